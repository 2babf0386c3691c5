//! Propagation of type-argument bindings through the class hierarchy.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::cache::{CacheOptions, CacheStats, GenerationalCache};
use crate::subst::{Binding, Substitutor};
use crate::symbols::{ClassSymbol, ClassSymbolProvider};
use crate::ty::{ClassId, ClassType, Type, TypeVarId};

use super::subtyping::{upper_bounds, ConversionMode, Relations};

type SubstitutorKey = (ClassId, ClassId, Substitutor);

/// Memo tables for [`HierarchyResolver`]. Bound to a single symbol provider.
pub struct HierarchyCache {
    substitutors: GenerationalCache<SubstitutorKey, Option<Substitutor>>,
    supertypes: GenerationalCache<ClassId, Arc<[ClassId]>>,
}

impl HierarchyCache {
    pub fn new(options: &CacheOptions) -> Self {
        Self {
            substitutors: GenerationalCache::new(options),
            supertypes: GenerationalCache::new(options),
        }
    }

    pub fn clear(&self) {
        self.substitutors.clear();
        self.supertypes.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let a = self.substitutors.stats();
        let b = self.supertypes.stats();
        CacheStats {
            hits: a.hits + b.hits,
            misses: a.misses + b.misses,
        }
    }
}

impl fmt::Debug for HierarchyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchyCache")
            .field("substitutors", &self.substitutors.len())
            .field("supertypes", &self.supertypes.len())
            .finish()
    }
}

/// Walks declared supertypes depth-first (interfaces before the superclass), substituting type
/// arguments along the way.
///
/// Diamonds resolve to the first path discovered; a later path through the same class is never
/// examined, even if it would bind the target's parameters differently.
#[derive(Clone, Copy)]
pub struct HierarchyResolver<'env> {
    env: &'env dyn ClassSymbolProvider,
    cache: Option<&'env HierarchyCache>,
}

impl fmt::Debug for HierarchyResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchyResolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<'env> HierarchyResolver<'env> {
    pub fn new(env: &'env dyn ClassSymbolProvider) -> Self {
        Self { env, cache: None }
    }

    pub fn with_cache(env: &'env dyn ClassSymbolProvider, cache: &'env HierarchyCache) -> Self {
        Self {
            env,
            cache: Some(cache),
        }
    }

    pub fn env(&self) -> &'env dyn ClassSymbolProvider {
        self.env
    }

    /// The substitutor for `target`'s parameters when `from` is used with `from_subst`.
    ///
    /// `None` when `target` is neither `from` nor one of its supertypes.
    pub fn super_substitutor(
        &self,
        target: ClassId,
        from: ClassId,
        from_subst: &Substitutor,
    ) -> Option<Substitutor> {
        if target == from {
            return Some(from_subst.clone());
        }
        if self.env.class(from).is_none() {
            tracing::debug!(?from, "super_substitutor: unknown class");
            return None;
        }
        if target == self.env.well_known().object {
            return Some(Substitutor::empty());
        }

        let Some(cache) = self.cache else {
            return self.search(target, from, from_subst);
        };
        let generation = self.env.generation();
        let key = (target, from, from_subst.clone());
        if let Some(hit) = cache.substitutors.get(&key, generation) {
            tracing::trace!(?target, ?from, "super_substitutor cache hit");
            return hit;
        }
        tracing::trace!(?target, ?from, "super_substitutor cache miss");
        let result = self.search(target, from, from_subst);
        cache.substitutors.insert(key, generation, result.clone());
        result
    }

    fn search(&self, target: ClassId, from: ClassId, from_subst: &Substitutor) -> Option<Substitutor> {
        let mut visited = HashSet::new();
        self.search_from(target, from, from_subst, &mut visited)
    }

    fn search_from(
        &self,
        target: ClassId,
        current: ClassId,
        subst: &Substitutor,
        visited: &mut HashSet<ClassId>,
    ) -> Option<Substitutor> {
        if !visited.insert(current) {
            return None;
        }
        let symbol = self.env.class(current)?;
        let raw = subst.is_raw_for(&self.scope_params(symbol));
        for sup in symbol.declared_supertypes() {
            let sup_subst = self.supertype_substitutor(sup, subst, raw);
            if sup.def == target {
                return Some(sup_subst);
            }
            if let Some(found) = self.search_from(target, sup.def, &sup_subst, visited) {
                return Some(found);
            }
        }
        None
    }

    /// Bindings for `sup`'s parameters (and its enclosing classes') given the bindings of the
    /// class declaring it. `declaring_raw` is set when that class is used raw.
    fn supertype_substitutor(
        &self,
        sup: &ClassType,
        subst: &Substitutor,
        declaring_raw: bool,
    ) -> Substitutor {
        let Some(sup_symbol) = self.env.class(sup.def) else {
            tracing::debug!(class = ?sup.def, "supertype refers to an unknown class");
            return Substitutor::empty();
        };
        let declared_raw = sup.args.is_empty() && !sup_symbol.type_params.is_empty();
        if declared_raw || declaring_raw {
            return Substitutor::raw_for(self.env, sup.def);
        }
        if sup.args.len() != sup_symbol.type_params.len() {
            tracing::debug!(
                class = %sup_symbol.name,
                expected = sup_symbol.type_params.len(),
                found = sup.args.len(),
                "supertype has the wrong number of type arguments; treating it as raw"
            );
            return Substitutor::raw_for(self.env, sup.def);
        }

        let mut out = Substitutor::from_pairs(
            sup_symbol
                .type_params
                .iter()
                .copied()
                .zip(sup.args.iter().map(|arg| subst.substitute(arg))),
        );
        for var in self.enclosing_params(sup_symbol) {
            out = match subst.get(var) {
                Some(Binding::Type(ty)) => out.put(var, ty.clone()),
                Some(Binding::Erased(ty)) => out.put_erased(var, ty.clone()),
                None => continue,
            };
        }
        out
    }

    /// `symbol`'s own type parameters followed by those of its enclosing generic scopes.
    pub(crate) fn scope_params(&self, symbol: &ClassSymbol) -> Vec<TypeVarId> {
        let mut params = symbol.type_params.clone();
        params.extend(self.enclosing_params(symbol));
        params
    }

    /// Type parameters of the classes whose parameters are in scope inside `symbol`.
    fn enclosing_params(&self, symbol: &ClassSymbol) -> Vec<TypeVarId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut scope = symbol.enclosing_generic_scope();
        while let Some(id) = scope {
            if !visited.insert(id) {
                break;
            }
            let Some(outer) = self.env.class(id) else {
                break;
            };
            out.extend(outer.type_params.iter().copied());
            scope = outer.enclosing_generic_scope();
        }
        out
    }

    /// Every transitive supertype of `class`, in depth-first discovery order, ending with
    /// `Object` unless it was already reached.
    pub fn all_supertypes(&self, class: ClassId) -> Vec<ClassId> {
        self.supertypes(class).to_vec()
    }

    fn supertypes(&self, class: ClassId) -> Arc<[ClassId]> {
        let Some(cache) = self.cache else {
            return self.collect_supertypes(class);
        };
        let generation = self.env.generation();
        cache
            .supertypes
            .get_or_insert_with(class, generation, || self.collect_supertypes(class))
    }

    fn collect_supertypes(&self, class: ClassId) -> Arc<[ClassId]> {
        if self.env.class(class).is_none() {
            tracing::debug!(?class, "all_supertypes: unknown class");
            return Arc::from(Vec::new());
        }

        let mut out = Vec::new();
        let mut visited = HashSet::from([class]);
        // Preorder DFS; each frame holds the not-yet-visited declared supertypes of one class.
        let mut frames = vec![self.declared_ids(class).into_iter()];
        while let Some(frame) = frames.last_mut() {
            let Some(next) = frame.next() else {
                frames.pop();
                continue;
            };
            if !visited.insert(next) {
                continue;
            }
            out.push(next);
            frames.push(self.declared_ids(next).into_iter());
        }

        let object = self.env.well_known().object;
        if class != object && !visited.contains(&object) {
            out.push(object);
        }
        Arc::from(out)
    }

    fn declared_ids(&self, class: ClassId) -> Vec<ClassId> {
        self.env
            .class(class)
            .map(|symbol| symbol.declared_supertypes().map(|sup| sup.def).collect())
            .unwrap_or_default()
    }

    /// Reflexive-transitive inheritance test.
    pub fn is_inheritor(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup || self.supertypes(sub).contains(&sup)
    }

    /// `ty` viewed as an instantiation of `target`.
    pub fn instantiate_supertype(&self, ty: &ClassType, target: ClassId) -> Option<ClassType> {
        let from_subst = Substitutor::for_class_type(self.env, ty);
        let subst = self.super_substitutor(target, ty.def, &from_subst)?;
        let target_symbol = self.env.class(target)?;
        let params = &target_symbol.type_params;
        if params.is_empty() || subst.is_raw_for(params) {
            return Some(ClassType::new(target, Vec::new()));
        }
        let args = params
            .iter()
            .map(|param| subst.substitute(&Type::TypeVar(*param)))
            .collect();
        Some(ClassType::new(target, args))
    }

    /// Like [`HierarchyResolver::instantiate_supertype`], but also looks through arrays, type
    /// variable and captured bounds, and intersections.
    pub fn as_supertype(&self, ty: &Type, target: ClassId) -> Option<ClassType> {
        self.as_supertype_guarded(ty, target, &mut Vec::new())
    }

    fn as_supertype_guarded(
        &self,
        ty: &Type,
        target: ClassId,
        expanding: &mut Vec<Type>,
    ) -> Option<ClassType> {
        match ty {
            Type::Class(ct) => self.instantiate_supertype(ct, target),
            Type::Array(_) => {
                let wk = self.env.well_known();
                (target == wk.object || target == wk.cloneable || target == wk.serializable)
                    .then(|| ClassType::new(target, Vec::new()))
            }
            Type::TypeVar(_) | Type::Captured(_) => {
                if expanding.contains(ty) {
                    return None;
                }
                expanding.push(ty.clone());
                let found = upper_bounds(self.env, ty)
                    .iter()
                    .find_map(|bound| self.as_supertype_guarded(bound, target, expanding));
                expanding.pop();
                found
            }
            Type::Intersection(parts) => parts
                .iter()
                .find_map(|part| self.as_supertype_guarded(part, target, expanding)),
            _ => None,
        }
    }

    pub fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        Relations::new(self).is_subtype(sub, sup)
    }

    pub fn is_assignable(&self, from: &Type, to: &Type, mode: ConversionMode) -> bool {
        Relations::new(self).is_assignable(from, to, mode)
    }

    /// See [`super::glb`].
    pub fn glb(&self, candidates: Vec<Type>) -> Type {
        let object = self.env.well_known().object_type();
        let mut flat = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match candidate {
                Type::Intersection(parts) => flat.extend(parts),
                other => flat.push(other),
            }
        }
        flat.retain(|candidate| !candidate.is_unknown() && *candidate != object);
        flat.sort();
        flat.dedup();

        let mut relations = Relations::new(self);
        let (arrays, mut kept): (Vec<Type>, Vec<Type>) =
            flat.into_iter().partition(|c| matches!(c, Type::Array(_)));
        // At most one array survives: the first (in canonical order) that is a subtype of every
        // other candidate.
        let array = arrays.iter().find(|array| {
            arrays
                .iter()
                .chain(kept.iter())
                .all(|other| relations.is_subtype(array, other))
        });
        match array {
            Some(array) => kept.push(array.clone()),
            None if !arrays.is_empty() => {
                tracing::debug!(
                    arrays = arrays.len(),
                    "glb: skipping array bounds that do not fit the other candidates"
                );
            }
            None => {}
        }
        kept.sort();

        let mut survivors = Vec::with_capacity(kept.len());
        for (i, candidate) in kept.iter().enumerate() {
            let mut redundant = false;
            for (j, other) in kept.iter().enumerate() {
                if i == j || !relations.is_subtype(other, candidate) {
                    continue;
                }
                // Of two mutually-subtyped candidates only the first is kept.
                if j < i || !relations.is_subtype(candidate, other) {
                    redundant = true;
                    break;
                }
            }
            if !redundant {
                survivors.push(candidate.clone());
            }
        }

        match survivors.len() {
            0 => object,
            _ => Type::intersection(survivors),
        }
    }
}
