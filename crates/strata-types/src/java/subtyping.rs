//! Erasure, subtyping and assignability (JLS 4.6, 4.10, 5.1-5.3).
//!
//! The free functions here build an uncached [`HierarchyResolver`] per call. Callers issuing many
//! queries against the same symbol table should hold a resolver with a [`HierarchyCache`] and use
//! its methods instead.
//!
//! [`HierarchyCache`]: super::HierarchyCache

use crate::symbols::ClassSymbolProvider;
use crate::ty::{ClassId, ClassType, PrimitiveType, Type, WildcardBound};

use super::hierarchy::HierarchyResolver;

/// Recursion limit for relations that unfold bounds through generic supertypes. F-bounded
/// declarations can otherwise grow types without revisiting a variable.
const MAX_DEPTH: u32 = 64;

/// Which method-invocation conversions an assignability check may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConversionMode {
    /// Identity, widening primitive/reference and unchecked conversion.
    Strict,
    /// [`ConversionMode::Strict`] plus boxing and unboxing.
    Loose,
}

pub fn erasure(env: &dyn ClassSymbolProvider, ty: &Type) -> Type {
    erase(env, ty, &mut Vec::new())
}

fn erase(env: &dyn ClassSymbolProvider, ty: &Type, expanding: &mut Vec<Type>) -> Type {
    let object = || env.well_known().object_type();
    match ty {
        Type::Primitive(_) | Type::Null | Type::Unknown => ty.clone(),
        Type::Class(ct) => Type::class(ct.def, vec![]),
        Type::Array(component) => Type::array(erase(env, component, expanding)),
        Type::Wildcard(WildcardBound::Extends(bound)) => erase(env, bound, expanding),
        Type::Wildcard(_) => object(),
        Type::TypeVar(_) | Type::Captured(_) => {
            if expanding.contains(ty) {
                return object();
            }
            // The erasure of a variable is the erasure of its leftmost bound.
            let Some(first) = upper_bounds(env, ty).into_iter().next() else {
                return object();
            };
            expanding.push(ty.clone());
            let erased = erase(env, &first, expanding);
            expanding.pop();
            erased
        }
        Type::Intersection(parts) => {
            let preferred = parts
                .iter()
                .find(|part| match part {
                    Type::Class(ct) => env.class(ct.def).is_some_and(|c| !c.is_interface()),
                    _ => false,
                })
                .or_else(|| parts.first());
            match preferred {
                Some(part) => erase(env, part, expanding),
                None => object(),
            }
        }
        Type::Disjunction(alternatives) => erased_lub(env, alternatives),
    }
}

/// The closest common superclass of the alternatives' erasures.
fn erased_lub(env: &dyn ClassSymbolProvider, alternatives: &[Type]) -> Type {
    let object = env.well_known().object;
    let mut classes = Vec::with_capacity(alternatives.len());
    for alt in alternatives {
        match erasure(env, alt) {
            Type::Class(ct) => classes.push(ct.def),
            _ => return Type::class(object, vec![]),
        }
    }
    let Some((&first, rest)) = classes.split_first() else {
        return Type::class(object, vec![]);
    };

    let hierarchy = HierarchyResolver::new(env);
    let mut candidate = Some(first);
    let mut steps = 0usize;
    while let Some(id) = candidate {
        if rest.iter().all(|other| hierarchy.is_inheritor(*other, id)) {
            return Type::class(id, vec![]);
        }
        steps += 1;
        if steps > 256 {
            break;
        }
        candidate = env
            .class(id)
            .and_then(|symbol| symbol.super_class.as_ref())
            .map(|sup| sup.def);
    }
    Type::class(object, vec![])
}

/// Declared upper bounds of a type variable or captured wildcard; `[Object]` when there are none
/// (or the variable is unknown). Empty for every other type.
pub(crate) fn upper_bounds(env: &dyn ClassSymbolProvider, ty: &Type) -> Vec<Type> {
    let object = || vec![env.well_known().object_type()];
    match ty {
        Type::TypeVar(var) => match env.type_param(*var) {
            Some(def) if !def.upper_bounds.is_empty() => def.upper_bounds.clone(),
            Some(_) => object(),
            None => {
                tracing::debug!(?var, "type variable is not in scope; assuming Object bound");
                object()
            }
        },
        Type::Captured(id) => match env.captured(*id) {
            Some(captured) => match captured.upper_bound {
                Type::Intersection(parts) => parts,
                bound => vec![bound],
            },
            None => {
                tracing::debug!(?id, "captured wildcard has no recorded bounds; assuming Object");
                object()
            }
        },
        _ => Vec::new(),
    }
}

pub fn is_subtype(env: &dyn ClassSymbolProvider, sub: &Type, sup: &Type) -> bool {
    HierarchyResolver::new(env).is_subtype(sub, sup)
}

pub fn is_assignable(
    env: &dyn ClassSymbolProvider,
    from: &Type,
    to: &Type,
    mode: ConversionMode,
) -> bool {
    HierarchyResolver::new(env).is_assignable(from, to, mode)
}

/// `ty` viewed as an instantiation of `target`, e.g. `ArrayList<String>` as `List` is
/// `List<String>`. Raw when the path to `target` goes through a raw type.
pub fn as_supertype(env: &dyn ClassSymbolProvider, ty: &Type, target: ClassId) -> Option<ClassType> {
    HierarchyResolver::new(env).as_supertype(ty, target)
}

/// Boxing conversion (JLS 5.1.7). `void` has no box.
pub fn box_primitive(env: &dyn ClassSymbolProvider, primitive: PrimitiveType) -> Option<Type> {
    if primitive == PrimitiveType::Void {
        return None;
    }
    Some(Type::class(env.well_known().boxed(primitive), vec![]))
}

/// Unboxing conversion (JLS 5.1.8), including variables bounded by a box type.
pub fn unbox(env: &dyn ClassSymbolProvider, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Class(ct) => env.well_known().unboxed(ct.def),
        Type::TypeVar(_) | Type::Captured(_) | Type::Intersection(_) => match erasure(env, ty) {
            Type::Class(ct) => env.well_known().unboxed(ct.def),
            _ => None,
        },
        _ => None,
    }
}

/// Greatest lower bound of a multiset of reference types (JLS 5.1.10).
///
/// Never returns an intersection containing a supertype of another conjunct. An empty or
/// all-`Object` input yields `Object`.
pub fn glb(env: &dyn ClassSymbolProvider, candidates: Vec<Type>) -> Type {
    HierarchyResolver::new(env).glb(candidates)
}

/// One relation query. Tracks the variables whose bounds are being unfolded so that cyclic
/// bounds terminate.
pub(crate) struct Relations<'r, 'env> {
    hierarchy: &'r HierarchyResolver<'env>,
    expanding: Vec<Type>,
    depth: u32,
}

impl<'r, 'env> Relations<'r, 'env> {
    pub(crate) fn new(hierarchy: &'r HierarchyResolver<'env>) -> Self {
        Self {
            hierarchy,
            expanding: Vec::new(),
            depth: 0,
        }
    }

    fn env(&self) -> &'env dyn ClassSymbolProvider {
        self.hierarchy.env()
    }

    pub(crate) fn is_subtype(&mut self, sub: &Type, sup: &Type) -> bool {
        if sub.is_unknown() || sup.is_unknown() {
            return false;
        }
        if sub == sup {
            return !sub.contains_unknown();
        }
        if self.depth >= MAX_DEPTH {
            tracing::debug!(depth = self.depth, "subtype check exceeded recursion limit");
            return false;
        }

        self.depth += 1;
        let result = self.is_subtype_uncached(sub, sup);
        self.depth -= 1;
        result
    }

    fn is_subtype_uncached(&mut self, sub: &Type, sup: &Type) -> bool {
        match sup {
            Type::Intersection(parts) => {
                return parts.iter().all(|part| self.is_subtype(sub, part));
            }
            Type::Disjunction(alternatives)
                if !matches!(sub, Type::Disjunction(_) | Type::Intersection(_)) =>
            {
                return alternatives.iter().any(|alt| self.is_subtype(sub, alt));
            }
            Type::Wildcard(_) | Type::Null => return false,
            Type::Captured(id) => {
                let lower = self.env().captured(*id).and_then(|c| c.lower_bound);
                if let Some(lower) = lower {
                    if self.is_subtype(sub, &lower) {
                        return true;
                    }
                }
            }
            _ => {}
        }

        match sub {
            Type::Unknown | Type::Wildcard(_) => false,
            Type::Null => sup.is_reference(),
            Type::Primitive(from) => match sup {
                Type::Primitive(to) => from.widens_to(*to),
                _ => false,
            },
            Type::Intersection(parts) => parts.iter().any(|part| self.is_subtype(part, sup)),
            Type::Disjunction(alternatives) => {
                alternatives.iter().all(|alt| self.is_subtype(alt, sup))
            }
            Type::TypeVar(_) | Type::Captured(_) => self.bound_is_subtype(sub, sup),
            Type::Array(component) => self.array_is_subtype(component, sup),
            Type::Class(ct) => self.class_is_subtype(ct, sup),
        }
    }

    fn bound_is_subtype(&mut self, sub: &Type, sup: &Type) -> bool {
        if self.expanding.contains(sub) {
            return false;
        }
        let bounds = upper_bounds(self.env(), sub);
        self.expanding.push(sub.clone());
        let result = bounds.iter().any(|bound| self.is_subtype(bound, sup));
        self.expanding.pop();
        result
    }

    fn array_is_subtype(&mut self, component: &Type, sup: &Type) -> bool {
        match sup {
            Type::Array(sup_component) => match (component, &**sup_component) {
                (Type::Primitive(a), Type::Primitive(b)) => a == b,
                (a, b) if !a.is_primitive() && !b.is_primitive() => self.is_subtype(a, b),
                _ => false,
            },
            Type::Class(ct) => {
                let wk = self.env().well_known();
                ct.args.is_empty()
                    && (ct.def == wk.object || ct.def == wk.cloneable || ct.def == wk.serializable)
            }
            _ => false,
        }
    }

    fn class_is_subtype(&mut self, sub: &ClassType, sup: &Type) -> bool {
        let Type::Class(target) = sup else {
            return false;
        };
        if target.def == self.env().well_known().object {
            return true;
        }
        let Some(view) = self.hierarchy.instantiate_supertype(sub, target.def) else {
            return false;
        };
        if target.args.is_empty() {
            return true;
        }
        if view.args.len() != target.args.len() {
            return false;
        }
        view.args
            .iter()
            .zip(&target.args)
            .all(|(arg, formal)| self.contains(arg, formal))
    }

    /// Type argument containment (JLS 4.5.1): does `formal` contain `arg`?
    fn contains(&mut self, arg: &Type, formal: &Type) -> bool {
        match formal {
            Type::Wildcard(WildcardBound::Unbounded) => !arg.contains_unknown(),
            Type::Wildcard(WildcardBound::Extends(bound)) => match arg {
                Type::Wildcard(WildcardBound::Extends(inner)) => self.is_subtype(inner, bound),
                Type::Wildcard(_) => self.is_object(bound),
                _ => self.is_subtype(arg, bound),
            },
            Type::Wildcard(WildcardBound::Super(bound)) => match arg {
                Type::Wildcard(WildcardBound::Super(inner)) => self.is_subtype(bound, inner),
                Type::Wildcard(_) => false,
                _ => self.is_subtype(bound, arg),
            },
            _ => arg == formal && !arg.contains_unknown(),
        }
    }

    fn is_object(&self, ty: &Type) -> bool {
        matches!(ty, Type::Class(ct) if ct.def == self.env().well_known().object)
    }

    pub(crate) fn is_assignable(&mut self, from: &Type, to: &Type, mode: ConversionMode) -> bool {
        if from.is_unknown() || to.is_unknown() {
            return false;
        }
        if self.is_subtype(from, to) {
            return true;
        }

        let env = self.env();
        if mode == ConversionMode::Loose {
            match (from, to) {
                (Type::Primitive(primitive), _) if to.is_reference() => {
                    if let Some(boxed) = box_primitive(env, *primitive) {
                        if self.is_subtype(&boxed, to) {
                            return true;
                        }
                    }
                }
                (_, Type::Primitive(target)) if from.is_reference() => {
                    if let Some(unboxed) = unbox(env, from) {
                        if unboxed == *target || unboxed.widens_to(*target) {
                            return true;
                        }
                    }
                }
                _ => {}
            }
        }

        self.is_unchecked_conversion(from, to)
    }

    /// A raw type converts to any parameterization of its (transitive) generic supertypes.
    fn is_unchecked_conversion(&mut self, from: &Type, to: &Type) -> bool {
        let Type::Class(target) = to else {
            return false;
        };
        if target.args.is_empty() || !from.is_reference() {
            return false;
        }
        let Some(view) = self.hierarchy.as_supertype(from, target.def) else {
            return false;
        };
        let unchecked = view.args.is_empty();
        if unchecked {
            tracing::trace!(class = ?target.def, "unchecked conversion from raw type");
        }
        unchecked
    }
}
