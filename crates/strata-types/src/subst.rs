//! Immutable type-variable substitutions.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::java::{erasure, format_type};
use crate::symbols::ClassSymbolProvider;
use crate::ty::{ClassId, ClassType, Type, TypeVarId, WildcardBound};

/// What a substitutor does with one type variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    Type(Type),
    /// Deliberate erasure (raw use). Holds the precomputed erasure of the variable.
    Erased(Type),
}

impl Binding {
    pub fn ty(&self) -> &Type {
        match self {
            Binding::Type(ty) | Binding::Erased(ty) => ty,
        }
    }
}

/// An immutable map from type variables to types.
///
/// Variables without a binding substitute to themselves. Substitutors are cheap to clone; `put`
/// copies the underlying map only when it is shared.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Substitutor {
    map: Arc<BTreeMap<TypeVarId, Binding>>,
}

impl Substitutor {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (TypeVarId, Type)>) -> Self {
        let map = pairs
            .into_iter()
            .map(|(var, ty)| (var, Binding::Type(ty)))
            .collect();
        Self { map: Arc::new(map) }
    }

    #[must_use]
    pub fn put(&self, var: TypeVarId, ty: Type) -> Self {
        self.with_binding(var, Binding::Type(ty))
    }

    #[must_use]
    pub fn put_erased(&self, var: TypeVarId, erasure: Type) -> Self {
        self.with_binding(var, Binding::Erased(erasure))
    }

    fn with_binding(&self, var: TypeVarId, binding: Binding) -> Self {
        let mut out = self.clone();
        Arc::make_mut(&mut out.map).insert(var, binding);
        out
    }

    pub fn get(&self, var: TypeVarId) -> Option<&Binding> {
        self.map.get(&var)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeVarId, &Binding)> {
        self.map.iter().map(|(var, binding)| (*var, binding))
    }

    /// A substitutor is raw when it erases at least one variable.
    pub fn is_raw(&self) -> bool {
        self.map
            .values()
            .any(|binding| matches!(binding, Binding::Erased(_)))
    }

    pub fn is_raw_for(&self, params: &[TypeVarId]) -> bool {
        params
            .iter()
            .any(|param| matches!(self.map.get(param), Some(Binding::Erased(_))))
    }

    pub fn substitute(&self, ty: &Type) -> Type {
        if self.map.is_empty() {
            return ty.clone();
        }

        match ty {
            Type::Primitive(_) | Type::Null | Type::Unknown | Type::Captured(_) => ty.clone(),
            Type::Class(ClassType { def, args }) => Type::class(
                *def,
                args.iter().map(|arg| self.substitute(arg)).collect(),
            ),
            Type::Array(component) => Type::array(self.substitute(component)),
            Type::Wildcard(bound) => Type::Wildcard(self.substitute_wildcard(bound)),
            Type::Intersection(parts) => {
                Type::intersection(parts.iter().map(|part| self.substitute(part)).collect())
            }
            Type::Disjunction(alternatives) => Type::Disjunction(
                alternatives
                    .iter()
                    .map(|alt| self.substitute(alt))
                    .collect(),
            ),
            Type::TypeVar(var) => match self.map.get(var) {
                Some(binding) => binding.ty().clone(),
                None => ty.clone(),
            },
        }
    }

    fn substitute_wildcard(&self, bound: &WildcardBound) -> WildcardBound {
        match bound {
            WildcardBound::Unbounded => WildcardBound::Unbounded,
            // A variable bound to a wildcard inside a wildcard bound folds into a single wildcard.
            WildcardBound::Extends(inner) => match self.substitute(inner) {
                Type::Wildcard(WildcardBound::Extends(b)) => WildcardBound::Extends(b),
                Type::Wildcard(_) => WildcardBound::Unbounded,
                other => WildcardBound::Extends(Box::new(other)),
            },
            WildcardBound::Super(inner) => match self.substitute(inner) {
                Type::Wildcard(WildcardBound::Super(b)) => WildcardBound::Super(b),
                Type::Wildcard(_) => WildcardBound::Unbounded,
                other => WildcardBound::Super(Box::new(other)),
            },
        }
    }

    /// `compose(outer, inner).substitute(t) == outer.substitute(&inner.substitute(t))`.
    pub fn compose(outer: &Substitutor, inner: &Substitutor) -> Substitutor {
        if inner.is_empty() {
            return outer.clone();
        }
        if outer.is_empty() {
            return inner.clone();
        }

        let mut map: BTreeMap<TypeVarId, Binding> = inner
            .map
            .iter()
            .map(|(var, binding)| {
                let rebound = match binding {
                    Binding::Type(ty) => Binding::Type(outer.substitute(ty)),
                    Binding::Erased(ty) => Binding::Erased(outer.substitute(ty)),
                };
                (*var, rebound)
            })
            .collect();
        for (var, binding) in outer.map.iter() {
            map.entry(*var).or_insert_with(|| binding.clone());
        }

        Substitutor { map: Arc::new(map) }
    }

    /// The substitutor for a raw use of `class`: its parameters, and those of every enclosing
    /// class whose parameters are in scope, are erased.
    pub fn raw_for(env: &dyn ClassSymbolProvider, class: ClassId) -> Substitutor {
        let mut map = BTreeMap::new();
        let mut visited = HashSet::new();
        let mut scope = Some(class);
        while let Some(id) = scope {
            if !visited.insert(id) {
                break;
            }
            let Some(symbol) = env.class(id) else {
                break;
            };
            for param in &symbol.type_params {
                map.entry(*param)
                    .or_insert_with(|| Binding::Erased(erasure(env, &Type::TypeVar(*param))));
            }
            scope = symbol.enclosing_generic_scope();
        }
        Substitutor { map: Arc::new(map) }
    }

    /// Map the parameters of `ty.def` to `ty`'s arguments.
    ///
    /// Raw uses (no arguments on a generic class) and malformed argument lists produce the raw
    /// substitutor for the class.
    pub fn for_class_type(env: &dyn ClassSymbolProvider, ty: &ClassType) -> Substitutor {
        let Some(symbol) = env.class(ty.def) else {
            return Substitutor::empty();
        };
        if symbol.type_params.is_empty() {
            return Substitutor::empty();
        }
        if ty.args.len() != symbol.type_params.len() {
            if !ty.args.is_empty() {
                tracing::debug!(
                    ty = %format_type(env, &Type::Class(ty.clone())),
                    expected = symbol.type_params.len(),
                    found = ty.args.len(),
                    "type argument count mismatch; treating use as raw"
                );
            }
            return Substitutor::raw_for(env, ty.def);
        }
        Substitutor::from_pairs(
            symbol
                .type_params
                .iter()
                .copied()
                .zip(ty.args.iter().cloned()),
        )
    }
}
