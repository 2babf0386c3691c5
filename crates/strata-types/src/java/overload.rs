//! Method applicability by phase (JLS 15.12.2.2-15.12.2.4) and most-specific selection.

use thiserror::Error;

use crate::subst::{Binding, Substitutor};
use crate::symbols::{ClassSymbolProvider, MethodSymbol};
use crate::ty::Type;

use super::format::format_type;
use super::subtyping::{erasure, ConversionMode};
use super::HierarchyResolver;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// No boxing, no variable arity.
    Strict,
    /// Boxing and unboxing, no variable arity.
    Loose,
    /// Boxing, unboxing and variable-arity expansion.
    Varargs,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Strict, Phase::Loose, Phase::Varargs];

    pub fn conversion_mode(self) -> ConversionMode {
        match self {
            Phase::Strict => ConversionMode::Strict,
            Phase::Loose | Phase::Varargs => ConversionMode::Loose,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Applicability {
    NotApplicable,
    FixedArity,
    VarargsArity,
}

impl Applicability {
    pub fn is_applicable(self) -> bool {
        self != Applicability::NotApplicable
    }
}

/// Decides whether an argument of type `from` may be passed to a parameter of type `to` in a
/// given phase.
pub trait AssignabilityPredicate {
    fn is_assignable(
        &self,
        env: &dyn ClassSymbolProvider,
        from: &Type,
        to: &Type,
        phase: Phase,
    ) -> bool;
}

impl<F> AssignabilityPredicate for F
where
    F: Fn(&dyn ClassSymbolProvider, &Type, &Type, Phase) -> bool,
{
    fn is_assignable(
        &self,
        env: &dyn ClassSymbolProvider,
        from: &Type,
        to: &Type,
        phase: Phase,
    ) -> bool {
        self(env, from, to, phase)
    }
}

/// Method invocation conversion as javac applies it.
#[derive(Clone, Copy, Debug, Default)]
pub struct JavaAssignability;

impl AssignabilityPredicate for JavaAssignability {
    fn is_assignable(
        &self,
        env: &dyn ClassSymbolProvider,
        from: &Type,
        to: &Type,
        phase: Phase,
    ) -> bool {
        HierarchyResolver::new(env).is_assignable(from, to, phase.conversion_mode())
    }
}

/// One overload under consideration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Declared parameter types, unsubstituted.
    pub formals: Vec<Type>,
    pub is_varargs: bool,
    /// Bindings of the receiver's (and any inferred method) type parameters.
    pub subst: Substitutor,
}

impl Candidate {
    pub fn new(formals: Vec<Type>, is_varargs: bool, subst: Substitutor) -> Self {
        Self {
            formals,
            is_varargs,
            subst,
        }
    }

    pub fn for_method(method: &MethodSymbol, subst: Substitutor) -> Self {
        Self::new(method.params.clone(), method.is_varargs, subst)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverloadResolution {
    Found {
        index: usize,
        phase: Phase,
        applicability: Applicability,
    },
    /// Several candidates are applicable in `phase` and none is more specific than the rest.
    /// `indices` holds the maximally specific ones.
    Ambiguous { phase: Phase, indices: Vec<usize> },
    NotFound,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("overload resolution was cancelled")]
pub struct Cancelled;

pub struct ApplicabilityChecker<'env, P = JavaAssignability> {
    env: &'env dyn ClassSymbolProvider,
    predicate: P,
}

impl<'env> ApplicabilityChecker<'env, JavaAssignability> {
    pub fn new(env: &'env dyn ClassSymbolProvider) -> Self {
        Self::with_predicate(env, JavaAssignability)
    }
}

impl<'env, P: AssignabilityPredicate> ApplicabilityChecker<'env, P> {
    pub fn with_predicate(env: &'env dyn ClassSymbolProvider, predicate: P) -> Self {
        Self { env, predicate }
    }

    /// Classify `actuals` against `formals` in one phase.
    ///
    /// When `actuals` and `formals` have the same length and the last actual is accepted by the
    /// last formal as is, the call is fixed-arity even for a variable-arity method (an array
    /// passed straight through).
    pub fn applicability(
        &self,
        formals: &[Type],
        is_varargs: bool,
        actuals: &[Type],
        subst: &Substitutor,
        phase: Phase,
    ) -> Applicability {
        let Some((last_formal, leading)) = formals.split_last() else {
            return if actuals.is_empty() {
                Applicability::FixedArity
            } else {
                Applicability::NotApplicable
            };
        };
        if actuals.len() + 1 < formals.len() {
            return Applicability::NotApplicable;
        }

        for (formal, actual) in leading.iter().zip(actuals) {
            if !self.accepts(actual, formal, subst, phase) {
                return Applicability::NotApplicable;
            }
        }

        if actuals.len() == formals.len() {
            if let Some(last_actual) = actuals.last() {
                if self.accepts(last_actual, last_formal, subst, phase) {
                    return Applicability::FixedArity;
                }
            }
        }

        if phase == Phase::Varargs && is_varargs {
            let Type::Array(component) = last_formal else {
                tracing::debug!(
                    ?last_formal,
                    "variable-arity method whose last parameter is not an array"
                );
                return Applicability::NotApplicable;
            };
            let trailing = &actuals[leading.len()..];
            if trailing
                .iter()
                .all(|actual| self.accepts(actual, component, subst, phase))
            {
                return Applicability::VarargsArity;
            }
        }

        Applicability::NotApplicable
    }

    fn accepts(&self, actual: &Type, formal: &Type, subst: &Substitutor, phase: Phase) -> bool {
        let target = subst.substitute(formal);
        if self.predicate.is_assignable(self.env, actual, &target, phase) {
            return true;
        }
        if !mentions_erased(formal, subst) {
            return false;
        }
        let erased = erasure(self.env, formal);
        erased != target && self.predicate.is_assignable(self.env, actual, &erased, phase)
    }

    /// Run the phases in order and pick the most specific candidate of the first phase that
    /// finds any applicable one.
    ///
    /// `is_cancelled` is polled before each candidate is examined.
    pub fn resolve(
        &self,
        candidates: &[Candidate],
        actuals: &[Type],
        is_cancelled: impl Fn() -> bool,
    ) -> Result<OverloadResolution, Cancelled> {
        for phase in Phase::ALL {
            let mut applicable = Vec::new();
            for (index, candidate) in candidates.iter().enumerate() {
                if is_cancelled() {
                    return Err(Cancelled);
                }
                let applicability = self.applicability(
                    &candidate.formals,
                    candidate.is_varargs,
                    actuals,
                    &candidate.subst,
                    phase,
                );
                if applicability.is_applicable() {
                    applicable.push((index, applicability));
                }
            }
            if applicable.is_empty() {
                continue;
            }

            tracing::debug!(?phase, applicable = applicable.len(), "overload phase selected");
            return Ok(self.most_specific(candidates, &applicable, phase, actuals.len()));
        }
        Ok(OverloadResolution::NotFound)
    }

    fn most_specific(
        &self,
        candidates: &[Candidate],
        applicable: &[(usize, Applicability)],
        phase: Phase,
        arity: usize,
    ) -> OverloadResolution {
        if let [(index, applicability)] = applicable {
            return OverloadResolution::Found {
                index: *index,
                phase,
                applicability: *applicability,
            };
        }

        let hierarchy = HierarchyResolver::new(self.env);
        let more_specific = |a: &(usize, Applicability), b: &(usize, Applicability)| {
            let (ca, cb) = (&candidates[a.0], &candidates[b.0]);
            let width = arity.max(ca.formals.len()).max(cb.formals.len());
            let pa = expanded_formals(ca, a.1, width);
            let pb = expanded_formals(cb, b.1, width);
            pa.len() == pb.len()
                && pa
                    .iter()
                    .zip(&pb)
                    .all(|(x, y)| hierarchy.is_subtype(x, y))
        };

        let winners: Vec<&(usize, Applicability)> = applicable
            .iter()
            .filter(|a| {
                applicable
                    .iter()
                    .all(|b| a.0 == b.0 || more_specific(a, b))
            })
            .collect();
        if let [(index, applicability)] = winners.as_slice() {
            return OverloadResolution::Found {
                index: *index,
                phase,
                applicability: *applicability,
            };
        }

        let indices: Vec<usize> = applicable
            .iter()
            .filter(|a| {
                !applicable
                    .iter()
                    .any(|b| a.0 != b.0 && more_specific(b, a) && !more_specific(a, b))
            })
            .map(|a| a.0)
            .collect();
        if tracing::enabled!(tracing::Level::DEBUG) {
            let signatures: Vec<String> = indices
                .iter()
                .map(|&index| {
                    let formals = &candidates[index].formals;
                    let rendered: Vec<String> =
                        formals.iter().map(|f| format_type(self.env, f)).collect();
                    format!("({})", rendered.join(", "))
                })
                .collect();
            tracing::debug!(?phase, ?indices, ?signatures, "ambiguous overloads");
        }
        OverloadResolution::Ambiguous { phase, indices }
    }
}

/// Does `ty` refer to a type variable that `subst` erases, i.e. is this formal seen through a raw
/// receiver?
fn mentions_erased(ty: &Type, subst: &Substitutor) -> bool {
    match ty {
        Type::TypeVar(var) => matches!(subst.get(*var), Some(Binding::Erased(_))),
        Type::Class(ct) => ct.args.iter().any(|arg| mentions_erased(arg, subst)),
        Type::Array(component) => mentions_erased(component, subst),
        Type::Wildcard(bound) => bound.bound().is_some_and(|b| mentions_erased(b, subst)),
        Type::Intersection(parts) | Type::Disjunction(parts) => {
            parts.iter().any(|part| mentions_erased(part, subst))
        }
        Type::Primitive(_) | Type::Captured(_) | Type::Null | Type::Unknown => false,
    }
}

/// Substituted parameter types as seen by a call of `width` arguments. Variable-arity
/// candidates repeat their component type to fill the width.
fn expanded_formals(
    candidate: &Candidate,
    applicability: Applicability,
    width: usize,
) -> Vec<Type> {
    let mut formals: Vec<Type> = candidate
        .formals
        .iter()
        .map(|formal| candidate.subst.substitute(formal))
        .collect();
    if applicability != Applicability::VarargsArity {
        return formals;
    }
    let component = match formals.pop() {
        Some(Type::Array(component)) => *component,
        Some(other) => return [formals, vec![other]].concat(),
        None => return formals,
    };
    while formals.len() < width {
        formals.push(component.clone());
    }
    formals
}
