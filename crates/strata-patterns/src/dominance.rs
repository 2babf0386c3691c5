//! Pattern totality, dominance and covering (JLS 14.30.3, 14.11.1).

use std::fmt;

use strata_types::java::{box_primitive, erasure, unbox, HierarchyResolver};
use strata_types::{ClassKind, ClassSymbolProvider, PrimitiveType, RecordComponentProvider, Type};

use crate::pattern::{is_guarded, ConstExprEvaluator, Pattern, SwitchLabel};

/// Answers dominance questions about patterns against one symbol table.
///
/// Every query is total: a relation that cannot be established (unknown types, non-record
/// deconstruction targets, arity mismatches) is simply `false`.
#[derive(Clone, Copy)]
pub struct PatternDominance<'env> {
    hierarchy: HierarchyResolver<'env>,
    records: &'env dyn RecordComponentProvider,
}

impl fmt::Debug for PatternDominance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternDominance")
            .field("hierarchy", &self.hierarchy)
            .finish_non_exhaustive()
    }
}

impl<'env> PatternDominance<'env> {
    pub fn new(
        env: &'env dyn ClassSymbolProvider,
        records: &'env dyn RecordComponentProvider,
    ) -> Self {
        Self::with_hierarchy(HierarchyResolver::new(env), records)
    }

    /// Share a (typically cached) resolver.
    pub fn with_hierarchy(
        hierarchy: HierarchyResolver<'env>,
        records: &'env dyn RecordComponentProvider,
    ) -> Self {
        Self { hierarchy, records }
    }

    fn env(&self) -> &'env dyn ClassSymbolProvider {
        self.hierarchy.env()
    }

    /// Does every value of type `ty` match a type test for `pattern_ty`, without loss of
    /// information?
    pub fn type_is_unconditionally_exact(&self, ty: &Type, pattern_ty: &Type) -> bool {
        if ty.contains_unknown() || pattern_ty.contains_unknown() {
            return false;
        }
        match (ty, pattern_ty) {
            (Type::Null, _) => pattern_ty.is_reference(),
            (Type::Primitive(from), Type::Primitive(to)) => {
                from == to || from.widens_exactly_to(*to)
            }
            (Type::Primitive(p), _) => match box_primitive(self.env(), *p) {
                Some(boxed) => self.type_is_unconditionally_exact(&boxed, pattern_ty),
                None => false,
            },
            (_, Type::Primitive(p)) => match box_primitive(self.env(), *p) {
                Some(boxed) => self.type_is_unconditionally_exact(ty, &boxed),
                None => false,
            },
            _ => {
                let erased_ty = erasure(self.env(), ty);
                let erased_pattern = erasure(self.env(), pattern_ty);
                erased_ty == erased_pattern
                    || self.hierarchy.is_subtype(&erased_ty, &erased_pattern)
            }
        }
    }

    /// Does `pattern` match every value of type `ty`? A deconstruction pattern never does, since
    /// it does not match `null`.
    pub fn is_unconditional(&self, pattern: &Pattern, ty: &Type) -> bool {
        match pattern.collapse() {
            Pattern::TypeTest { ty: pattern_ty, .. } | Pattern::Unnamed { ty: pattern_ty } => {
                self.type_is_unconditionally_exact(ty, pattern_ty)
            }
            Pattern::Deconstruction { .. } | Pattern::Parenthesized(_) => false,
        }
    }

    /// Like [`PatternDominance::is_unconditional`], except that a deconstruction pattern counts
    /// when its record type is exact for `ty` and it names every component.
    fn is_unconditional_for_dominance(&self, pattern: &Pattern, ty: &Type) -> bool {
        match pattern.collapse() {
            Pattern::Deconstruction {
                ty: record,
                components,
            } => {
                self.type_is_unconditionally_exact(ty, record)
                    && self.record_arity(record) == Some(components.len())
            }
            other => self.is_unconditional(other, ty),
        }
    }

    fn record_arity(&self, ty: &Type) -> Option<usize> {
        let Type::Class(ct) = ty else {
            return None;
        };
        let symbol = self.env().class(ct.def)?;
        if symbol.kind != ClassKind::Record {
            tracing::debug!(class = %symbol.name, "deconstruction pattern on a non-record type");
            return None;
        }
        Some(self.records.record_components(ct.def).len())
    }

    /// Does `who` match every value of `over_type`?
    pub fn dominates_type(&self, who: &Pattern, over_type: &Type) -> bool {
        self.is_unconditional_for_dominance(who, over_type)
    }

    /// Does `who` match every value `over` matches?
    pub fn dominates(&self, who: &Pattern, over: &Pattern) -> bool {
        let (who, over) = (who.collapse(), over.collapse());
        if who.is_incomplete() || over.is_incomplete() {
            tracing::debug!("dominance query over an incomplete pattern");
            return false;
        }
        if !self.is_unconditional_for_dominance(who, over.ty()) {
            return false;
        }
        let Some(who_components) = who.components() else {
            return true;
        };
        match over.components() {
            Some(over_components) if over_components.len() == who_components.len() => {
                who_components
                    .iter()
                    .zip(over_components)
                    .all(|(w, o)| self.dominates(w, o))
            }
            _ => false,
        }
    }

    /// Is every value of `over_type` also a value of `who_type`? Intersections and type
    /// variables are split into their conjuncts and bounds first.
    pub fn covers(&self, who_type: &Type, over_type: &Type) -> bool {
        let who_parts = self.decompose(who_type);
        let over_parts = self.decompose(over_type);
        if who_parts.is_empty() || over_parts.is_empty() {
            return false;
        }
        who_parts.iter().all(|who| {
            over_parts
                .iter()
                .any(|over| self.covers_directly(who, over))
        })
    }

    fn covers_directly(&self, who: &Type, over: &Type) -> bool {
        if self.type_is_unconditionally_exact(over, who) {
            return true;
        }
        unbox(self.env(), over).is_some_and(|unboxed: PrimitiveType| {
            self.type_is_unconditionally_exact(&Type::Primitive(unboxed), who)
        })
    }

    fn decompose(&self, ty: &Type) -> Vec<Type> {
        let mut out = Vec::new();
        let mut expanding = Vec::new();
        self.decompose_into(ty, &mut out, &mut expanding);
        out
    }

    fn decompose_into(&self, ty: &Type, out: &mut Vec<Type>, expanding: &mut Vec<Type>) {
        match ty {
            Type::Intersection(parts) => {
                for part in parts {
                    self.decompose_into(part, out, expanding);
                }
            }
            Type::TypeVar(var) => {
                if expanding.contains(ty) {
                    return;
                }
                let bounds = match self.env().type_param(*var) {
                    Some(def) if !def.upper_bounds.is_empty() => def.upper_bounds.clone(),
                    _ => vec![self.env().well_known().object_type()],
                };
                expanding.push(ty.clone());
                for bound in &bounds {
                    self.decompose_into(bound, out, expanding);
                }
                expanding.pop();
            }
            Type::Captured(id) => {
                if expanding.contains(ty) {
                    return;
                }
                let bound = self
                    .env()
                    .captured(*id)
                    .map(|captured| captured.upper_bound)
                    .unwrap_or_else(|| self.env().well_known().object_type());
                expanding.push(ty.clone());
                self.decompose_into(&bound, out, expanding);
                expanding.pop();
            }
            other => out.push(other.clone()),
        }
    }

    /// An unguarded label whose pattern is unconditional for `ty`.
    pub fn label_is_unconditional<G>(
        &self,
        label: &SwitchLabel<G>,
        ty: &Type,
        evaluator: &impl ConstExprEvaluator<G>,
    ) -> bool {
        !is_guarded(label, evaluator) && self.is_unconditional(&label.pattern, ty)
    }

    /// A guarded label dominates nothing; an unguarded one dominates any label (guarded or not)
    /// whose pattern its own pattern dominates.
    pub fn label_dominates<G>(
        &self,
        who: &SwitchLabel<G>,
        over: &SwitchLabel<G>,
        evaluator: &impl ConstExprEvaluator<G>,
    ) -> bool {
        !is_guarded(who, evaluator) && self.dominates(&who.pattern, &over.pattern)
    }
}
