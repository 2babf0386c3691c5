use serde::{Deserialize, Serialize};
use strata_types::Type;

/// A pattern as it appears in a `case` label or `instanceof`.
///
/// Types are already resolved; an element the front end could not resolve is [`Type::Unknown`],
/// which makes every relation involving the pattern false.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// `T t`, or `var t` with the inferred type.
    TypeTest { ty: Type, binding: Option<String> },
    /// `R(p1, ..., pn)`.
    Deconstruction { ty: Type, components: Vec<Pattern> },
    /// `_`, with the type of the position it occupies.
    Unnamed { ty: Type },
    Parenthesized(Box<Pattern>),
}

impl Pattern {
    pub fn type_test(ty: Type, binding: impl Into<String>) -> Self {
        Pattern::TypeTest {
            ty,
            binding: Some(binding.into()),
        }
    }

    pub fn deconstruction(ty: Type, components: Vec<Pattern>) -> Self {
        Pattern::Deconstruction { ty, components }
    }

    pub fn unnamed(ty: Type) -> Self {
        Pattern::Unnamed { ty }
    }

    pub fn parenthesized(inner: Pattern) -> Self {
        Pattern::Parenthesized(Box::new(inner))
    }

    /// Strip any number of enclosing parentheses.
    pub fn collapse(&self) -> &Pattern {
        let mut pattern = self;
        while let Pattern::Parenthesized(inner) = pattern {
            pattern = inner;
        }
        pattern
    }

    /// The type a value must have to match.
    pub fn ty(&self) -> &Type {
        match self {
            Pattern::TypeTest { ty, .. }
            | Pattern::Deconstruction { ty, .. }
            | Pattern::Unnamed { ty } => ty,
            Pattern::Parenthesized(inner) => inner.ty(),
        }
    }

    /// Components of a deconstruction pattern; `None` for every other kind.
    pub fn components(&self) -> Option<&[Pattern]> {
        match self.collapse() {
            Pattern::Deconstruction { components, .. } => Some(components),
            _ => None,
        }
    }

    /// Does an unresolved type appear anywhere in the pattern?
    pub fn is_incomplete(&self) -> bool {
        match self.collapse() {
            Pattern::Deconstruction { ty, components } => {
                ty.contains_unknown() || components.iter().any(Pattern::is_incomplete)
            }
            other => other.ty().contains_unknown(),
        }
    }
}

/// A `case` label: a pattern plus an optional `when` guard expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchLabel<G> {
    pub pattern: Pattern,
    pub guard: Option<G>,
}

impl<G> SwitchLabel<G> {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            guard: None,
        }
    }

    pub fn guarded(pattern: Pattern, guard: G) -> Self {
        Self {
            pattern,
            guard: Some(guard),
        }
    }
}

/// Compile-time evaluation of boolean guard expressions.
pub trait ConstExprEvaluator<E: ?Sized> {
    /// `Some(value)` when `expr` is a constant expression, `None` otherwise.
    fn evaluate_boolean(&self, expr: &E) -> Option<bool>;
}

impl<E: ?Sized, F> ConstExprEvaluator<E> for F
where
    F: Fn(&E) -> Option<bool>,
{
    fn evaluate_boolean(&self, expr: &E) -> Option<bool> {
        self(expr)
    }
}

/// Treats every guard as non-constant.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoConstants;

impl<E: ?Sized> ConstExprEvaluator<E> for NoConstants {
    fn evaluate_boolean(&self, _expr: &E) -> Option<bool> {
        None
    }
}

/// A label is guarded unless it has no guard or its guard is the constant `true`.
pub fn is_guarded<G>(label: &SwitchLabel<G>, evaluator: &impl ConstExprEvaluator<G>) -> bool {
    match &label.guard {
        None => false,
        Some(guard) => evaluator.evaluate_boolean(guard) != Some(true),
    }
}
