//! Pattern totality and dominance for `switch` and `instanceof` patterns.
//!
//! Patterns carry already-resolved [`strata_types::Type`]s; the relations in
//! [`PatternDominance`] answer whether one pattern matches every value another does, which is
//! what unreachable-case detection and exhaustiveness checks are built on.

mod dominance;
mod pattern;
pub mod switch;

pub use dominance::PatternDominance;
pub use pattern::{is_guarded, ConstExprEvaluator, NoConstants, Pattern, SwitchLabel};
pub use switch::{analyze_switch, DominatedLabel, SwitchAnalysis};
