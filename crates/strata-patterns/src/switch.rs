//! Reachability of pattern `case` labels.

use serde::Serialize;
use strata_types::Type;

use crate::dominance::PatternDominance;
use crate::pattern::{ConstExprEvaluator, SwitchLabel};

/// A label that can never be selected because an earlier label matches everything it matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DominatedLabel {
    pub index: usize,
    /// The first earlier label that dominates it.
    pub by: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SwitchAnalysis {
    /// In label order.
    pub dominated: Vec<DominatedLabel>,
    /// The first label that matches every value of the selector type.
    pub unconditional: Option<usize>,
}

impl SwitchAnalysis {
    pub fn is_dominated(&self, index: usize) -> bool {
        self.dominated.iter().any(|label| label.index == index)
    }
}

pub fn analyze_switch<G>(
    dominance: &PatternDominance<'_>,
    selector: &Type,
    labels: &[SwitchLabel<G>],
    evaluator: &impl ConstExprEvaluator<G>,
) -> SwitchAnalysis {
    let mut analysis = SwitchAnalysis::default();

    for (index, label) in labels.iter().enumerate() {
        let dominating = labels[..index]
            .iter()
            .position(|earlier| dominance.label_dominates(earlier, label, evaluator));
        if let Some(by) = dominating {
            tracing::debug!(index, by, "case label is dominated");
            analysis.dominated.push(DominatedLabel { index, by });
        }

        if analysis.unconditional.is_none()
            && dominance.label_is_unconditional(label, selector, evaluator)
        {
            analysis.unconditional = Some(index);
        }
    }

    analysis
}
