use pretty_assertions::assert_eq;
use strata_patterns::{
    analyze_switch, DominatedLabel, NoConstants, Pattern, PatternDominance, SwitchAnalysis,
    SwitchLabel,
};
use strata_types::ClassId;

use super::fixtures::{literal_true, Zoo};

fn label(zoo: &Zoo, class: ClassId, guard: Option<&'static str>) -> SwitchLabel<&'static str> {
    let pattern = Pattern::type_test(zoo.ty(class), "x");
    match guard {
        Some(guard) => SwitchLabel::guarded(pattern, guard),
        None => SwitchLabel::new(pattern),
    }
}

#[test]
fn reports_dominated_labels_and_the_first_unconditional_one() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let labels = vec![
        label(&zoo, zoo.mammal, Some("x.isHungry()")),
        label(&zoo, zoo.dog, None),
        label(&zoo, zoo.mammal, None),
        label(&zoo, zoo.dog, None),
        label(&zoo, zoo.animal, None),
    ];

    let analysis = analyze_switch(&dominance, &zoo.ty(zoo.animal), &labels, &NoConstants);

    assert_eq!(
        analysis,
        SwitchAnalysis {
            dominated: vec![DominatedLabel { index: 3, by: 1 }],
            unconditional: Some(4),
        }
    );
    assert!(analysis.is_dominated(3));
    assert!(!analysis.is_dominated(2));
}

#[test]
fn constant_true_guard_dominates_later_labels() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let labels = vec![
        label(&zoo, zoo.animal, Some("true")),
        label(&zoo, zoo.dog, None),
    ];
    let selector = zoo.ty(zoo.animal);

    let with_constants = analyze_switch(&dominance, &selector, &labels, &literal_true);
    assert_eq!(with_constants.dominated, vec![DominatedLabel { index: 1, by: 0 }]);
    assert_eq!(with_constants.unconditional, Some(0));

    let without = analyze_switch(&dominance, &selector, &labels, &NoConstants);
    assert_eq!(without, SwitchAnalysis::default());
}

#[test]
fn analysis_serializes_for_diagnostics() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let labels = vec![label(&zoo, zoo.mammal, None), label(&zoo, zoo.dog, None)];

    let analysis = analyze_switch(&dominance, &zoo.ty(zoo.dog), &labels, &NoConstants);

    assert_eq!(
        serde_json::to_value(&analysis).expect("serialize"),
        serde_json::json!({
            "dominated": [{ "index": 1, "by": 0 }],
            "unconditional": 0,
        })
    );
}
