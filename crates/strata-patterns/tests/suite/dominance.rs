use pretty_assertions::assert_eq;
use strata_patterns::{NoConstants, Pattern, PatternDominance, SwitchLabel};
use strata_types::{AnalysisCaches, Type};

use super::fixtures::{literal_true, Zoo};

fn var(ty: Type, name: &str) -> Pattern {
    Pattern::type_test(ty, name)
}

#[test]
fn record_pattern_with_var_components_dominates_its_own_record() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let point = zoo.ty(zoo.point);

    // `Point(var x, var y)`: `var` takes the component types.
    let point_vars = Pattern::deconstruction(
        point.clone(),
        vec![var(zoo.object(), "x"), var(zoo.object(), "y")],
    );
    let point_objects = Pattern::deconstruction(
        point.clone(),
        vec![var(zoo.object(), "o"), var(zoo.object(), "p")],
    );
    let color_point_vars = Pattern::deconstruction(
        zoo.ty(zoo.color_point),
        vec![
            var(zoo.object(), "x"),
            var(zoo.object(), "y"),
            var(Type::class(zoo.well_known().string, vec![]), "c"),
        ],
    );

    assert!(dominance.dominates(&point_vars, &point_objects));
    assert!(dominance.dominates_type(&point_vars, &point));
    assert!(!dominance.dominates(&point_vars, &color_point_vars));
    assert!(!dominance.is_unconditional(&point_vars, &point));
}

#[test]
fn record_patterns_need_the_full_component_list() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let point = zoo.ty(zoo.point);
    let partial = Pattern::deconstruction(point.clone(), vec![var(zoo.object(), "x")]);

    assert!(!dominance.dominates_type(&partial, &point));
}

#[test]
fn deconstruction_of_a_non_record_dominates_nothing() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let animal = zoo.ty(zoo.animal);
    let bogus = Pattern::deconstruction(animal.clone(), vec![]);

    assert!(!dominance.dominates_type(&bogus, &animal));
    assert!(!dominance.dominates(&bogus, &Pattern::type_test(animal, "a")));
}

#[test]
fn type_test_dominates_a_record_pattern_of_a_subtype() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let point_vars = Pattern::deconstruction(
        zoo.ty(zoo.point),
        vec![var(zoo.object(), "x"), var(zoo.object(), "y")],
    );

    assert!(dominance.dominates(&Pattern::type_test(zoo.object(), "o"), &point_vars));
    assert!(!dominance.dominates(&point_vars, &Pattern::type_test(zoo.ty(zoo.point), "p")));
}

#[test]
fn guarded_number_pattern_is_never_unconditional() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let number = Type::class(zoo.well_known().number, vec![]);
    let label = SwitchLabel::guarded(Pattern::type_test(number.clone(), "n"), "n.intValue() > 0");

    assert!(dominance.is_unconditional(&label.pattern, &number));
    assert!(!dominance.label_is_unconditional(&label, &number, &NoConstants));
    assert!(!dominance.label_is_unconditional(&label, &number, &literal_true));
}

#[test]
fn constant_true_guard_counts_as_absent() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let animal = zoo.ty(zoo.animal);
    let always = SwitchLabel::guarded(Pattern::type_test(animal.clone(), "a"), "true");
    let dog = SwitchLabel::new(Pattern::type_test(zoo.ty(zoo.dog), "d"));

    assert!(dominance.label_is_unconditional(&always, &animal, &literal_true));
    assert!(dominance.label_dominates(&always, &dog, &literal_true));
    assert!(!dominance.label_dominates(&always, &dog, &NoConstants));
    // Guarded labels are still dominated by unguarded ones.
    assert!(dominance.label_dominates(
        &SwitchLabel::new(Pattern::type_test(animal, "a")),
        &SwitchLabel::guarded(Pattern::type_test(zoo.ty(zoo.dog), "d"), "d.barks()"),
        &NoConstants,
    ));
}

#[test]
fn dominance_is_reflexive_over_a_hierarchy() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);

    for ty in zoo.chain() {
        let pattern = Pattern::type_test(ty.clone(), "x");
        assert!(dominance.dominates(&pattern, &pattern), "{ty:?}");
        assert!(dominance.dominates(
            &Pattern::parenthesized(pattern.clone()),
            &Pattern::unnamed(ty)
        ));
    }
}

#[test]
fn dominance_is_transitive_over_a_hierarchy() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let patterns: Vec<Pattern> = zoo
        .chain()
        .into_iter()
        .map(|ty| Pattern::type_test(ty, "x"))
        .collect();

    for (i, a) in patterns.iter().enumerate() {
        for (j, b) in patterns.iter().enumerate() {
            // Higher in the chain dominates lower, never the reverse.
            assert_eq!(dominance.dominates(a, b), i <= j, "{i} over {j}");
            for c in &patterns {
                if dominance.dominates(a, b) && dominance.dominates(b, c) {
                    assert!(dominance.dominates(a, c));
                }
            }
        }
    }
}

#[test]
fn unknown_types_relate_to_nothing() {
    let zoo = Zoo::new();
    let dominance = PatternDominance::new(&zoo.store, &zoo.store);
    let unknown = Pattern::type_test(Type::Unknown, "u");
    let animal = Pattern::type_test(zoo.ty(zoo.animal), "a");

    assert!(!dominance.dominates(&unknown, &animal));
    assert!(!dominance.dominates(&animal, &unknown));
    assert!(!dominance.dominates(&unknown, &unknown));
    assert!(!dominance.is_unconditional(&unknown, &Type::Unknown));
}

#[test]
fn shares_a_cached_hierarchy() {
    let zoo = Zoo::new();
    let caches = AnalysisCaches::default();
    let dominance = PatternDominance::with_hierarchy(caches.hierarchy(&zoo.store), &zoo.store);

    assert!(dominance.dominates(
        &Pattern::type_test(zoo.ty(zoo.animal), "a"),
        &Pattern::type_test(zoo.ty(zoo.dog), "d"),
    ));
}
