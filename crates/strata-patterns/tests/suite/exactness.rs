use pretty_assertions::assert_eq;
use strata_patterns::PatternDominance;
use strata_types::{PrimitiveType, SymbolStore, Type};

use PrimitiveType::*;

const NUMERIC: [PrimitiveType; 7] = [Byte, Short, Char, Int, Long, Float, Double];

/// Conversions that keep every value intact.
const EXACT: &[(PrimitiveType, &[PrimitiveType])] = &[
    (Byte, &[Byte, Short, Int, Long, Float, Double]),
    (Short, &[Short, Int, Long, Float, Double]),
    (Char, &[Char, Int, Long, Float, Double]),
    (Int, &[Int, Long, Double]),
    (Long, &[Long]),
    (Float, &[Float, Double]),
    (Double, &[Double]),
];

#[test]
fn primitive_exactness_for_every_ordered_pair() {
    let store = SymbolStore::new();
    let dominance = PatternDominance::new(&store, &store);

    for (from, targets) in EXACT {
        for to in NUMERIC {
            let actual = dominance
                .type_is_unconditionally_exact(&Type::Primitive(*from), &Type::Primitive(to));
            assert_eq!(actual, targets.contains(&to), "{from:?} -> {to:?}");
        }
    }
}

#[test]
fn boolean_is_only_exact_for_itself() {
    let store = SymbolStore::new();
    let dominance = PatternDominance::new(&store, &store);
    let boolean = Type::Primitive(Boolean);

    assert!(dominance.type_is_unconditionally_exact(&boolean, &boolean));
    for other in NUMERIC {
        assert!(!dominance.type_is_unconditionally_exact(&boolean, &Type::Primitive(other)));
        assert!(!dominance.type_is_unconditionally_exact(&Type::Primitive(other), &boolean));
    }
}
