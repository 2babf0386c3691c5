use proptest::prelude::*;
use strata_types::{ClassId, PrimitiveType, Substitutor, Type, TypeVarId};

const PROPTEST_CASES: u32 = 256;

fn arb_var() -> impl Strategy<Value = TypeVarId> {
    // A small pool so generated substitutors actually overlap.
    (0u32..4).prop_map(|n| TypeVarId::new(1_000 + n))
}

fn arb_type() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        3 => arb_var().prop_map(Type::TypeVar),
        1 => Just(Type::Primitive(PrimitiveType::Int)),
        2 => (0u32..3).prop_map(|n| Type::class(ClassId::new(n), vec![])),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        let arg = prop_oneof![
            3 => inner.clone(),
            1 => inner.clone().prop_map(Type::extends),
            1 => inner.clone().prop_map(Type::super_of),
            1 => Just(Type::unbounded()),
        ];
        prop_oneof![
            inner.prop_map(Type::array),
            (0u32..3, prop::collection::vec(arg, 1..3))
                .prop_map(|(n, args)| Type::class(ClassId::new(n), args)),
        ]
    })
}

fn arb_substitutor() -> impl Strategy<Value = Substitutor> {
    prop::collection::vec((arb_var(), arb_type()), 0..4).prop_map(Substitutor::from_pairs)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: PROPTEST_CASES, .. ProptestConfig::default() })]

    #[test]
    fn composition_is_associative(
        a in arb_substitutor(),
        b in arb_substitutor(),
        c in arb_substitutor(),
        probe in arb_type(),
    ) {
        let sequential = a.substitute(&b.substitute(&c.substitute(&probe)));

        let left = Substitutor::compose(&a, &Substitutor::compose(&b, &c));
        let right = Substitutor::compose(&Substitutor::compose(&a, &b), &c);
        prop_assert_eq!(left.substitute(&probe), sequential.clone());
        prop_assert_eq!(right.substitute(&probe), sequential);
    }

    #[test]
    fn empty_substitutor_is_the_identity(s in arb_substitutor(), probe in arb_type()) {
        let empty = Substitutor::empty();
        prop_assert_eq!(empty.substitute(&probe), probe.clone());
        prop_assert_eq!(Substitutor::compose(&empty, &s).substitute(&probe), s.substitute(&probe));
        prop_assert_eq!(Substitutor::compose(&s, &empty).substitute(&probe), s.substitute(&probe));
    }
}
