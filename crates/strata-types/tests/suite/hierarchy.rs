use pretty_assertions::assert_eq;
use strata_types::java::HierarchyResolver;
use strata_types::{
    ClassId, ClassKind, ClassSymbol, ClassSymbolProvider, ClassType, Substitutor, SymbolStore,
    Type, TypeVarId,
};

fn id(store: &SymbolStore, name: &str) -> ClassId {
    store
        .class_id(name)
        .unwrap_or_else(|| panic!("{name} must exist in the minimal JDK"))
}

fn first_param(store: &SymbolStore, class: ClassId) -> TypeVarId {
    store.class(class).expect("class exists").type_params[0]
}

#[test]
fn array_list_binding_reaches_list() {
    let store = SymbolStore::with_minimal_jdk();
    let resolver = HierarchyResolver::new(&store);
    let list = id(&store, "java.util.List");
    let array_list = id(&store, "java.util.ArrayList");
    let string = Type::class(store.well_known().string, vec![]);

    let from = Substitutor::from_pairs([(first_param(&store, array_list), string.clone())]);
    let to_list = resolver
        .super_substitutor(list, array_list, &from)
        .expect("List is a supertype of ArrayList");

    assert_eq!(
        to_list.substitute(&Type::TypeVar(first_param(&store, list))),
        string
    );
}

#[test]
fn erasing_an_out_of_scope_variable_keeps_the_binding() {
    let mut store = SymbolStore::with_minimal_jdk();
    let unrelated = store.add_type_param("X", vec![]);
    let resolver = HierarchyResolver::new(&store);
    let list = id(&store, "java.util.List");
    let array_list = id(&store, "java.util.ArrayList");
    let string = Type::class(store.well_known().string, vec![]);

    let from = Substitutor::from_pairs([(first_param(&store, array_list), string.clone())])
        .put_erased(unrelated, store.well_known().object_type());
    let to_list = resolver
        .super_substitutor(list, array_list, &from)
        .expect("List is a supertype of ArrayList");

    assert_eq!(
        to_list.substitute(&Type::TypeVar(first_param(&store, list))),
        string
    );
    assert!(!to_list.is_raw());
}

#[test]
fn unrelated_targets_have_no_substitutor() {
    let store = SymbolStore::with_minimal_jdk();
    let resolver = HierarchyResolver::new(&store);
    let map = id(&store, "java.util.Map");
    let array_list = id(&store, "java.util.ArrayList");

    assert_eq!(
        resolver.super_substitutor(map, array_list, &Substitutor::empty()),
        None
    );
    assert_eq!(
        resolver.super_substitutor(map, ClassId::new(90_000), &Substitutor::empty()),
        None
    );
}

/// `interface Holder<T>`, `interface Strings extends Holder<String>`,
/// `interface Ints extends Holder<Integer>` and a class implementing both in the given order.
fn diamond(first_strings: bool) -> (SymbolStore, ClassId, ClassId) {
    let mut store = SymbolStore::new();
    let wk = store.well_known().clone();
    let t = store.add_type_param("T", vec![]);
    let holder = store.add_class(ClassSymbol {
        name: "com.example.Holder".to_string(),
        kind: ClassKind::Interface,
        type_params: vec![t],
        ..ClassSymbol::default()
    });
    let strings = store.add_class(ClassSymbol {
        name: "com.example.Strings".to_string(),
        kind: ClassKind::Interface,
        interfaces: vec![ClassType::new(holder, vec![Type::class(wk.string, vec![])])],
        ..ClassSymbol::default()
    });
    let ints = store.add_class(ClassSymbol {
        name: "com.example.Ints".to_string(),
        kind: ClassKind::Interface,
        interfaces: vec![ClassType::new(holder, vec![Type::class(wk.integer, vec![])])],
        ..ClassSymbol::default()
    });
    let mut interfaces = vec![ClassType::new(strings, vec![]), ClassType::new(ints, vec![])];
    if !first_strings {
        interfaces.reverse();
    }
    let both = store.add_class(ClassSymbol {
        name: "com.example.Both".to_string(),
        super_class: Some(ClassType::new(wk.object, vec![])),
        interfaces,
        ..ClassSymbol::default()
    });
    (store, holder, both)
}

#[test]
fn diamonds_resolve_through_the_first_declared_path() {
    for (first_strings, expected) in [(true, "java.lang.String"), (false, "java.lang.Integer")] {
        let (store, holder, both) = diamond(first_strings);
        let resolver = HierarchyResolver::new(&store);
        let subst = resolver
            .super_substitutor(holder, both, &Substitutor::empty())
            .expect("Holder is a supertype");
        let bound = subst.substitute(&Type::TypeVar(first_param(&store, holder)));
        assert_eq!(bound, Type::class(id(&store, expected), vec![]));
    }
}

#[test]
fn enclosing_bindings_are_carried_into_inner_supertypes() {
    let mut store = SymbolStore::new();
    let wk = store.well_known().clone();
    let t = store.add_type_param("T", vec![]);
    let outer = store.add_class(ClassSymbol {
        name: "com.example.Outer".to_string(),
        type_params: vec![t],
        ..ClassSymbol::default()
    });
    let base = store.add_class(ClassSymbol {
        name: "com.example.Outer$Base".to_string(),
        containing_class: Some(outer),
        super_class: Some(ClassType::new(wk.object, vec![])),
        ..ClassSymbol::default()
    });
    let node = store.add_class(ClassSymbol {
        name: "com.example.Outer$Node".to_string(),
        containing_class: Some(outer),
        super_class: Some(ClassType::new(base, vec![])),
        ..ClassSymbol::default()
    });

    let string = Type::class(wk.string, vec![]);
    let resolver = HierarchyResolver::new(&store);
    let subst = resolver
        .super_substitutor(base, node, &Substitutor::from_pairs([(t, string.clone())]))
        .expect("Base is a supertype of Node");
    assert_eq!(subst.substitute(&Type::TypeVar(t)), string);
}

#[test]
fn raw_supertypes_erase_everything_above_them() {
    let mut store = SymbolStore::with_minimal_jdk();
    let array_list = id(&store, "java.util.ArrayList");
    let list = id(&store, "java.util.List");
    let raw_list = store.add_class(ClassSymbol {
        name: "com.example.LegacyList".to_string(),
        super_class: Some(ClassType::new(array_list, vec![])),
        ..ClassSymbol::default()
    });
    let resolver = HierarchyResolver::new(&store);

    let via_raw_declaration = resolver
        .super_substitutor(list, raw_list, &Substitutor::empty())
        .expect("List is a supertype");
    assert!(via_raw_declaration.is_raw());
    assert_eq!(
        via_raw_declaration.substitute(&Type::TypeVar(first_param(&store, list))),
        store.well_known().object_type()
    );

    let via_raw_use = resolver
        .super_substitutor(list, array_list, &Substitutor::raw_for(&store, array_list))
        .expect("List is a supertype");
    assert!(via_raw_use.is_raw());

    assert_eq!(
        resolver.instantiate_supertype(&ClassType::new(raw_list, vec![]), list),
        Some(ClassType::new(list, vec![]))
    );
}
