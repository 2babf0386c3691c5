use strata_types::java::{as_supertype, is_assignable, is_subtype, ConversionMode};
use strata_types::{ClassSymbolProvider, ClassType, PrimitiveType, SymbolStore, Type};

#[test]
fn minimal_jdk_interfaces_are_subtypes_of_object() {
    let env = SymbolStore::with_minimal_jdk();
    let object = env.well_known().object_type();

    let list = env
        .class_id("java.util.List")
        .expect("List must exist in minimal JDK");
    let list_string = Type::class(list, vec![Type::class(env.well_known().string, vec![])]);
    assert!(is_subtype(&env, &list_string, &object));

    let cloneable = Type::class(env.well_known().cloneable, vec![]);
    assert!(is_subtype(&env, &cloneable, &object));
}

#[test]
fn intersection_subtyping_is_order_independent() {
    let env = SymbolStore::with_minimal_jdk();

    let cloneable = Type::class(env.well_known().cloneable, vec![]);
    let serializable = Type::class(env.well_known().serializable, vec![]);

    // Built by hand, bypassing normalisation, so both orders really occur.
    let ab = Type::Intersection(vec![cloneable.clone(), serializable.clone()]);
    let ba = Type::Intersection(vec![serializable.clone(), cloneable.clone()]);

    assert!(is_subtype(&env, &ab, &ba));
    assert!(is_subtype(&env, &ba, &ab));

    assert!(is_subtype(&env, &ab, &cloneable));
    assert!(is_subtype(&env, &ab, &serializable));

    assert!(!is_subtype(&env, &cloneable, &ab));
    assert!(!is_subtype(&env, &serializable, &ab));
}

#[test]
fn boxes_are_comparable_to_themselves() {
    let env = SymbolStore::with_minimal_jdk();
    let wk = env.well_known();
    let integer = Type::class(wk.integer, vec![]);

    assert!(is_subtype(
        &env,
        &integer,
        &Type::class(wk.comparable, vec![integer.clone()])
    ));
    assert!(!is_subtype(
        &env,
        &integer,
        &Type::class(wk.comparable, vec![Type::class(wk.long, vec![])])
    ));
    assert!(is_assignable(
        &env,
        &Type::Primitive(PrimitiveType::Int),
        &Type::class(wk.comparable, vec![Type::extends(wk.object_type())]),
        ConversionMode::Loose
    ));
}

#[test]
fn exceptions_form_a_chain() {
    let env = SymbolStore::with_minimal_jdk();
    let iae = env
        .class_id("java.lang.IllegalArgumentException")
        .expect("IllegalArgumentException");
    let throwable = env.class_id("java.lang.Throwable").expect("Throwable");

    assert!(is_subtype(
        &env,
        &Type::class(iae, vec![]),
        &Type::class(throwable, vec![])
    ));
    assert!(!is_subtype(
        &env,
        &Type::class(throwable, vec![]),
        &Type::class(iae, vec![])
    ));
}

#[test]
fn supertype_views_keep_type_arguments() {
    let env = SymbolStore::with_minimal_jdk();
    let array_list = env.class_id("java.util.ArrayList").expect("ArrayList");
    let collection = env.class_id("java.util.Collection").expect("Collection");
    let string = Type::class(env.well_known().string, vec![]);

    assert_eq!(
        as_supertype(&env, &Type::class(array_list, vec![string.clone()]), collection),
        Some(ClassType::new(collection, vec![string.clone()]))
    );
    assert_eq!(
        as_supertype(
            &env,
            &Type::array(string),
            env.well_known().serializable
        ),
        Some(ClassType::new(env.well_known().serializable, vec![]))
    );
}
