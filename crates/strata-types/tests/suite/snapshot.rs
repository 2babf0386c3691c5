use pretty_assertions::assert_eq;
use strata_types::java::HierarchyResolver;
use strata_types::{
    ClassKind, ClassSymbol, ClassSymbolProvider, ClassType, PrimitiveType, RecordComponent,
    RecordComponentProvider, SymbolStore, SymbolStoreError, Type,
};

#[test]
fn store_round_trips_through_json() {
    let mut store = SymbolStore::with_minimal_jdk();
    let int = Type::Primitive(PrimitiveType::Int);
    let point = store.add_class(ClassSymbol {
        name: "com.example.Point".to_string(),
        kind: ClassKind::Record,
        super_class: Some(ClassType::new(store.well_known().record, vec![])),
        record_components: vec![
            RecordComponent::new("x", int.clone()),
            RecordComponent::new("y", int),
        ],
        ..ClassSymbol::default()
    });

    let json = serde_json::to_string(&store).expect("store serializes");
    let restored: SymbolStore = serde_json::from_str(&json).expect("store deserializes");
    assert_eq!(restored.validate(), Ok(()));

    assert_eq!(restored.generation(), store.generation());
    assert_eq!(restored.class_id("com.example.Point"), Some(point));
    assert_eq!(
        restored.record_components(point),
        store.record_components(point)
    );

    let list = restored.class_id("java.util.List").expect("List");
    let array_list = restored.class_id("java.util.ArrayList").expect("ArrayList");
    assert_eq!(
        HierarchyResolver::new(&restored).all_supertypes(array_list),
        HierarchyResolver::new(&store).all_supertypes(array_list)
    );
    assert!(HierarchyResolver::new(&restored).is_inheritor(array_list, list));
}

#[test]
fn tampered_snapshots_fail_validation() {
    let store = SymbolStore::new();
    let mut json: serde_json::Value = serde_json::to_value(&store).expect("store serializes");

    let classes = json["classes"].as_array_mut().expect("classes array");
    let duplicate = classes[0].clone();
    classes.push(duplicate);

    let restored: SymbolStore = serde_json::from_value(json).expect("store deserializes");
    assert_eq!(
        restored.validate(),
        Err(SymbolStoreError::DuplicateName("java.lang.Object".to_string()))
    );
}
