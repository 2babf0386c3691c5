use strata_types::{
    ClassId, ClassKind, ClassSymbol, ClassSymbolProvider, ClassType, RecordComponent, SymbolStore,
    Type, WellKnownTypes,
};

/// `Animal > Mammal > Dog` under `Object`, plus the records
/// `Point(Object x, Object y)` and `ColorPoint(Object x, Object y, String color)`.
pub struct Zoo {
    pub store: SymbolStore,
    pub animal: ClassId,
    pub mammal: ClassId,
    pub dog: ClassId,
    pub point: ClassId,
    pub color_point: ClassId,
}

impl Zoo {
    pub fn new() -> Self {
        let mut store = SymbolStore::new();
        let wk = store.well_known().clone();
        let object = wk.object_type();

        let animal = store.add_class(ClassSymbol {
            name: "zoo.Animal".to_string(),
            ..ClassSymbol::default()
        });
        let mammal = store.add_class(ClassSymbol {
            name: "zoo.Mammal".to_string(),
            super_class: Some(ClassType::new(animal, vec![])),
            ..ClassSymbol::default()
        });
        let dog = store.add_class(ClassSymbol {
            name: "zoo.Dog".to_string(),
            super_class: Some(ClassType::new(mammal, vec![])),
            ..ClassSymbol::default()
        });

        let point = store.add_class(ClassSymbol {
            name: "geo.Point".to_string(),
            kind: ClassKind::Record,
            super_class: Some(ClassType::new(wk.record, vec![])),
            record_components: vec![
                RecordComponent::new("x", object.clone()),
                RecordComponent::new("y", object.clone()),
            ],
            ..ClassSymbol::default()
        });
        let color_point = store.add_class(ClassSymbol {
            name: "geo.ColorPoint".to_string(),
            kind: ClassKind::Record,
            super_class: Some(ClassType::new(wk.record, vec![])),
            record_components: vec![
                RecordComponent::new("x", object.clone()),
                RecordComponent::new("y", object),
                RecordComponent::new("color", Type::class(wk.string, vec![])),
            ],
            ..ClassSymbol::default()
        });

        Zoo {
            store,
            animal,
            mammal,
            dog,
            point,
            color_point,
        }
    }

    pub fn ty(&self, class: ClassId) -> Type {
        Type::class(class, vec![])
    }

    pub fn well_known(&self) -> &WellKnownTypes {
        self.store.well_known()
    }

    pub fn object(&self) -> Type {
        self.store.well_known().object_type()
    }

    /// The hierarchy from the top down.
    pub fn chain(&self) -> Vec<Type> {
        vec![
            self.object(),
            self.ty(self.animal),
            self.ty(self.mammal),
            self.ty(self.dog),
        ]
    }
}

/// Treats the literal guard `"true"` as the only constant expression.
pub fn literal_true(guard: &&str) -> Option<bool> {
    (*guard == "true").then_some(true)
}
