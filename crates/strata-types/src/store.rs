//! An in-memory [`ClassSymbolProvider`] with a bootstrap `java.lang`/`java.util` subset.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::symbols::{
    ClassKind, ClassSymbol, ClassSymbolProvider, Generation, MethodSymbol, RecordComponent,
    RecordComponentProvider, TypeParamDef, WellKnownTypes,
};
use crate::ty::{ClassId, ClassType, MethodId, Type, TypeVarId, WildcardBound};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolStoreError {
    #[error("`{owner}` refers to unknown class id {id:?}")]
    DanglingClass { owner: String, id: ClassId },
    #[error("`{owner}` refers to unknown type parameter {id:?}")]
    DanglingTypeParam { owner: String, id: TypeVarId },
    #[error("`{owner}` refers to unknown method {id:?}")]
    DanglingMethod { owner: String, id: MethodId },
    #[error("class name `{0}` is defined more than once")]
    DuplicateName(String),
}

/// Owns class, type-parameter and method symbols in arenas indexed by their ids.
///
/// Every mutation bumps [`SymbolStore::generation`], so caches built on top of a store never
/// serve results computed against an older version of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymbolStore {
    classes: Vec<ClassSymbol>,
    type_params: Vec<TypeParamDef>,
    methods: Vec<MethodSymbol>,
    by_name: BTreeMap<String, ClassId>,
    well_known: WellKnownTypes,
    generation: Generation,
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolStore {
    /// A store containing the `java.lang` types the engine refers to directly.
    pub fn new() -> Self {
        let placeholder = ClassId::new(0);
        let mut store = SymbolStore {
            classes: Vec::new(),
            type_params: Vec::new(),
            methods: Vec::new(),
            by_name: BTreeMap::new(),
            well_known: WellKnownTypes {
                object: placeholder,
                string: placeholder,
                number: placeholder,
                cloneable: placeholder,
                serializable: placeholder,
                comparable: placeholder,
                record: placeholder,
                enum_: placeholder,
                boolean: placeholder,
                byte: placeholder,
                short: placeholder,
                character: placeholder,
                integer: placeholder,
                long: placeholder,
                float: placeholder,
                double: placeholder,
                void: placeholder,
            },
            generation: Generation::default(),
        };
        store.bootstrap_java_lang();
        store
    }

    /// [`SymbolStore::new`] plus a handful of `java.util` collections and common exceptions.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::new();
        store.bootstrap_java_util();
        store
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Reserve an id for `name` without defining it yet (for self-referential declarations).
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_id(name) {
            return id;
        }
        let id = ClassId::new(arena_index(self.classes.len()));
        self.classes.push(ClassSymbol {
            name: name.to_string(),
            ..ClassSymbol::default()
        });
        self.by_name.insert(name.to_string(), id);
        self.bump();
        id
    }

    pub fn define_class(&mut self, id: ClassId, symbol: ClassSymbol) {
        let Some(slot) = self.classes.get_mut(id.index()) else {
            tracing::debug!(?id, "define_class: id was never interned");
            return;
        };
        if slot.name != symbol.name {
            if self.by_name.get(&slot.name) == Some(&id) {
                self.by_name.remove(&slot.name);
            }
            self.by_name.insert(symbol.name.clone(), id);
        }
        *slot = symbol;
        self.bump();
    }

    pub fn add_class(&mut self, symbol: ClassSymbol) -> ClassId {
        let id = self.intern_class_id(&symbol.name);
        self.define_class(id, symbol);
        id
    }

    /// Mutable access to a class. Counts as a mutation even if the caller changes nothing.
    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassSymbol> {
        self.generation = self.generation.next();
        self.classes.get_mut(id.index())
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId::new(arena_index(self.type_params.len()));
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
        });
        self.bump();
        id
    }

    pub fn define_type_param(&mut self, id: TypeVarId, def: TypeParamDef) {
        if let Some(slot) = self.type_params.get_mut(id.index()) {
            *slot = def;
            self.bump();
        }
    }

    /// Register a method; when it has an owner, the owner's method list is updated too.
    pub fn add_method(&mut self, method: MethodSymbol) -> MethodId {
        let id = MethodId::new(arena_index(self.methods.len()));
        if let Some(owner) = method.owner.and_then(|owner| self.classes.get_mut(owner.index())) {
            owner.methods.push(id);
        }
        self.methods.push(method);
        self.bump();
        id
    }

    /// Check that every id referenced by a symbol points into this store.
    ///
    /// Stores built through the mutation API are always valid; this is meant for stores that were
    /// deserialized from an external snapshot.
    pub fn validate(&self) -> Result<(), SymbolStoreError> {
        let mut seen_names = HashSet::new();
        for class in &self.classes {
            if !seen_names.insert(class.name.as_str()) {
                return Err(SymbolStoreError::DuplicateName(class.name.clone()));
            }

            let owner = || class.name.clone();
            for tp in &class.type_params {
                self.check_type_param(*tp, owner)?;
            }
            for sup in class.declared_supertypes() {
                self.check_class_type(sup, owner)?;
            }
            if let Some(outer) = class.containing_class {
                self.check_class(outer, owner)?;
            }
            for component in &class.record_components {
                self.check_type(&component.ty, owner)?;
            }
            for method in &class.methods {
                if self.methods.get(method.index()).is_none() {
                    return Err(SymbolStoreError::DanglingMethod {
                        owner: owner(),
                        id: *method,
                    });
                }
            }
        }

        for tp in &self.type_params {
            for bound in &tp.upper_bounds {
                self.check_type(bound, || tp.name.clone())?;
            }
        }

        for method in &self.methods {
            let owner = || method.name.clone();
            for tp in &method.type_params {
                self.check_type_param(*tp, owner)?;
            }
            for param in &method.params {
                self.check_type(param, owner)?;
            }
            self.check_type(&method.return_type, owner)?;
        }

        Ok(())
    }

    fn check_class(
        &self,
        id: ClassId,
        owner: impl Fn() -> String,
    ) -> Result<(), SymbolStoreError> {
        if self.classes.get(id.index()).is_none() {
            return Err(SymbolStoreError::DanglingClass { owner: owner(), id });
        }
        Ok(())
    }

    fn check_type_param(
        &self,
        id: TypeVarId,
        owner: impl Fn() -> String,
    ) -> Result<(), SymbolStoreError> {
        if self.type_params.get(id.index()).is_none() {
            return Err(SymbolStoreError::DanglingTypeParam { owner: owner(), id });
        }
        Ok(())
    }

    fn check_class_type(
        &self,
        ty: &ClassType,
        owner: impl Fn() -> String + Copy,
    ) -> Result<(), SymbolStoreError> {
        self.check_class(ty.def, owner)?;
        for arg in &ty.args {
            self.check_type(arg, owner)?;
        }
        Ok(())
    }

    fn check_type(&self, ty: &Type, owner: impl Fn() -> String + Copy) -> Result<(), SymbolStoreError> {
        match ty {
            Type::Class(ct) => self.check_class_type(ct, owner),
            Type::Array(component) => self.check_type(component, owner),
            Type::Wildcard(WildcardBound::Extends(bound) | WildcardBound::Super(bound)) => {
                self.check_type(bound, owner)
            }
            Type::Intersection(parts) | Type::Disjunction(parts) => {
                parts.iter().try_for_each(|part| self.check_type(part, owner))
            }
            Type::TypeVar(id) => self.check_type_param(*id, owner),
            Type::Wildcard(WildcardBound::Unbounded)
            | Type::Primitive(_)
            | Type::Captured(_)
            | Type::Null
            | Type::Unknown => Ok(()),
        }
    }

    fn bump(&mut self) {
        self.generation = self.generation.next();
    }

    fn bootstrap_java_lang(&mut self) {
        let object = self.add_class(ClassSymbol {
            name: "java.lang.Object".to_string(),
            ..ClassSymbol::default()
        });
        let object_ty = ClassType::new(object, vec![]);

        let serializable = self.interface("java.io.Serializable", vec![]);
        let cloneable = self.interface("java.lang.Cloneable", vec![]);
        let char_sequence = self.interface("java.lang.CharSequence", vec![]);

        let comparable = self.intern_class_id("java.lang.Comparable");
        let comparable_t = self.add_type_param("T", vec![]);
        self.define_class(
            comparable,
            ClassSymbol {
                name: "java.lang.Comparable".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![comparable_t],
                ..ClassSymbol::default()
            },
        );
        let comparable_of = |id: ClassId| {
            ClassType::new(comparable, vec![Type::class(id, vec![])])
        };

        let string = self.intern_class_id("java.lang.String");
        self.define_class(
            string,
            ClassSymbol {
                name: "java.lang.String".to_string(),
                super_class: Some(object_ty.clone()),
                interfaces: vec![
                    ClassType::new(serializable, vec![]),
                    comparable_of(string),
                    ClassType::new(char_sequence, vec![]),
                ],
                ..ClassSymbol::default()
            },
        );

        let number = self.add_class(ClassSymbol {
            name: "java.lang.Number".to_string(),
            super_class: Some(object_ty.clone()),
            interfaces: vec![ClassType::new(serializable, vec![])],
            ..ClassSymbol::default()
        });

        let boxed = |store: &mut SymbolStore, name: &str, numeric: bool| {
            let id = store.intern_class_id(name);
            store.define_class(
                id,
                ClassSymbol {
                    name: name.to_string(),
                    super_class: Some(ClassType::new(if numeric { number } else { object }, vec![])),
                    interfaces: vec![ClassType::new(serializable, vec![]), comparable_of(id)],
                    ..ClassSymbol::default()
                },
            );
            id
        };
        let boolean = boxed(self, "java.lang.Boolean", false);
        let character = boxed(self, "java.lang.Character", false);
        let byte = boxed(self, "java.lang.Byte", true);
        let short = boxed(self, "java.lang.Short", true);
        let integer = boxed(self, "java.lang.Integer", true);
        let long = boxed(self, "java.lang.Long", true);
        let float = boxed(self, "java.lang.Float", true);
        let double = boxed(self, "java.lang.Double", true);

        let void = self.add_class(ClassSymbol {
            name: "java.lang.Void".to_string(),
            super_class: Some(object_ty.clone()),
            ..ClassSymbol::default()
        });

        let record = self.add_class(ClassSymbol {
            name: "java.lang.Record".to_string(),
            super_class: Some(object_ty.clone()),
            ..ClassSymbol::default()
        });

        // abstract class Enum<E extends Enum<E>> implements Comparable<E>, Serializable
        let enum_ = self.intern_class_id("java.lang.Enum");
        let enum_e = self.add_type_param("E", vec![]);
        self.define_type_param(
            enum_e,
            TypeParamDef {
                name: "E".to_string(),
                upper_bounds: vec![Type::class(enum_, vec![Type::TypeVar(enum_e)])],
            },
        );
        self.define_class(
            enum_,
            ClassSymbol {
                name: "java.lang.Enum".to_string(),
                type_params: vec![enum_e],
                super_class: Some(object_ty),
                interfaces: vec![
                    ClassType::new(comparable, vec![Type::TypeVar(enum_e)]),
                    ClassType::new(serializable, vec![]),
                ],
                ..ClassSymbol::default()
            },
        );

        self.well_known = WellKnownTypes {
            object,
            string,
            number,
            cloneable,
            serializable,
            comparable,
            record,
            enum_,
            boolean,
            byte,
            short,
            character,
            integer,
            long,
            float,
            double,
            void,
        };
    }

    fn bootstrap_java_util(&mut self) {
        let object = self.well_known.object;
        let serializable = ClassType::new(self.well_known.serializable, vec![]);
        let cloneable = ClassType::new(self.well_known.cloneable, vec![]);

        let iterable_t = self.add_type_param("T", vec![]);
        let iterable = self.add_class(ClassSymbol {
            name: "java.lang.Iterable".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![iterable_t],
            ..ClassSymbol::default()
        });

        let collection_e = self.add_type_param("E", vec![]);
        let collection = self.add_class(ClassSymbol {
            name: "java.util.Collection".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![collection_e],
            interfaces: vec![ClassType::new(iterable, vec![Type::TypeVar(collection_e)])],
            ..ClassSymbol::default()
        });

        let list_e = self.add_type_param("E", vec![]);
        let list = self.add_class(ClassSymbol {
            name: "java.util.List".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![list_e],
            interfaces: vec![ClassType::new(collection, vec![Type::TypeVar(list_e)])],
            ..ClassSymbol::default()
        });

        let set_e = self.add_type_param("E", vec![]);
        self.add_class(ClassSymbol {
            name: "java.util.Set".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![set_e],
            interfaces: vec![ClassType::new(collection, vec![Type::TypeVar(set_e)])],
            ..ClassSymbol::default()
        });

        let random_access = self.interface("java.util.RandomAccess", vec![]);

        let abstract_collection_e = self.add_type_param("E", vec![]);
        let abstract_collection = self.add_class(ClassSymbol {
            name: "java.util.AbstractCollection".to_string(),
            type_params: vec![abstract_collection_e],
            super_class: Some(ClassType::new(object, vec![])),
            interfaces: vec![ClassType::new(
                collection,
                vec![Type::TypeVar(abstract_collection_e)],
            )],
            ..ClassSymbol::default()
        });

        let abstract_list_e = self.add_type_param("E", vec![]);
        let abstract_list = self.add_class(ClassSymbol {
            name: "java.util.AbstractList".to_string(),
            type_params: vec![abstract_list_e],
            super_class: Some(ClassType::new(
                abstract_collection,
                vec![Type::TypeVar(abstract_list_e)],
            )),
            interfaces: vec![ClassType::new(list, vec![Type::TypeVar(abstract_list_e)])],
            ..ClassSymbol::default()
        });

        let array_list_e = self.add_type_param("E", vec![]);
        self.add_class(ClassSymbol {
            name: "java.util.ArrayList".to_string(),
            type_params: vec![array_list_e],
            super_class: Some(ClassType::new(
                abstract_list,
                vec![Type::TypeVar(array_list_e)],
            )),
            interfaces: vec![
                ClassType::new(list, vec![Type::TypeVar(array_list_e)]),
                ClassType::new(random_access, vec![]),
                cloneable.clone(),
                serializable.clone(),
            ],
            ..ClassSymbol::default()
        });

        let map_k = self.add_type_param("K", vec![]);
        let map_v = self.add_type_param("V", vec![]);
        let map = self.add_class(ClassSymbol {
            name: "java.util.Map".to_string(),
            kind: ClassKind::Interface,
            type_params: vec![map_k, map_v],
            ..ClassSymbol::default()
        });

        let hash_map_k = self.add_type_param("K", vec![]);
        let hash_map_v = self.add_type_param("V", vec![]);
        self.add_class(ClassSymbol {
            name: "java.util.HashMap".to_string(),
            type_params: vec![hash_map_k, hash_map_v],
            super_class: Some(ClassType::new(object, vec![])),
            interfaces: vec![
                ClassType::new(
                    map,
                    vec![Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v)],
                ),
                cloneable,
                serializable.clone(),
            ],
            ..ClassSymbol::default()
        });

        let throwable = self.add_class(ClassSymbol {
            name: "java.lang.Throwable".to_string(),
            super_class: Some(ClassType::new(object, vec![])),
            interfaces: vec![serializable],
            ..ClassSymbol::default()
        });
        let exception = self.subclass("java.lang.Exception", throwable);
        let runtime = self.subclass("java.lang.RuntimeException", exception);
        self.subclass("java.lang.IllegalArgumentException", runtime);
        self.subclass("java.lang.IllegalStateException", runtime);
    }

    fn interface(&mut self, name: &str, interfaces: Vec<ClassType>) -> ClassId {
        self.add_class(ClassSymbol {
            name: name.to_string(),
            kind: ClassKind::Interface,
            interfaces,
            ..ClassSymbol::default()
        })
    }

    fn subclass(&mut self, name: &str, super_class: ClassId) -> ClassId {
        self.add_class(ClassSymbol {
            name: name.to_string(),
            super_class: Some(ClassType::new(super_class, vec![])),
            ..ClassSymbol::default()
        })
    }
}

fn arena_index(len: usize) -> u32 {
    // Arenas are indexed by `u32`; exceeding that is a programming error, not an input property.
    u32::try_from(len).expect("symbol arena exceeded u32::MAX entries")
}

impl ClassSymbolProvider for SymbolStore {
    fn class(&self, id: ClassId) -> Option<&ClassSymbol> {
        self.classes.get(id.index())
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.index())
    }

    fn method(&self, id: MethodId) -> Option<&MethodSymbol> {
        self.methods.get(id.index())
    }

    fn resolve(&self, qualified_name: &str, scope: Option<ClassId>) -> Option<ClassId> {
        let mut scope = scope;
        while let Some(id) = scope {
            let Some(outer) = self.class(id) else {
                break;
            };
            if let Some(found) = self.class_id(&format!("{}${}", outer.name, qualified_name)) {
                return Some(found);
            }
            scope = outer.containing_class;
        }
        self.class_id(qualified_name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    fn generation(&self) -> Generation {
        self.generation
    }
}

impl RecordComponentProvider for SymbolStore {
    fn record_components(&self, class: ClassId) -> &[RecordComponent] {
        match self.class(class) {
            Some(symbol) if symbol.kind == ClassKind::Record => &symbol.record_components,
            _ => &[],
        }
    }
}
