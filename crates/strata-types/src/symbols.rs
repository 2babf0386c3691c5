//! Symbol data and the collaborator traits the engine reads it through.

use serde::{Deserialize, Serialize};

use crate::ty::{CaptureId, ClassId, ClassType, MethodId, PrimitiveType, Type, TypeVarId, WildcardBound};

/// Monotonic stamp of a symbol table's contents. Any mutation produces a newer generation, which
/// invalidates every memoised result computed against an older one.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Record,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    /// Declared bounds, unsubstituted. Empty means `Object`.
    pub upper_bounds: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordComponent {
    pub name: String,
    pub ty: Type,
}

impl RecordComponent {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbol {
    /// Qualified (binary) name, e.g. `java.util.List`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    /// Written in terms of this symbol's own type variables.
    pub super_class: Option<ClassType>,
    pub interfaces: Vec<ClassType>,
    pub containing_class: Option<ClassId>,
    pub is_static: bool,
    #[serde(default)]
    pub record_components: Vec<RecordComponent>,
    #[serde(default)]
    pub methods: Vec<MethodId>,
}

impl ClassSymbol {
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Immediate supertypes in walk order: interfaces first, then the superclass.
    pub fn declared_supertypes(&self) -> impl Iterator<Item = &ClassType> {
        self.interfaces.iter().chain(self.super_class.iter())
    }

    /// The enclosing class whose type parameters are in scope here, if any.
    pub fn enclosing_generic_scope(&self) -> Option<ClassId> {
        // Nested interfaces, records and enums are implicitly static.
        if self.is_static || self.kind != ClassKind::Class {
            return None;
        }
        self.containing_class
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    pub owner: Option<ClassId>,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
}

/// The result of capturing one wildcard at one capture site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedWildcard {
    pub id: CaptureId,
    pub origin: WildcardBound,
    pub upper_bound: Type,
    pub lower_bound: Option<Type>,
}

/// Ids of the `java.lang` types the algorithms refer to directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub number: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub comparable: ClassId,
    pub record: ClassId,
    pub enum_: ClassId,

    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub void: ClassId,
}

impl WellKnownTypes {
    pub fn boxed(&self, primitive: PrimitiveType) -> ClassId {
        match primitive {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
            PrimitiveType::Void => self.void,
        }
    }

    pub fn unboxed(&self, class: ClassId) -> Option<PrimitiveType> {
        let primitive = if class == self.boolean {
            PrimitiveType::Boolean
        } else if class == self.byte {
            PrimitiveType::Byte
        } else if class == self.short {
            PrimitiveType::Short
        } else if class == self.character {
            PrimitiveType::Char
        } else if class == self.integer {
            PrimitiveType::Int
        } else if class == self.long {
            PrimitiveType::Long
        } else if class == self.float {
            PrimitiveType::Float
        } else if class == self.double {
            PrimitiveType::Double
        } else {
            return None;
        };
        Some(primitive)
    }

    pub fn object_type(&self) -> Type {
        Type::class(self.object, vec![])
    }
}

/// Read-only access to resolved class symbols.
///
/// Implementations are expected to be cheap to query; the engine calls these methods in tight
/// loops and memoises on top of them using [`ClassSymbolProvider::generation`].
pub trait ClassSymbolProvider {
    fn class(&self, id: ClassId) -> Option<&ClassSymbol>;

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;

    fn method(&self, id: MethodId) -> Option<&MethodSymbol>;

    /// Resolve a (possibly nested) class name, trying `scope` and its enclosing classes first.
    fn resolve(&self, qualified_name: &str, scope: Option<ClassId>) -> Option<ClassId>;

    fn well_known(&self) -> &WellKnownTypes;

    fn generation(&self) -> Generation;

    /// Bounds of a captured wildcard. Plain symbol tables know no captures.
    fn captured(&self, id: CaptureId) -> Option<CapturedWildcard> {
        let _ = id;
        None
    }
}

/// Record component lookup used by deconstruction patterns.
pub trait RecordComponentProvider {
    /// Components in declaration order; empty when `class` is not a record (or is unknown).
    fn record_components(&self, class: ClassId) -> &[RecordComponent];
}
