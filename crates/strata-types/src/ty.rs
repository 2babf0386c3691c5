//! Algebraic representation of Java types.
//!
//! Everything here is plain data: no lookups into the symbol table happen in this module. The
//! relations over these types (subtyping, erasure, capture, ...) live in [`crate::java`].

use serde::{Deserialize, Serialize};

/// Arena index of a class or interface symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena index of a declared type parameter (class- or method-level).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(u32);

impl TypeVarId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arena index of a method symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId(u32);

impl MethodId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies one capture site (one expression or type use).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(u64);

impl ContextId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Identity of a captured wildcard: the capture site plus the type-argument position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaptureId {
    pub context: ContextId,
    pub slot: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveType {
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean | PrimitiveType::Void)
    }

    /// Widening primitive conversion (JLS 5.1.2). Identity is not included.
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Boolean | Double | Void => false,
        }
    }

    /// Widening conversions that never lose information, i.e. the ones a primitive type pattern
    /// may treat as unconditionally exact. Identity is not included.
    pub fn widens_exactly_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Double),
            Float => matches!(target, Double),
            Boolean | Long | Double | Void => false,
        }
    }

    pub fn java_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

impl WildcardBound {
    pub fn bound(&self) -> Option<&Type> {
        match self {
            WildcardBound::Unbounded => None,
            WildcardBound::Extends(ty) | WildcardBound::Super(ty) => Some(ty),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassType {
    pub def: ClassId,
    /// Empty for raw or non-generic uses.
    pub args: Vec<Type>,
}

impl ClassType {
    pub fn new(def: ClassId, args: Vec<Type>) -> Self {
        Self { def, args }
    }

    pub fn has_wildcard_args(&self) -> bool {
        self.args.iter().any(|arg| matches!(arg, Type::Wildcard(_)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    Wildcard(WildcardBound),
    /// Captured wildcards compare by identity; their bounds live in the capture registry.
    Captured(CaptureId),
    Intersection(Vec<Type>),
    TypeVar(TypeVarId),
    Null,
    /// Multi-catch alternatives.
    Disjunction(Vec<Type>),
    /// A missing or unresolved type element. No relation ever holds for it.
    Unknown,
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Type {
        Type::Class(ClassType { def, args })
    }

    pub fn array(component: Type) -> Type {
        Type::Array(Box::new(component))
    }

    pub fn extends(bound: Type) -> Type {
        Type::Wildcard(WildcardBound::Extends(Box::new(bound)))
    }

    pub fn super_of(bound: Type) -> Type {
        Type::Wildcard(WildcardBound::Super(Box::new(bound)))
    }

    pub fn unbounded() -> Type {
        Type::Wildcard(WildcardBound::Unbounded)
    }

    /// Build a normalised intersection: nested intersections are flattened, duplicates removed,
    /// conjuncts sorted, and a single survivor is returned as-is.
    pub fn intersection(parts: Vec<Type>) -> Type {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Type::Intersection(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();

        match flat.len() {
            0 => Type::Unknown,
            1 => flat.pop().unwrap_or(Type::Unknown),
            _ => Type::Intersection(flat),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Array(_)
                | Type::Captured(_)
                | Type::Intersection(_)
                | Type::TypeVar(_)
                | Type::Null
                | Type::Disjunction(_)
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(ct) => Some(ct),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Does an unknown element appear anywhere inside this type?
    pub fn contains_unknown(&self) -> bool {
        match self {
            Type::Unknown => true,
            Type::Class(ct) => ct.args.iter().any(Type::contains_unknown),
            Type::Array(component) => component.contains_unknown(),
            Type::Wildcard(bound) => bound.bound().is_some_and(Type::contains_unknown),
            Type::Intersection(parts) | Type::Disjunction(parts) => {
                parts.iter().any(Type::contains_unknown)
            }
            Type::Primitive(_) | Type::Captured(_) | Type::TypeVar(_) | Type::Null => false,
        }
    }
}

impl From<ClassType> for Type {
    fn from(value: ClassType) -> Self {
        Type::Class(value)
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Type::Primitive(value)
    }
}
