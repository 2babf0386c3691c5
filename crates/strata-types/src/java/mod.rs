//! Java relations over the type model: subtyping, hierarchy propagation, capture conversion and
//! overload applicability.
//!
//! Everything here reads symbols through [`crate::ClassSymbolProvider`] and never mutates them.
//! Memoised state lives in [`HierarchyCache`] and [`CaptureRegistry`], both stamped with the
//! provider's generation.

pub mod capture;
pub mod format;
pub mod hierarchy;
pub mod overload;
pub mod subtyping;

pub use capture::{CaptureEngine, CaptureRegistry, CaptureSite};
pub use format::{format_method_signature, format_type, TypeDisplay};
pub use hierarchy::{HierarchyCache, HierarchyResolver};
pub use overload::{
    Applicability, ApplicabilityChecker, AssignabilityPredicate, Cancelled, Candidate,
    JavaAssignability, OverloadResolution, Phase,
};
pub use subtyping::{
    as_supertype, box_primitive, erasure, glb, is_assignable, is_subtype, unbox, ConversionMode,
};
