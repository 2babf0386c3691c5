//! Generic type resolution for a Java-like front end.
//!
//! The crate is organised leaves first:
//!
//! - [`Type`] and friends: plain data describing Java types.
//! - [`Substitutor`]: immutable type-variable bindings.
//! - [`SymbolStore`]: an in-memory [`ClassSymbolProvider`].
//! - [`java`]: the relations (hierarchy propagation, capture, subtyping, overload applicability).
//! - [`AnalysisCaches`]: the generation-stamped memo state shared by those relations.

mod cache;
pub mod java;
mod store;
mod subst;
mod symbols;
mod ty;

use std::fmt;

pub use cache::{CacheOptions, CacheStats, GenerationalCache};
pub use store::{SymbolStore, SymbolStoreError};
pub use subst::{Binding, Substitutor};
pub use symbols::{
    CapturedWildcard, ClassKind, ClassSymbol, ClassSymbolProvider, Generation, MethodSymbol,
    RecordComponent, RecordComponentProvider, TypeParamDef, WellKnownTypes,
};
pub use ty::{
    CaptureId, ClassId, ClassType, ContextId, MethodId, PrimitiveType, Type, TypeVarId,
    WildcardBound,
};

use java::{CaptureEngine, CaptureRegistry, HierarchyCache, HierarchyResolver};

/// The memo state of one analysis session against one symbol provider.
pub struct AnalysisCaches {
    hierarchy: HierarchyCache,
    captures: CaptureRegistry,
}

impl AnalysisCaches {
    pub fn new(options: &CacheOptions) -> Self {
        tracing::debug!(
            enabled = options.enabled,
            max_entries = options.max_entries,
            "creating analysis caches"
        );
        Self {
            hierarchy: HierarchyCache::new(options),
            captures: CaptureRegistry::new(),
        }
    }

    pub fn hierarchy<'a>(&'a self, env: &'a dyn ClassSymbolProvider) -> HierarchyResolver<'a> {
        HierarchyResolver::with_cache(env, &self.hierarchy)
    }

    pub fn capture_engine<'a>(&'a self, env: &'a dyn ClassSymbolProvider) -> CaptureEngine<'a> {
        CaptureEngine::new(env, &self.captures)
    }

    pub fn captures(&self) -> &CaptureRegistry {
        &self.captures
    }

    pub fn hierarchy_stats(&self) -> CacheStats {
        self.hierarchy.stats()
    }
}

impl Default for AnalysisCaches {
    fn default() -> Self {
        Self::new(&CacheOptions::default())
    }
}

impl fmt::Debug for AnalysisCaches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisCaches")
            .field("hierarchy", &self.hierarchy)
            .field("captures", &self.captures)
            .finish()
    }
}
