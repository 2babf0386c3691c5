//! Capture conversion (JLS 5.1.10).
//!
//! Each capture site is identified by a caller-chosen [`ContextId`]. The bounds of the fresh
//! variables introduced at a site are kept in a [`CaptureRegistry`]; types only ever refer to
//! them through [`Type::Captured`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::cache::GenerationalCache;
use crate::subst::Substitutor;
use crate::symbols::{
    CapturedWildcard, ClassSymbol, ClassSymbolProvider, Generation, MethodSymbol, TypeParamDef,
    WellKnownTypes,
};
use crate::ty::{CaptureId, ClassId, ClassType, ContextId, MethodId, Type, TypeVarId, WildcardBound};

use super::hierarchy::HierarchyResolver;

/// Contexts handed out by [`CaptureRegistry::fresh_context`] have this bit set, so they never
/// collide with small caller-assigned ids (e.g. syntax node indices).
const FRESH_CONTEXT_BIT: u64 = 1 << 63;

/// The outcome of capturing one type at one site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureSite {
    pub origin: ClassType,
    pub result: ClassType,
    /// In slot order; only slots that held a wildcard appear.
    pub captures: Vec<CapturedWildcard>,
}

/// Capture sites recorded against one symbol provider.
pub struct CaptureRegistry {
    sites: GenerationalCache<ContextId, Arc<CaptureSite>>,
    next_context: AtomicU64,
}

impl Default for CaptureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CaptureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureRegistry")
            .field("sites", &self.sites.len())
            .finish_non_exhaustive()
    }
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self {
            sites: GenerationalCache::unbounded(),
            next_context: AtomicU64::new(0),
        }
    }

    pub fn fresh_context(&self) -> ContextId {
        let n = self.next_context.fetch_add(1, Ordering::Relaxed);
        ContextId::new(FRESH_CONTEXT_BIT | n)
    }

    pub fn site(&self, context: ContextId, generation: Generation) -> Option<Arc<CaptureSite>> {
        self.sites.get(&context, generation)
    }

    pub fn captured(&self, id: CaptureId, generation: Generation) -> Option<CapturedWildcard> {
        let site = self.site(id.context, generation)?;
        site.captures.iter().find(|c| c.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Returns the site that ends up recorded, which is `site` unless another thread won.
    fn record(
        &self,
        context: ContextId,
        generation: Generation,
        site: CaptureSite,
    ) -> Arc<CaptureSite> {
        if let Some(existing) = self.site(context, generation) {
            check_same_origin(context, &existing.origin, &site.origin);
            return existing;
        }
        let site = Arc::new(site);
        self.sites.insert(context, generation, Arc::clone(&site));
        site
    }
}

fn check_same_origin(context: ContextId, recorded: &ClassType, requested: &ClassType) {
    assert!(
        recorded == requested,
        "capture context {context:?} was already used for a different type \
         ({recorded:?} vs {requested:?})"
    );
}

/// Performs capture conversion against `env`, recording sites in `registry`.
///
/// The engine is itself a [`ClassSymbolProvider`]: it answers [`ClassSymbolProvider::captured`]
/// from its registry, so relations computed through it see the bounds of captured types.
#[derive(Clone, Copy)]
pub struct CaptureEngine<'env> {
    env: &'env dyn ClassSymbolProvider,
    registry: &'env CaptureRegistry,
}

impl fmt::Debug for CaptureEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureEngine")
            .field("registry", self.registry)
            .finish_non_exhaustive()
    }
}

impl<'env> CaptureEngine<'env> {
    pub fn new(env: &'env dyn ClassSymbolProvider, registry: &'env CaptureRegistry) -> Self {
        Self { env, registry }
    }

    pub fn registry(&self) -> &'env CaptureRegistry {
        self.registry
    }

    /// Capture the wildcard arguments of `ty`. Nested wildcards are left alone.
    ///
    /// Capturing the same type again under the same `context` returns the recorded result.
    ///
    /// # Panics
    ///
    /// If `context` was already used for a different type in the current generation.
    pub fn capture_top_level(&self, ty: &ClassType, context: ContextId) -> ClassType {
        if !ty.has_wildcard_args() {
            return ty.clone();
        }

        let generation = self.env.generation();
        if let Some(site) = self.registry.site(context, generation) {
            check_same_origin(context, &site.origin, ty);
            tracing::trace!(?context, "capture site reused");
            return site.result.clone();
        }

        let Some(symbol) = self.env.class(ty.def) else {
            tracing::debug!(class = ?ty.def, "cannot capture a use of an unknown class");
            return ty.clone();
        };
        if symbol.type_params.len() != ty.args.len() {
            tracing::debug!(
                class = %symbol.name,
                expected = symbol.type_params.len(),
                found = ty.args.len(),
                "cannot capture a use with the wrong number of type arguments"
            );
            return ty.clone();
        }

        let result_args: Vec<Type> = ty
            .args
            .iter()
            .enumerate()
            .map(|(slot, arg)| match arg {
                Type::Wildcard(_) => Type::Captured(capture_id(context, slot)),
                other => other.clone(),
            })
            .collect();
        let subst = Substitutor::from_pairs(
            symbol
                .type_params
                .iter()
                .copied()
                .zip(result_args.iter().cloned()),
        );

        let mut captures: Vec<CapturedWildcard> = Vec::new();
        for (slot, (param, arg)) in symbol.type_params.iter().zip(&ty.args).enumerate() {
            let Type::Wildcard(origin) = arg else {
                continue;
            };

            let mut candidates: Vec<Type> = self
                .env
                .type_param(*param)
                .map(|def| def.upper_bounds.iter().map(|b| subst.substitute(b)).collect())
                .unwrap_or_default();
            if let WildcardBound::Extends(bound) = origin {
                candidates.push((**bound).clone());
            }

            let pending = PendingCaptures {
                engine: self,
                pending: &captures,
            };
            let upper_bound = HierarchyResolver::new(&pending).glb(candidates);
            let lower_bound = match origin {
                WildcardBound::Super(bound) => Some((**bound).clone()),
                _ => None,
            };
            captures.push(CapturedWildcard {
                id: capture_id(context, slot),
                origin: origin.clone(),
                upper_bound,
                lower_bound,
            });
        }

        let result = ClassType::new(ty.def, result_args);
        let site = CaptureSite {
            origin: ty.clone(),
            result,
            captures,
        };
        tracing::trace!(?context, class = %symbol.name, "captured wildcards");
        self.registry.record(context, generation, site).result.clone()
    }

    /// [`CaptureEngine::capture_top_level`] for class types; every other type is returned as is.
    pub fn capture(&self, ty: &Type, context: ContextId) -> Type {
        match ty {
            Type::Class(ct) => Type::Class(self.capture_top_level(ct, context)),
            other => other.clone(),
        }
    }
}

fn capture_id(context: ContextId, slot: usize) -> CaptureId {
    CaptureId {
        context,
        // `slot` indexes a type argument list, which is tiny.
        slot: u32::try_from(slot).unwrap_or(u32::MAX),
    }
}

impl ClassSymbolProvider for CaptureEngine<'_> {
    fn class(&self, id: ClassId) -> Option<&ClassSymbol> {
        self.env.class(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.env.type_param(id)
    }

    fn method(&self, id: MethodId) -> Option<&MethodSymbol> {
        self.env.method(id)
    }

    fn resolve(&self, qualified_name: &str, scope: Option<ClassId>) -> Option<ClassId> {
        self.env.resolve(qualified_name, scope)
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.env.well_known()
    }

    fn generation(&self) -> Generation {
        self.env.generation()
    }

    fn captured(&self, id: CaptureId) -> Option<CapturedWildcard> {
        self.registry
            .captured(id, self.env.generation())
            .or_else(|| self.env.captured(id))
    }
}

/// The engine's view while a site is being built: earlier siblings are visible before the site
/// is recorded.
struct PendingCaptures<'a, 'env> {
    engine: &'a CaptureEngine<'env>,
    pending: &'a [CapturedWildcard],
}

impl ClassSymbolProvider for PendingCaptures<'_, '_> {
    fn class(&self, id: ClassId) -> Option<&ClassSymbol> {
        self.engine.class(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.engine.type_param(id)
    }

    fn method(&self, id: MethodId) -> Option<&MethodSymbol> {
        self.engine.method(id)
    }

    fn resolve(&self, qualified_name: &str, scope: Option<ClassId>) -> Option<ClassId> {
        self.engine.resolve(qualified_name, scope)
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.engine.well_known()
    }

    fn generation(&self) -> Generation {
        self.engine.generation()
    }

    fn captured(&self, id: CaptureId) -> Option<CapturedWildcard> {
        self.pending
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .or_else(|| self.engine.captured(id))
    }
}
