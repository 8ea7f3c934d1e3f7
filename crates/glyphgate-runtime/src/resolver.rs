//! Module resolver for the reserved capability namespace.
//!
//! The resolver is registered as an import hook with the scripting engine.
//! Its job is purely routing: specifiers inside the reserved namespace are
//! delegated to the [`ExtensionRegistry`], everything else is declined so the
//! normal script-loading path handles it. Namespaced specifiers never touch
//! filesystem- or network-based resolution, even if a colliding file exists,
//! so guest code cannot shadow a host capability.

use crate::capability::CapabilityModule;
use crate::error::InjectionResult;
use crate::registry::ExtensionRegistry;
use crate::specifier::ModuleSpecifier;
use std::sync::Arc;
use tracing::trace;

/// Outcome of asking the resolver about a raw specifier.
#[derive(Debug)]
pub enum ModuleResolution {
    /// The specifier lies in the reserved namespace and resolved to a
    /// capability instance; the guest import yields this instance.
    Capability(Arc<dyn CapabilityModule>),

    /// The specifier is outside the reserved namespace; the normal loader
    /// owns it.
    External,
}

impl ModuleResolution {
    /// Whether the resolver declined the specifier.
    pub fn is_external(&self) -> bool {
        matches!(self, ModuleResolution::External)
    }

    /// The capability instance, if the resolver produced one.
    pub fn into_capability(self) -> Option<Arc<dyn CapabilityModule>> {
        match self {
            ModuleResolution::Capability(instance) => Some(instance),
            ModuleResolution::External => None,
        }
    }
}

/// Routes reserved-namespace imports to the extension registry.
pub struct ModuleResolver {
    registry: Arc<ExtensionRegistry>,
}

impl ModuleResolver {
    /// Create a resolver over a shared registry.
    pub fn new(registry: Arc<ExtensionRegistry>) -> Self {
        Self { registry }
    }

    /// Whether a raw specifier lies within the reserved namespace.
    ///
    /// Structural check only; true even for namespaced specifiers nothing is
    /// registered under.
    pub fn can_resolve(&self, raw: &str) -> bool {
        ModuleSpecifier::in_reserved_namespace(raw)
    }

    /// Resolve a raw specifier.
    ///
    /// Out-of-namespace specifiers yield [`ModuleResolution::External`].
    /// In-namespace specifiers are parsed (failing with
    /// [`crate::InjectionError::MalformedSpecifier`] on bad shape) and
    /// resolved through the registry.
    pub fn resolve(&self, raw: &str) -> InjectionResult<ModuleResolution> {
        if !self.can_resolve(raw) {
            trace!(specifier = raw, "declined out-of-namespace specifier");
            return Ok(ModuleResolution::External);
        }

        let specifier = ModuleSpecifier::parse(raw)?;
        self.registry
            .resolve(&specifier)
            .map(ModuleResolution::Capability)
    }

    /// The registry this resolver routes into.
    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }
}
