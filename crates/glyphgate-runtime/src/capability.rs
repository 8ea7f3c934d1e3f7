//! Capability module contracts.
//!
//! Every capability declares a static [`CapabilityContract`] listing the
//! operations it exports to guest code. The contract is validated when the
//! factory is registered, and the constructed instance is checked against it
//! on first resolve, so a module's export surface is pinned rather than
//! assumed. Adding operations is backward compatible; removing or renaming is
//! not.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Static description of a capability's guest-facing export surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityContract {
    /// Short capability name used in logs and diagnostics.
    pub name: &'static str,

    /// Operation names exposed to guest code.
    pub operations: &'static [&'static str],
}

impl CapabilityContract {
    /// Validate the contract shape.
    ///
    /// A contract must name itself, export at least one operation, and list
    /// each operation exactly once.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("capability name must not be empty".to_string());
        }
        if self.operations.is_empty() {
            return Err(format!("capability '{}' exports no operations", self.name));
        }
        for (index, op) in self.operations.iter().enumerate() {
            if op.is_empty() {
                return Err(format!("capability '{}' has an empty operation name", self.name));
            }
            if self.operations[..index].contains(op) {
                return Err(format!(
                    "capability '{}' lists operation '{op}' more than once",
                    self.name
                ));
            }
        }
        Ok(())
    }

    /// Whether the contract exports an operation with this name.
    pub fn has_operation(&self, operation: &str) -> bool {
        self.operations.contains(&operation)
    }
}

/// A host-implemented object exposing a bounded operation set to guest code.
///
/// Instances are shared read-mostly between the registry cache and any guest
/// code holding a reference through a global binding; identity is
/// `Arc::ptr_eq`. Lifetime is the lifetime of the host instance.
pub trait CapabilityModule: Send + Sync {
    /// The static contract this module was built against.
    fn contract(&self) -> &'static CapabilityContract;

    /// Short capability name from the contract.
    fn name(&self) -> &'static str {
        self.contract().name
    }

    /// Operation names from the contract.
    fn operations(&self) -> &'static [&'static str] {
        self.contract().operations
    }

    /// Downcast support for reaching the concrete operation surface.
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn CapabilityModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityModule")
            .field("name", &self.name())
            .field("operations", &self.operations())
            .finish()
    }
}

/// Downcast a shared capability instance to its concrete type.
pub fn downcast<T: CapabilityModule + 'static>(module: &Arc<dyn CapabilityModule>) -> Option<&T> {
    module.as_any().downcast_ref::<T>()
}
