//! Extension registry: lazy-singleton capability construction.
//!
//! The registry maps reserved module specifiers to capability factories.
//! Registration happens while the host is being built and requires exclusive
//! access; afterwards the registry is shared immutably and `resolve` is the
//! only entry point.
//!
//! Resolution is memoizing: the factory for a specifier runs at most once per
//! host instance, and every successful `resolve` for that specifier returns
//! the same `Arc` identity. A failed construction is not cached, so a later
//! call may retry.

use crate::capability::{CapabilityContract, CapabilityModule};
use crate::error::{BoxedCause, InjectionError, InjectionResult};
use crate::specifier::ModuleSpecifier;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Zero-argument producer of a capability instance.
///
/// Owned exclusively by the registry; invoked at most once per specifier per
/// host instance. Construction failures carry the underlying platform cause.
pub type CapabilityFactory =
    Box<dyn Fn() -> Result<Arc<dyn CapabilityModule>, BoxedCause> + Send + Sync>;

struct Registration {
    contract: &'static CapabilityContract,
    factory: CapabilityFactory,
    // Per-specifier construction lock. Held across the factory call, so
    // concurrent resolves for one specifier serialize while resolves for
    // different specifiers proceed independently.
    slot: Mutex<Option<Arc<dyn CapabilityModule>>>,
}

/// Registry of capability factories keyed by reserved module specifier.
pub struct ExtensionRegistry {
    entries: HashMap<ModuleSpecifier, Registration>,
}

impl ExtensionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a factory under a specifier.
    ///
    /// The contract is validated here, at registration time. Fails with
    /// [`InjectionError::DuplicateRegistration`] if the specifier is already
    /// taken, so two capabilities can never silently collide.
    pub fn register(
        &mut self,
        specifier: ModuleSpecifier,
        contract: &'static CapabilityContract,
        factory: CapabilityFactory,
    ) -> InjectionResult<()> {
        contract
            .validate()
            .map_err(|reason| InjectionError::ContractViolation {
                specifier: specifier.clone(),
                reason,
            })?;

        if self.entries.contains_key(&specifier) {
            return Err(InjectionError::DuplicateRegistration(specifier));
        }

        debug!(%specifier, capability = contract.name, "registered capability factory");
        self.entries.insert(
            specifier,
            Registration {
                contract,
                factory,
                slot: Mutex::new(None),
            },
        );
        Ok(())
    }

    /// Resolve a specifier to its capability instance, constructing it on
    /// first use.
    ///
    /// Identity-stable: repeated calls return the same `Arc`. Fails with
    /// [`InjectionError::UnknownModule`] for unregistered specifiers and with
    /// [`InjectionError::Initialization`] when the factory fails; the failed
    /// attempt is not cached.
    pub fn resolve(
        &self,
        specifier: &ModuleSpecifier,
    ) -> InjectionResult<Arc<dyn CapabilityModule>> {
        let entry = self
            .entries
            .get(specifier)
            .ok_or_else(|| InjectionError::UnknownModule(specifier.clone()))?;

        let mut slot = entry.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = slot.as_ref() {
            return Ok(Arc::clone(instance));
        }

        let instance =
            (entry.factory)().map_err(|source| InjectionError::Initialization {
                specifier: specifier.clone(),
                source,
            })?;

        let contract = instance.contract();
        if contract.name != entry.contract.name || contract.operations != entry.contract.operations
        {
            return Err(InjectionError::ContractViolation {
                specifier: specifier.clone(),
                reason: format!(
                    "constructed instance reports contract '{}', registered as '{}'",
                    contract.name, entry.contract.name
                ),
            });
        }

        info!(%specifier, capability = contract.name, "capability initialized");
        *slot = Some(Arc::clone(&instance));
        Ok(instance)
    }

    /// Whether a factory is registered under this specifier.
    pub fn is_registered(&self, specifier: &ModuleSpecifier) -> bool {
        self.entries.contains_key(specifier)
    }

    /// Whether the instance for this specifier has already been constructed.
    pub fn is_resolved(&self, specifier: &ModuleSpecifier) -> bool {
        self.entries.get(specifier).is_some_and(|entry| {
            entry
                .slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        })
    }

    /// All registered specifiers.
    pub fn specifiers(&self) -> Vec<&ModuleSpecifier> {
        self.entries.keys().collect()
    }

    /// Number of registered specifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
