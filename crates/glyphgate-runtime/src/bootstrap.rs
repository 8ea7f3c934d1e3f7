//! Bootstrap: binding resolved capabilities onto the guest global scope.
//!
//! A [`BootstrapManifest`] is an ordered list of (specifier, global name)
//! pairs fixed at host build time. The [`BootstrapSequencer`] walks it in
//! order, resolves each specifier through the registry and binds the
//! resulting instance into a [`GlobalBindingTable`], the explicit model of
//! the guest's global object, enumerable so tests can verify every binding.
//!
//! Manifest order must be a valid topological order of any construction
//! dependencies between capabilities.

use crate::capability::CapabilityModule;
use crate::error::{InjectionError, InjectionResult};
use crate::registry::ExtensionRegistry;
use crate::specifier::ModuleSpecifier;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// One manifest entry: which capability lands under which global name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapEntry {
    pub specifier: ModuleSpecifier,
    pub global: String,
}

/// Ordered list of capabilities to bind, fixed at host build time.
#[derive(Debug, Default)]
pub struct BootstrapManifest {
    entries: Vec<BootstrapEntry>,
}

impl BootstrapManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    ///
    /// Fails with [`InjectionError::ManifestConflict`] if the specifier or
    /// the global name already appears in the manifest.
    pub fn push(
        &mut self,
        specifier: ModuleSpecifier,
        global: impl Into<String>,
    ) -> InjectionResult<()> {
        let global = global.into();
        if self.entries.iter().any(|e| e.specifier == specifier) {
            return Err(InjectionError::ManifestConflict(format!(
                "specifier '{specifier}' listed twice"
            )));
        }
        if self.entries.iter().any(|e| e.global == global) {
            return Err(InjectionError::ManifestConflict(format!(
                "global name '{global}' listed twice"
            )));
        }
        self.entries.push(BootstrapEntry { specifier, global });
        Ok(())
    }

    /// Entries in bind order.
    pub fn entries(&self) -> &[BootstrapEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The guest global object, modeled explicitly.
///
/// Entries are write-once per host instance: binding the same identity again
/// is a no-op, binding a different identity under an existing name fails with
/// [`InjectionError::BindingDiverged`] instead of silently shadowing. Two
/// reads of the same name within one host instance always yield the same
/// identity.
#[derive(Default)]
pub struct GlobalBindingTable {
    bindings: HashMap<String, Arc<dyn CapabilityModule>>,
}

impl GlobalBindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a capability instance under a fixed global name.
    pub fn bind(
        &mut self,
        global: &str,
        instance: Arc<dyn CapabilityModule>,
    ) -> InjectionResult<()> {
        match self.bindings.get(global) {
            Some(existing) if Arc::ptr_eq(existing, &instance) => Ok(()),
            Some(_) => Err(InjectionError::BindingDiverged {
                global: global.to_string(),
            }),
            None => {
                self.bindings.insert(global.to_string(), instance);
                Ok(())
            }
        }
    }

    /// Look up a binding by global name.
    pub fn get(&self, global: &str) -> Option<Arc<dyn CapabilityModule>> {
        self.bindings.get(global).cloned()
    }

    /// Whether a global name is bound.
    pub fn contains(&self, global: &str) -> bool {
        self.bindings.contains_key(global)
    }

    /// All bound global names.
    pub fn names(&self) -> Vec<&str> {
        self.bindings.keys().map(|s| s.as_str()).collect()
    }

    /// Iterate over (global name, instance) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn CapabilityModule>)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Walks a manifest once per host instance and binds each capability.
///
/// Holds no state beyond run bookkeeping used for diagnostics. Re-entry is
/// not prevented, only made observably safe: a second run re-binds the same
/// identities (registry memoization guarantees no re-construction).
#[derive(Default)]
pub struct BootstrapSequencer {
    runs: AtomicUsize,
}

impl BootstrapSequencer {
    /// Create a sequencer that has not run yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute the manifest in order.
    ///
    /// Fail-fast: the first failing entry stops the walk and is reported as
    /// [`InjectionError::Bootstrap`] with the offending specifier and global
    /// name attached. Bindings from earlier entries remain in place; a
    /// capability already bound and usable is not revoked because a later,
    /// unrelated one failed.
    pub fn run(
        &self,
        manifest: &BootstrapManifest,
        registry: &ExtensionRegistry,
        globals: &mut GlobalBindingTable,
    ) -> InjectionResult<()> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        if run > 1 {
            warn!(run, "bootstrap re-entered; existing bindings are re-checked");
        }

        for entry in manifest.entries() {
            let instance = registry.resolve(&entry.specifier).map_err(|source| {
                InjectionError::Bootstrap {
                    specifier: entry.specifier.clone(),
                    global: entry.global.clone(),
                    source: Box::new(source),
                }
            })?;

            globals
                .bind(&entry.global, instance)
                .map_err(|source| InjectionError::Bootstrap {
                    specifier: entry.specifier.clone(),
                    global: entry.global.clone(),
                    source: Box::new(source),
                })?;

            info!(specifier = %entry.specifier, global = %entry.global, "capability bound");
        }
        Ok(())
    }

    /// Whether `run` has been called at least once.
    pub fn has_run(&self) -> bool {
        self.runs.load(Ordering::SeqCst) > 0
    }

    /// How many times `run` has been called.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}
