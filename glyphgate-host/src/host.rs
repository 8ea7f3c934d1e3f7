//! Script host assembly and bootstrap.
//!
//! [`ScriptHostBuilder`] registers the standard capability set according to
//! the host configuration and fixes the bootstrap manifest. [`ScriptHost`]
//! owns the registry, resolver, sequencer and the guest global binding table
//! for one host instance.

use crate::config::HostConfig;
use anyhow::{Context, Result};
use glyphgate_runtime::{
    BootstrapManifest, BootstrapSequencer, CapabilityModule, ExtensionRegistry,
    GlobalBindingTable, InjectionResult, ModuleResolver,
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;
use uuid::Uuid;

/// Fixed global names under which capabilities become ambient to guest code.
///
/// These are guest-observable API surface: assignment takes precedence over
/// guest-declared globals of the same name.
pub const GLOBAL_CONSOLE: &str = "console";
pub const GLOBAL_FS: &str = "fs";
pub const GLOBAL_ENV: &str = "env";
pub const GLOBAL_ENCODING: &str = "encoding";
pub const GLOBAL_SYSTEM: &str = "system";
pub const GLOBAL_TIME: &str = "time";

/// One host instance of the capability layer.
pub struct ScriptHost {
    id: Uuid,
    registry: Arc<ExtensionRegistry>,
    resolver: ModuleResolver,
    sequencer: BootstrapSequencer,
    manifest: BootstrapManifest,
    globals: Mutex<GlobalBindingTable>,
}

impl ScriptHost {
    /// Start building a host with default configuration.
    pub fn builder() -> ScriptHostBuilder {
        ScriptHostBuilder::new()
    }

    /// Instance id used in diagnostics and guest console tagging.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run the bootstrap sequence, binding every manifest entry onto the
    /// guest global scope.
    ///
    /// Safe to call again: a second run re-binds the same instances.
    pub fn bootstrap(&self) -> InjectionResult<()> {
        let mut globals = self.globals.lock().unwrap_or_else(PoisonError::into_inner);
        self.sequencer
            .run(&self.manifest, &self.registry, &mut globals)
    }

    /// The import hook to register with the scripting engine.
    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// The shared extension registry.
    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    /// The bootstrap manifest this host was built with.
    pub fn manifest(&self) -> &BootstrapManifest {
        &self.manifest
    }

    /// Look up a bound global by name.
    pub fn global(&self, name: &str) -> Option<Arc<dyn CapabilityModule>> {
        self.globals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
    }

    /// Names of all bound globals, sorted.
    pub fn global_names(&self) -> Vec<String> {
        let globals = self.globals.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = globals.names().iter().map(|s| s.to_string()).collect();
        names.sort();
        names
    }

    /// Whether bootstrap has been attempted at least once.
    pub fn has_bootstrapped(&self) -> bool {
        self.sequencer.has_run()
    }

    /// How many times bootstrap has been attempted.
    pub fn bootstrap_runs(&self) -> usize {
        self.sequencer.runs()
    }
}

/// Assembles a [`ScriptHost`] from configuration.
pub struct ScriptHostBuilder {
    config: HostConfig,
}

impl ScriptHostBuilder {
    /// Builder over default configuration.
    pub fn new() -> Self {
        Self {
            config: HostConfig::default(),
        }
    }

    /// Builder over explicit configuration.
    pub fn with_config(config: HostConfig) -> Self {
        Self { config }
    }

    /// Register enabled capabilities, fix the manifest and assemble the host.
    ///
    /// Registration failures here are build-time misconfiguration and fail
    /// host startup.
    pub fn build(self) -> Result<ScriptHost> {
        let id = Uuid::new_v4();
        let mut registry = ExtensionRegistry::new();
        let mut manifest = BootstrapManifest::new();

        if self.config.capability_enabled("console") {
            let source = format!("guest-{}", &id.to_string()[..8]);
            let factory: glyphgate_runtime::CapabilityFactory = Box::new(move || {
                Ok(Arc::new(cap_console::ConsoleCapability::with_source(
                    source.clone(),
                )))
            });
            registry.register(cap_console::specifier(), &cap_console::CONTRACT, factory)?;
            manifest.push(cap_console::specifier(), GLOBAL_CONSOLE)?;
        }

        if self.config.capability_enabled("env") {
            registry.register(cap_env::specifier(), &cap_env::CONTRACT, cap_env::factory())?;
            manifest.push(cap_env::specifier(), GLOBAL_ENV)?;
        }

        if self.config.capability_enabled("encoding") {
            registry.register(
                cap_encoding::specifier(),
                &cap_encoding::CONTRACT,
                cap_encoding::factory(),
            )?;
            manifest.push(cap_encoding::specifier(), GLOBAL_ENCODING)?;
        }

        if self.config.capability_enabled("system") {
            registry.register(
                cap_sysinfo::specifier(),
                &cap_sysinfo::CONTRACT,
                cap_sysinfo::factory(),
            )?;
            manifest.push(cap_sysinfo::specifier(), GLOBAL_SYSTEM)?;
        }

        if self.config.capability_enabled("time") {
            registry.register(cap_time::specifier(), &cap_time::CONTRACT, cap_time::factory())?;
            manifest.push(cap_time::specifier(), GLOBAL_TIME)?;
        }

        // Filesystem last: the only factory that can fail at bootstrap
        // (missing sandbox root).
        if self.config.capability_enabled("fs") {
            let root = self
                .config
                .fs_root()
                .context("Failed to determine filesystem sandbox root")?;
            registry.register(cap_fs::specifier(), &cap_fs::CONTRACT, cap_fs::factory(root))?;
            manifest.push(cap_fs::specifier(), GLOBAL_FS)?;
        }

        info!(
            host = %id,
            capabilities = registry.len(),
            "script host assembled"
        );

        let registry = Arc::new(registry);
        Ok(ScriptHost {
            id,
            resolver: ModuleResolver::new(Arc::clone(&registry)),
            registry,
            sequencer: BootstrapSequencer::new(),
            manifest,
            globals: Mutex::new(GlobalBindingTable::new()),
        })
    }
}

impl Default for ScriptHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}
