//! # cap-sysinfo
//!
//! System introspection for guest code: OS, architecture, platform family,
//! and, where the platform exposes them, hostname and CPU count.
//!
//! All operations are synchronous and bounded. Availability is soft,
//! per-field: `os`, `arch` and `family` never fail, while `hostname` and
//! `cpu_count` raise [`OpError::Unsupported`] on platforms that do not
//! expose them. The platform profile is captured at construction and can be
//! substituted, so behavior on a foreign platform is testable.

use glyphgate_runtime::{
    CapabilityContract, CapabilityFactory, CapabilityModule, ModuleSpecifier, OpError, OpResult,
};
use std::any::Any;
use std::sync::Arc;

/// Export surface of the system introspection capability.
pub static CONTRACT: CapabilityContract = CapabilityContract {
    name: "system",
    operations: &["os", "arch", "family", "hostname", "cpu_count"],
};

/// Reserved specifier this capability is registered under.
pub fn specifier() -> ModuleSpecifier {
    ModuleSpecifier::reserved("caps", "system")
}

/// Default factory reading the current platform.
pub fn factory() -> CapabilityFactory {
    Box::new(|| Ok(Arc::new(SystemInfoCapability::new())))
}

/// Snapshot of what the current platform exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    pub os: String,
    pub arch: String,
    pub family: String,
    /// `None` on platforms that do not expose a hostname.
    pub hostname: Option<String>,
    /// `None` on platforms that do not report parallelism.
    pub cpu_count: Option<usize>,
}

impl PlatformProfile {
    /// Capture the profile of the platform this host is running on.
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            family: std::env::consts::FAMILY.to_string(),
            hostname: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("COMPUTERNAME"))
                .ok()
                .filter(|name| !name.is_empty()),
            cpu_count: std::thread::available_parallelism()
                .ok()
                .map(|count| count.get()),
        }
    }
}

/// System introspection operations.
pub struct SystemInfoCapability {
    profile: PlatformProfile,
}

impl SystemInfoCapability {
    /// Create a capability over the current platform.
    pub fn new() -> Self {
        Self::with_profile(PlatformProfile::current())
    }

    /// Create a capability over a fixed profile.
    pub fn with_profile(profile: PlatformProfile) -> Self {
        Self { profile }
    }

    /// Operating system identifier (e.g. `linux`, `macos`). Never fails.
    pub fn os(&self) -> &str {
        &self.profile.os
    }

    /// Processor architecture (e.g. `x86_64`, `aarch64`). Never fails.
    pub fn arch(&self) -> &str {
        &self.profile.arch
    }

    /// Platform family (e.g. `unix`, `windows`). Never fails.
    pub fn family(&self) -> &str {
        &self.profile.family
    }

    /// Hostname of the machine.
    ///
    /// Errors: `Unsupported` on platforms that do not expose one.
    pub fn hostname(&self) -> OpResult<String> {
        self.profile
            .hostname
            .clone()
            .ok_or_else(|| OpError::Unsupported {
                operation: "hostname",
                reason: "platform does not expose a hostname".to_string(),
            })
    }

    /// Number of logical CPUs.
    ///
    /// Errors: `Unsupported` on platforms that do not report parallelism.
    pub fn cpu_count(&self) -> OpResult<usize> {
        self.profile.cpu_count.ok_or_else(|| OpError::Unsupported {
            operation: "cpu_count",
            reason: "platform does not report available parallelism".to_string(),
        })
    }
}

impl Default for SystemInfoCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityModule for SystemInfoCapability {
    fn contract(&self) -> &'static CapabilityContract {
        &CONTRACT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_profile() -> PlatformProfile {
        PlatformProfile {
            os: "serenity".to_string(),
            arch: "riscv64".to_string(),
            family: "unix".to_string(),
            hostname: None,
            cpu_count: None,
        }
    }

    #[test]
    fn test_contract_is_valid() {
        assert!(CONTRACT.validate().is_ok());
        assert!(CONTRACT.has_operation("hostname"));
    }

    #[test]
    fn test_current_platform_basics_never_fail() {
        let system = SystemInfoCapability::new();
        assert!(!system.os().is_empty());
        assert!(!system.arch().is_empty());
        assert!(!system.family().is_empty());
    }

    #[test]
    fn test_bare_platform_reports_unsupported() {
        let system = SystemInfoCapability::with_profile(bare_profile());

        let err = system.hostname().unwrap_err();
        assert!(matches!(err, OpError::Unsupported { operation: "hostname", .. }));
        assert_eq!(err.kind(), "unsupported");

        let err = system.cpu_count().unwrap_err();
        assert!(matches!(err, OpError::Unsupported { operation: "cpu_count", .. }));
    }

    #[test]
    fn test_rich_profile_exposes_fields() {
        let mut profile = bare_profile();
        profile.hostname = Some("gatekeeper".to_string());
        profile.cpu_count = Some(8);

        let system = SystemInfoCapability::with_profile(profile);
        assert_eq!(system.hostname().unwrap(), "gatekeeper");
        assert_eq!(system.cpu_count().unwrap(), 8);
    }
}
