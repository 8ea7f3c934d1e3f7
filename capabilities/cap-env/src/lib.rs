//! # cap-env
//!
//! Environment-variable reads for guest code. Read-only by contract: guest
//! code can observe the host process environment but never mutate it.
//!
//! All operations are synchronous, bounded and hard-available; per-call
//! failures are limited to [`OpError::NotSet`] and [`OpError::InvalidInput`].

use glyphgate_runtime::{
    CapabilityContract, CapabilityFactory, CapabilityModule, ModuleSpecifier, OpError, OpResult,
};
use std::any::Any;
use std::env::VarError;
use std::sync::Arc;

/// Export surface of the environment capability.
pub static CONTRACT: CapabilityContract = CapabilityContract {
    name: "env",
    operations: &["get", "has", "names"],
};

/// Reserved specifier this capability is registered under.
pub fn specifier() -> ModuleSpecifier {
    ModuleSpecifier::reserved("caps", "env")
}

/// Default factory.
pub fn factory() -> CapabilityFactory {
    Box::new(|| Ok(Arc::new(EnvCapability::new())))
}

/// Read-only view of the host process environment.
pub struct EnvCapability;

impl EnvCapability {
    /// Create the capability.
    pub fn new() -> Self {
        Self
    }

    /// Read one variable.
    ///
    /// Errors: `NotSet` when the variable is absent, `InvalidInput` when its
    /// value is not valid Unicode.
    pub fn get(&self, name: &str) -> OpResult<String> {
        match std::env::var(name) {
            Ok(value) => Ok(value),
            Err(VarError::NotPresent) => Err(OpError::NotSet(name.to_string())),
            Err(VarError::NotUnicode(_)) => Err(OpError::InvalidInput(format!(
                "environment variable '{name}' is not valid Unicode"
            ))),
        }
    }

    /// Whether a variable is set (regardless of its value being Unicode).
    pub fn has(&self, name: &str) -> bool {
        std::env::var_os(name).is_some()
    }

    /// Names of all set variables, sorted. Names that are not valid Unicode
    /// are skipped.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::env::vars_os()
            .filter_map(|(name, _)| name.into_string().ok())
            .collect();
        names.sort();
        names
    }
}

impl Default for EnvCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityModule for EnvCapability {
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

    #[test]
    fn test_contract_is_valid() {
        assert!(CONTRACT.validate().is_ok());
        assert!(CONTRACT.has_operation("get"));
    }

    #[test]
    fn test_get_present_variable() {
        std::env::set_var("GLYPHGATE_ENV_TEST_PRESENT", "forty-two");
        let env = EnvCapability::new();

        assert_eq!(env.get("GLYPHGATE_ENV_TEST_PRESENT").unwrap(), "forty-two");
        assert!(env.has("GLYPHGATE_ENV_TEST_PRESENT"));
        assert!(env
            .names()
            .contains(&"GLYPHGATE_ENV_TEST_PRESENT".to_string()));
    }

    #[test]
    fn test_absent_variable_is_not_set() {
        std::env::remove_var("GLYPHGATE_ENV_TEST_ABSENT");
        let env = EnvCapability::new();

        let err = env.get("GLYPHGATE_ENV_TEST_ABSENT").unwrap_err();
        assert!(matches!(err, OpError::NotSet(_)));
        assert_eq!(err.kind(), "not_set");
        assert!(!env.has("GLYPHGATE_ENV_TEST_ABSENT"));
    }

    #[test]
    fn test_names_are_sorted() {
        let env = EnvCapability::new();
        let names = env.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
