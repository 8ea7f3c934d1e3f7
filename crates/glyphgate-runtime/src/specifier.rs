//! Reserved module specifiers.
//!
//! Capability modules live in a reserved namespace with the shape
//! `host:<package>/<module>`, e.g. `host:caps/console`. The scheme is
//! structurally recognizable: whether a raw string lies inside the namespace
//! is independent of whether anything is registered under it.

use crate::error::{InjectionError, InjectionResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheme prefix that marks a specifier as host-owned.
pub const RESERVED_SCHEME: &str = "host";

/// An opaque key identifying a capability module.
///
/// Equality is exact string match. Specifiers are unique within a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleSpecifier(String);

impl ModuleSpecifier {
    /// Parse a raw specifier that must lie inside the reserved namespace.
    ///
    /// Fails with [`InjectionError::MalformedSpecifier`] if the scheme is
    /// missing or the body does not have the `<package>/<module>` shape.
    pub fn parse(raw: &str) -> InjectionResult<Self> {
        let body = raw
            .strip_prefix(RESERVED_SCHEME)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| InjectionError::MalformedSpecifier(raw.to_string()))?;

        let Some((package, module)) = body.split_once('/') else {
            return Err(InjectionError::MalformedSpecifier(raw.to_string()));
        };
        if package.is_empty() || module.is_empty() || module.contains('/') {
            return Err(InjectionError::MalformedSpecifier(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    /// Build a reserved specifier from its package and module segments.
    ///
    /// Segments are taken as-is; callers pass plain path segments without
    /// scheme or separator characters.
    pub fn reserved(package: &str, module: &str) -> Self {
        Self(format!("{RESERVED_SCHEME}:{package}/{module}"))
    }

    /// Whether a raw string lies inside the reserved namespace.
    ///
    /// This is a structural check on the scheme only and says nothing about
    /// registration.
    pub fn in_reserved_namespace(raw: &str) -> bool {
        raw.strip_prefix(RESERVED_SCHEME)
            .is_some_and(|rest| rest.starts_with(':'))
    }

    /// The full specifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The package segment.
    pub fn package(&self) -> &str {
        self.body().split_once('/').map_or("", |(pkg, _)| pkg)
    }

    /// The module segment.
    pub fn module(&self) -> &str {
        self.body().split_once('/').map_or("", |(_, module)| module)
    }

    fn body(&self) -> &str {
        self.0
            .strip_prefix(RESERVED_SCHEME)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or("")
    }
}

impl fmt::Display for ModuleSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleSpecifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_specifier() {
        let spec = ModuleSpecifier::parse("host:caps/console").unwrap();
        assert_eq!(spec.as_str(), "host:caps/console");
        assert_eq!(spec.package(), "caps");
        assert_eq!(spec.module(), "console");
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        assert!(ModuleSpecifier::parse("caps/console").is_err());
        assert!(ModuleSpecifier::parse("./caps/console").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(ModuleSpecifier::parse("host:").is_err());
        assert!(ModuleSpecifier::parse("host:console").is_err());
        assert!(ModuleSpecifier::parse("host:/console").is_err());
        assert!(ModuleSpecifier::parse("host:caps/").is_err());
        assert!(ModuleSpecifier::parse("host:caps/fs/extra").is_err());
    }

    #[test]
    fn test_namespace_check_is_structural() {
        // In the namespace even though nothing is registered under it.
        assert!(ModuleSpecifier::in_reserved_namespace("host:nope/nothing"));
        assert!(ModuleSpecifier::in_reserved_namespace("host:"));

        assert!(!ModuleSpecifier::in_reserved_namespace("hostile:caps/console"));
        assert!(!ModuleSpecifier::in_reserved_namespace("caps/console"));
        assert!(!ModuleSpecifier::in_reserved_namespace(""));
    }

    #[test]
    fn test_reserved_constructor_matches_parse() {
        let built = ModuleSpecifier::reserved("caps", "time");
        let parsed = ModuleSpecifier::parse("host:caps/time").unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let spec = ModuleSpecifier::reserved("caps", "env");
        assert_eq!(
            serde_json::to_string(&spec).unwrap(),
            "\"host:caps/env\""
        );

        let parsed: ModuleSpecifier = serde_json::from_str("\"host:caps/env\"").unwrap();
        assert_eq!(parsed, spec);
    }

    #[test]
    fn test_equality_is_exact_string_match() {
        let a = ModuleSpecifier::reserved("caps", "fs");
        let b = ModuleSpecifier::reserved("caps", "fs");
        let c = ModuleSpecifier::reserved("caps", "env");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
