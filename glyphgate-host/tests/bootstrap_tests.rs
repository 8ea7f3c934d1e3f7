//! Integration tests for the bootstrap sequence.
//!
//! These tests verify the host-level injection laws: every manifest entry
//! lands under its fixed global name, re-running bootstrap preserves binding
//! identities, and a failing capability stops the walk without revoking
//! earlier bindings.

use glyphgate_host::config::{CapabilitySettings, HostConfig};
use glyphgate_host::host::{ScriptHostBuilder, GLOBAL_FS};
use glyphgate_runtime::InjectionError;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn config_with_root(root: impl Into<PathBuf>) -> HostConfig {
    let mut config = HostConfig::default();
    config.fs.root = Some(root.into());
    config
}

#[test]
fn test_bootstrap_binds_all_default_globals() {
    let guest_root = TempDir::new().unwrap();
    let host = ScriptHostBuilder::with_config(config_with_root(guest_root.path()))
        .build()
        .unwrap();

    assert!(!host.has_bootstrapped());
    host.bootstrap().unwrap();
    assert!(host.has_bootstrapped());

    assert_eq!(
        host.global_names(),
        vec!["console", "encoding", "env", "fs", "system", "time"]
    );
}

#[test]
fn test_bootstrap_is_idempotent() {
    let guest_root = TempDir::new().unwrap();
    let host = ScriptHostBuilder::with_config(config_with_root(guest_root.path()))
        .build()
        .unwrap();

    host.bootstrap().unwrap();
    let before: Vec<_> = host
        .global_names()
        .into_iter()
        .map(|name| (name.clone(), host.global(&name).unwrap()))
        .collect();

    host.bootstrap().unwrap();
    assert_eq!(host.bootstrap_runs(), 2);

    for (name, instance) in &before {
        let after = host.global(name).unwrap();
        assert!(
            Arc::ptr_eq(instance, &after),
            "global '{name}' must keep its identity across runs"
        );
    }
}

#[test]
fn test_failing_capability_keeps_earlier_bindings() {
    // The sandbox root does not exist, so the fs factory fails at bootstrap.
    let missing_root = PathBuf::from("/nonexistent/glyphgate/guest");
    let host = ScriptHostBuilder::with_config(config_with_root(missing_root))
        .build()
        .unwrap();

    let err = host.bootstrap().unwrap_err();
    match &err {
        InjectionError::Bootstrap { specifier, global, .. } => {
            assert_eq!(specifier, &cap_fs::specifier());
            assert_eq!(global, GLOBAL_FS);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Everything before the failing entry is bound and usable.
    for name in ["console", "env", "encoding", "system", "time"] {
        assert!(host.global(name).is_some(), "global '{name}' must survive");
    }
    // The failing entry itself is absent, not partially bound.
    assert!(host.global("fs").is_none());
}

#[test]
fn test_failed_construction_is_retried_on_next_run() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("guest");
    let host = ScriptHostBuilder::with_config(config_with_root(&root))
        .build()
        .unwrap();

    assert!(host.bootstrap().is_err());
    assert!(host.global("fs").is_none());

    // Once the root exists, a second run picks it up: the failed attempt was
    // not cached.
    std::fs::create_dir(&root).unwrap();
    host.bootstrap().unwrap();
    assert!(host.global("fs").is_some());

    // Earlier bindings kept their identities across the failed run.
    let console_a = host.global("console").unwrap();
    host.bootstrap().unwrap();
    let console_b = host.global("console").unwrap();
    assert!(Arc::ptr_eq(&console_a, &console_b));
}

#[test]
fn test_disabled_capability_is_not_registered() {
    let mut config = HostConfig::default();
    config
        .capabilities
        .insert("fs".to_string(), CapabilitySettings { enabled: false });

    let host = ScriptHostBuilder::with_config(config).build().unwrap();
    host.bootstrap().unwrap();

    assert!(host.global("fs").is_none());
    assert!(host.global("console").is_some());

    // The specifier still lies in the reserved namespace, but nothing is
    // registered under it.
    assert!(host.resolver().can_resolve(cap_fs::specifier().as_str()));
    let err = host
        .resolver()
        .resolve(cap_fs::specifier().as_str())
        .unwrap_err();
    assert!(matches!(err, InjectionError::UnknownModule(_)));
}

#[test]
fn test_manifest_lists_fs_last() {
    let guest_root = TempDir::new().unwrap();
    let host = ScriptHostBuilder::with_config(config_with_root(guest_root.path()))
        .build()
        .unwrap();

    let entries = host.manifest().entries();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries.last().unwrap().global, GLOBAL_FS);
}
