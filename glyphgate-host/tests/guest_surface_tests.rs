//! Integration tests for the guest-facing capability surface.
//!
//! These tests exercise the layer the way guest code does: import through
//! the resolver, read a global, downcast to the concrete capability and call
//! its operations.

use cap_console::ConsoleCapability;
use cap_encoding::EncodingCapability;
use cap_env::EnvCapability;
use cap_fs::FsCapability;
use cap_sysinfo::{PlatformProfile, SystemInfoCapability};
use cap_time::TimeCapability;
use glyphgate_host::config::HostConfig;
use glyphgate_host::host::{ScriptHost, ScriptHostBuilder};
use glyphgate_runtime::{downcast, OpError};
use std::sync::Arc;
use tempfile::TempDir;

fn booted_host() -> (ScriptHost, TempDir) {
    let guest_root = TempDir::new().unwrap();
    let mut config = HostConfig::default();
    config.fs.root = Some(guest_root.path().to_path_buf());

    let host = ScriptHostBuilder::with_config(config).build().unwrap();
    host.bootstrap().unwrap();
    (host, guest_root)
}

#[test]
fn test_import_yields_the_bound_identity() {
    let (host, _root) = booted_host();

    // A guest `import` of the reserved specifier and a read of the global
    // must observe the same singleton.
    let imported = host
        .resolver()
        .resolve(cap_time::specifier().as_str())
        .unwrap()
        .into_capability()
        .unwrap();
    let global = host.global("time").unwrap();
    assert!(Arc::ptr_eq(&imported, &global));
}

#[test]
fn test_out_of_namespace_import_is_not_ours() {
    let (host, _root) = booted_host();

    // Looks like a capability module path, but carries no reserved scheme:
    // the normal script loader owns it.
    let resolution = host.resolver().resolve("caps/time").unwrap();
    assert!(resolution.is_external());
}

#[tokio::test]
async fn test_guest_file_roundtrip_through_global() {
    let (host, root) = booted_host();

    let module = host.global("fs").unwrap();
    let fs = downcast::<FsCapability>(&module).unwrap();

    fs.write_file("journal.txt", b"day one").await.unwrap();
    assert_eq!(fs.read_text_file("journal.txt").await.unwrap(), "day one");

    // The write landed inside the sandbox root and nowhere else.
    assert!(root.path().join("journal.txt").is_file());

    // Escaping the sandbox is denied at the wrapper.
    let err = fs.read_file("../journal.txt").await.unwrap_err();
    assert!(matches!(err, OpError::PermissionDenied(_)));
}

#[test]
fn test_guest_console_is_tagged_with_host_instance() {
    let (host, _root) = booted_host();

    let module = host.global("console").unwrap();
    let console = downcast::<ConsoleCapability>(&module).unwrap();
    assert!(console.source().starts_with("guest-"));
    console.info("guest says hello");
}

#[test]
fn test_guest_env_reads() {
    let (host, _root) = booted_host();

    let module = host.global("env").unwrap();
    let env = downcast::<EnvCapability>(&module).unwrap();

    std::env::set_var("GLYPHGATE_SURFACE_TEST", "visible");
    assert_eq!(env.get("GLYPHGATE_SURFACE_TEST").unwrap(), "visible");

    std::env::remove_var("GLYPHGATE_SURFACE_TEST_GONE");
    let err = env.get("GLYPHGATE_SURFACE_TEST_GONE").unwrap_err();
    assert_eq!(err.kind(), "not_set");
}

#[test]
fn test_guest_encoding_roundtrip() {
    let (host, _root) = booted_host();

    let module = host.global("encoding").unwrap();
    let encoding = downcast::<EncodingCapability>(&module).unwrap();

    let encoded = encoding.encode_base64(b"ambient bytes");
    assert_eq!(
        encoding.decode_base64(&encoded).unwrap(),
        b"ambient bytes"
    );
}

#[test]
fn test_guest_system_introspection() {
    let (host, _root) = booted_host();

    let module = host.global("system").unwrap();
    let system = downcast::<SystemInfoCapability>(&module).unwrap();
    assert!(!system.os().is_empty());
    assert!(!system.arch().is_empty());
}

#[test]
fn test_unsupported_operation_has_exact_kind() {
    // A platform profile without hostname support must produce the
    // `unsupported` kind, not a generic failure.
    let system = SystemInfoCapability::with_profile(PlatformProfile {
        os: "linux".to_string(),
        arch: "x86_64".to_string(),
        family: "unix".to_string(),
        hostname: None,
        cpu_count: Some(4),
    });

    let err = system.hostname().unwrap_err();
    assert!(matches!(
        err,
        OpError::Unsupported {
            operation: "hostname",
            ..
        }
    ));
    assert_eq!(err.kind(), "unsupported");
}

#[tokio::test]
async fn test_guest_clock_reads_and_sleep() {
    let (host, _root) = booted_host();

    let module = host.global("time").unwrap();
    let time = downcast::<TimeCapability>(&module).unwrap();

    let before = time.now_millis();
    time.sleep(10).await;
    assert!(time.now_millis() >= before);
    assert!(time.elapsed_millis() < 60_000);
}
