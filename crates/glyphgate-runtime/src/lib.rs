//! # glyphgate-runtime
//!
//! Capability injection core for the glyphgate script host.
//!
//! This crate provides:
//! - A reserved `host:` module namespace for host-backed capabilities
//! - Registration-time capability contracts
//! - A lazy-singleton extension registry with per-specifier construction locking
//! - A module resolver that routes reserved imports to the registry
//! - A fail-fast, idempotent bootstrap sequencer that binds capabilities onto
//!   the guest's global scope
//!
//! ## Injection Model
//!
//! Capability modules are host-implemented singletons. At host build time each
//! one is registered under a reserved module specifier together with a factory
//! and a contract describing its operation set. The bootstrap pass then
//! resolves each manifest entry through the registry and binds the resulting
//! instance to a fixed global name. After bootstrap, guest code reads the
//! globals directly; no further resolution occurs for those names.
//!
//! ## Security Model
//!
//! The reserved namespace is owned by the host. Imports using the `host:`
//! scheme are never satisfied from guest-supplied sources, so guest code
//! cannot shadow a capability with a file of the same name. Each capability
//! wrapper is the sole boundary to its native resource.

pub mod bootstrap;
pub mod capability;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod specifier;

pub use bootstrap::{BootstrapEntry, BootstrapManifest, BootstrapSequencer, GlobalBindingTable};
pub use capability::{downcast, CapabilityContract, CapabilityModule};
pub use error::{BoxedCause, InjectionError, InjectionResult, OpError, OpResult};
pub use registry::{CapabilityFactory, ExtensionRegistry};
pub use resolver::{ModuleResolution, ModuleResolver};
pub use specifier::{ModuleSpecifier, RESERVED_SCHEME};
