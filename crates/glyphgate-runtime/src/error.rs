//! Error types for the injection layer.
//!
//! Two taxonomies with different audiences:
//!
//! - [`InjectionError`] covers host-level concerns (registration, resolution,
//!   bootstrap). These surface during startup so the embedding application can
//!   decide whether a missing capability is fatal. They are never converted
//!   into guest exceptions.
//! - [`OpError`] covers guest-visible operation failures raised at the call
//!   site. The engine maps these onto its own error-signaling convention; they
//!   must never crash the host process.

use crate::specifier::ModuleSpecifier;
use thiserror::Error;

/// Underlying cause carried by initialization failures.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Host-level errors from the registry, resolver and bootstrap sequencer.
#[derive(Error, Debug)]
pub enum InjectionError {
    /// A factory is already registered under this specifier.
    #[error("capability already registered for specifier '{0}'")]
    DuplicateRegistration(ModuleSpecifier),

    /// No factory was ever registered under this specifier.
    #[error("no capability registered for specifier '{0}'")]
    UnknownModule(ModuleSpecifier),

    /// A raw specifier carried the reserved scheme but not the
    /// `host:<package>/<module>` shape.
    #[error("malformed reserved specifier '{0}'")]
    MalformedSpecifier(String),

    /// A capability contract failed validation, or a constructed instance did
    /// not report the contract it was registered with.
    #[error("capability contract violation for '{specifier}': {reason}")]
    ContractViolation {
        specifier: ModuleSpecifier,
        reason: String,
    },

    /// The factory for a capability failed. Wraps the underlying platform
    /// cause; the failed attempt is not cached and may be retried.
    #[error("capability '{specifier}' failed to initialize")]
    Initialization {
        specifier: ModuleSpecifier,
        #[source]
        source: BoxedCause,
    },

    /// A bootstrap manifest entry collided with an earlier one.
    #[error("bootstrap manifest conflict: {0}")]
    ManifestConflict(String),

    /// Bootstrap stopped at this entry. Bindings from earlier entries remain
    /// in place.
    #[error("bootstrap halted at '{specifier}' (global '{global}')")]
    Bootstrap {
        specifier: ModuleSpecifier,
        global: String,
        #[source]
        source: Box<InjectionError>,
    },

    /// A global name is already bound to a different capability instance.
    #[error("global '{global}' is already bound to a different capability instance")]
    BindingDiverged { global: String },
}

/// Result type for host-level injection operations.
pub type InjectionResult<T> = std::result::Result<T, InjectionError>;

/// Guest-visible capability operation errors.
///
/// Every operation that can fail reports a distinguishable kind; which kinds a
/// given operation can produce is documented on the operation itself.
#[derive(Error, Debug)]
pub enum OpError {
    /// The operation is not supported on the current platform.
    #[error("operation '{operation}' is not supported on this platform: {reason}")]
    Unsupported {
        operation: &'static str,
        reason: String,
    },

    /// A filesystem entry does not exist.
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// The caller may not touch this resource.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A file operation was applied to a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// An environment variable is not set.
    #[error("environment variable not set: {0}")]
    NotSet(String),

    /// Malformed input to a conversion (invalid UTF-8, invalid base64, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Residual I/O failure with no more specific kind.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl OpError {
    /// Stable kind tag, used by engines that map errors onto guest values.
    pub fn kind(&self) -> &'static str {
        match self {
            OpError::Unsupported { .. } => "unsupported",
            OpError::NotFound(_) => "not_found",
            OpError::PermissionDenied(_) => "permission_denied",
            OpError::IsADirectory(_) => "is_a_directory",
            OpError::NotSet(_) => "not_set",
            OpError::InvalidInput(_) => "invalid_input",
            OpError::Io(_) => "io",
        }
    }
}

/// Result type for guest-visible capability operations.
pub type OpResult<T> = std::result::Result<T, OpError>;
