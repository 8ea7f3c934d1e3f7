//! # cap-console
//!
//! Console capability: leveled guest logging routed onto the host's tracing
//! layer. Guest output is tagged with the host-assigned source label so
//! embedding applications can tell guest chatter from their own logs.
//!
//! All operations are synchronous, bounded and infallible; this capability is
//! hard-available on every platform.

use glyphgate_runtime::{CapabilityContract, CapabilityFactory, CapabilityModule, ModuleSpecifier};
use std::any::Any;
use std::sync::Arc;

/// Export surface of the console capability.
pub static CONTRACT: CapabilityContract = CapabilityContract {
    name: "console",
    operations: &["log", "trace", "debug", "info", "warn", "error"],
};

/// Reserved specifier this capability is registered under.
pub fn specifier() -> ModuleSpecifier {
    ModuleSpecifier::reserved("caps", "console")
}

/// Default factory with the standard guest source label.
pub fn factory() -> CapabilityFactory {
    Box::new(|| Ok(Arc::new(ConsoleCapability::new())))
}

/// Severity of a guest console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Stable operation name for this level.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a level name; unknown names fall back to `Info`.
    pub fn parse(value: &str) -> Self {
        match value {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Console output for guest code.
pub struct ConsoleCapability {
    source: String,
}

impl ConsoleCapability {
    /// Create a console with the default `guest` source label.
    pub fn new() -> Self {
        Self::with_source("guest")
    }

    /// Create a console tagged with a host-assigned source label.
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The source label attached to guest messages.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Emit a message at the given level. Never fails, never suspends.
    pub fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(source = %self.source, "{}", message),
            LogLevel::Debug => tracing::debug!(source = %self.source, "{}", message),
            LogLevel::Info => tracing::info!(source = %self.source, "{}", message),
            LogLevel::Warn => tracing::warn!(source = %self.source, "{}", message),
            LogLevel::Error => tracing::error!(source = %self.source, "{}", message),
        }
    }

    /// Emit at trace level.
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    /// Emit at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Emit at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Emit at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Emit at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

impl Default for ConsoleCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityModule for ConsoleCapability {
    fn contract(&self) -> &'static CapabilityContract {
        &CONTRACT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
