//! # cap-time
//!
//! Time for guest code: wall clock, a monotonic elapsed counter anchored at
//! module construction, and a suspending sleep.
//!
//! Clock reads are synchronous, bounded and never fail. `sleep` is the one
//! suspending operation; it is cancellation-safe: dropping the future wakes
//! nothing and leaves no side effect.

use chrono::{DateTime, Utc};
use glyphgate_runtime::{CapabilityContract, CapabilityFactory, CapabilityModule, ModuleSpecifier};
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Export surface of the time capability.
pub static CONTRACT: CapabilityContract = CapabilityContract {
    name: "time",
    operations: &["now_millis", "now_utc", "now_rfc3339", "elapsed_millis", "sleep"],
};

/// Reserved specifier this capability is registered under.
pub fn specifier() -> ModuleSpecifier {
    ModuleSpecifier::reserved("caps", "time")
}

/// Default factory.
pub fn factory() -> CapabilityFactory {
    Box::new(|| Ok(Arc::new(TimeCapability::new())))
}

/// Clock access for guest code.
pub struct TimeCapability {
    origin: Instant,
}

impl TimeCapability {
    /// Create a capability; the monotonic origin is fixed here.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds since the Unix epoch.
    pub fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// Current wall-clock time in UTC.
    pub fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Current wall-clock time as an RFC 3339 string.
    pub fn now_rfc3339(&self) -> String {
        self.now_utc().to_rfc3339()
    }

    /// Monotonic milliseconds since this capability was constructed.
    /// Unaffected by wall-clock adjustments.
    pub fn elapsed_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Suspend the guest for at least `millis` milliseconds.
    pub async fn sleep(&self, millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

impl Default for TimeCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityModule for TimeCapability {
    fn contract(&self) -> &'static CapabilityContract {
        &CONTRACT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
