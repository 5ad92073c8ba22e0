//! Env-driven configuration for `SimTransport`.

use coll_core::env::env_get;

/// `COLL_SIM_QUEUE_CAPACITY` / `COLL_SIM_LATENCY_US`-driven tuning knobs.
///
/// The queue capacity exists so the `QUEUE_FULL` / backoff path has a way
/// to actually trigger under test: set it low and issue a burst of
/// submits on one queue before any `flush`.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub queue_capacity: u32,
    pub latency_us: u64,
}

impl SimConfig {
    pub fn from_env() -> Self {
        SimConfig {
            queue_capacity: env_get("COLL_SIM_QUEUE_CAPACITY", 1024u32),
            latency_us: env_get("COLL_SIM_LATENCY_US", 0u64),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            queue_capacity: 1024,
            latency_us: 0,
        }
    }
}
