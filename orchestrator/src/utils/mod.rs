pub mod instrument;
pub mod logging;
pub mod metrics;
pub mod signal_handler;
pub mod startup_info;

use std::time::Duration;

use rand::Rng;

/// `base` plus a uniformly random extra of up to `max_jitter_ms`, so that processes started
/// together do not poll the store in lockstep.
pub fn with_jitter(base: Duration, max_jitter_ms: u64) -> Duration {
    if max_jitter_ms == 0 {
        return base;
    }
    base + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter_ms))
}
