//! Service configuration from environment variables.

use std::env;
use std::time::Duration;

/// Well-known input queue name requesters address their timeout requests to.
pub const DEFAULT_INPUT_QUEUE: &str = "timebus.timeouts";

/// Default interval between due-timeout sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(300);

/// Configuration for the timeout service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Queue name the service receives requests on. The transport routes
    /// inbound messages here; the engine only reports it in diagnostics.
    pub input_queue: String,

    /// How often the sweep loop checks for due timeouts.
    pub sweep_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            input_queue: DEFAULT_INPUT_QUEUE.to_string(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TIMEBUS_INPUT_QUEUE`: Input queue name (default: timebus.timeouts)
    /// - `TIMEBUS_SWEEP_INTERVAL_MS`: Sweep interval in milliseconds
    ///   (default: 300)
    pub fn from_env() -> Self {
        Self {
            input_queue: env::var("TIMEBUS_INPUT_QUEUE")
                .unwrap_or_else(|_| DEFAULT_INPUT_QUEUE.to_string()),

            sweep_interval: env::var("TIMEBUS_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
        }
    }

    /// Create configuration for tests: a short sweep interval so scenarios
    /// that wait on real time finish quickly.
    pub fn for_testing() -> Self {
        Self {
            input_queue: DEFAULT_INPUT_QUEUE.to_string(),
            sweep_interval: Duration::from_millis(20),
        }
    }
}
