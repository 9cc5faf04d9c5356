// 📝 Logging - tracing subscriber for the binary
// Library code only emits events; installing a subscriber is the binary's job.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install a stderr fmt subscriber filtered by RUST_LOG (or `default_filter`)
pub fn init_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", default_filter, e))?;

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_cleanly() {
        let _ = init_logging(DEFAULT_FILTER);
        assert!(init_logging(DEFAULT_FILTER).is_err());
    }
}
