use tracing_subscriber::FmtSubscriber;

use crate::core::config::LoggingConfig;
use crate::core::errors::{FormError, Result};

/// Install a global fmt subscriber at the configured level
///
/// Fails if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = config.level.parse::<tracing::Level>().map_err(|_| {
        FormError::configuration_field(format!("unknown log level '{}'", config.level), "logging.level")
    })?;

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| FormError::configuration(format!("tracing subscriber already set: {e}")))
}
