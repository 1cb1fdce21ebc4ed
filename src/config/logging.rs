use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::environment::Config;

/// Installs the global subscriber. `RUST_LOG` wins over `LOG_LEVEL` when set.
pub fn init_tracing(config: &Config) {
    let level = config.log_level.to_lowercase();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("api_scaffold={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(config.debug))
        .init();
}
