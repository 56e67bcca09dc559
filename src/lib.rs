pub mod commands;
pub mod config;
pub mod core_state;
pub mod db;
pub mod i18n;
pub mod journal;
pub mod medications;
pub mod medicines;
pub mod models;
pub mod report;
pub mod settings;
pub mod toast;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
