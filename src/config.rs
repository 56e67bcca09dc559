use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "EpiFriend";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage keys, one JSON document each.
pub const EPISODES_KEY: &str = "epifriend_episodes";
pub const MEDICATIONS_KEY: &str = "epifriend_medications";
pub const MEDICATION_LOGS_KEY: &str = "epifriend_medication_logs";
pub const SETTINGS_KEY: &str = "epifriend_settings";

/// How long a toast stays visible unless told otherwise.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

/// Number of episodes shown in the "recent" list.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Exported report file names are `<prefix><YYYY-MM-DD>.pdf`.
pub const REPORT_FILE_PREFIX: &str = "EpiFriend_Report_";

const DATABASE_FILE: &str = "epifriend.db";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "epifriend=info,epifriend_lib=info,warn"
}

/// Get the application data directory
/// ~/EpiFriend/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Database file inside a data directory.
pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILE)
}

/// Directory that receives exported reports.
pub fn exports_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("exports")
}
