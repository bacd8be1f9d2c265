use std::{env, fs, path::Path, path::PathBuf, sync::Once};

use dirs::home_dir;

use crate::errors::{LoanError, Result};

const DEFAULT_DIR_NAME: &str = ".loan_core";
const BOOKS_DIR: &str = "books";
const BACKUP_DIR: &str = "backups";
const CONFIG_DIR: &str = "config";
const CONFIG_BACKUP_DIR: &str = "config_backups";
const CONFIG_FILE: &str = "config.json";
const STATE_FILE: &str = "state.json";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("loan_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Returns the application-specific data directory, defaulting to `~/.loan_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("LOAN_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding managed loan books, inside `base`.
pub fn books_dir_in(base: &Path) -> PathBuf {
    base.join(BOOKS_DIR)
}

/// Base directory for backup snapshots, inside `base`.
pub fn backups_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

/// Directory for the active configuration file, inside `base`.
pub fn config_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR)
}

/// Path to the active configuration file, inside `base`.
pub fn config_file_in(base: &Path) -> PathBuf {
    config_dir_in(base).join(CONFIG_FILE)
}

/// Directory containing configuration backups, inside `base`.
pub fn config_backups_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_BACKUP_DIR)
}

/// Path to the shared state file (tracking last opened book, etc.).
pub fn state_file_in(base: &Path) -> PathBuf {
    base.join(STATE_FILE)
}

/// Creates `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|err| LoanError::StorageError(format!("{}: {}", path.display(), err)))
}
