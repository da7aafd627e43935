//! CLI command implementations.

pub mod config;
pub mod invoke;
pub mod records;
pub mod serve;

use anyhow::{Context, Result};
use docparse_config::{AppPaths, Config};
use docparse_db::Database;
use docparse_handler::Handler;
use std::path::PathBuf;
use std::sync::Arc;

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    pub config: Option<String>,
    pub sqlite: Option<String>,
}

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).with_context(|| format!("Failed to expand path '{}'", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Path of the config file in use.
pub fn config_path(opts: &GlobalOpts) -> Result<PathBuf> {
    match &opts.config {
        Some(path) => expand_path(path),
        None => Ok(get_paths()?.config_file),
    }
}

/// Load and validate configuration (file first, then environment).
pub fn load_config(opts: &GlobalOpts) -> Result<Config> {
    let path = config_path(opts)?;
    Config::load_with_env(&path).context("Invalid configuration")
}

/// Open the local result store given by `--sqlite`, if any.
pub fn open_local_store(opts: &GlobalOpts) -> Result<Option<Database>> {
    match &opts.sqlite {
        Some(path) => {
            let path = expand_path(path)?;
            let db = Database::open(&path)
                .with_context(|| format!("Failed to open result store at {}", path.display()))?;
            Ok(Some(db))
        }
        None => Ok(None),
    }
}

/// Open the local result store, falling back to the default location.
pub fn open_records_store(opts: &GlobalOpts) -> Result<Database> {
    if let Some(db) = open_local_store(opts)? {
        return Ok(db);
    }
    let paths = get_paths()?;
    Database::open(&paths.database_file).context("Failed to open result store")
}

/// Build the handler from configuration, routing writes to SQLite when requested.
pub fn build_handler(opts: &GlobalOpts) -> Result<Handler> {
    let config = load_config(opts)?;
    let handler = Handler::from_config(&config).context("Failed to set up collaborators")?;

    Ok(match open_local_store(opts)? {
        Some(db) => handler.with_store(Arc::new(db)),
        None => handler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_plain_path() {
        assert_eq!(expand_path("/tmp/results.db").unwrap(), PathBuf::from("/tmp/results.db"));
    }

    #[test]
    fn test_open_local_store_is_optional() {
        let opts = GlobalOpts::default();
        assert!(open_local_store(&opts).unwrap().is_none());

        let dir = tempfile::TempDir::new().unwrap();
        let opts = GlobalOpts {
            config: None,
            sqlite: Some(dir.path().join("r.db").to_string_lossy().to_string()),
        };
        assert!(open_local_store(&opts).unwrap().is_some());
    }
}
