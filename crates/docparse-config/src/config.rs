//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_APPWRITE_ENDPOINT: &str = "APPWRITE_ENDPOINT";
pub const ENV_APPWRITE_PROJECT: &str = "APPWRITE_PROJECT";
pub const ENV_APPWRITE_API_KEY: &str = "APPWRITE_API_KEY";
pub const ENV_APPWRITE_DATABASE_ID: &str = "APPWRITE_DATABASE_ID";
pub const ENV_APPWRITE_COLLECTION_ID: &str = "APPWRITE_COLLECTION_ID";
pub const ENV_APPWRITE_BUCKET_ID: &str = "APPWRITE_BUCKET_ID";
pub const ENV_LLAMA_API_URL: &str = "LLAMA_CLOUD_API_ENDPOINT";
pub const ENV_LLAMA_API_KEY: &str = "LLAMA_CLOUD_API_KEY";
pub const ENV_LLAMA_TIMEOUT: &str = "LLAMA_CLOUD_TIMEOUT_SECONDS";
pub const ENV_MAX_FILE_BYTES: &str = "DOCPARSE_MAX_FILE_BYTES";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub appwrite: AppwriteConfig,

    #[serde(default)]
    pub llama: LlamaConfig,

    #[serde(default)]
    pub handler: HandlerConfig,
}

impl Config {
    /// Load from `path` (if it exists), overlay the environment and validate.
    pub fn load_with_env(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path, without the environment.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config file at {}, using environment only", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Build and validate configuration purely from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build and validate configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values found through `lookup`; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_APPWRITE_ENDPOINT) {
            self.appwrite.endpoint = v;
        }
        if let Some(v) = get(ENV_APPWRITE_PROJECT) {
            self.appwrite.project = v;
        }
        if let Some(v) = get(ENV_APPWRITE_API_KEY) {
            self.appwrite.api_key = v;
        }
        if let Some(v) = get(ENV_APPWRITE_DATABASE_ID) {
            self.appwrite.database_id = v;
        }
        if let Some(v) = get(ENV_APPWRITE_COLLECTION_ID) {
            self.appwrite.collection_id = v;
        }
        if let Some(v) = get(ENV_APPWRITE_BUCKET_ID) {
            self.appwrite.bucket_id = v;
        }
        if let Some(v) = get(ENV_LLAMA_API_URL) {
            self.llama.api_url = v;
        }
        if let Some(v) = get(ENV_LLAMA_API_KEY) {
            self.llama.api_key = v;
        }
        if let Some(v) = get(ENV_LLAMA_TIMEOUT) {
            self.llama.timeout_seconds = parse_number(ENV_LLAMA_TIMEOUT, &v)?;
        }
        if let Some(v) = get(ENV_MAX_FILE_BYTES) {
            self.handler.max_file_bytes = Some(parse_number(ENV_MAX_FILE_BYTES, &v)?);
        }

        Ok(())
    }

    /// Check that every required value is present, reporting all gaps at once.
    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            (ENV_APPWRITE_ENDPOINT, &self.appwrite.endpoint),
            (ENV_APPWRITE_PROJECT, &self.appwrite.project),
            (ENV_APPWRITE_API_KEY, &self.appwrite.api_key),
            (ENV_LLAMA_API_URL, &self.llama.api_url),
            (ENV_LLAMA_API_KEY, &self.llama.api_key),
            (ENV_APPWRITE_DATABASE_ID, &self.appwrite.database_id),
            (ENV_APPWRITE_COLLECTION_ID, &self.appwrite.collection_id),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        if self.llama.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "llama.timeout_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a template config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Generate a template config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Docparse Configuration
# Every value can also be provided through the environment variable noted
# above it. Environment values take precedence over this file.

[appwrite]
# APPWRITE_ENDPOINT
endpoint = ""
# APPWRITE_PROJECT
project = ""
# APPWRITE_API_KEY
api_key = ""
# APPWRITE_DATABASE_ID
database_id = ""
# APPWRITE_COLLECTION_ID
collection_id = ""
# APPWRITE_BUCKET_ID (storage bucket holding the uploaded files)
bucket_id = "default"

[llama]
# LLAMA_CLOUD_API_ENDPOINT
api_url = ""
# LLAMA_CLOUD_API_KEY
api_key = ""
# LLAMA_CLOUD_TIMEOUT_SECONDS
timeout_seconds = 120

[handler]
# DOCPARSE_MAX_FILE_BYTES (unset means no limit)
# max_file_bytes = 52428800
"#
        .to_string()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} must be a number, got '{}'", key, value)))
}

/// Appwrite project, storage and database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project: String,
    pub api_key: String,
    pub database_id: String,
    pub collection_id: String,
    pub bucket_id: String,
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            project: String::new(),
            api_key: String::new(),
            database_id: String::new(),
            collection_id: String::new(),
            bucket_id: "default".to_string(),
        }
    }
}

/// Remote parser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlamaConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

impl Default for LlamaConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            timeout_seconds: 120,
        }
    }
}

/// Pipeline limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_bytes: Option<u64>,
}

/// Mask a secret for display, keeping only a short prefix.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(unset)".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}****", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (ENV_APPWRITE_ENDPOINT, "https://cloud.appwrite.io/v1".to_string()),
            (ENV_APPWRITE_PROJECT, "proj".to_string()),
            (ENV_APPWRITE_API_KEY, "secret-key".to_string()),
            (ENV_APPWRITE_DATABASE_ID, "db".to_string()),
            (ENV_APPWRITE_COLLECTION_ID, "results".to_string()),
            (ENV_LLAMA_API_URL, "https://api.cloud.llamaindex.ai/parse".to_string()),
            (ENV_LLAMA_API_KEY, "llx-key".to_string()),
        ])
    }

    #[test]
    fn test_from_lookup() {
        let env = full_env();
        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.appwrite.project, "proj");
        assert_eq!(config.appwrite.bucket_id, "default");
        assert_eq!(config.llama.timeout_seconds, 120);
        assert!(config.handler.max_file_bytes.is_none());
    }

    #[test]
    fn test_missing_keys_are_all_reported() {
        let mut env = full_env();
        env.remove(ENV_APPWRITE_API_KEY);
        env.insert(ENV_LLAMA_API_KEY, "  ".to_string());

        let err = Config::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        match err {
            ConfigError::Missing(keys) => {
                assert_eq!(keys, vec![ENV_APPWRITE_API_KEY, ENV_LLAMA_API_KEY]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_numeric_overrides() {
        let mut env = full_env();
        env.insert(ENV_LLAMA_TIMEOUT, "30".to_string());
        env.insert(ENV_MAX_FILE_BYTES, "1024".to_string());

        let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.llama.timeout_seconds, 30);
        assert_eq!(config.handler.max_file_bytes, Some(1024));

        env.insert(ENV_LLAMA_TIMEOUT, "soon".to_string());
        assert!(matches!(
            Config::from_lookup(|k| env.get(k).cloned()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_file_then_overrides() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [appwrite]
            endpoint = "http://localhost/v1"
            project = "from-file"

            [llama]
            timeout_seconds = 45
            "#
        )
        .unwrap();

        let mut config = Config::load_from(temp_file.path()).unwrap();
        assert_eq!(config.appwrite.project, "from-file");
        assert_eq!(config.llama.timeout_seconds, 45);
        assert!(config.validate().is_err());

        let env = HashMap::from([(ENV_APPWRITE_PROJECT, "from-env".to_string())]);
        config.apply_overrides(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.appwrite.project, "from-env");
        assert_eq!(config.appwrite.endpoint, "http://localhost/v1");
    }

    #[test]
    fn test_template_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert_eq!(config.appwrite.bucket_id, "default");
        assert_eq!(config.llama.timeout_seconds, 120);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(unset)");
        assert_eq!(mask_secret("llx-abcdef"), "llx-****");
    }
}
