//! Configuration loader
//!
//! Loads the SDK configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the credentials are not set, falls back to loading from file
//! 3. Searches the working directory and its parents for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MPESA_CONSUMER_KEY`: Consumer key (required)
//! - `MPESA_CONSUMER_SECRET`: Consumer secret (required)
//! - `MPESA_ENVIRONMENT`: `sandbox` (default) or `production`
//! - `MPESA_TIMEOUT_SECS`: Per-request timeout in seconds (default 30)
//! - `MPESA_BASE_URL`: Replaces the environment's base URL
//!
//! ## File Locations
//! The loader looks for `mpesa.toml`, `mpesa.json`, `config.toml` and
//! `config.json` in the current working directory, then in each parent
//! directory up to two levels.

use std::path::{Path, PathBuf};

use mpesa_domain::constants::DEFAULT_TIMEOUT_SECS;
use mpesa_domain::{MpesaConfig, MpesaEnvironment, MpesaError, Result};

use crate::errors::InfraError;

/// File names tried in each directory, in order.
const CONFIG_FILE_NAMES: [&str; 4] = ["mpesa.toml", "mpesa.json", "config.toml", "config.json"];

/// How many parent directories [`find_config_file`] walks up.
const MAX_PARENT_LEVELS: usize = 2;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If that fails, falls
/// back to loading from a config file. The result is validated either way.
///
/// # Errors
/// Returns `MpesaError::InvalidConfiguration` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The consumer key or secret is blank
pub fn load() -> Result<MpesaConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!(environment = %config.environment, "Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `MpesaError::InvalidConfiguration` if a credential variable is
/// missing or blank, or an optional variable has an invalid value.
pub fn load_from_env() -> Result<MpesaConfig> {
    let consumer_key = env_var("MPESA_CONSUMER_KEY")?;
    let consumer_secret = env_var("MPESA_CONSUMER_SECRET")?;

    let environment = match std::env::var("MPESA_ENVIRONMENT") {
        Ok(raw) => raw.parse::<MpesaEnvironment>()?,
        Err(_) => MpesaEnvironment::default(),
    };

    let timeout_secs = match std::env::var("MPESA_TIMEOUT_SECS") {
        Ok(raw) => raw.trim().parse::<u64>().map_err(|e| {
            MpesaError::InvalidConfiguration(format!("Invalid timeout '{raw}': {e}"))
        })?,
        Err(_) => DEFAULT_TIMEOUT_SECS,
    };

    let mut config = MpesaConfig::new(consumer_key, consumer_secret, environment)
        .with_timeout_secs(timeout_secs);
    if let Some(base_url) = std::env::var("MPESA_BASE_URL").ok().filter(|v| !v.trim().is_empty()) {
        config = config.with_base_url(base_url);
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations with
/// [`find_config_file`]. The format is detected by file extension.
///
/// # Errors
/// Returns `MpesaError::InvalidConfiguration` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<MpesaConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MpesaError::InvalidConfiguration(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            MpesaError::InvalidConfiguration(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        MpesaError::InvalidConfiguration(format!("Failed to read config file: {e}"))
    })?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, choosing the format by the
/// extension of `path` (`.json` when there is none).
fn parse_config(contents: &str, path: &Path) -> Result<MpesaConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| MpesaError::from(InfraError::from(e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MpesaError::InvalidConfiguration(format!("Invalid JSON format: {e}"))),
        _ => Err(MpesaError::InvalidConfiguration(format!(
            "Unsupported config format: {extension}"
        ))),
    }
}

/// Search the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    search_from(&cwd)
}

fn search_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(MAX_PARENT_LEVELS + 1)
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Get a required, non-blank environment variable
fn env_var(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(MpesaError::InvalidConfiguration(format!(
            "Environment variable {key} must not be empty"
        ))),
        Err(_) => Err(MpesaError::InvalidConfiguration(format!(
            "Missing required environment variable: {key}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::{Builder, TempDir};

    use super::*;

    // Serializes tests that touch process-wide environment variables.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 5] = [
        "MPESA_CONSUMER_KEY",
        "MPESA_CONSUMER_SECRET",
        "MPESA_ENVIRONMENT",
        "MPESA_TIMEOUT_SECS",
        "MPESA_BASE_URL",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MPESA_CONSUMER_KEY", "key");
        std::env::set_var("MPESA_CONSUMER_SECRET", "secret");
        std::env::set_var("MPESA_ENVIRONMENT", "production");
        std::env::set_var("MPESA_TIMEOUT_SECS", "45");
        std::env::set_var("MPESA_BASE_URL", "http://127.0.0.1:9000/");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.consumer_key, "key");
        assert_eq!(config.consumer_secret, "secret");
        assert_eq!(config.environment, MpesaEnvironment::Production);
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
    }

    /// Validates the defaults applied to optional environment variables.
    ///
    /// Assertions:
    /// - Environment defaults to sandbox.
    /// - Timeout defaults to 30 seconds.
    /// - Base URL is the sandbox URL.
    #[test]
    fn test_load_from_env_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MPESA_CONSUMER_KEY", "key");
        std::env::set_var("MPESA_CONSUMER_SECRET", "secret");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.environment, MpesaEnvironment::Sandbox);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.base_url(), "https://sandbox.safaricom.co.ke");
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MPESA_CONSUMER_KEY", "key");

        let result = load_from_env();
        clear_env();

        match result {
            Err(MpesaError::InvalidConfiguration(message)) => {
                assert!(message.contains("MPESA_CONSUMER_SECRET"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_env_blank_key() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MPESA_CONSUMER_KEY", "   ");
        std::env::set_var("MPESA_CONSUMER_SECRET", "secret");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(MpesaError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("MPESA_CONSUMER_KEY", "key");
        std::env::set_var("MPESA_CONSUMER_SECRET", "secret");
        std::env::set_var("MPESA_TIMEOUT_SECS", "soon");
        let bad_timeout = load_from_env();

        std::env::set_var("MPESA_TIMEOUT_SECS", "30");
        std::env::set_var("MPESA_ENVIRONMENT", "staging");
        let bad_environment = load_from_env();
        clear_env();

        assert!(matches!(bad_timeout, Err(MpesaError::InvalidConfiguration(_))));
        assert!(matches!(bad_environment, Err(MpesaError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_load_from_file_json() {
        let file = write_config(
            ".json",
            r#"{
                "consumer_key": "json-key",
                "consumer_secret": "json-secret",
                "environment": "production",
                "timeout_secs": 10
            }"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).expect("json config");
        assert_eq!(config.consumer_key, "json-key");
        assert_eq!(config.environment, MpesaEnvironment::Production);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = write_config(
            ".toml",
            r#"
consumer_key = "toml-key"
consumer_secret = "toml-secret"
base_url = "http://localhost:8080"
"#,
        );

        let config = load_from_file(Some(file.path().to_path_buf())).expect("toml config");
        assert_eq!(config.consumer_key, "toml-key");
        assert_eq!(config.environment, MpesaEnvironment::Sandbox);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/mpesa.toml")));
        assert!(matches!(result, Err(MpesaError::InvalidConfiguration(ref m)) if m.contains("not found")));
    }

    #[test]
    fn test_load_from_file_blank_secret_fails_validation() {
        let file = write_config(".json", r#"{"consumer_key":"k","consumer_secret":""}"#);
        let result = load_from_file(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(MpesaError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let file = write_config(".json", "{ not json");
        let result = load_from_file(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(MpesaError::InvalidConfiguration(ref m)) if m.contains("JSON")));
    }

    #[test]
    fn test_parse_config_invalid_toml() {
        let result = parse_config("consumer_key = ", Path::new("mpesa.toml"));
        assert!(matches!(result, Err(MpesaError::InvalidConfiguration(ref m)) if m.contains("TOML")));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("consumer_key: k", Path::new("mpesa.yaml"));
        assert!(matches!(result, Err(MpesaError::InvalidConfiguration(ref m)) if m.contains("yaml")));
    }

    /// Validates the search order across the directory tree.
    ///
    /// Assertions:
    /// - Nothing is found in an empty tree.
    /// - A `config.json` two levels up is found from a nested directory.
    /// - `mpesa.toml` in the same directory wins over `config.json`.
    #[test]
    fn test_search_walks_parents_in_order() {
        let root = TempDir::new().expect("temp dir");
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).expect("nested dirs");

        assert_eq!(search_from(&nested), None);

        std::fs::write(root.path().join("config.json"), "{}").expect("write");
        assert_eq!(search_from(&nested), Some(root.path().join("config.json")));

        std::fs::write(root.path().join("mpesa.toml"), "").expect("write");
        assert_eq!(search_from(&nested), Some(root.path().join("mpesa.toml")));

        std::fs::write(nested.join("config.toml"), "").expect("write");
        assert_eq!(search_from(&nested), Some(nested.join("config.toml")));
    }
}
