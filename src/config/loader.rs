use crate::config::schema::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
static CONFIG_TEST_ENV_LOCK: Mutex<()> = Mutex::new(());

pub const ENV_SYMPTOMS_PATH: &str = "SYMPTOM_EXPERT_SYMPTOMS";
pub const ENV_RULES_PATH: &str = "SYMPTOM_EXPERT_RULES";
pub const ENV_SESSION_TIMEOUT: &str = "SYMPTOM_EXPERT_SESSION_TIMEOUT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
}

/// Values given on the command line; they take precedence over everything else
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub symptoms_path: Option<PathBuf>,
    pub rules_path: Option<PathBuf>,
}

pub fn load_config(overrides: ConfigOverrides, cli_config_path: Option<PathBuf>) -> Result<Config> {
    tracing::debug!("Loading configuration");

    let mut config = Config::default();

    // Layer 1: config file (~/.symptom-expert/config.json or --config)
    let config_file = cli_config_path.clone().or_else(get_default_config_path);

    if let Some(ref path) = config_file {
        if path.exists() {
            tracing::debug!(config_path = %path.display(), "Loading configuration from file");
            config = read_config_file(path)?;
        } else if cli_config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        } else {
            tracing::debug!(config_path = %path.display(), "Config file not found, using defaults");
        }
    }

    // Layer 2: environment variables
    config = merge_env_variables(config);

    // Layer 3: CLI flags (highest precedence)
    if let Some(path) = overrides.symptoms_path {
        tracing::debug!(path = %path.display(), "Applying CLI symptoms override");
        config.symptoms_path = Some(path);
    }
    if let Some(path) = overrides.rules_path {
        tracing::debug!(path = %path.display(), "Applying CLI rules override");
        config.rules_path = Some(path);
    }

    config.validate()?;

    tracing::debug!(
        symptoms_path = ?config.symptoms_path,
        rules_path = ?config.rules_path,
        session_timeout_secs = config.session_timeout_secs,
        min_symptoms = config.min_symptoms,
        partial_threshold = config.partial_threshold,
        "Configuration loaded successfully"
    );

    Ok(config)
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".symptom-expert").join("config.json"))
}

fn read_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(ConfigError::IoError)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = serde_json::from_str(&content).map_err(ConfigError::InvalidJson)?;
    Ok(config)
}

fn merge_env_variables(config: Config) -> Config {
    let env_path = |key: &str| {
        std::env::var(key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    };

    let session_timeout_secs = match std::env::var(ENV_SESSION_TIMEOUT) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                tracing::warn!(
                    value = %raw,
                    "Ignoring invalid {} value",
                    ENV_SESSION_TIMEOUT
                );
                config.session_timeout_secs
            }
        },
        Err(_) => config.session_timeout_secs,
    };

    Config {
        symptoms_path: env_path(ENV_SYMPTOMS_PATH).or(config.symptoms_path),
        rules_path: env_path(ENV_RULES_PATH).or(config.rules_path),
        session_timeout_secs,
        ..config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn clear_env() {
        unsafe {
            env::remove_var(ENV_SYMPTOMS_PATH);
            env::remove_var(ENV_RULES_PATH);
            env::remove_var(ENV_SESSION_TIMEOUT);
        }
    }

    #[test]
    fn test_load_config_defaults() {
        let _lock = CONFIG_TEST_ENV_LOCK.lock().unwrap();
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{}").unwrap();

        let config = load_config(ConfigOverrides::default(), Some(config_path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_missing_explicit_file_fails() {
        let _lock = CONFIG_TEST_ENV_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let result = load_config(
            ConfigOverrides::default(),
            Some(temp_dir.path().join("nope.json")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_json() {
        let _lock = CONFIG_TEST_ENV_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "not valid json").unwrap();

        let result = load_config(ConfigOverrides::default(), Some(config_path));
        let err_msg = format!("{}", result.unwrap_err());
        assert!(err_msg.contains("invalid JSON"));
    }

    #[test]
    fn test_load_config_rejects_invalid_threshold() {
        let _lock = CONFIG_TEST_ENV_LOCK.lock().unwrap();
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, r#"{"partial_threshold": 0.0}"#).unwrap();

        assert!(load_config(ConfigOverrides::default(), Some(config_path)).is_err());
    }

    #[test]
    fn test_config_hierarchy_precedence() {
        let _lock = CONFIG_TEST_ENV_LOCK.lock().unwrap();
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        // Layer 1: file
        fs::write(
            &config_path,
            r#"{
                "symptoms_path": "/file/symptoms.json",
                "rules_path": "/file/rules.json",
                "session_timeout_secs": 60
            }"#,
        )
        .unwrap();

        // Layer 2: env overrides rules and timeout
        unsafe {
            env::set_var(ENV_RULES_PATH, "/env/rules.json");
            env::set_var(ENV_SESSION_TIMEOUT, "120");
        }

        // Layer 3: CLI overrides rules again
        let overrides = ConfigOverrides {
            symptoms_path: None,
            rules_path: Some(PathBuf::from("/cli/rules.txt")),
        };
        let config = load_config(overrides, Some(config_path)).unwrap();

        assert_eq!(
            config.symptoms_path,
            Some(PathBuf::from("/file/symptoms.json"))
        );
        assert_eq!(config.rules_path, Some(PathBuf::from("/cli/rules.txt")));
        assert_eq!(config.session_timeout_secs, 120);

        clear_env();
    }

    #[test]
    fn test_invalid_env_timeout_is_ignored() {
        let _lock = CONFIG_TEST_ENV_LOCK.lock().unwrap();
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, r#"{"session_timeout_secs": 90}"#).unwrap();

        unsafe {
            env::set_var(ENV_SESSION_TIMEOUT, "soon");
        }
        let config = load_config(ConfigOverrides::default(), Some(config_path)).unwrap();
        assert_eq!(config.session_timeout_secs, 90);

        clear_env();
    }
}
