//! Issuer configuration file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Signing credentials and issuance defaults, loaded from YAML.
///
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeAuthConfig {
    /// Application id used when no flag or environment variable provides one.
    #[serde(default)]
    pub application_id: Option<String>,

    /// Environment variable containing the application id.
    #[serde(default)]
    pub application_id_env: Option<String>,

    /// Environment variable containing the secret.
    #[serde(default)]
    pub secret_env: Option<String>,

    /// Path to a file containing the secret.
    #[serde(default)]
    pub secret_file: Option<PathBuf>,

    /// Lifetime of tokens issued without an explicit expiry.
    #[serde(default = "default_expires_in_seconds")]
    pub default_expires_in_seconds: i64,

    /// Capabilities granted before any given on the command line.
    #[serde(default)]
    pub default_capabilities: Vec<String>,
}

fn default_expires_in_seconds() -> i64 {
    3600
}

impl Default for EdgeAuthConfig {
    fn default() -> Self {
        Self {
            application_id: None,
            application_id_env: None,
            secret_env: None,
            secret_file: None,
            default_expires_in_seconds: default_expires_in_seconds(),
            default_capabilities: Vec::new(),
        }
    }
}

impl EdgeAuthConfig {
    /// Load the configuration from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve the application id: flag, then environment, then config value.
    pub fn resolve_application_id(&self, flag: Option<String>) -> Option<String> {
        if flag.is_some() {
            return flag;
        }

        if let Some(env_var) = &self.application_id_env {
            if let Ok(value) = std::env::var(env_var) {
                return Some(value);
            }
        }

        self.application_id.clone()
    }

    /// Resolve the secret: flag, then environment, then file.
    pub fn resolve_secret(&self, flag: Option<String>) -> Result<Option<String>, std::io::Error> {
        if flag.is_some() {
            return Ok(flag);
        }

        if let Some(env_var) = &self.secret_env {
            if let Ok(secret) = std::env::var(env_var) {
                return Ok(Some(secret));
            }
        }

        if let Some(path) = &self.secret_file {
            if path.exists() {
                let secret = std::fs::read_to_string(path)?;
                return Ok(Some(secret.trim().to_string()));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config: EdgeAuthConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.default_expires_in_seconds, 3600);
        assert!(config.default_capabilities.is_empty());
        assert!(config.resolve_application_id(None).is_none());
        assert!(config.resolve_secret(None).unwrap().is_none());
    }

    #[test]
    fn test_load_and_resolve_secret_file() {
        let dir = tempdir().unwrap();
        let secret_path = dir.path().join("secret");
        std::fs::write(&secret_path, "file-secret\n").unwrap();

        let config_path = dir.path().join("edgeauth.yaml");
        std::fs::write(
            &config_path,
            format!(
                "application_id: my-app\nsecret_file: {}\ndefault_expires_in_seconds: 60\ndefault_capabilities: [publish]\n",
                secret_path.display()
            ),
        )
        .unwrap();

        let config = EdgeAuthConfig::load(&config_path).unwrap();
        assert_eq!(config.default_expires_in_seconds, 60);
        assert_eq!(config.default_capabilities, vec!["publish".to_string()]);
        assert_eq!(config.resolve_application_id(None).as_deref(), Some("my-app"));
        assert_eq!(
            config.resolve_secret(None).unwrap().as_deref(),
            Some("file-secret")
        );
    }

    #[test]
    fn test_flags_take_precedence() {
        let config = EdgeAuthConfig {
            application_id: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config
                .resolve_application_id(Some("from-flag".to_string()))
                .as_deref(),
            Some("from-flag")
        );
        assert_eq!(
            config
                .resolve_secret(Some("flag-secret".to_string()))
                .unwrap()
                .as_deref(),
            Some("flag-secret")
        );
    }

    #[test]
    fn test_resolve_from_env() {
        // SAFETY: We're in a test and controlling the environment
        unsafe {
            std::env::set_var("EDGEAUTH_TEST_APP_ID", "env-app");
            std::env::set_var("EDGEAUTH_TEST_SECRET", "env-secret");
        }

        let config = EdgeAuthConfig {
            application_id: Some("from-config".to_string()),
            application_id_env: Some("EDGEAUTH_TEST_APP_ID".to_string()),
            secret_env: Some("EDGEAUTH_TEST_SECRET".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_application_id(None).as_deref(), Some("env-app"));
        assert_eq!(config.resolve_secret(None).unwrap().as_deref(), Some("env-secret"));

        // SAFETY: Cleanup in test
        unsafe {
            std::env::remove_var("EDGEAUTH_TEST_APP_ID");
            std::env::remove_var("EDGEAUTH_TEST_SECRET");
        }
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = EdgeAuthConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
