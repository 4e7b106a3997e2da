//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when it does
    /// not exist. Other failures (bad TOML, unreadable file) are still errors.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            Err(e) => Err(e),
        }
    }

    /// Default config file location (`~/.skipramp/config.toml`).
    pub fn default_path() -> PathBuf {
        PathBuf::from(Self::expand_path("~/.skipramp/config.toml"))
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex");

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.config`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skipramp_protocols::SkipMethod;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.settings.target_speed, 4.0);
        assert_eq!(config.settings.allowed_sites, vec!["youtube.com".to_string()]);
    }

    #[test]
    fn test_load_settings() {
        let content = r#"
            [settings]
            allowed_sites = ["example.com", "youtube.com"]
            target_speed = 3.5
            ad_grace_delay_seconds = 1.0
            skip_method = "input"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.settings.allowed_sites.len(), 2);
        assert_eq!(config.settings.target_speed, 3.5);
        assert_eq!(config.settings.ad_grace_delay_seconds, 1.0);
        assert_eq!(config.settings.skip_method, SkipMethod::Input);
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let content = r#"
            [settings]
            target_speed = 3.0
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.settings.target_speed, 3.0);
        assert_eq!(config.settings.ad_grace_delay_seconds, 2.0);
        assert_eq!(config.settings.skip_method, SkipMethod::Pointer);
    }

    #[test]
    fn test_load_keys_and_browser() {
        let content = r#"
            [keys]
            skip = "k"

            [browser]
            endpoint = "http://127.0.0.1:9333"
            scan_interval_ms = 500
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.keys.skip, "k");
        assert_eq!(config.keys.decrease, "a");
        assert_eq!(config.browser.endpoint, "http://127.0.0.1:9333");
        assert_eq!(config.browser.scan_interval_ms, 500);
    }

    #[test]
    fn test_unknown_skip_method_rejected() {
        let content = r#"
            [settings]
            skip_method = "telepathy"
        "#;
        assert!(ConfigLoader::load_str(content).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[settings]").unwrap();
        writeln!(file, "target_speed = 2.5").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.settings.target_speed, 2.5);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.settings.target_speed, 4.0);
    }

    #[test]
    fn test_load_or_default_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "settings = [unclosed").unwrap();
        assert!(ConfigLoader::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("SKIPRAMP_TEST_ENDPOINT", "http://10.0.0.2:9222");
        }
        let content = "[browser]\nendpoint = \"${SKIPRAMP_TEST_ENDPOINT}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.browser.endpoint, "http://10.0.0.2:9222");
        unsafe {
            std::env::remove_var("SKIPRAMP_TEST_ENDPOINT");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${SKIPRAMP_NONEXISTENT_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }

    #[test]
    fn test_default_path() {
        let path = ConfigLoader::default_path();
        assert!(path.ends_with(".skipramp/config.toml"));
    }
}
