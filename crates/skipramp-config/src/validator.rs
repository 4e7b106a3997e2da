//! Configuration validation.

use crate::schema::Config;

/// Rates above this still work but are rarely what the user meant.
const HIGH_TARGET_SPEED: f64 = 16.0;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_settings(config, &mut result);
        Self::validate_keys(config, &mut result);
        Self::validate_browser(config, &mut result);

        result
    }

    fn validate_settings(config: &Config, result: &mut ValidationResult) {
        let settings = &config.settings;

        if !settings.target_speed.is_finite() || settings.target_speed <= 0.0 {
            result.add_error(ValidationError::new(
                "settings.target_speed",
                "target_speed must be a positive number",
            ));
        } else if settings.target_speed > HIGH_TARGET_SPEED {
            result.add_warning(ValidationWarning::new(
                "settings.target_speed",
                format!(
                    "target_speed {} is above {}x, most players clamp or mute at this rate",
                    settings.target_speed, HIGH_TARGET_SPEED
                ),
            ));
        }

        if !settings.ad_grace_delay_seconds.is_finite() || settings.ad_grace_delay_seconds < 0.0 {
            result.add_error(ValidationError::new(
                "settings.ad_grace_delay_seconds",
                "ad_grace_delay_seconds must be zero or more",
            ));
        }

        if settings.allowed_sites.is_empty() {
            result.add_warning(ValidationWarning::new(
                "settings.allowed_sites",
                "allowed_sites is empty, speed control and key commands are disabled everywhere",
            ));
        }

        for (i, site) in settings.allowed_sites.iter().enumerate() {
            if site.trim().trim_start_matches('.').is_empty() {
                result.add_error(ValidationError::new(
                    format!("settings.allowed_sites[{}]", i),
                    "site entry cannot be empty",
                ));
            } else if site.contains("://") || site.contains('/') {
                result.add_error(ValidationError::new(
                    format!("settings.allowed_sites[{}]", i),
                    format!("'{}' must be a bare hostname, not a URL", site),
                ));
            }
        }
    }

    fn validate_keys(config: &Config, result: &mut ValidationResult) {
        let keys = config.keys.all();
        for (i, key) in keys.iter().enumerate() {
            if key.is_empty() {
                result.add_error(ValidationError::new("keys", "key binding cannot be empty"));
                continue;
            }
            if keys[..i].iter().any(|k| k.eq_ignore_ascii_case(key)) {
                result.add_error(ValidationError::new(
                    "keys",
                    format!("key '{}' is bound to more than one command", key),
                ));
            }
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let endpoint = &config.browser.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            result.add_error(ValidationError::new(
                "browser.endpoint",
                "endpoint must start with http:// or https://",
            ));
        }

        if config.browser.scan_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "browser.scan_interval_ms",
                "scan_interval_ms must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
