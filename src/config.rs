//! Per-session compilation options.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::reporter::DEFAULT_MAX_ERRORS;

pub const WERROR_VAR: &str = "MODSCRIPT_WERROR";
pub const MAX_ERRORS_VAR: &str = "MODSCRIPT_MAX_ERRORS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid session config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{variable} must be {expected}, found `{value}`")]
    InvalidVar {
        variable: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Report warnings as errors.
    pub werror: bool,
    /// Compiling a dependency rather than the user's own sources; warnings
    /// are not reported.
    pub dependency_compile: bool,
    /// Errors beyond this many are counted but not kept.
    pub max_errors: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            werror: false,
            dependency_compile: false,
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Applies `MODSCRIPT_WERROR` and `MODSCRIPT_MAX_ERRORS` over the
    /// defaults, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(WERROR_VAR) {
            config.werror = match value.trim() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        variable: WERROR_VAR,
                        expected: "a boolean",
                        value: value.clone(),
                    });
                }
            };
        }
        if let Some(value) = lookup(MAX_ERRORS_VAR) {
            config.max_errors = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidVar {
                    variable: MAX_ERRORS_VAR,
                    expected: "a non-negative integer",
                    value: value.clone(),
                })?;
        }
        Ok(config)
    }

    pub fn for_dependency(self) -> Self {
        Self {
            dependency_compile: true,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert!(!config.werror);
        assert!(!config.dependency_compile);
        assert_eq!(config.max_errors, 50);
        assert_eq!(SessionConfig::from_lookup(vars(&[])).unwrap(), config);
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = SessionConfig::from_json(r#"{ "werror": true }"#).unwrap();
        assert!(config.werror);
        assert_eq!(config.max_errors, DEFAULT_MAX_ERRORS);

        assert!(matches!(
            SessionConfig::from_json(r#"{ "max_errors": -1 }"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{ "colour": true }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = SessionConfig::from_lookup(vars(&[
            ("MODSCRIPT_WERROR", "yes"),
            ("MODSCRIPT_MAX_ERRORS", " 3 "),
        ]))
        .unwrap();
        assert!(config.werror);
        assert_eq!(config.max_errors, 3);
    }

    #[test]
    fn bad_environment_values_are_errors() {
        let error = SessionConfig::from_lookup(vars(&[("MODSCRIPT_MAX_ERRORS", "lots")]))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "MODSCRIPT_MAX_ERRORS must be a non-negative integer, found `lots`"
        );
        assert!(SessionConfig::from_lookup(vars(&[("MODSCRIPT_WERROR", "maybe")])).is_err());
    }

    #[test]
    fn dependency_config_keeps_other_settings() {
        let config = SessionConfig {
            werror: true,
            ..SessionConfig::default()
        }
        .for_dependency();
        assert!(config.dependency_compile);
        assert!(config.werror);
    }
}
