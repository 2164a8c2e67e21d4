//! Engine settings, loadable from TOML.
//!
//! ```toml
//! [operation_limits]
//! depth = 5
//!
//! [execution]
//! timeout = "30s"
//! mutations = true
//! ```

use std::time::Duration;

/// Depth bound applied when the configuration doesn't set one.
pub const DEFAULT_MAX_DEPTH: u16 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid engine configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Graph operation limit settings
    pub operation_limits: OperationLimitsConfig,
    /// Settings applying to the execution of every request
    pub execution: ExecutionConfig,
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationLimitsConfig {
    /// Limits the deepest nesting of selection sets in an operation,
    /// including fields in fragments.
    pub depth: Option<u16>,
}

impl Default for OperationLimitsConfig {
    fn default() -> Self {
        Self {
            depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Timeout for a whole request, parsing included.
    #[serde(deserialize_with = "duration_str::deserialize_option_duration")]
    pub timeout: Option<Duration>,
    /// Whether the schema exposes its mutation root.
    pub mutations: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            mutations: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();

        insta::assert_debug_snapshot!(&config, @r###"
        EngineConfig {
            operation_limits: OperationLimitsConfig {
                depth: Some(
                    5,
                ),
            },
            execution: ExecutionConfig {
                timeout: None,
                mutations: true,
            },
        }
        "###);
    }

    #[test]
    fn full() {
        let input = indoc! {r#"
            [operation_limits]
            depth = 3

            [execution]
            timeout = "1s"
            mutations = false
        "#};

        let config = EngineConfig::from_toml_str(input).unwrap();

        let expected = EngineConfig {
            operation_limits: OperationLimitsConfig { depth: Some(3) },
            execution: ExecutionConfig {
                timeout: Some(Duration::from_secs(1)),
                mutations: false,
            },
        };
        assert_eq!(expected, config);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let input = indoc! {r#"
            [operation_limits]
            max_depth = 3
        "#};

        let error = EngineConfig::from_toml_str(input).unwrap_err().to_string();
        assert!(error.starts_with("Invalid engine configuration: "), "{error}");
        assert!(error.contains("unknown field `max_depth`"), "{error}");
    }

    #[test]
    fn depth_must_fit_in_u16() {
        let input = indoc! {r#"
            [operation_limits]
            depth = 100000
        "#};

        let error = EngineConfig::from_toml_str(input).unwrap_err().to_string();
        assert!(error.contains("expected u16"), "{error}");
    }
}
