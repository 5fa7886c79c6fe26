use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::config::helpers::{
    EnvSource, ProcessEnv, optional_env, parse_bool_env, parse_number_env, parse_string_env,
};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Advisory-text model access.
#[derive(Debug, Clone)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    pub endpoint: Url,
    pub api_key: Option<SecretString>,
    pub summary_model: String,
    pub strategy_model: String,
    pub summary_temperature: f32,
    pub strategy_temperature: f32,
    pub timeout: Duration,
}

/// CSV export layout. Import always sniffs the delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterchangeConfig {
    pub delimiter: u8,
    pub write_bom: bool,
}

impl Default for InterchangeConfig {
    fn default() -> Self {
        Self {
            delimiter: b';',
            write_bom: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PracticeConfig {
    pub advisory: AdvisoryConfig,
    pub interchange: InterchangeConfig,
}

fn validate_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: "ADVISORY_ENDPOINT".to_string(),
        message: format!("'{raw}' is not a valid URL: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            key: "ADVISORY_ENDPOINT".to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn validate_temperature(key: &str, value: f32) -> Result<f32, ConfigError> {
    if !(0.0..=2.0).contains(&value) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("temperature must be between 0 and 2, got {value}"),
        });
    }
    Ok(value)
}

/// Only separators that import can detect are accepted, so an export can
/// always be read back. `tab` names the tab character.
fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw {
        ";" => Ok(b';'),
        "," => Ok(b','),
        "|" => Ok(b'|'),
        "\t" | "tab" => Ok(b'\t'),
        _ => Err(ConfigError::InvalidValue {
            key: "INTERCHANGE_DELIMITER".to_string(),
            message: format!("delimiter must be one of ';', ',', '|' or tab, got '{raw}'"),
        }),
    }
}

impl AdvisoryConfig {
    pub(crate) fn resolve_with(
        settings: &Settings,
        env: &impl EnvSource,
    ) -> Result<Self, ConfigError> {
        let advisory = &settings.advisory;
        let endpoint = {
            let raw = parse_string_env(env, "ADVISORY_ENDPOINT", advisory.endpoint.clone())?;
            validate_endpoint(&raw)?
        };
        let api_key = optional_env(env, "ADVISORY_API_KEY")?
            .or(optional_env(env, "GEMINI_API_KEY")?)
            .map(SecretString::from);
        let timeout_secs =
            parse_number_env(env, "ADVISORY_TIMEOUT_SECS", advisory.timeout_secs)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ADVISORY_TIMEOUT_SECS".to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }

        Ok(Self {
            enabled: parse_bool_env(env, "ADVISORY_ENABLED", advisory.enabled)?,
            endpoint,
            api_key,
            summary_model: parse_string_env(
                env,
                "ADVISORY_SUMMARY_MODEL",
                advisory.summary_model.clone(),
            )?,
            strategy_model: parse_string_env(
                env,
                "ADVISORY_STRATEGY_MODEL",
                advisory.strategy_model.clone(),
            )?,
            summary_temperature: validate_temperature(
                "ADVISORY_SUMMARY_TEMPERATURE",
                parse_number_env(
                    env,
                    "ADVISORY_SUMMARY_TEMPERATURE",
                    advisory.summary_temperature,
                )?,
            )?,
            strategy_temperature: validate_temperature(
                "ADVISORY_STRATEGY_TEMPERATURE",
                parse_number_env(
                    env,
                    "ADVISORY_STRATEGY_TEMPERATURE",
                    advisory.strategy_temperature,
                )?,
            )?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl InterchangeConfig {
    pub(crate) fn resolve_with(
        settings: &Settings,
        env: &impl EnvSource,
    ) -> Result<Self, ConfigError> {
        // Not trimmed: a literal tab must survive.
        let delimiter = match env.var("INTERCHANGE_DELIMITER")? {
            Some(raw) if !raw.is_empty() => parse_delimiter(&raw)?,
            _ => parse_delimiter(&settings.interchange.delimiter)?,
        };
        Ok(Self {
            delimiter,
            write_bom: parse_bool_env(
                env,
                "INTERCHANGE_WRITE_BOM",
                settings.interchange.write_bom,
            )?,
        })
    }
}

impl PracticeConfig {
    /// Settings overridden by the process environment.
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        Self::resolve_with(settings, &ProcessEnv)
    }

    pub(crate) fn resolve_with(
        settings: &Settings,
        env: &impl EnvSource,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            advisory: AdvisoryConfig::resolve_with(settings, env)?,
            interchange: InterchangeConfig::resolve_with(settings, env)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::ExposeSecret;

    use super::{InterchangeConfig, PracticeConfig};
    use crate::config::helpers::MapEnv;
    use crate::error::ConfigError;
    use crate::settings::Settings;

    fn resolve(settings: &Settings, env: &MapEnv) -> Result<PracticeConfig, ConfigError> {
        PracticeConfig::resolve_with(settings, env)
    }

    #[test]
    fn resolve_uses_defaults() {
        let config = resolve(&Settings::default(), &MapEnv::default()).expect("config");

        assert!(config.advisory.enabled);
        assert_eq!(
            config.advisory.endpoint.as_str(),
            "https://generativelanguage.googleapis.com/"
        );
        assert!(config.advisory.api_key.is_none());
        assert_eq!(config.advisory.summary_temperature, 0.2);
        assert_eq!(config.advisory.strategy_temperature, 0.5);
        assert_eq!(config.advisory.timeout, Duration::from_secs(30));
        assert_eq!(config.interchange, InterchangeConfig::default());
    }

    #[test]
    fn env_overrides_settings() {
        let env = MapEnv::default()
            .with("ADVISORY_ENABLED", "false")
            .with("ADVISORY_TIMEOUT_SECS", "5")
            .with("ADVISORY_SUMMARY_MODEL", " gemini-lite ")
            .with("GEMINI_API_KEY", "k-gemini")
            .with("INTERCHANGE_DELIMITER", "\t")
            .with("INTERCHANGE_WRITE_BOM", "no");
        let config = resolve(&Settings::default(), &env).expect("config");

        assert!(!config.advisory.enabled);
        assert_eq!(config.advisory.timeout, Duration::from_secs(5));
        assert_eq!(config.advisory.summary_model, "gemini-lite");
        assert_eq!(
            config.advisory.api_key.as_ref().map(|k| k.expose_secret()),
            Some("k-gemini")
        );
        assert_eq!(config.interchange.delimiter, b'\t');
        assert!(!config.interchange.write_bom);
    }

    #[test]
    fn advisory_key_wins_over_gemini_key() {
        let env = MapEnv::default()
            .with("ADVISORY_API_KEY", "k-advisory")
            .with("GEMINI_API_KEY", "k-gemini");
        let config = resolve(&Settings::default(), &env).expect("config");
        assert_eq!(
            config.advisory.api_key.as_ref().map(|k| k.expose_secret()),
            Some("k-advisory")
        );
    }

    #[test]
    fn resolve_rejects_bad_endpoint_from_settings() {
        let mut settings = Settings::default();
        settings.advisory.endpoint = "not a url".to_string();

        let err = resolve(&settings, &MapEnv::default()).expect_err("invalid endpoint");
        let ConfigError::InvalidValue { key, .. } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "ADVISORY_ENDPOINT");
    }

    #[test]
    fn validate_endpoint_rejects_non_http_schemes() {
        let err = super::validate_endpoint("ftp://models.example").expect_err("ftp");
        let ConfigError::InvalidValue { message, .. } = err else {
            panic!("expected InvalidValue");
        };
        assert!(message.contains("ftp"), "unexpected message: {message}");
    }

    #[test]
    fn resolve_rejects_out_of_range_temperature() {
        let mut settings = Settings::default();
        settings.advisory.strategy_temperature = 3.5;

        let err = resolve(&settings, &MapEnv::default()).expect_err("temperature");
        let ConfigError::InvalidValue { key, .. } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "ADVISORY_STRATEGY_TEMPERATURE");
    }

    #[test]
    fn resolve_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.advisory.timeout_secs = 0;
        assert!(resolve(&settings, &MapEnv::default()).is_err());
    }

    #[test]
    fn parse_delimiter_accepts_only_detectable_separators() {
        assert_eq!(super::parse_delimiter(",").expect("comma"), b',');
        assert_eq!(super::parse_delimiter(";").expect("semicolon"), b';');
        assert_eq!(super::parse_delimiter("|").expect("pipe"), b'|');
        assert_eq!(super::parse_delimiter("\t").expect("tab"), b'\t');
        assert_eq!(super::parse_delimiter("tab").expect("tab name"), b'\t');
        for raw in [":", "ab", "x", "\"", ""] {
            assert!(super::parse_delimiter(raw).is_err(), "{raw:?} accepted");
        }
    }
}
