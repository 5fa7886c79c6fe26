#[cfg(test)]
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ConfigError;

/// Where configuration overrides come from.
pub(crate) trait EnvSource {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// The process environment.
pub(crate) struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        match std::env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "value is not valid unicode".to_string(),
            }),
        }
    }
}

/// A fixed set of variables, isolated from the process environment.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MapEnv(pub HashMap<String, String>);

#[cfg(test)]
impl MapEnv {
    pub(crate) fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

#[cfg(test)]
impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.0.get(key).cloned())
    }
}

/// Read a variable, treating unset and blank as `None`.
pub(crate) fn optional_env(env: &impl EnvSource, key: &str) -> Result<Option<String>, ConfigError> {
    Ok(env.var(key)?.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_bool_env(
    env: &impl EnvSource,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match optional_env(env, key)? {
        Some(raw) => parse_bool(key, &raw),
        None => Ok(default),
    }
}

pub(crate) fn parse_string_env(
    env: &impl EnvSource,
    key: &str,
    default: String,
) -> Result<String, ConfigError> {
    Ok(optional_env(env, key)?
        .map(|value| value.trim().to_string())
        .unwrap_or(default))
}

pub(crate) fn parse_number_env<T>(
    env: &impl EnvSource,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(env, key)? {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{raw}' is not a valid number: {e}"),
            }),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}
