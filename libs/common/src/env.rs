//! Environment variable helpers shared by every `from_env` constructor
//!
//! Configuration is read once at startup by the binary and handed to each
//! component explicitly. These helpers only take care of the lookup and
//! parsing so that every config struct reports problems the same way.

use std::str::FromStr;

use crate::error::ConfigError;

/// Read a required variable. Empty values count as missing.
pub fn required(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name.to_string())),
    }
}

/// Read an optional variable, falling back to `default` when unset
pub fn or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read and parse an optional variable.
///
/// Unlike a silent `unwrap_or`, a value that is present but does not parse
/// is reported as an error so typos in deployment manifests are caught at
/// startup.
pub fn parse_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::Invalid {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}
