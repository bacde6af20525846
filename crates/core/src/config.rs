//! Emitter configuration.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EmitterError, EmitterResult};

/// Listener limit applied to new emitters.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Environment variable holding the listener limit.
pub const MAX_LISTENERS_VAR: &str = "HERALD_MAX_LISTENERS";

/// Environment variable holding the overflow policy (`warn` or `reject`).
pub const ON_EXCEED_VAR: &str = "HERALD_ON_EXCEED";

/// What happens when a registration pushes an event past its listener limit.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Log a leak warning and register anyway.
    #[default]
    Warn,
    /// Refuse the registration with [`EmitterError::MaxListenersExceeded`].
    Reject,
}

impl FromStr for OverflowPolicy {
    type Err = EmitterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "reject" | "throw" => Ok(Self::Reject),
            other => Err(EmitterError::config(format!(
                "unknown overflow policy {other:?} (expected \"warn\" or \"reject\")"
            ))),
        }
    }
}

impl core::fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Warn => f.write_str("warn"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Emitter configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Per-event listener limit used for leak detection.
    pub max_listeners: usize,
    /// Behaviour once the limit is exceeded.
    pub overflow: OverflowPolicy,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_listeners: DEFAULT_MAX_LISTENERS,
            overflow: OverflowPolicy::Warn,
        }
    }
}

impl EmitterConfig {
    pub fn with_max_listeners(mut self, max: usize) -> Self {
        self.max_listeners = max;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Read `HERALD_MAX_LISTENERS` / `HERALD_ON_EXCEED` from the process
    /// environment. Unset variables keep their defaults.
    pub fn from_env() -> EmitterResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EmitterConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EmitterResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_LISTENERS_VAR) {
            config.max_listeners = raw
                .trim()
                .parse()
                .map_err(|_| EmitterError::invalid_max_listeners(&raw))?;
        }

        if let Some(raw) = lookup(ON_EXCEED_VAR) {
            config.overflow = raw.parse()?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EmitterConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EmitterConfig::default());
        assert_eq!(config.max_listeners, 10);
        assert_eq!(config.overflow, OverflowPolicy::Warn);
    }

    #[test]
    fn reads_both_variables() {
        let config = EmitterConfig::from_lookup(lookup(&[
            (MAX_LISTENERS_VAR, " 25 "),
            (ON_EXCEED_VAR, "Reject"),
        ]))
        .unwrap();
        assert_eq!(config.max_listeners, 25);
        assert_eq!(config.overflow, OverflowPolicy::Reject);
    }

    #[test]
    fn negative_limit_is_a_range_error() {
        let err = EmitterConfig::from_lookup(lookup(&[(MAX_LISTENERS_VAR, "-3")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        let err = EmitterConfig::from_lookup(lookup(&[(ON_EXCEED_VAR, "explode")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn throw_is_accepted_as_reject() {
        assert_eq!("throw".parse::<OverflowPolicy>().unwrap(), OverflowPolicy::Reject);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: EmitterConfig = serde_json::from_str(r#"{"overflow":"reject"}"#).unwrap();
        assert_eq!(config.max_listeners, DEFAULT_MAX_LISTENERS);
        assert_eq!(config.overflow, OverflowPolicy::Reject);
    }
}
