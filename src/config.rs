//! Server configuration from the environment.
//!
//! HOST (default 0.0.0.0), PORT (8080), REQUIRED_VALIDATIONS (1), EVENT_BUS_CAPACITY (256).
//! Invalid values fall back to the default with a warning.

use crate::engine::EngineSettings;
use std::str::FromStr;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub engine: EngineSettings,
    pub event_bus_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            engine: EngineSettings::default(),
            event_bus_capacity: 256,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let host = lookup("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.host);
        let port = parse_or(&lookup, "PORT", defaults.port, |_| true);
        let required_validations = parse_or(
            &lookup,
            "REQUIRED_VALIDATIONS",
            defaults.engine.required_validations,
            |n| *n >= 1,
        );
        let event_bus_capacity =
            parse_or(&lookup, "EVENT_BUS_CAPACITY", defaults.event_bus_capacity, |n| *n >= 1);
        Self {
            host,
            port,
            engine: EngineSettings {
                required_validations,
            },
            event_bus_capacity,
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            log::warn!("Ignoring invalid {key}={raw:?}, using {default}");
            default
        }
    }
}
