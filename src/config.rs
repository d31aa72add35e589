//! Configuration management for the parse server
//!
//! Everything comes from the environment (optionally seeded from a `.env`
//! file by `main`). Unset variables take their defaults; set but unparsable
//! ones are an error.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::parser::{ParseConfig, PoolConfig};

/// Default upload limit: 256 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub parser: ParseConfig,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        let parser = ParseConfig::default();
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8888,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            pool: PoolConfig {
                capacity: parser.max_processors,
                ..PoolConfig::default()
            },
            parser,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let var = Vars { lookup: &lookup };

        let parser = ParseConfig {
            max_processors: var.parse("PARSER_MAX_PROCESSORS", defaults.parser.max_processors)?,
            footer_margin: var.parse("PARSER_FOOTER_MARGIN", defaults.parser.footer_margin)?,
            header_margin: var.parse("PARSER_HEADER_MARGIN", defaults.parser.header_margin)?,
            no_image_text: var.flag("PARSER_NO_IMAGE_TEXT", defaults.parser.no_image_text)?,
            tolerance: var.parse("PARSER_TOLERANCE", defaults.parser.tolerance)?,
        };
        if parser.max_processors == 0 {
            return Err(ConfigError::Invalid {
                key: "PARSER_MAX_PROCESSORS",
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        let pool = PoolConfig {
            capacity: parser.max_processors,
            acquire_timeout: Duration::from_secs(var.parse(
                "PARSER_ACQUIRE_TIMEOUT_SECS",
                defaults.pool.acquire_timeout.as_secs(),
            )?),
            unit_timeout: Duration::from_secs(var.parse(
                "PARSER_UNIT_TIMEOUT_SECS",
                defaults.pool.unit_timeout.as_secs(),
            )?),
        };

        Ok(Config {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or(defaults.server.host),
                port: var.parse("PORT", defaults.server.port)?,
                max_upload_bytes: var.parse("MAX_UPLOAD_BYTES", defaults.server.max_upload_bytes)?,
            },
            parser,
            pool,
        })
    }
}

/// Lenient boolean: `1/0`, `true/false`, `yes/no`, `on/off`
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

struct Vars<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value: raw,
            }),
        }
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match (self.lookup)(key) {
            None => Ok(default),
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: "expected a boolean".to_string(),
            }),
        }
    }
}
