//! Server configuration loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `STROKE_API_HOST` | `0.0.0.0` |
//! | `STROKE_API_PORT` | `8000` |
//! | `STROKE_MODEL_PATH` | `Health_Stroke_Pred/stroke_xgb_deploy.json` |
//! | `STROKE_API_KEY` | unset (no auth) |
//! | `STROKE_RATE_LIMIT` | unset (no limit), requests per minute per client |
//! | `STROKE_CORS_ORIGINS` | unset (permissive), comma-separated |
//! | `STROKE_TRUST_PROXY` | `false`; when true, rate limiting keys on `X-Forwarded-For` / `X-Real-IP` |

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "Health_Stroke_Pred/stroke_xgb_deploy.json";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub api_key: Option<String>,
    pub rate_limit: Option<u32>,
    pub cors_origins: Option<Vec<String>>,
    /// Only set behind a reverse proxy that overwrites forwarding headers.
    pub trust_proxy: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            api_key: None,
            rate_limit: None,
            cors_origins: None,
            trust_proxy: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match var("STROKE_API_PORT") {
            Some(raw) => parse_number(&raw)
                .filter(|&p: &u16| p != 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "STROKE_API_PORT",
                    expected: "a port number (1-65535)",
                    value: raw,
                })?,
            None => defaults.port,
        };

        let rate_limit = match var("STROKE_RATE_LIMIT") {
            Some(raw) => Some(
                parse_number(&raw)
                    .filter(|&n: &u32| n > 0)
                    .ok_or(ConfigError::InvalidValue {
                        var: "STROKE_RATE_LIMIT",
                        expected: "a positive integer",
                        value: raw,
                    })?,
            ),
            None => None,
        };

        let cors_origins = var("STROKE_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        });

        let trust_proxy = match var("STROKE_TRUST_PROXY") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                var: "STROKE_TRUST_PROXY",
                expected: "true or false",
                value: raw,
            })?,
            None => defaults.trust_proxy,
        };

        Ok(Self {
            host: var("STROKE_API_HOST").unwrap_or(defaults.host),
            port,
            model_path: var("STROKE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            api_key: var("STROKE_API_KEY"),
            rate_limit,
            cors_origins,
            trust_proxy,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
