//! Process configuration read from environment variables.

use std::{path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Overrides Google's endpoint, e.g. for a proxy.
    pub gemini_base_url: Option<String>,
    pub model_timeout: Duration,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub password_hash_rounds: u32,
    pub data_file: PathBuf,
    pub port: u16,
    /// Reject replies whose summary is empty.
    pub strict_summary: bool,
}

/// Load `.env` if present, then read the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from(|name| std::env::var(name).ok())
}

/// Build a [`Config`] from an arbitrary variable lookup.
pub fn load_config_from(
    lookup: impl Fn(&'static str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let get = |name: &'static str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

    Ok(Config {
        gemini_api_key: required("GEMINI_API_KEY")?,
        gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        gemini_base_url: get("GEMINI_BASE_URL"),
        model_timeout: Duration::from_secs(parse_or(
            "MODEL_TIMEOUT_SECS",
            get("MODEL_TIMEOUT_SECS"),
            60,
        )?),
        jwt_secret: required("JWT_SECRET")?,
        token_ttl_secs: parse_or("TOKEN_TTL_SECS", get("TOKEN_TTL_SECS"), 3600)?,
        password_hash_rounds: parse_or(
            "PASSWORD_HASH_ROUNDS",
            get("PASSWORD_HASH_ROUNDS"),
            100_000,
        )?,
        data_file: get("DATA_FILE").map_or_else(|| PathBuf::from("db.json"), PathBuf::from),
        port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
        strict_summary: parse_bool(
            "ASSISTANT_STRICT_SUMMARY",
            get("ASSISTANT_STRICT_SUMMARY"),
        )?,
    })
}

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let lowered = value.as_deref().map(str::to_ascii_lowercase);
    match lowered.as_deref() {
        None | Some("false" | "0" | "no") => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some(_) => Err(ConfigError::Invalid {
            name,
            value: value.unwrap_or_default(),
        }),
    }
}
