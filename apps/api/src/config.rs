use anyhow::{Context, Result};
use serde::Serialize;

/// Placeholder shipped in sample `.env` files. Treated as "not configured".
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";
const EXPECTED_KEY_PREFIX: &str = "sk-";
const MIN_KEY_LENGTH: usize = 40;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
/// Inputs larger than this are rejected by the HTTP layer (10 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Only `PORT` and `MAX_INPUT_BYTES` can fail startup; the API key is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,
    pub port: u16,
    pub rust_log: String,
    pub max_input_bytes: usize,
}

/// Outcome of the credential format check shown on the diagnostics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialCheck {
    pub valid: bool,
    pub message: &'static str,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            openai_api_base: std::env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_input_bytes: match std::env::var("MAX_INPUT_BYTES") {
                Ok(v) => parse_max_input_bytes(&v)?,
                Err(_) => DEFAULT_MAX_INPUT_BYTES,
            },
        })
    }

    /// The API key, if one is present and is not the sample placeholder.
    /// This is the only check that decides remote vs. heuristic analysis.
    pub fn configured_api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .filter(|k| *k != PLACEHOLDER_API_KEY)
    }

    pub fn is_remote_configured(&self) -> bool {
        self.configured_api_key().is_some()
    }

    /// Shape check for the diagnostics surface. Does not gate analysis.
    pub fn credential_check(&self) -> CredentialCheck {
        check_credential(self.openai_api_key.as_deref())
    }

    /// `sk-proj...wxyz` style rendering; never exposes the full key.
    pub fn masked_api_key(&self) -> String {
        match self.openai_api_key.as_deref() {
            None => "Not set".to_string(),
            Some(key) => mask_key(key),
        }
    }
}

fn parse_max_input_bytes(value: &str) -> Result<usize> {
    let bytes = value
        .trim()
        .parse::<usize>()
        .context("MAX_INPUT_BYTES must be a positive integer")?;
    anyhow::ensure!(bytes > 0, "MAX_INPUT_BYTES must be a positive integer");
    Ok(bytes)
}

fn check_credential(key: Option<&str>) -> CredentialCheck {
    let (valid, message) = match key {
        None => (false, "API key not set"),
        Some(PLACEHOLDER_API_KEY) => (false, "Using placeholder key"),
        Some(k) if !k.starts_with(EXPECTED_KEY_PREFIX) => {
            (false, "Invalid format (should start with sk-)")
        }
        Some(k) if k.chars().count() < MIN_KEY_LENGTH => (false, "Key too short"),
        Some(_) => (true, "Format looks valid"),
    };
    CredentialCheck { valid, message }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
pub(crate) fn test_config(api_key: Option<&str>) -> Config {
    Config {
        openai_api_key: api_key.map(str::to_string),
        openai_model: DEFAULT_MODEL.to_string(),
        openai_api_base: DEFAULT_API_BASE.to_string(),
        port: 8080,
        rust_log: "info".to_string(),
        max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
    }
}
