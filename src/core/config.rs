//! Environment-driven configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::features::personas::DEFAULT_MODEL;

/// Default location of the persisted persona document
pub const DEFAULT_STORE_PATH: &str = "personas.json";
/// Default upper bound on a single generation request
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 45;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Alternate Gemini endpoint root (proxy or regional gateway)
    pub gemini_api_base: Option<String>,
    pub persona_store_path: PathBuf,
    /// Register commands for this guild only (instant updates while developing)
    pub discord_guild_id: Option<u64>,
    pub generation_timeout: Duration,
    pub log_level: String,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Call after `dotenvy::dotenv()` so a local `.env` file is honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| anyhow!("{key} must be set (environment or .env file)"))
        };

        let discord_token = required("DISCORD_BOT_TOKEN")?;
        let gemini_api_key = required("GEMINI_API_KEY")?;

        let discord_guild_id = match get("DISCORD_GUILD_ID") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|e| anyhow!("DISCORD_GUILD_ID must be a numeric id: {e}"))?,
            ),
            None => None,
        };

        let timeout_secs = match get("GENERATION_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    anyhow!("GENERATION_TIMEOUT_SECS must be a positive integer, got '{raw}'")
                })?,
            None => DEFAULT_GENERATION_TIMEOUT_SECS,
        };

        Ok(Self {
            discord_token,
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: get("GEMINI_API_BASE"),
            persona_store_path: get("PERSONA_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            discord_guild_id,
            generation_timeout: Duration::from_secs(timeout_secs),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("GEMINI_API_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.discord_token, "token");
        assert_eq!(config.gemini_api_key, "key");
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.gemini_api_base, None);
        assert_eq!(config.persona_store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(config.discord_guild_id, None);
        assert_eq!(config.generation_timeout, Duration::from_secs(45));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_discord_token_names_variable() {
        let err = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "key")])).unwrap_err();
        assert!(err.to_string().contains("DISCORD_BOT_TOKEN"));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let err = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("GEMINI_API_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_MODEL", "gemini-2.5-flash"),
            ("GEMINI_API_BASE", "https://gemini-proxy.internal/v1beta/models"),
            ("PERSONA_STORE_PATH", "/data/personas.json"),
            ("DISCORD_GUILD_ID", "123456789"),
            ("GENERATION_TIMEOUT_SECS", "10"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(
            config.gemini_api_base.as_deref(),
            Some("https://gemini-proxy.internal/v1beta/models")
        );
        assert_eq!(config.persona_store_path, PathBuf::from("/data/personas.json"));
        assert_eq!(config.discord_guild_id, Some(123456789));
        assert_eq!(config.generation_timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_guild_id_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("GEMINI_API_KEY", "key"),
            ("DISCORD_GUILD_ID", "general"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DISCORD_GUILD_ID"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("GEMINI_API_KEY", "key"),
            ("GENERATION_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GENERATION_TIMEOUT_SECS"));
    }
}
