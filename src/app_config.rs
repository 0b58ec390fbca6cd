use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ai_service::DEFAULT_API_URL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    // --- Server ---
    pub port: String,

    // --- Completion service ---
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub history_window: usize,
    pub request_timeout: Duration,

    // --- Persistence ---
    pub data_file: PathBuf,

    // --- Mock replies ---
    pub mock_seed: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // dotenv belongs HERE, nowhere else
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env::var("PORT").unwrap_or_else(|_| "3001".into()),

            api_url: env::var("AURA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            api_key: env::var("AURA_API_KEY")
                .or_else(|_| env::var("GROQ_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: env::var("AURA_MODEL")
                .or_else(|_| env::var("GROQ_MODEL"))
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".into()),
            max_tokens: parse_var("AURA_MAX_TOKENS", 500)?,
            temperature: parse_var("AURA_TEMPERATURE", 0.7)?,
            history_window: parse_var("AURA_HISTORY_WINDOW", 10)?,
            request_timeout: Duration::from_secs(parse_var("AURA_REQUEST_TIMEOUT_SECS", 30)?),

            data_file: env::var("AURA_DATA_FILE")
                .unwrap_or_else(|_| "aura_conversations.json".into())
                .into(),

            mock_seed: env::var("AURA_MOCK_SEED")
                .ok()
                .map(|raw| raw.parse().context("AURA_MOCK_SEED must be an integer"))
                .transpose()?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value: u32 = parse_var("AURA_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
