// src/config/mod.rs

//! Environment-driven configuration. Every tunable has a sane default so the
//! crate runs with no .env at all (providers simply report unavailable).

use once_cell::sync::Lazy;
use std::str::FromStr;

pub static CONFIG: Lazy<KindredConfig> = Lazy::new(KindredConfig::from_env);

#[derive(Debug, Clone)]
pub struct KindredConfig {
    // ── Database
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Analyzer coordination
    pub analyzer_timeout_ms: u64,

    // ── Memory
    pub retrieve_top_k: usize,
    pub history_limit: usize,
    /// Retention in days per expiring tier. Personal/permanent never expire.
    pub retention_session_days: i64,
    pub retention_sub_temporary_days: i64,
    pub retention_temporary_days: i64,

    // ── Conversation flow
    pub flow_max_history: usize,

    // ── Response generation
    pub cache_ttl_secs: u64,
    pub local_model_url: String,
    pub local_model: String,
    pub local_fallback_model: String,
    pub local_timeout_secs: u64,
    pub local_fallback_timeout_secs: u64,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub anthropic_timeout_secs: u64,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_timeout_secs: u64,
    pub max_response_tokens: u32,

    // ── Logging
    pub log_level: String,
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            // Tolerate trailing comments and whitespace in .env values
            let clean = val.split('#').next().unwrap_or("").trim();
            clean.parse::<T>().unwrap_or(default)
        }
        Err(_) => default,
    }
}

impl KindredConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            database_url: env_var_or("DATABASE_URL", "sqlite:./kindred.db?mode=rwc".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),

            analyzer_timeout_ms: env_var_or("KINDRED_ANALYZER_TIMEOUT_MS", 1500),

            retrieve_top_k: env_var_or("KINDRED_RETRIEVE_TOP_K", 5),
            history_limit: env_var_or("KINDRED_HISTORY_LIMIT", 3),
            retention_session_days: env_var_or("KINDRED_RETENTION_SESSION_DAYS", 1),
            retention_sub_temporary_days: env_var_or("KINDRED_RETENTION_SUB_TEMP_DAYS", 7),
            retention_temporary_days: env_var_or("KINDRED_RETENTION_TEMP_DAYS", 30),

            flow_max_history: env_var_or("KINDRED_FLOW_MAX_HISTORY", 10),

            cache_ttl_secs: env_var_or("KINDRED_CACHE_TTL_SECS", 3600),
            local_model_url: env_var_or("KINDRED_LOCAL_URL", "http://localhost:11434".to_string()),
            local_model: env_var_or("KINDRED_LOCAL_MODEL", "llama3".to_string()),
            local_fallback_model: env_var_or("KINDRED_LOCAL_FALLBACK_MODEL", "phi3".to_string()),
            local_timeout_secs: env_var_or("KINDRED_LOCAL_TIMEOUT_SECS", 5),
            local_fallback_timeout_secs: env_var_or("KINDRED_LOCAL_FALLBACK_TIMEOUT_SECS", 10),
            anthropic_api_key: env_var_or("ANTHROPIC_API_KEY", String::new()),
            anthropic_model: env_var_or(
                "KINDRED_ANTHROPIC_MODEL",
                "claude-3-haiku-20240307".to_string(),
            ),
            anthropic_timeout_secs: env_var_or("KINDRED_ANTHROPIC_TIMEOUT_SECS", 8),
            openai_api_key: env_var_or("OPENAI_API_KEY", String::new()),
            openai_model: env_var_or("KINDRED_OPENAI_MODEL", "gpt-4o-mini".to_string()),
            openai_timeout_secs: env_var_or("KINDRED_OPENAI_TIMEOUT_SECS", 8),
            max_response_tokens: env_var_or("KINDRED_MAX_RESPONSE_TOKENS", 1000),

            log_level: env_var_or("KINDRED_LOG_LEVEL", "info".to_string()),
        }
    }
}
