use anyhow::{Context, Result};

use crate::inference_client::DEFAULT_MODEL_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Base URL of the managed auth provider (e.g. `https://<project>.supabase.co`).
    pub auth_url: String,
    pub auth_api_key: String,
    pub inference_api_token: String,
    pub inference_model_url: String,
    /// Reject CSV rows whose cell count differs from the header's. `false` pads
    /// short rows with empty cells instead of rejecting them.
    pub ingest_strict_columns: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            auth_url: require_env("AUTH_URL")?
                .trim_end_matches('/')
                .to_string(),
            auth_api_key: require_env("AUTH_API_KEY")?,
            inference_api_token: require_env("INFERENCE_API_TOKEN")?,
            inference_model_url: std::env::var("INFERENCE_MODEL_URL")
                .unwrap_or_else(|_| DEFAULT_MODEL_URL.to_string()),
            ingest_strict_columns: parse_bool(
                "INGEST_STRICT_COLUMNS",
                std::env::var("INGEST_STRICT_COLUMNS").ok().as_deref(),
                true,
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_bool(key: &str, raw: Option<&str>, default: bool) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            "" => Ok(default),
            other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_default_when_unset() {
        assert!(parse_bool("X", None, true).unwrap());
        assert!(!parse_bool("X", None, false).unwrap());
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("X", Some("TRUE"), false).unwrap());
        assert!(parse_bool("X", Some(" yes "), false).unwrap());
        assert!(!parse_bool("X", Some("0"), true).unwrap());
        assert!(!parse_bool("X", Some("off"), true).unwrap());
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        let err = parse_bool("INGEST_STRICT_COLUMNS", Some("maybe"), true).unwrap_err();
        assert!(err.to_string().contains("INGEST_STRICT_COLUMNS"));
    }

    #[test]
    fn test_strict_columns_off_pads_short_rows() {
        use crate::ingest::coordinator::parse_candidates;
        use crate::ingest::validator::ColumnPolicy;

        let strict = parse_bool("INGEST_STRICT_COLUMNS", Some("false"), true).unwrap();
        let policy = ColumnPolicy::from_strict_flag(strict);
        assert_eq!(policy, ColumnPolicy::Lenient);

        let report = parse_candidates("name,phone,city\nA,1", policy);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].city, None);
    }
}
