use anyhow::{Context, Result};

const DEFAULT_AI_MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Workers AI credentials. AI food parsing is enabled only when both are set.
    pub cloudflare_account_id: Option<String>,
    pub cloudflare_api_token: Option<String>,
    pub cloudflare_ai_model: String,
    pub ai_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cloudflare_account_id: optional_env("CLOUDFLARE_ACCOUNT_ID"),
            cloudflare_api_token: optional_env("CLOUDFLARE_API_TOKEN"),
            cloudflare_ai_model: optional_env("CLOUDFLARE_AI_MODEL")
                .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            ai_timeout_secs: std::env::var("AI_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse::<u64>()
                .context("AI_TIMEOUT_SECS must be a whole number of seconds")?,
        })
    }

    /// Returns `(account_id, api_token)` when both provider secrets are configured.
    pub fn ai_credentials(&self) -> Option<(&str, &str)> {
        match (&self.cloudflare_account_id, &self.cloudflare_api_token) {
            (Some(account), Some(token)) => Some((account.as_str(), token.as_str())),
            _ => None,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Blank values count as unset so an empty `.env` entry does not enable a feature.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(account: Option<&str>, token: Option<&str>) -> Config {
        Config {
            database_url: "postgres://localhost/fitlog".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            cloudflare_account_id: account.map(String::from),
            cloudflare_api_token: token.map(String::from),
            cloudflare_ai_model: DEFAULT_AI_MODEL.to_string(),
            ai_timeout_secs: 15,
        }
    }

    #[test]
    fn test_ai_credentials_require_both_secrets() {
        assert!(config(Some("acct"), None).ai_credentials().is_none());
        assert!(config(None, Some("tok")).ai_credentials().is_none());
        assert_eq!(
            config(Some("acct"), Some("tok")).ai_credentials(),
            Some(("acct", "tok"))
        );
    }
}
