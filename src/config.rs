use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::auth::TokenVerifier;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Auto-spray trigger threshold in degrees Celsius.
    pub spray_threshold: f64,
    /// Spray log persisted here as a JSON array.
    pub spray_log_path: PathBuf,
    /// Device flag persisted here so a restarted session restores it.
    pub device_state_path: PathBuf,
    /// Record manual toggles to on as `manual` spray events. Off by default:
    /// the spray log is a history of automatic actuations.
    pub log_manual_sprays: bool,
    /// Remote identity-provider verification endpoint. Takes precedence over
    /// `api_token` when both are set.
    pub auth_verify_url: Option<String>,
    /// Shared bearer token for local development.
    pub api_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            spray_threshold: optional("SPRAY_THRESHOLD", "36.0")
                .parse()
                .context("SPRAY_THRESHOLD must be a temperature in °C")?,
            spray_log_path: optional("SPRAY_LOG_PATH", "state/spray_logs.json").into(),
            device_state_path: optional("DEVICE_STATE_PATH", "state/device_status.json").into(),
            log_manual_sprays: optional("LOG_MANUAL_SPRAYS", "false")
                .parse()
                .context("LOG_MANUAL_SPRAYS must be true or false")?,
            auth_verify_url: std::env::var("AUTH_VERIFY_URL").ok(),
            api_token: std::env::var("API_TOKEN").ok(),
        })
    }

    /// Build the token verifier for the configured auth mode. Exactly one of
    /// `AUTH_VERIFY_URL` / `API_TOKEN` has to be present.
    pub fn verifier(&self) -> Result<TokenVerifier> {
        match (&self.auth_verify_url, &self.api_token) {
            (Some(url), _) => Ok(TokenVerifier::remote(url.clone())),
            (None, Some(token)) => Ok(TokenVerifier::static_token(token.clone())),
            (None, None) => anyhow::bail!(
                "no auth configured: set AUTH_VERIFY_URL (identity provider) or API_TOKEN (shared token)"
            ),
        }
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_host: "127.0.0.1".to_owned(),
            server_port: 8080,
            spray_threshold: 36.0,
            spray_log_path: "state/spray_logs.json".into(),
            device_state_path: "state/device_status.json".into(),
            log_manual_sprays: false,
            auth_verify_url: None,
            api_token: None,
        }
    }

    #[test]
    fn verify_url_selects_the_remote_verifier() {
        let config = Config {
            auth_verify_url: Some("https://auth.example/verify".to_owned()),
            api_token: Some("also-set".to_owned()),
            ..base_config()
        };
        assert!(matches!(config.verifier().unwrap(), TokenVerifier::Remote { .. }));
    }

    #[test]
    fn api_token_alone_selects_the_static_verifier() {
        let config = Config {
            api_token: Some("secret".to_owned()),
            ..base_config()
        };
        assert!(matches!(config.verifier().unwrap(), TokenVerifier::Static { .. }));
    }

    #[test]
    fn missing_auth_config_errors() {
        let err = base_config().verifier().unwrap_err();
        assert!(err.to_string().contains("no auth configured"));
    }
}
