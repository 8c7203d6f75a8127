//! Access-token handling with secure memory.
//!
//! Uses the `secrecy` crate so tokens never leak through Debug output.
//! Credential storage and renewal policy belong to the caller; this
//! module only covers the single stateless exchange needed to turn a
//! long-lived refresh token into a usable access token.

use secrecy::{ExposeSecret, SecretBox};
use serde::Deserialize;
use std::fmt;

use crate::error::{GscError, Result};

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// An OAuth access token for the webmasters scope.
pub struct AccessToken(SecretBox<str>);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the token for use in a request header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Read the token from `GSC_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let value = std::env::var("GSC_ACCESS_TOKEN")
            .map_err(|_| GscError::Config("GSC_ACCESS_TOKEN not set".into()))?;
        Ok(Self::new(value))
    }
}

impl Clone for AccessToken {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Credentials for the `refresh_token` grant.
pub struct OauthCredentials {
    client_id: String,
    client_secret: SecretBox<str>,
    refresh_token: SecretBox<str>,
    token_uri: String,
}

impl OauthCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretBox::new(Box::from(client_secret.into().as_str())),
            refresh_token: SecretBox::new(Box::from(refresh_token.into().as_str())),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
        }
    }

    /// Override the token endpoint (for tests and proxies).
    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.token_uri = uri.into();
        self
    }

    /// Read `GSC_CLIENT_ID`, `GSC_CLIENT_SECRET`, and `GSC_REFRESH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| GscError::Config(format!("{name} not set")))
        };
        Ok(Self::new(
            var("GSC_CLIENT_ID")?,
            var("GSC_CLIENT_SECRET")?,
            var("GSC_REFRESH_TOKEN")?,
        ))
    }

    /// Exchange the refresh token for a fresh access token.
    pub async fn refresh(&self, http: &reqwest::Client) -> Result<AccessToken> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("refresh_token", self.refresh_token.expose_secret()),
            ("grant_type", "refresh_token"),
        ];

        let resp = http.post(&self.token_uri).form(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GscError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = resp.json().await?;
        tracing::debug!("access token refreshed");
        Ok(AccessToken::new(token.access_token))
    }
}

impl fmt::Debug for OauthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OauthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    expires_in: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_redacted_in_debug_and_display() {
        let token = AccessToken::new("ya29.super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
        assert!(!format!("{token}").contains("super-secret"));
        assert_eq!(token.expose(), "ya29.super-secret");
    }

    #[test]
    fn credentials_redact_secrets() {
        let creds = OauthCredentials::new("client-id", "client-secret", "refresh-token");
        let debug = format!("{creds:?}");
        assert!(debug.contains("client-id"));
        assert!(!debug.contains("client-secret"));
        assert!(!debug.contains("refresh-token"));
    }
}
