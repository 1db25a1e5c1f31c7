//! Access token acquisition for the policy service

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::policy::error::PolicyError;

/// Default OAuth2 authority
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";

/// Scope requested for app-only Graph access
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// How to obtain a bearer token
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A token issued out of band
    AccessToken(String),
    /// OAuth2 client-credentials grant
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

// Secrets never reach the logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Credentials::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges credentials for a bearer token
pub struct TokenClient {
    client: reqwest::Client,
    authority_url: String,
}

impl TokenClient {
    pub fn new(authority_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            authority_url: authority_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns a bearer token for the given credentials.
    ///
    /// Static tokens are returned as-is without a network round trip.
    pub async fn acquire(&self, credentials: &Credentials) -> Result<String, PolicyError> {
        let (tenant_id, client_id, client_secret) = match credentials {
            Credentials::AccessToken(token) => return Ok(token.clone()),
            Credentials::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => (tenant_id, client_id, client_secret),
        };

        let url = format!("{}/{}/oauth2/v2.0/token", self.authority_url, tenant_id);
        debug!("Requesting access token for client {} from {}", client_id, url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Token endpoint returned status {}", status);
            return Err(PolicyError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse token response: {}", e);
            PolicyError::Auth(e.to_string())
        })?;

        Ok(token.access_token)
    }
}

impl Default for TokenClient {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHORITY_URL)
    }
}
