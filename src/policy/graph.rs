//! Microsoft Graph compliance policy store

use std::time::Duration;

use reqwest::{Response, StatusCode};
use tracing::{debug, warn};

use crate::config::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::policy::error::PolicyError;
use crate::policy::store::PolicyStore;
use crate::policy::types::{CompliancePolicy, DEFAULT_POLICY_ODATA_TYPE, PolicyUpdate};

/// Default base URL for the Graph API
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/beta";

/// Policy store backed by `deviceManagement/deviceCompliancePolicies`
pub struct GraphPolicyStore {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    odata_type: String,
}

impl GraphPolicyStore {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            odata_type: DEFAULT_POLICY_ODATA_TYPE.to_string(),
        }
    }

    /// Overrides the `@odata.type` sent with updates
    pub fn with_odata_type(mut self, odata_type: &str) -> Self {
        self.odata_type = odata_type.to_string();
        self
    }

    fn policy_url(&self, policy_id: &str) -> String {
        format!(
            "{}/deviceManagement/deviceCompliancePolicies/{}",
            self.base_url, policy_id
        )
    }

    /// Map non-success statuses onto policy errors
    async fn check_status(response: Response, policy_id: &str) -> Result<Response, PolicyError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::NOT_FOUND => Err(PolicyError::NotFound(policy_id.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(PolicyError::Unauthorized(format!("{}: {}", status, body)))
            }
            _ => {
                warn!("Policy service returned status {} for {}", status, policy_id);
                Err(PolicyError::InvalidResponse(format!(
                    "Unexpected status: {}: {}",
                    status, body
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl PolicyStore for GraphPolicyStore {
    async fn get_policy(&self, policy_id: &str) -> Result<CompliancePolicy, PolicyError> {
        let url = self.policy_url(policy_id);
        debug!("Fetching compliance policy from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = Self::check_status(response, policy_id).await?;

        response.json().await.map_err(|e| {
            warn!("Failed to parse compliance policy response: {}", e);
            PolicyError::InvalidResponse(e.to_string())
        })
    }

    async fn update_minimum_version(
        &self,
        policy_id: &str,
        os_minimum_version: &str,
    ) -> Result<(), PolicyError> {
        let url = self.policy_url(policy_id);
        let update = PolicyUpdate::new(&self.odata_type, os_minimum_version);
        debug!("Patching {} with osMinimumVersion {}", url, os_minimum_version);

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(&update)
            .send()
            .await?;

        Self::check_status(response, policy_id).await?;

        Ok(())
    }
}
