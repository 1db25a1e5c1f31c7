//! Policy store trait for reading and writing compliance policies

#[cfg(test)]
use mockall::automock;

use crate::policy::error::PolicyError;
use crate::policy::types::CompliancePolicy;

/// Trait for the compliance policy service
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PolicyStore: Send + Sync {
    /// Fetches the policy with the given id
    async fn get_policy(&self, policy_id: &str) -> Result<CompliancePolicy, PolicyError>;

    /// Sets the policy's minimum OS version
    async fn update_minimum_version(
        &self,
        policy_id: &str,
        os_minimum_version: &str,
    ) -> Result<(), PolicyError>;
}
