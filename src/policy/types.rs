//! Wire types for the compliance policy service

use serde::{Deserialize, Serialize};

/// Schema discriminator for macOS compliance policies
pub const DEFAULT_POLICY_ODATA_TYPE: &str = "#microsoft.graph.macOSCompliancePolicy";

/// The subset of a compliance policy this tool reads
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompliancePolicy {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub os_minimum_version: Option<String>,
}

/// PATCH body that sets the minimum OS version
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyUpdate {
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    pub os_minimum_version: String,
}

impl PolicyUpdate {
    pub fn new(odata_type: &str, os_minimum_version: &str) -> Self {
        Self {
            odata_type: odata_type.to_string(),
            os_minimum_version: os_minimum_version.to_string(),
        }
    }
}
