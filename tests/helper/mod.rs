//! Shared fixtures for integration tests

#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use serde_json::{Value, json};

use os_floor_sync::config::SyncConfig;
use os_floor_sync::release::types::ReleaseRecord;

pub const POLICY_ID: &str = "policy-1";
pub const POLICY_PATH: &str = "/deviceManagement/deviceCompliancePolicies/policy-1";
pub const FEED_PATH: &str = "/v1/macos.json";

/// Realistic feed with majors 13-16, several minors each, and pre-release noise
pub fn macos_feed() -> Value {
    json!([
        {"version": "16.0 beta 3", "build": "24A5289h", "released": false, "beta": true},
        {"version": "16.0", "build": "24A335", "released": true, "releaseDate": "2024-09-16"},
        {"version": "15.2", "build": "24C101", "released": true, "releaseDate": "2024-12-11"},
        {"version": "15.1.1", "build": "24B91", "released": true, "releaseDate": "2024-11-19"},
        {"version": "15.1", "build": "24B83", "released": true},
        {"version": "15.0.1", "build": "24A348", "released": true},
        {"version": "15.3 RC", "build": "24D60", "released": true, "rc": true},
        {"version": "14.7.2", "build": "23H311", "released": true},
        {"version": "14.7.1", "build": "23H222", "released": true},
        {"version": "14.6", "build": "23G80", "released": true},
        {"version": "13.7.2", "build": "22H313", "released": true},
        {"version": "13.7", "build": "22H123", "released": true},
        {"version": "13.6.9", "build": "22G830", "released": true},
        {"version": "Rapid Security Response (a)", "build": "22F770820d", "released": true}
    ])
}

pub fn feed_records() -> Vec<ReleaseRecord> {
    serde_json::from_value(macos_feed()).unwrap()
}

pub async fn mock_feed(server: &mut ServerGuard, body: Value) -> Mock {
    server
        .mock("GET", FEED_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

pub async fn mock_policy(server: &mut ServerGuard, os_minimum_version: Option<&str>) -> Mock {
    server
        .mock("GET", POLICY_PATH)
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "@odata.type": "#microsoft.graph.macOSCompliancePolicy",
                "id": POLICY_ID,
                "displayName": "macOS baseline",
                "osMinimumVersion": os_minimum_version
            })
            .to_string(),
        )
        .create_async()
        .await
}

/// Config pointing the feed, token and Graph endpoints at the mock server
pub fn config_for(server: &ServerGuard) -> SyncConfig {
    SyncConfig {
        policy_id: Some(POLICY_ID.to_string()),
        feed_url: Some(format!("{}{}", server.url(), FEED_PATH)),
        graph_base_url: server.url(),
        authority_url: server.url(),
        ..SyncConfig::default()
    }
}
