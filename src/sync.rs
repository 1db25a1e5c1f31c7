//! Policy synchronization
//!
//! Fetches the release feed, selects the target minimum version and writes it
//! to the compliance policy when the stored value differs.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SyncConfig};
use crate::policy::auth::{Credentials, TokenClient};
use crate::policy::error::PolicyError;
use crate::policy::graph::GraphPolicyStore;
use crate::policy::store::PolicyStore;
use crate::release::error::{FeedError, SelectionError};
use crate::release::feed::ReleaseFeed;
use crate::release::feeds::HttpReleaseFeed;
use crate::release::normalizer::normalize;
use crate::release::selector::{Selection, select_target};
use crate::release::types::SelectionPolicy;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch release feed: {0}")]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Policy service error: {0}")]
    Policy(#[from] PolicyError),

    /// The policy service failed after the target had been computed
    #[error("Policy service error while applying {}: {source}", .selection.target)]
    Apply {
        previous_version: Option<String>,
        selection: Selection,
        #[source]
        source: PolicyError,
    },
}

impl SyncError {
    /// The computed selection, when the run got that far
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            SyncError::Apply { selection, .. } => Some(selection),
            _ => None,
        }
    }

    /// The policy's stored minimum version, when it was read before failing
    pub fn previous_version(&self) -> Option<&str> {
        match self {
            SyncError::Apply {
                previous_version, ..
            } => previous_version.as_deref(),
            _ => None,
        }
    }
}

/// What happened to the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Stored version already matched the target
    Unchanged,
    /// Policy was written
    Updated,
    /// Policy differs but dry run suppressed the write
    WouldUpdate,
}

/// Result of a completed sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub policy_id: String,
    pub display_name: String,
    pub previous_version: Option<String>,
    pub selection: Selection,
    pub action: SyncAction,
}

impl SyncOutcome {
    pub fn updated(&self) -> bool {
        self.action == SyncAction::Updated
    }
}

/// Returns true when the stored minimum version differs from the target.
///
/// Comparison is exact string equality: "13.7" and "13.7.0" are different.
pub fn needs_update(current: Option<&str>, target: &str) -> bool {
    current != Some(target)
}

/// Fetch the feed and compute the target version for a policy
pub async fn compute_target(
    feed: &dyn ReleaseFeed,
    policy: &SelectionPolicy,
) -> Result<Selection, SyncError> {
    let records = feed.fetch_releases().await?;
    info!("Fetched {} release records", records.len());

    let versions = normalize(&records, policy)?;
    debug!(
        "{} distinct versions after normalization: {:?}",
        versions.len(),
        versions.iter().map(|v| v.full_version()).collect::<Vec<_>>()
    );

    let selection = select_target(&versions, policy.versions_below())?;

    info!(
        "Latest detected version: {} (build {}, released {})",
        selection.latest, selection.latest.build, selection.latest.release_date
    );

    if let Some(history) = selection.insufficient_history {
        warn!(
            "Only {} distinct versions available but versionsBelow is {}; using oldest available version {}",
            history.available, history.requested, selection.target
        );
    }

    info!(
        "Target minimum version: {} ({} below latest)",
        selection.target,
        policy.versions_below()
    );

    Ok(selection)
}

/// Bring one policy's minimum version in line with the release feed
pub async fn sync_policy(
    feed: &dyn ReleaseFeed,
    store: &dyn PolicyStore,
    policy_id: &str,
    selection_policy: &SelectionPolicy,
    dry_run: bool,
) -> Result<SyncOutcome, SyncError> {
    let selection = compute_target(feed, selection_policy).await?;
    let target = selection.target_version();

    let policy = match store.get_policy(policy_id).await {
        Ok(policy) => policy,
        Err(source) => {
            return Err(SyncError::Apply {
                previous_version: None,
                selection,
                source,
            });
        }
    };
    let previous_version = policy.os_minimum_version.clone();
    info!(
        "Policy '{}' ({}) currently requires {}",
        policy.display_name,
        policy_id,
        previous_version.as_deref().unwrap_or("no minimum version")
    );

    let action = if !needs_update(previous_version.as_deref(), &target) {
        info!("Policy already requires {}; no update needed", target);
        SyncAction::Unchanged
    } else if dry_run {
        info!(
            "Dry run: would update policy {} from {} to {}",
            policy_id,
            previous_version.as_deref().unwrap_or("none"),
            target
        );
        SyncAction::WouldUpdate
    } else {
        if let Err(source) = store.update_minimum_version(policy_id, &target).await {
            return Err(SyncError::Apply {
                previous_version,
                selection,
                source,
            });
        }
        info!(
            "Updated policy {} from {} to {}",
            policy_id,
            previous_version.as_deref().unwrap_or("none"),
            target
        );
        SyncAction::Updated
    };

    Ok(SyncOutcome {
        policy_id: policy_id.to_string(),
        display_name: policy.display_name,
        previous_version,
        selection,
        action,
    })
}

/// Compute the target from a fully-resolved config, without touching any policy
pub async fn run_target(config: &SyncConfig) -> Result<Selection, SyncError> {
    let selection_policy = config.selection_policy()?;
    let feed = HttpReleaseFeed::new(config.feed_url()?);

    compute_target(&feed, &selection_policy).await
}

/// Run a full sync against the configured feed and Graph endpoint
pub async fn run(config: &SyncConfig, credentials: &Credentials) -> Result<SyncOutcome, SyncError> {
    let selection_policy = config.selection_policy()?;
    let policy_id = config.policy_id()?;
    let feed = HttpReleaseFeed::new(config.feed_url()?);

    let access_token = TokenClient::new(&config.authority_url)
        .acquire(credentials)
        .await?;
    let store = GraphPolicyStore::new(&config.graph_base_url, &access_token)
        .with_odata_type(&config.policy_odata_type);

    if config.dry_run {
        info!("Dry run enabled; the policy will not be modified");
    }

    sync_policy(&feed, &store, policy_id, &selection_policy, config.dry_run).await
}
