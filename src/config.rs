use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::policy::auth::{Credentials, DEFAULT_AUTHORITY_URL};
use crate::policy::graph::DEFAULT_GRAPH_BASE_URL;
use crate::policy::types::DEFAULT_POLICY_ODATA_TYPE;
use crate::release::error::SelectionError;
use crate::release::types::SelectionPolicy;

// =============================================================================
// Network-related constants
// =============================================================================

/// Timeout for each HTTP request (30 seconds)
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// User agent sent to the release feed and the policy service
pub const USER_AGENT: &str = concat!("os-floor-sync/", env!("CARGO_PKG_VERSION"));

/// Default number of versions behind the newest to target
pub const DEFAULT_VERSIONS_BELOW: u32 = 2;

/// Environment variable holding a pre-issued bearer token
pub const ACCESS_TOKEN_ENV: &str = "ACCESS_TOKEN";

/// Environment variable holding the OAuth2 client secret
pub const CLIENT_SECRET_ENV: &str = "CLIENT_SECRET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Sync configuration, as read from the JSON config file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    pub policy_id: Option<String>,
    pub versions_below: u32,
    pub use_minor_versions: bool,
    /// Major version to pin to; 0 disables pinning
    pub pin_to_major_version: u64,
    pub dry_run: bool,
    pub feed_url: Option<String>,
    pub graph_base_url: String,
    pub authority_url: String,
    pub policy_odata_type: String,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            policy_id: None,
            versions_below: DEFAULT_VERSIONS_BELOW,
            use_minor_versions: false,
            pin_to_major_version: 0,
            dry_run: false,
            feed_url: None,
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            authority_url: DEFAULT_AUTHORITY_URL.to_string(),
            policy_odata_type: DEFAULT_POLICY_ODATA_TYPE.to_string(),
            tenant_id: None,
            client_id: None,
        }
    }
}

/// Command-line and environment overrides applied on top of the config file
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Compliance policy id to keep in sync
    #[arg(long, env = "POLICY_ID", global = true)]
    pub policy_id: Option<String>,

    /// How many versions behind the newest to target (1-10)
    #[arg(long, env = "VERSIONS_BELOW", global = true)]
    pub versions_below: Option<u32>,

    /// Group by major.minor instead of major (`--use-minor-versions=false` to disable)
    #[arg(
        long,
        env = "USE_MINOR_VERSIONS",
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub use_minor_versions: Option<bool>,

    /// Restrict selection to one major version (0 disables)
    #[arg(long, env = "PIN_TO_MAJOR_VERSION", global = true)]
    pub pin_to_major_version: Option<u64>,

    /// Compute and report, but never write the policy (`--dry-run=false` to disable)
    #[arg(
        long,
        env = "DRY_RUN",
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub dry_run: Option<bool>,

    /// URL of the JSON release feed
    #[arg(long, env = "FEED_URL", global = true)]
    pub feed_url: Option<String>,

    #[arg(long, env = "GRAPH_BASE_URL", global = true, hide = true)]
    pub graph_base_url: Option<String>,

    #[arg(long, env = "AUTHORITY_URL", global = true, hide = true)]
    pub authority_url: Option<String>,

    /// Directory tenant used for the client-credentials grant
    #[arg(long, env = "TENANT_ID", global = true)]
    pub tenant_id: Option<String>,

    /// Application id used for the client-credentials grant
    #[arg(long, env = "CLIENT_ID", global = true)]
    pub client_id: Option<String>,
}

impl SyncConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    debug!("No config file at {:?}, using defaults", default_path);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides; unset overrides keep the file's value
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(policy_id) = overrides.policy_id {
            self.policy_id = Some(policy_id);
        }
        if let Some(versions_below) = overrides.versions_below {
            self.versions_below = versions_below;
        }
        if let Some(use_minor_versions) = overrides.use_minor_versions {
            self.use_minor_versions = use_minor_versions;
        }
        if let Some(pin) = overrides.pin_to_major_version {
            self.pin_to_major_version = pin;
        }
        if let Some(dry_run) = overrides.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(feed_url) = overrides.feed_url {
            self.feed_url = Some(feed_url);
        }
        if let Some(graph_base_url) = overrides.graph_base_url {
            self.graph_base_url = graph_base_url;
        }
        if let Some(authority_url) = overrides.authority_url {
            self.authority_url = authority_url;
        }
        if let Some(tenant_id) = overrides.tenant_id {
            self.tenant_id = Some(tenant_id);
        }
        if let Some(client_id) = overrides.client_id {
            self.client_id = Some(client_id);
        }
        self
    }

    /// Resolve and validate the selection policy
    pub fn selection_policy(&self) -> Result<SelectionPolicy, ConfigError> {
        let pin = Some(self.pin_to_major_version).filter(|major| *major > 0);
        Ok(SelectionPolicy::new(
            self.versions_below,
            self.use_minor_versions,
            pin,
        )?)
    }

    pub fn feed_url(&self) -> Result<&str, ConfigError> {
        self.feed_url.as_deref().ok_or(ConfigError::Missing("feedUrl"))
    }

    pub fn policy_id(&self) -> Result<&str, ConfigError> {
        self.policy_id.as_deref().ok_or(ConfigError::Missing("policyId"))
    }

    /// Pick credentials from the process environment
    pub fn credentials_from_env(&self) -> Result<Credentials, ConfigError> {
        self.credentials(
            std::env::var(ACCESS_TOKEN_ENV).ok(),
            std::env::var(CLIENT_SECRET_ENV).ok(),
        )
    }

    /// A pre-issued token wins over the client-credentials grant
    pub fn credentials(
        &self,
        access_token: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Credentials, ConfigError> {
        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            return Ok(Credentials::AccessToken(token));
        }

        let client_secret = client_secret
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(CLIENT_SECRET_ENV))?;
        let tenant_id = self.tenant_id.clone().ok_or(ConfigError::Missing("tenantId"))?;
        let client_id = self.client_id.clone().ok_or(ConfigError::Missing("clientId"))?;

        Ok(Credentials::ClientSecret {
            tenant_id,
            client_id,
            client_secret,
        })
    }
}

/// Returns the path to the config directory for os-floor-sync.
/// Uses $XDG_CONFIG_HOME/os-floor-sync if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/os-floor-sync,
/// or ./os-floor-sync if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("os-floor-sync")
}
