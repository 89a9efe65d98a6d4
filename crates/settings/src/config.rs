//! Configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{default_settings_path, Result, SettingsError};

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Bridge connection settings
    #[serde(default)]
    pub bridge: BridgeSettings,

    /// Shard transfer tuning
    #[serde(default)]
    pub transfer: TransferSettings,

    /// Farmer shard-server settings (only relevant when running as a farmer)
    #[serde(default)]
    pub farmer: FarmerSettings,

    /// Custom settings file path (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bridge: BridgeSettings::default(),
            transfer: TransferSettings::default(),
            farmer: FarmerSettings::default(),
            config_path: None,
        }
    }
}

impl Settings {
    /// Load settings from the default path, or create defaults
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&default_settings_path())
    }

    /// Load settings from a specific path, or create defaults
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.config_path = Some(path.clone());
            info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            let mut settings = Self::default();
            settings.config_path = Some(path.clone());
            Ok(settings)
        }
    }

    /// Save settings to the configured path
    pub fn save(&self) -> Result<()> {
        let path = self.config_path.clone().unwrap_or_else(default_settings_path);
        self.save_to(&path)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Bridge connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Base URL of the bridge API
    #[serde(default = "default_bridge_url")]
    pub base_url: String,

    /// Account email used for HTTP Basic authentication, if not signing
    /// requests with a keypair
    #[serde(default)]
    pub account_email: Option<String>,

    /// Path to the signing keypair file used to authenticate requests
    #[serde(default)]
    pub keyfile: Option<String>,
}

fn default_bridge_url() -> String {
    "https://api.shardnet.example".to_string()
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            base_url: default_bridge_url(),
            account_email: None,
            keyfile: None,
        }
    }
}

/// Shard transfer tuning knobs (§4.7, §5)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Concurrent shard transfers per upload/download
    #[serde(default = "default_transfer_concurrency")]
    pub transfer_concurrency: usize,

    /// Retries against one farmer before blacklisting it and
    /// requesting a fresh pointer
    #[serde(default = "default_transfer_retries")]
    pub transfer_retries: u32,

    /// Delay between retry attempts, in milliseconds
    #[serde(default = "default_retry_throttle_ms")]
    pub retry_throttle_ms: u64,

    /// Number of pointers resolved per sliding-window download request
    #[serde(default = "default_pointer_window")]
    pub pointer_window: u32,

    /// Audit challenges generated per shard
    #[serde(default = "default_audit_count")]
    pub audit_count: usize,

    /// Maximum farmer offers accepted per published contract
    #[serde(default = "default_offer_max")]
    pub offer_max: usize,

    /// How long a blacklisted farmer stays excluded, in seconds
    #[serde(default = "default_blacklist_ttl_secs")]
    pub blacklist_ttl_secs: u64,
}

fn default_transfer_concurrency() -> usize {
    3
}
fn default_transfer_retries() -> u32 {
    3
}
fn default_retry_throttle_ms() -> u64 {
    500
}
fn default_pointer_window() -> u32 {
    6
}
fn default_audit_count() -> usize {
    12
}
fn default_offer_max() -> usize {
    12
}
fn default_blacklist_ttl_secs() -> u64 {
    24 * 60 * 60
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            transfer_concurrency: default_transfer_concurrency(),
            transfer_retries: default_transfer_retries(),
            retry_throttle_ms: default_retry_throttle_ms(),
            pointer_window: default_pointer_window(),
            audit_count: default_audit_count(),
            offer_max: default_offer_max(),
            blacklist_ttl_secs: default_blacklist_ttl_secs(),
        }
    }
}

/// Farmer shard-server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerSettings {
    /// Listen address for the shard server
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Free space to keep unallocated below the reported capacity, in bytes
    #[serde(default = "default_free_space_padding")]
    pub free_space_padding_bytes: u64,

    /// Interval between expired-token reaper sweeps, in seconds
    #[serde(default = "default_reaper_interval_secs")]
    pub reaper_interval_secs: u64,

    /// Local path where consigned shards are stored
    #[serde(default)]
    pub storage_dir: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:4000".to_string()
}

fn default_free_space_padding() -> u64 {
    256 * 1024 * 1024
}

fn default_reaper_interval_secs() -> u64 {
    60
}

impl Default for FarmerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            free_space_padding_bytes: default_free_space_padding(),
            reaper_interval_secs: default_reaper_interval_secs(),
            storage_dir: None,
        }
    }
}
