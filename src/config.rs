//! Profile Configuration
//!
//! A profile is one configured provider account: which provider drives it,
//! which regions are in scope, suspend behavior, and the initial inventory
//! of the in-process provider client.
//!
//! ```yaml
//! profiles:
//!   - name: aws-prod
//!     provider: aws-ec2
//!     regions: [us-east-1]
//!     suspend:
//!       preserve_state: true
//!     nodes:
//!       - region: us-east-1
//!         id: i-1
//!         name: web-1
//!         state: running
//!         addresses: [10.0.0.1]
//! ```

use crate::domain::handle::{encode_handle, Handle};
use crate::domain::ports::SuspendOptions;
use crate::error::{Error, Result};
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Initial instance known to a provider client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedNode {
    pub region: String,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Provider-native state string (`running`, `On`, `suspended`, ...)
    pub state: String,
    /// Public address first, then private
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// One provider account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub name: String,
    pub provider: ProviderKind,
    /// Regions (EC2), datacenters (GoGrid) or VDCs (vCloud) in scope
    pub regions: Vec<String>,
    #[serde(default)]
    pub suspend: SuspendOptions,
    #[serde(default)]
    pub nodes: Vec<SeedNode>,
}

impl ProfileConfig {
    pub fn new(name: impl Into<String>, provider: ProviderKind, regions: &[&str]) -> Self {
        Self {
            name: name.into(),
            provider,
            regions: regions.iter().map(|r| r.to_string()).collect(),
            suspend: SuspendOptions::default(),
            nodes: Vec::new(),
        }
    }

    pub fn with_node(mut self, region: &str, id: &str, state: &str) -> Self {
        self.nodes.push(SeedNode {
            region: region.into(),
            id: id.into(),
            name: None,
            state: state.into(),
            addresses: Vec::new(),
        });
        self
    }

    /// Check the profile and its seed inventory
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Configuration("profile name must not be empty".into()));
        }
        if self.regions.is_empty() {
            return Err(Error::Configuration(format!(
                "profile {} has no regions",
                self.name
            )));
        }
        let mut seen = BTreeSet::new();
        for node in &self.nodes {
            // Seed ids must survive an encode/decode round trip
            let handle = Handle::new(&node.region, &node.id).map_err(|e| {
                Error::Configuration(format!("profile {}: invalid node: {}", self.name, e))
            })?;
            if !self.regions.contains(&node.region) {
                return Err(Error::Configuration(format!(
                    "profile {}: node {} is in region {} which is not in scope",
                    self.name, node.id, node.region
                )));
            }
            if !seen.insert(handle) {
                return Err(Error::Configuration(format!(
                    "profile {}: duplicate node {}",
                    self.name,
                    encode_handle(&node.region, &node.id)
                )));
            }
        }
        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeConfig {
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

impl ComputeConfig {
    /// Load and validate a YAML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&raw)?;
        info!(
            "Loaded {} profile(s) from {}",
            config.profiles.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate profile name: {}",
                    profile.name
                )));
            }
        }
        Ok(())
    }
}
