//! Profile Registry
//!
//! Explicit name → strategy table built once from configuration and shared
//! by the API layer. There is no ambient global lookup.

use crate::config::ComputeConfig;
use crate::domain::ports::NodeLifecycleStrategyRef;
use crate::error::{Error, Result};
use crate::providers::{ProviderFactory, ProviderKind};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// One registered profile
#[derive(Clone)]
pub struct RegisteredProfile {
    pub name: String,
    pub provider: ProviderKind,
    pub strategy: NodeLifecycleStrategyRef,
}

impl fmt::Debug for RegisteredProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredProfile")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

/// Profiles by name
#[derive(Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, RegisteredProfile>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a strategy for every configured profile
    pub async fn from_config(config: &ComputeConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = Self::new();
        for profile in &config.profiles {
            let strategy = ProviderFactory::create(profile).await?;
            registry.insert(profile.name.clone(), profile.provider, strategy)?;
        }

        info!("Profile registry ready with {} profile(s)", registry.len());
        Ok(registry)
    }

    /// Register a strategy under a new name
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        provider: ProviderKind,
        strategy: NodeLifecycleStrategyRef,
    ) -> Result<()> {
        let name = name.into();
        if self.profiles.contains_key(&name) {
            return Err(Error::Configuration(format!(
                "profile {} is already registered",
                name
            )));
        }

        self.profiles.insert(
            name.clone(),
            RegisteredProfile {
                name,
                provider,
                strategy,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&RegisteredProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| Error::UnknownProfile(name.to_string()))
    }

    /// Strategy of a profile
    pub fn strategy(&self, name: &str) -> Result<NodeLifecycleStrategyRef> {
        self.get(name).map(|p| p.strategy.clone())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_str())
    }

    pub fn profiles(&self) -> impl Iterator<Item = &RegisteredProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
