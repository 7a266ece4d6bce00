//! Feature Registry (C1) — a process-wide, initialized-at-startup mapping
//! from `feature_name` to [`FeatureDefinition`].
//!
//! Read-only after initialization: there is no coordination point in the
//! hot path because nothing can be registered once serving begins.

use crate::error::{Result, RuntimeError};
use feature_store_core::FeatureDefinition;
use std::collections::HashMap;
use tracing::info;

/// Key a definition is indexed under: `(name, version)`. Version `0` is
/// never a storage key — it is resolved to the highest concrete version
/// registered for that name at lookup time.
type VersionedKey = (String, u32);

#[derive(Default)]
pub struct FeatureRegistry {
    definitions: HashMap<VersionedKey, FeatureDefinition>,
    latest_version: HashMap<String, u32>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Permitted only during initialization: this
    /// type is not meant to be mutated once handed to a [`FeatureStore`]
    /// (enforced by convention, not the type system, matching the teacher's
    /// registry which is likewise a plain builder-then-freeze struct).
    ///
    /// [`FeatureStore`]: https://docs.rs/feature-store-sdk
    pub fn register(&mut self, defn: FeatureDefinition) -> Result<()> {
        let key = (defn.name.clone(), defn.version);
        if self.definitions.contains_key(&key) {
            return Err(RuntimeError::AlreadyRegistered { name: defn.name, version: defn.version });
        }
        let latest = self.latest_version.entry(defn.name.clone()).or_insert(defn.version);
        if defn.version >= *latest {
            *latest = defn.version;
        }
        info!(name = %defn.name, version = defn.version, ttl_class = %defn.ttl_class, "feature registered");
        self.definitions.insert(key, defn);
        Ok(())
    }

    /// `version = 0` resolves to the highest version registered for `name`.
    pub fn lookup(&self, name: &str, version: u32) -> Result<&FeatureDefinition> {
        let resolved = if version == 0 {
            *self.latest_version.get(name).ok_or_else(|| RuntimeError::UnknownFeature(name.to_string()))?
        } else {
            version
        };
        self.definitions
            .get(&(name.to_string(), resolved))
            .ok_or_else(|| RuntimeError::UnknownFeature(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
