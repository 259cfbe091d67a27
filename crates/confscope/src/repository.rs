// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! The in-memory cache of artefacts.
//!
//! The repository holds every artefact that has been loaded, keyed by
//! name. It listens for source changes and drops the cached artefact so
//! that the next lookup misses and the loader parses the source again.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::artefact::Artefact;
use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::source::{SourceKey, SourceListener};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./repository_test.rs"]
mod repository_test;

/// Cache of artefacts by name.
#[derive(Debug, Default)]
pub struct ConfigurationRepository {
    artefacts: DashMap<String, Arc<Artefact>>,
}

impl ConfigurationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert and return a new empty artefact for `name`.
    pub fn create_artefact(&self, name: &str) -> Result<Arc<Artefact>> {
        match self.artefacts.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::DuplicateArtefact(name.to_string())),
            Entry::Vacant(entry) => {
                let artefact = Arc::new(Artefact::new(name));
                entry.insert(Arc::clone(&artefact));
                tracing::debug!(artefact = name, "created artefact");
                Ok(artefact)
            }
        }
    }

    /// Publish an already populated artefact under its name.
    ///
    /// Readers see either no entry or the whole artefact.
    pub fn insert_artefact(&self, artefact: impl Into<Arc<Artefact>>) -> Result<()> {
        let artefact = artefact.into();
        match self.artefacts.entry(artefact.name().to_string()) {
            Entry::Occupied(entry) => Err(Error::DuplicateArtefact(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(artefact = artefact.name(), "inserted artefact");
                entry.insert(artefact);
                Ok(())
            }
        }
    }

    /// Replace the stored artefact of the same name.
    pub fn update_artefact(&self, artefact: impl Into<Arc<Artefact>>) -> Result<()> {
        let artefact = artefact.into();
        match self.artefacts.entry(artefact.name().to_string()) {
            Entry::Vacant(entry) => Err(Error::UnknownArtefact(entry.into_key())),
            Entry::Occupied(mut entry) => {
                tracing::debug!(artefact = artefact.name(), "replacing artefact");
                entry.insert(artefact);
                Ok(())
            }
        }
    }

    pub fn artefact(&self, name: &str) -> Option<Arc<Artefact>> {
        self.artefacts.get(name).map(|a| Arc::clone(a.value()))
    }

    pub fn has_configuration(&self, name: &str) -> bool {
        self.artefacts.contains_key(name)
    }

    /// Names of all cached artefacts, sorted.
    pub fn artefact_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.artefacts.iter().map(|a| a.key().clone()).collect();
        names.sort();
        names
    }

    /// Resolve every attribute of `name` in `env` (global when `None`).
    ///
    /// Attributes without a value anywhere on the fallback chain are left
    /// out of the snapshot.
    pub fn configuration(&self, name: &str, env: Option<&Environment>) -> Result<Configuration> {
        let env = env.cloned().unwrap_or_default();
        let artefact = self
            .artefact(name)
            .ok_or_else(|| Error::UnknownArtefact(name.to_string()))?;

        let includes = artefact.includes();
        let mut attributes = BTreeMap::new();
        for attribute_name in artefact.attribute_names() {
            let attribute = artefact.attribute(&attribute_name)?;
            if let Some(value) = attribute.value_in(&env) {
                attributes.insert(attribute_name, value.raw().to_string());
            }
        }
        Ok(Configuration::new(artefact.name(), env, attributes, includes))
    }

    /// Drop everything.
    pub fn reset_all(&self) {
        self.artefacts.clear();
    }
}

impl SourceListener for ConfigurationRepository {
    fn configuration_source_updated(&self, key: &SourceKey) {
        if self.artefacts.remove(&key.name).is_some() {
            tracing::debug!(artefact = %key.name, "evicted artefact after source change");
        }
    }
}
