// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Loading configurations from disk into a repository.
//!
//! The loader is the only place that reacts to a repository miss: it
//! parses the source again, installs the artefact and resolves includes.
//! Reloads of one name are serialized so that concurrent misses parse the
//! source once.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::artefact::Artefact;
use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::parser::{ParsedConfiguration, parser_for};
use crate::repository::ConfigurationRepository;
use crate::settings::Settings;
use crate::source::{FileSource, SourceKey, SourceListener, SourceRegistry};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./loader_test.rs"]
mod loader_test;

/// Default limit for nested includes.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

pub struct Loader {
    repository: Arc<ConfigurationRepository>,
    source: FileSource,
    registry: Arc<SourceRegistry>,
    default_environment: Environment,
    max_include_depth: usize,
    gates: DashMap<String, Arc<Mutex<()>>>,
}

impl Loader {
    /// Create a loader for `source` that keeps `repository` up to date.
    ///
    /// The repository is subscribed to source changes, so a changed file
    /// evicts its artefact on the next [`Loader::poll`].
    pub fn new(repository: Arc<ConfigurationRepository>, source: FileSource) -> Self {
        let registry = Arc::new(SourceRegistry::new(source.clone()));
        let listener: Arc<dyn SourceListener> = repository.clone();
        registry.add_listener(listener);
        Self {
            repository,
            source,
            registry,
            default_environment: Environment::Global,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            gates: DashMap::new(),
        }
    }

    pub fn from_settings(
        repository: Arc<ConfigurationRepository>,
        settings: &Settings,
    ) -> Result<Self> {
        let source = FileSource::new(settings.resolved_source_dir()?);
        Ok(Self::new(repository, source)
            .with_default_environment(settings.default_environment())
            .with_max_include_depth(settings.max_include_depth))
    }

    pub fn with_default_environment(mut self, env: Environment) -> Self {
        self.default_environment = env;
        self
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn repository(&self) -> &Arc<ConfigurationRepository> {
        &self.repository
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    pub fn default_environment(&self) -> &Environment {
        &self.default_environment
    }

    /// The cached artefact for `name`, loading it on a miss.
    pub fn artefact(&self, name: &str) -> Result<Arc<Artefact>> {
        if let Some(artefact) = self.repository.artefact(name) {
            return Ok(artefact);
        }
        let gate = self.gate(name);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished loading while we waited.
        if let Some(artefact) = self.repository.artefact(name) {
            return Ok(artefact);
        }
        self.load_locked(name)
    }

    /// Parse the source of `name` again and replace the cached artefact.
    pub fn reload(&self, name: &str) -> Result<Arc<Artefact>> {
        let gate = self.gate(name);
        let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_locked(name)
    }

    /// Resolve `name` in `env` (the default environment when `None`),
    /// with the attributes of its includes spliced in.
    pub fn configuration(&self, name: &str, env: Option<&Environment>) -> Result<Configuration> {
        let env = env.unwrap_or(&self.default_environment);
        let mut chain = Vec::new();
        self.compose(name, env, &mut chain)
    }

    /// Check watched sources; changed ones are evicted from the repository.
    pub fn poll(&self) -> Vec<SourceKey> {
        self.registry.poll()
    }

    fn gate(&self, name: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.gates.entry(name.to_string()).or_default().value())
    }

    fn load_locked(&self, name: &str) -> Result<Arc<Artefact>> {
        let key = self.source.locate(name)?;
        let (content, fingerprint) = self.source.read_with_fingerprint(&key)?;
        let parsed = parser_for(key.format).parse(name, &content)?;
        self.registry.watch_with(key.clone(), fingerprint);

        let artefact = self.install(&parsed)?;
        tracing::info!(
            source = %key,
            attributes = artefact.attribute_count(),
            "loaded configuration"
        );
        Ok(artefact)
    }

    /// Populate a standalone artefact, then publish it in one step.
    fn install(&self, parsed: &ParsedConfiguration) -> Result<Arc<Artefact>> {
        let artefact = Arc::new(Artefact::new(parsed.name.as_str()));
        parsed.apply_to(&artefact);
        loop {
            match self.repository.insert_artefact(Arc::clone(&artefact)) {
                Ok(()) => return Ok(artefact),
                Err(Error::DuplicateArtefact(_)) => {}
                Err(err) => return Err(err),
            }
            match self.repository.update_artefact(Arc::clone(&artefact)) {
                Ok(()) => return Ok(artefact),
                // Evicted between the two calls; insert again.
                Err(Error::UnknownArtefact(_)) => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn resolve(&self, name: &str, env: &Environment) -> Result<Configuration> {
        match self.repository.configuration(name, Some(env)) {
            Err(Error::UnknownArtefact(_)) => {
                tracing::debug!(configuration = name, "cache miss, loading");
                self.artefact(name)?;
                self.repository.configuration(name, Some(env))
            }
            other => other,
        }
    }

    fn compose(
        &self,
        name: &str,
        env: &Environment,
        chain: &mut Vec<String>,
    ) -> Result<Configuration> {
        if chain.iter().any(|seen| seen == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(Error::CircularInclude(cycle));
        }
        if chain.len() >= self.max_include_depth {
            return Err(Error::IncludeDepthExceeded {
                name: name.to_string(),
                limit: self.max_include_depth,
            });
        }

        chain.push(name.to_string());
        let mut config = self.resolve(name, env)?;
        for include in config.includes().to_vec() {
            let included = self.compose(&include.name, env, chain)?;
            config.splice(&included);
        }
        chain.pop();
        Ok(config)
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("source", &self.source)
            .field("default_environment", &self.default_environment)
            .field("max_include_depth", &self.max_include_depth)
            .finish_non_exhaustive()
    }
}
