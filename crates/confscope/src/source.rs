// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Configuration sources on disk and change detection.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[cfg(test)]
#[path = "./source_test.rs"]
mod source_test;

const ISO_8601_MINUTES: &str = "%Y-%m-%dT%H:%M%z";

/// Format of a configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// File extensions tried, in order, when locating a source.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Yaml => &["yaml", "yml"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Identifies the source backing a named configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SourceKey {
    pub name: String,
    pub format: Format,
}

impl SourceKey {
    pub fn new(name: impl Into<String>, format: Format) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.format)
    }
}

/// Receives notifications about changed configuration sources.
pub trait SourceListener: Send + Sync {
    fn configuration_source_updated(&self, key: &SourceKey);
}

/// A directory of `<name>.<ext>` configuration files.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the source for `name`, preferring JSON over YAML.
    pub fn locate(&self, name: &str) -> Result<SourceKey> {
        for format in [Format::Json, Format::Yaml] {
            if self.existing_path(name, format).is_some() {
                return Ok(SourceKey::new(name, format));
            }
        }
        Err(Error::SourceNotFound(name.to_string()))
    }

    /// Path of the file backing `key`.
    pub fn path(&self, key: &SourceKey) -> Result<PathBuf> {
        self.existing_path(&key.name, key.format)
            .ok_or_else(|| Error::SourceNotFound(key.name.clone()))
    }

    fn existing_path(&self, name: &str, format: Format) -> Option<PathBuf> {
        format
            .extensions()
            .iter()
            .map(|ext| self.root.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
    }

    pub fn read(&self, key: &SourceKey) -> Result<String> {
        self.read_with_fingerprint(key).map(|(content, _)| content)
    }

    /// Read the source once, returning its text and the fingerprint of
    /// exactly those bytes.
    pub fn read_with_fingerprint(&self, key: &SourceKey) -> Result<(String, Fingerprint)> {
        let path = self.path(key)?;
        let bytes = self.read_bytes(&path)?;
        let fingerprint = Fingerprint::of(&bytes, &path);
        let content = String::from_utf8(bytes).map_err(|e| Error::ReadFailed {
            path,
            error: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        Ok((content, fingerprint))
    }

    /// Content hash and modification time of the source.
    pub fn fingerprint(&self, key: &SourceKey) -> Result<Fingerprint> {
        let path = self.path(key)?;
        let bytes = self.read_bytes(&path)?;
        Ok(Fingerprint::of(&bytes, &path))
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|error| Error::ReadFailed {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Names of every configuration in the directory, sorted.
    pub fn list(&self) -> Result<Vec<SourceKey>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(|error| Error::ReadFailed {
            path: self.root.clone(),
            error,
        })? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let format = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(Format::from_extension);
            let name = path.file_stem().and_then(|s| s.to_str());
            if let (Some(format), Some(name)) = (format, name) {
                keys.push(SourceKey::new(name, format));
            }
        }
        keys.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(keys)
    }
}

/// Identity of a source's content at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub sha256: String,
    pub modified: DateTime<Utc>,
}

impl Fingerprint {
    fn of(content: &[u8], path: &Path) -> Self {
        use sha2::{Digest, Sha256};

        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .and_then(|d| DateTime::from_timestamp(d.as_secs() as i64, d.subsec_nanos()))
            .unwrap_or_else(Utc::now);
        Self {
            sha256: format!("{:x}", Sha256::digest(content)),
            modified,
        }
    }

    /// Modification time as `yyyy-MM-ddTHH:mm+zzzz`.
    pub fn modified_iso8601(&self) -> String {
        self.modified.format(ISO_8601_MINUTES).to_string()
    }
}

/// Tracks watched sources and notifies listeners when they change.
pub struct SourceRegistry {
    source: FileSource,
    watched: Mutex<HashMap<SourceKey, Option<Fingerprint>>>,
    listeners: RwLock<Vec<Arc<dyn SourceListener>>>,
}

impl SourceRegistry {
    pub fn new(source: FileSource) -> Self {
        Self {
            source,
            watched: Mutex::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn SourceListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Start watching `key`, remembering its current fingerprint.
    pub fn watch(&self, key: SourceKey) {
        let fingerprint = self.source.fingerprint(&key).ok();
        self.track(key, fingerprint);
    }

    /// Start watching `key` as of `fingerprint`, typically the one taken
    /// when the content now in the cache was read. Any later change to the
    /// file is reported by the next [`SourceRegistry::poll`].
    pub fn watch_with(&self, key: SourceKey, fingerprint: Fingerprint) {
        self.track(key, Some(fingerprint));
    }

    fn track(&self, key: SourceKey, fingerprint: Option<Fingerprint>) {
        tracing::debug!(source = %key, "watching configuration source");
        self.watched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, fingerprint);
    }

    pub fn is_watched(&self, key: &SourceKey) -> bool {
        self.watched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Watched sources with their last known fingerprint.
    pub fn watched(&self) -> Vec<(SourceKey, Option<Fingerprint>)> {
        let watched = self.watched.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = watched
            .iter()
            .map(|(key, fp)| (key.clone(), fp.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        entries
    }

    /// Re-fingerprint every watched source and notify listeners about the
    /// ones that changed or disappeared.
    pub fn poll(&self) -> Vec<SourceKey> {
        let mut changed = Vec::new();
        {
            let mut watched = self.watched.lock().unwrap_or_else(PoisonError::into_inner);
            for (key, last) in watched.iter_mut() {
                let current = self.source.fingerprint(key).ok();
                let differs = match (&*last, &current) {
                    (Some(old), Some(new)) => old.sha256 != new.sha256,
                    (None, None) => false,
                    _ => true,
                };
                if differs {
                    *last = current;
                    changed.push(key.clone());
                }
            }
        }

        if !changed.is_empty() {
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for key in &changed {
                tracing::info!(source = %key, "configuration source changed");
                for listener in &listeners {
                    listener.configuration_source_updated(key);
                }
            }
        }
        changed
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
