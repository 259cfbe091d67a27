// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Resolved, read-only configuration snapshots.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::environment::Environment;
use crate::source::SourceKey;

/// An artefact resolved for one environment.
///
/// Owns copies of everything it exposes; later changes to the artefact it
/// was built from do not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    name: String,
    #[serde(skip)]
    environment: Environment,
    attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    includes: Vec<SourceKey>,
}

impl Configuration {
    pub(crate) fn new(
        name: impl Into<String>,
        environment: Environment,
        attributes: BTreeMap<String, String>,
        includes: Vec<SourceKey>,
    ) -> Self {
        Self {
            name: name.into(),
            environment,
            attributes,
            includes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The environment this snapshot was resolved for.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn includes(&self) -> &[SourceKey] {
        &self.includes
    }

    /// Add attributes of an included configuration that this one does not
    /// already resolve.
    pub(crate) fn splice(&mut self, included: &Configuration) {
        for (name, value) in &included.attributes {
            self.attributes
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }
}
