// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! The internal representation of one named configuration.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;

use crate::attribute::Attribute;
use crate::environment::Environment;
use crate::source::SourceKey;
use crate::value::Value;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./artefact_test.rs"]
mod artefact_test;

/// Every attribute of a configuration, in every environment.
///
/// Besides the attributes themselves an artefact keeps a per-environment
/// copy of the raw values for whole-artefact dumps, and the includes
/// declared by its values in declaration order.
#[derive(Debug)]
pub struct Artefact {
    name: String,
    attributes: DashMap<String, Arc<Attribute>>,
    content: DashMap<Environment, HashMap<String, String>>,
    includes: RwLock<Vec<SourceKey>>,
}

impl Artefact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: DashMap::new(),
            content: DashMap::new(),
            includes: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record `value` for `attribute_name` in `env`, creating the attribute
    /// on first write. A missing environment means global.
    pub fn add_attribute_value(
        &self,
        attribute_name: &str,
        value: Value,
        env: Option<&Environment>,
    ) {
        let env = env.cloned().unwrap_or_default();
        tracing::debug!(
            artefact = %self.name,
            attribute = attribute_name,
            env = %env,
            "adding attribute value"
        );

        let attribute = self
            .attributes
            .entry(attribute_name.to_string())
            .or_insert_with(|| Arc::new(Attribute::new(attribute_name)))
            .value()
            .clone();
        attribute.add_value(value.clone(), &env);

        self.content
            .entry(env)
            .or_default()
            .insert(attribute_name.to_string(), value.raw().to_string());

        if let Some(key) = value.include_key() {
            self.includes
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push(key.clone());
        }
    }

    /// The attribute with the given name.
    pub fn attribute(&self, attribute_name: &str) -> Result<Arc<Attribute>> {
        self.attributes
            .get(attribute_name)
            .map(|a| Arc::clone(a.value()))
            .ok_or_else(|| Error::AttributeNotFound {
                artefact: self.name.clone(),
                attribute: attribute_name.to_string(),
            })
    }

    /// Names of the contained attributes at the time of the call.
    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|a| a.key().clone()).collect()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Raw values grouped by the environment they were written in.
    pub fn content(&self) -> HashMap<Environment, HashMap<String, String>> {
        self.content
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Configurations included by this one, in declaration order.
    pub fn includes(&self) -> Vec<SourceKey> {
        self.includes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
