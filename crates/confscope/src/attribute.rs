// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Attribute storage and environment fallback resolution.

use dashmap::DashMap;

use crate::environment::Environment;
use crate::value::Value;

#[cfg(test)]
#[path = "./attribute_test.rs"]
mod attribute_test;

/// Values of one attribute keyed by environment canonical form.
///
/// Readers get clones, so a concurrent [`AttributeValue::set`] is either
/// fully visible or not visible at all.
#[derive(Debug, Default)]
pub struct AttributeValue {
    values: DashMap<String, Value>,
}

impl AttributeValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for exactly `env`, replacing any previous value.
    pub fn set(&self, value: Value, env: &Environment) {
        self.values.insert(env.canonical_form(), value);
    }

    /// Resolve the value for `env`, falling back to more general
    /// environments until one has a value.
    pub fn get(&self, env: &Environment) -> Option<Value> {
        let mut current = env.clone();
        loop {
            let key = current.canonical_form();
            tracing::trace!(env = %current, "looking up value");
            if let Some(value) = self.values.get(&key) {
                return Some(value.value().clone());
            }
            current = current.reduce()?;
        }
    }

    /// Number of environments holding a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named configuration property.
#[derive(Debug)]
pub struct Attribute {
    name: String,
    store: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: AttributeValue::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value in the global environment.
    pub fn value(&self) -> Option<Value> {
        self.value_in(&Environment::Global)
    }

    pub fn value_in(&self, env: &Environment) -> Option<Value> {
        tracing::debug!(attribute = %self.name, env = %env, "resolving attribute");
        self.store.get(env)
    }

    pub fn add_value(&self, value: Value, env: &Environment) {
        self.store.set(value, env);
    }

    pub fn values(&self) -> &AttributeValue {
        &self.store
    }
}
