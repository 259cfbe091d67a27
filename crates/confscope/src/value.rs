// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Raw attribute values.

use crate::source::SourceKey;

/// What kind of value an attribute holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Plain,
    /// Splice in the configuration identified by this key.
    Include(SourceKey),
}

/// An immutable raw value plus its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    raw: String,
    kind: ValueKind,
}

impl Value {
    pub fn plain(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: ValueKind::Plain,
        }
    }

    /// An include of another configuration. The raw form is its name.
    pub fn include(key: SourceKey) -> Self {
        Self {
            raw: key.name.clone(),
            kind: ValueKind::Include(key),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// The referenced configuration, if this is an include.
    pub fn include_key(&self) -> Option<&SourceKey> {
        match &self.kind {
            ValueKind::Include(key) => Some(key),
            ValueKind::Plain => None,
        }
    }
}

impl From<&str> for Value {
    fn from(raw: &str) -> Self {
        Self::plain(raw)
    }
}

impl From<String> for Value {
    fn from(raw: String) -> Self {
        Self::plain(raw)
    }
}
