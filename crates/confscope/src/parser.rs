// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Format front ends that flatten nested configuration text into
//! `(attribute, value, environment)` triples.
//!
//! Nested objects open a new environment scope named after their key:
//!
//! ```json
//! {
//!   "url": "https://example.com",
//!   "dev": { "url": "http://localhost" },
//!   "@db": "database"
//! }
//! ```
//!
//! yields `url` in the global environment, `url` in `dev`, and an include
//! of the `database` configuration recorded as attribute `db`. A dotted
//! scope key such as `"dev.eu"` is the same as nesting `eu` inside `dev`;
//! a scope key without any segment is rejected.

use serde_json::Value as Tree;

use crate::artefact::Artefact;
use crate::environment::{DELIMITER, DynamicEnvironment, Environment};
use crate::source::{Format, SourceKey};
use crate::value::Value;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./parser_test.rs"]
mod parser_test;

/// Prefix marking a key as an include of another configuration.
pub const INCLUDE_PREFIX: char = '@';

/// One attribute value with the environment it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttribute {
    pub name: String,
    pub value: Value,
    pub environment: Environment,
}

/// The flattened content of one configuration source.
#[derive(Debug, Clone, Default)]
pub struct ParsedConfiguration {
    pub name: String,
    pub attributes: Vec<ParsedAttribute>,
}

impl ParsedConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Feed every parsed attribute into `artefact`, in parse order.
    pub fn apply_to(&self, artefact: &Artefact) {
        for attribute in &self.attributes {
            artefact.add_attribute_value(
                &attribute.name,
                attribute.value.clone(),
                Some(&attribute.environment),
            );
        }
    }
}

/// Turns configuration text into parsed attributes.
pub trait ConfigurationParser: Send + Sync {
    fn parse(&self, name: &str, content: &str) -> Result<ParsedConfiguration>;
}

/// Parser for JSON sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl ConfigurationParser for JsonParser {
    fn parse(&self, name: &str, content: &str) -> Result<ParsedConfiguration> {
        if content.trim().is_empty() {
            return Ok(ParsedConfiguration::new(name));
        }
        let tree: Tree = serde_json::from_str(content).map_err(|error| Error::InvalidJson {
            name: name.to_string(),
            error,
        })?;
        flatten(name, &tree, Format::Json)
    }
}

/// Parser for YAML sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl ConfigurationParser for YamlParser {
    fn parse(&self, name: &str, content: &str) -> Result<ParsedConfiguration> {
        if content.trim().is_empty() {
            return Ok(ParsedConfiguration::new(name));
        }
        let tree: Tree = serde_yaml::from_str(content).map_err(|error| Error::InvalidYaml {
            name: name.to_string(),
            error,
        })?;
        flatten(name, &tree, Format::Yaml)
    }
}

/// The parser responsible for `format`.
pub fn parser_for(format: Format) -> &'static dyn ConfigurationParser {
    match format {
        Format::Json => &JsonParser,
        Format::Yaml => &YamlParser,
    }
}

fn flatten(name: &str, tree: &Tree, format: Format) -> Result<ParsedConfiguration> {
    let mut parsed = ParsedConfiguration::new(name);
    let root = match tree {
        Tree::Object(root) => root,
        Tree::Null => return Ok(parsed),
        _ => {
            return Err(Error::UnsupportedValue {
                name: name.to_string(),
                attribute: "<root>".to_string(),
            });
        }
    };

    let mut walker = Walker {
        name,
        format,
        env: DynamicEnvironment::new(),
        out: &mut parsed.attributes,
    };
    for (key, value) in root {
        walker.walk(key, value)?;
    }
    Ok(parsed)
}

struct Walker<'a> {
    name: &'a str,
    format: Format,
    env: DynamicEnvironment,
    out: &'a mut Vec<ParsedAttribute>,
}

impl Walker<'_> {
    fn walk(&mut self, key: &str, value: &Tree) -> Result<()> {
        let include = key.strip_prefix(INCLUDE_PREFIX);
        if let (None, Tree::Object(members)) = (include, value) {
            // `dev.eu` opens the same scope as `dev` then `eu`.
            let scope = DynamicEnvironment::from_segments(key.split(DELIMITER));
            if scope.is_empty() {
                return Err(self.unsupported(key));
            }
            for segment in scope.segments() {
                self.env.extend(segment.as_str());
            }
            for (sub_key, sub_value) in members {
                self.walk(sub_key, sub_value)?;
            }
            for _ in scope.segments() {
                self.env.reduce_this();
            }
            return Ok(());
        }

        let value = match (include, value) {
            (Some(included), Tree::String(target)) if !included.is_empty() => {
                self.record(included, Value::include(SourceKey::new(target.as_str(), self.format)));
                return Ok(());
            }
            (Some(_), _) => return Err(self.unsupported(key)),
            (None, Tree::String(s)) => Value::plain(s.as_str()),
            (None, Tree::Number(n)) => Value::plain(n.to_string()),
            (None, Tree::Bool(b)) => Value::plain(b.to_string()),
            (None, Tree::Null) => {
                tracing::warn!(
                    configuration = self.name,
                    attribute = key,
                    env = %Environment::from(self.env.clone()),
                    "skipping attribute without value"
                );
                return Ok(());
            }
            (None, _) => return Err(self.unsupported(key)),
        };
        self.record(key, value);
        Ok(())
    }

    fn record(&mut self, name: &str, value: Value) {
        self.out.push(ParsedAttribute {
            name: name.to_string(),
            value,
            environment: Environment::from(self.env.clone()),
        });
    }

    fn unsupported(&self, key: &str) -> Error {
        Error::UnsupportedValue {
            name: self.name.to_string(),
            attribute: key.to_string(),
        }
    }
}
