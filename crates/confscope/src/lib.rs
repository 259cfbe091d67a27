// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! confscope - Environment-scoped configuration repository
//!
//! This crate resolves named configuration attributes against a
//! hierarchical environment such as `dev.eu`, falling back from the most
//! specific scope to the most general one.
//!
//! # Overview
//!
//! A configuration source is a nested document in which every object opens
//! a new scope:
//!
//! ```yaml
//! # app.yaml
//! url: https://example.com
//! timeout: 30
//! dev:
//!   url: http://localhost:8080
//!   eu:
//!     timeout: 5
//! '@db': database
//! ```
//!
//! Parsing produces an [`Artefact`] that is cached in a
//! [`ConfigurationRepository`]. Asking for `app` in `dev.eu` yields
//! `url = http://localhost:8080` (from `dev`) and `timeout = 5`; asking in
//! `prod` falls back to the global values. The `@db` key includes the
//! `database` configuration, whose attributes the [`Loader`] splices in.
//!
//! When a source changes, the [`SourceRegistry`] notifies the repository,
//! which drops the artefact; the next lookup through the loader parses the
//! source again.

pub mod artefact;
pub mod attribute;
pub mod configuration;
pub mod environment;
pub mod error;
pub mod loader;
pub mod parser;
pub mod repository;
pub mod settings;
pub mod source;
pub mod value;

pub use artefact::Artefact;
pub use attribute::{Attribute, AttributeValue};
pub use configuration::Configuration;
pub use environment::{
    ApplicationEnvironment,
    DynamicEnvironment,
    Environment,
    LocaleEnvironment,
};
pub use error::{Error, Result};
pub use loader::Loader;
pub use parser::{ConfigurationParser, JsonParser, ParsedAttribute, ParsedConfiguration, YamlParser};
pub use repository::ConfigurationRepository;
pub use settings::Settings;
pub use source::{FileSource, Fingerprint, Format, SourceKey, SourceListener, SourceRegistry};
pub use value::{Value, ValueKind};

/// Well-known filename for settings.
pub const SETTINGS_FILENAME: &str = "confscope.yaml";
