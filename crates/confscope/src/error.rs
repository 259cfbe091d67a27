// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for confscope operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with confscope Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during confscope operations.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// An artefact with this name is already cached
    #[error("Artefact '{0}' already exists")]
    #[diagnostic(
        code(confscope::duplicate_artefact),
        help("Use update_artefact to replace an existing artefact")
    )]
    DuplicateArtefact(String),

    /// No artefact with this name is cached
    #[error("No such artefact: {0}")]
    #[diagnostic(
        code(confscope::unknown_artefact),
        help("The artefact may have been evicted after a source change; load it again")
    )]
    UnknownArtefact(String),

    /// The attribute was never written to the artefact
    #[error("Attribute '{attribute}' doesn't exist in artefact '{artefact}'")]
    #[diagnostic(code(confscope::attribute_not_found))]
    AttributeNotFound { artefact: String, attribute: String },

    /// Malformed JSON source
    #[error("Invalid JSON in configuration '{name}': {error}")]
    #[diagnostic(code(confscope::invalid_json))]
    InvalidJson {
        name: String,
        #[source]
        error: serde_json::Error,
    },

    /// Malformed YAML source
    #[error("Invalid YAML in configuration '{name}': {error}")]
    #[diagnostic(code(confscope::invalid_yaml))]
    InvalidYaml {
        name: String,
        #[source]
        error: serde_yaml::Error,
    },

    /// A value that cannot be stored as an attribute
    #[error("Unsupported value for attribute '{attribute}' in configuration '{name}'")]
    #[diagnostic(
        code(confscope::unsupported_value),
        help("Attribute values must be strings, numbers or booleans; objects open a new environment scope")
    )]
    UnsupportedValue { name: String, attribute: String },

    /// No source file backs the requested configuration
    #[error("No configuration source found for '{0}'")]
    #[diagnostic(
        code(confscope::source_not_found),
        help("Expected a <name>.json, <name>.yaml or <name>.yml file in the source directory")
    )]
    SourceNotFound(String),

    /// Failed to read a file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(confscope::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Circular include detected while composing
    #[error("Circular include detected: {}", display_chain(.0))]
    #[diagnostic(
        code(confscope::circular_include),
        help("Remove the circular reference in your includes")
    )]
    CircularInclude(Vec<String>),

    /// Include chain is deeper than allowed
    #[error("Include chain of '{name}' exceeds the limit of {limit}")]
    #[diagnostic(
        code(confscope::include_depth_exceeded),
        help("Raise max_include_depth in the settings or flatten the includes")
    )]
    IncludeDepthExceeded { name: String, limit: usize },

    /// Settings could not be loaded
    #[error("Invalid settings: {0}")]
    #[diagnostic(code(confscope::invalid_settings))]
    InvalidSettings(String),

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(confscope::io_error))]
    Io(#[from] std::io::Error),
}

fn display_chain(chain: &[String]) -> String {
    chain.join(" -> ")
}
