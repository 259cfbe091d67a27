// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Scope paths used to select between alternative attribute values.
//!
//! An [`Environment`] is identified solely by its canonical form: the
//! scope segments joined with [`DELIMITER`]. Resolution walks from the
//! most specific environment to [`Environment::Global`] one [`reduce`]
//! at a time.
//!
//! [`reduce`]: Environment::reduce

use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[cfg(test)]
#[path = "./environment_test.rs"]
mod environment_test;

/// Separator between scope segments in a canonical form.
pub const DELIMITER: &str = ".";

/// A scope path such as `dev.eu`.
#[derive(Debug, Clone, Default)]
pub enum Environment {
    /// The most general scope, canonical form `""`.
    #[default]
    Global,
    /// A segment stack built while walking nested scopes.
    Dynamic(DynamicEnvironment),
    /// Deployment coordinates of an application.
    Application(ApplicationEnvironment),
    /// A `language[_COUNTRY[_variant]]` locale.
    LocaleBased(LocaleEnvironment),
}

impl Environment {
    /// The unique textual key of this exact scope.
    pub fn canonical_form(&self) -> String {
        match self {
            Self::Global => String::new(),
            Self::Dynamic(env) => env.canonical_form(),
            Self::Application(env) => join(env.segments()),
            Self::LocaleBased(env) => join(env.segments()),
        }
    }

    /// Number of scope segments; zero means canonically global.
    pub fn depth(&self) -> usize {
        match self {
            Self::Global => 0,
            Self::Dynamic(env) => env.segments.len(),
            Self::Application(env) => env.segments().len(),
            Self::LocaleBased(env) => env.segments().len(),
        }
    }

    /// Whether [`Self::reduce`] yields a more general environment.
    pub fn is_reduceable(&self) -> bool {
        self.depth() > 0
    }

    /// The next more general environment, one segment removed.
    ///
    /// Returns `None` only when nothing is left to remove.
    pub fn reduce(&self) -> Option<Environment> {
        if !self.is_reduceable() {
            return None;
        }
        let reduced = match self {
            Self::Global => return None,
            Self::Dynamic(env) => {
                let mut env = env.clone();
                env.reduce_this();
                (!env.is_empty()).then_some(Self::Dynamic(env))
            }
            Self::Application(env) => env.reduced().map(Self::Application),
            Self::LocaleBased(env) => env.reduced().map(Self::LocaleBased),
        };
        Some(reduced.unwrap_or(Self::Global))
    }

    /// This environment followed by every reduction down to global.
    pub fn fallback_chain(&self) -> Vec<Environment> {
        let mut chain = vec![self.clone()];
        let mut current = self.clone();
        while let Some(next) = current.reduce() {
            chain.push(next.clone());
            current = next;
        }
        chain
    }

    pub fn is_global(&self) -> bool {
        self.depth() == 0
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_form() == other.canonical_form()
    }
}

impl Eq for Environment {}

impl Hash for Environment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_form().hash(state);
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            f.write_str("(global)")
        } else {
            f.write_str(&self.canonical_form())
        }
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    /// Parses `dev.eu` into a dynamic environment; an empty path is global.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let env = DynamicEnvironment::from_segments(s.split(DELIMITER));
        if env.is_empty() {
            Ok(Self::Global)
        } else {
            Ok(Self::Dynamic(env))
        }
    }
}

impl From<DynamicEnvironment> for Environment {
    fn from(env: DynamicEnvironment) -> Self {
        if env.is_empty() {
            Self::Global
        } else {
            Self::Dynamic(env)
        }
    }
}

impl From<ApplicationEnvironment> for Environment {
    fn from(env: ApplicationEnvironment) -> Self {
        Self::Application(env)
    }
}

impl From<LocaleEnvironment> for Environment {
    fn from(env: LocaleEnvironment) -> Self {
        Self::LocaleBased(env)
    }
}

fn join(segments: Vec<&str>) -> String {
    segments.join(DELIMITER)
}

/// A mutable stack of scope segments.
///
/// Parsers extend the stack when entering a nested scope and reduce it
/// again on the way out. Anything stored must be a clone, never a borrow
/// of the live stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicEnvironment {
    segments: Vec<String>,
}

impl DynamicEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from segments, dropping empty ones.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { segments }
    }

    /// Push a more specific segment.
    pub fn extend(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Pop the most recently pushed segment.
    pub fn reduce_this(&mut self) -> Option<String> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn canonical_form(&self) -> String {
        self.segments.join(DELIMITER)
    }
}

/// Deployment coordinates, from least to most specific:
/// system, service, host, component, instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationEnvironment {
    pub system: Option<String>,
    pub service: Option<String>,
    pub host: Option<String>,
    pub component: Option<String>,
    pub instance: Option<String>,
}

impl ApplicationEnvironment {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            ..Default::default()
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    fn coordinates(&self) -> [&Option<String>; 5] {
        [
            &self.system,
            &self.service,
            &self.host,
            &self.component,
            &self.instance,
        ]
    }

    /// Present, non-empty coordinates in order.
    pub fn segments(&self) -> Vec<&str> {
        self.coordinates()
            .into_iter()
            .filter_map(|c| c.as_deref())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Drop the most specific present coordinate.
    fn reduced(&self) -> Option<Self> {
        let mut reduced = self.clone();
        let slots = [
            &mut reduced.instance,
            &mut reduced.component,
            &mut reduced.host,
            &mut reduced.service,
            &mut reduced.system,
        ];
        for slot in slots {
            if slot.as_deref().is_some_and(|c| !c.is_empty()) {
                *slot = None;
                break;
            }
            *slot = None;
        }
        (!reduced.segments().is_empty()).then_some(reduced)
    }
}

/// A locale such as `de_DE` or `en_US_POSIX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleEnvironment {
    language: String,
    country: Option<String>,
    variant: Option<String>,
}

impl LocaleEnvironment {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            country: None,
            variant: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Parse `language[_COUNTRY[_variant]]`, also accepting `-` as separator.
    ///
    /// Returns `None` when no language is given.
    pub fn parse(locale: &str) -> Option<Self> {
        let mut parts = locale
            .split(['_', '-'])
            .map(str::trim)
            .filter(|p| !p.is_empty());
        let language = parts.next()?;
        Some(Self {
            language: language.to_string(),
            country: parts.next().map(String::from),
            variant: parts.next().map(String::from),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn segments(&self) -> Vec<&str> {
        let mut segments = Vec::with_capacity(3);
        if self.language.is_empty() {
            return segments;
        }
        segments.push(self.language.as_str());
        if let Some(country) = self.country() {
            segments.push(country);
            if let Some(variant) = self.variant() {
                segments.push(variant);
            }
        }
        segments
    }

    fn reduced(&self) -> Option<Self> {
        let mut reduced = self.clone();
        if reduced.variant.take().is_some() && reduced.country.is_some() {
            return Some(reduced);
        }
        if reduced.country.take().is_some() {
            return Some(reduced);
        }
        None
    }
}
