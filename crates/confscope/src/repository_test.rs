// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::environment::{ApplicationEnvironment, LocaleEnvironment};
use crate::source::Format;
use crate::value::Value;

fn env(path: &str) -> Environment {
    path.parse().unwrap()
}

#[fixture]
fn repository() -> ConfigurationRepository {
    ConfigurationRepository::new()
}

#[rstest]
fn test_duplicate_create_rejected(repository: ConfigurationRepository) {
    let first = repository.create_artefact("a").unwrap();
    first.add_attribute_value("foo", Value::plain("bar"), None);

    let err = repository.create_artefact("a").unwrap_err();
    assert!(matches!(err, Error::DuplicateArtefact(ref name) if name == "a"));

    let stored = repository.artefact("a").unwrap();
    assert!(Arc::ptr_eq(&first, &stored));
    assert_eq!(stored.attribute_names(), vec!["foo".to_string()]);
}

#[rstest]
fn test_update_requires_prior_create(repository: ConfigurationRepository) {
    let err = repository.update_artefact(Artefact::new("ghost")).unwrap_err();
    assert!(matches!(err, Error::UnknownArtefact(ref name) if name == "ghost"));
    assert!(!repository.has_configuration("ghost"));
}

#[rstest]
fn test_update_replaces_wholesale(repository: ConfigurationRepository) {
    let old = repository.create_artefact("a").unwrap();
    old.add_attribute_value("stale", Value::plain("1"), None);

    let fresh = Artefact::new("a");
    fresh.add_attribute_value("fresh", Value::plain("2"), None);
    repository.update_artefact(fresh).unwrap();

    let config = repository.configuration("a", None).unwrap();
    assert_eq!(config.attribute("fresh"), Some("2"));
    assert_eq!(config.attribute("stale"), None);

    // A holder of the old instance still sees it unchanged.
    assert_eq!(old.attribute_names(), vec!["stale".to_string()]);
}

#[rstest]
fn test_lookups_never_fail(repository: ConfigurationRepository) {
    assert!(repository.artefact("missing").is_none());
    assert!(!repository.has_configuration("missing"));
    let err = repository.configuration("missing", None).unwrap_err();
    assert!(matches!(err, Error::UnknownArtefact(_)));
}

#[rstest]
fn test_configuration_resolves_each_attribute(repository: ConfigurationRepository) {
    let artefact = repository.create_artefact("app").unwrap();
    artefact.add_attribute_value("url", Value::plain("global-url"), None);
    artefact.add_attribute_value("url", Value::plain("dev-url"), Some(&env("dev")));
    artefact.add_attribute_value("debug", Value::plain("true"), Some(&env("dev.eu")));
    artefact.add_attribute_value("audit", Value::plain("on"), Some(&env("prod")));

    let config = repository.configuration("app", Some(&env("dev.eu"))).unwrap();
    assert_eq!(config.name(), "app");
    assert_eq!(config.environment(), &env("dev.eu"));
    assert_eq!(config.attribute("url"), Some("dev-url"));
    assert_eq!(config.attribute("debug"), Some("true"));
    // Partially configured is fine: no value on the chain means absent.
    assert_eq!(config.attribute("audit"), None);
    assert_eq!(config.len(), 2);

    let global = repository.configuration("app", None).unwrap();
    assert_eq!(global.attribute("url"), Some("global-url"));
    assert_eq!(global.len(), 1);
}

#[rstest]
fn test_configuration_is_detached(repository: ConfigurationRepository) {
    let artefact = repository.create_artefact("app").unwrap();
    artefact.add_attribute_value("foo", Value::plain("1"), None);
    let config = repository.configuration("app", None).unwrap();

    artefact.add_attribute_value("foo", Value::plain("2"), None);
    artefact.add_attribute_value("db", Value::include(SourceKey::new("db", Format::Json)), None);

    assert_eq!(config.attribute("foo"), Some("1"));
    assert!(config.includes().is_empty());
    let again = repository.configuration("app", None).unwrap();
    assert_eq!(again.attribute("foo"), Some("2"));
    assert_eq!(again.includes().len(), 1);
}

#[rstest]
fn test_eviction_forces_miss(repository: ConfigurationRepository) {
    let artefact = repository.create_artefact("a").unwrap();
    artefact.add_attribute_value("foo", Value::plain("bar"), None);
    assert!(repository.configuration("a", None).is_ok());

    repository.configuration_source_updated(&SourceKey::new("a", Format::Json));

    assert!(repository.artefact("a").is_none());
    assert!(matches!(
        repository.configuration("a", None),
        Err(Error::UnknownArtefact(_))
    ));
    // Recreating after eviction is allowed.
    assert!(repository.create_artefact("a").is_ok());
}

#[rstest]
fn test_eviction_of_unknown_name_is_harmless(repository: ConfigurationRepository) {
    repository.create_artefact("kept").unwrap();
    repository.configuration_source_updated(&SourceKey::new("other", Format::Yaml));
    assert_eq!(repository.artefact_names(), vec!["kept".to_string()]);
}

#[rstest]
fn test_reset_all(repository: ConfigurationRepository) {
    repository.create_artefact("a").unwrap();
    repository.create_artefact("b").unwrap();
    repository.reset_all();
    assert!(repository.artefact_names().is_empty());
}

#[rstest]
fn test_racing_creates_yield_one_winner(repository: ConfigurationRepository) {
    let successes = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| repository.create_artefact("contended").is_ok()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });
    assert_eq!(successes, 1);
}

#[rstest]
fn test_readers_see_whole_artefacts_during_updates(repository: ConfigurationRepository) {
    let initial = repository.create_artefact("app").unwrap();
    initial.add_attribute_value("a", Value::plain("0"), None);
    initial.add_attribute_value("b", Value::plain("0"), None);

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 1..200 {
                let next = Artefact::new("app");
                next.add_attribute_value("a", Value::plain(i.to_string()), None);
                next.add_attribute_value("b", Value::plain(i.to_string()), None);
                repository.update_artefact(next).unwrap();
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let config = repository.configuration("app", None).unwrap();
                    assert_eq!(config.attribute("a"), config.attribute("b"));
                }
            });
        }
    });
}

#[rstest]
fn test_insert_publishes_populated_artefact(repository: ConfigurationRepository) {
    let artefact = Artefact::new("app");
    artefact.add_attribute_value("a", Value::plain("1"), None);
    repository.insert_artefact(artefact).unwrap();
    assert_eq!(
        repository.configuration("app", None).unwrap().attribute("a"),
        Some("1")
    );

    let err = repository.insert_artefact(Artefact::new("app")).unwrap_err();
    assert!(matches!(err, Error::DuplicateArtefact(ref name) if name == "app"));
    assert_eq!(repository.artefact("app").unwrap().attribute_count(), 1);
}

#[rstest]
fn test_configuration_in_application_and_locale_environments(
    repository: ConfigurationRepository,
) {
    let billing = Environment::from(ApplicationEnvironment::new("shop").with_service("billing"));
    let german = Environment::from(LocaleEnvironment::new("de"));
    let artefact = repository.create_artefact("app").unwrap();
    artefact.add_attribute_value("timeout", Value::plain("30"), None);
    artefact.add_attribute_value("timeout", Value::plain("5"), Some(&billing));
    artefact.add_attribute_value("greeting", Value::plain("hello"), None);
    artefact.add_attribute_value("greeting", Value::plain("hallo"), Some(&german));

    let instance = Environment::from(
        ApplicationEnvironment::new("shop")
            .with_service("billing")
            .with_host("h1")
            .with_instance("7"),
    );
    let config = repository.configuration("app", Some(&instance)).unwrap();
    assert_eq!(config.attribute("timeout"), Some("5"));
    assert_eq!(config.attribute("greeting"), Some("hello"));

    let swiss_german = Environment::from(LocaleEnvironment::parse("de_CH").unwrap());
    let config = repository.configuration("app", Some(&swiss_german)).unwrap();
    assert_eq!(config.attribute("greeting"), Some("hallo"));
    assert_eq!(config.attribute("timeout"), Some("30"));
}
