// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;

fn env(path: &str) -> Environment {
    path.parse().unwrap()
}

#[rstest]
fn test_global_is_terminal() {
    let global = Environment::Global;
    assert_eq!(global.canonical_form(), "");
    assert!(!global.is_reduceable());
    assert!(global.reduce().is_none());
}

#[rstest]
#[case("", "")]
#[case("dev", "dev")]
#[case("dev.eu", "dev.eu")]
#[case(".dev..eu.", "dev.eu")]
fn test_parse_canonical_form(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(env(input).canonical_form(), expected);
}

#[rstest]
fn test_empty_path_parses_to_global() {
    assert!(matches!(env(""), Environment::Global));
    assert_eq!(env(""), Environment::Global);
}

#[rstest]
fn test_dynamic_reduce_chain_ends_at_global() {
    let chain: Vec<String> = env("dev.eu.fra")
        .fallback_chain()
        .iter()
        .map(Environment::canonical_form)
        .collect();
    assert_eq!(chain, vec!["dev.eu.fra", "dev.eu", "dev", ""]);
}

#[rstest]
fn test_reduce_is_bounded_by_depth() {
    let start = env("a.b.c.d");
    assert_eq!(start.depth(), 4);
    assert_eq!(start.fallback_chain().len(), start.depth() + 1);
}

#[rstest]
fn test_equality_uses_canonical_form() {
    let dynamic = env("de.DE");
    let locale: Environment = LocaleEnvironment::parse("de_DE").unwrap().into();
    assert_eq!(dynamic, locale);

    let mut set = std::collections::HashSet::new();
    set.insert(dynamic);
    assert!(set.contains(&locale));
}

#[rstest]
fn test_dynamic_extend_and_reduce_this() {
    let mut dynamic = DynamicEnvironment::new();
    assert!(dynamic.is_empty());
    dynamic.extend("dev");
    dynamic.extend("eu");
    assert_eq!(dynamic.canonical_form(), "dev.eu");

    assert_eq!(dynamic.reduce_this().as_deref(), Some("eu"));
    assert_eq!(dynamic.canonical_form(), "dev");
    dynamic.reduce_this();
    assert_eq!(Environment::from(dynamic), Environment::Global);
}

#[rstest]
fn test_clone_is_independent_of_later_mutation() {
    let mut dynamic = DynamicEnvironment::new();
    dynamic.extend("dev");
    let captured = Environment::from(dynamic.clone());

    dynamic.reduce_this();
    dynamic.extend("test");

    assert_eq!(captured.canonical_form(), "dev");
    assert_eq!(dynamic.canonical_form(), "test");
}

#[rstest]
fn test_application_reduce_drops_most_specific() {
    let app: Environment = ApplicationEnvironment::new("shop")
        .with_service("billing")
        .with_host("node7")
        .into();
    let chain: Vec<String> = app
        .fallback_chain()
        .iter()
        .map(Environment::canonical_form)
        .collect();
    assert_eq!(chain, vec!["shop.billing.node7", "shop.billing", "shop", ""]);
    assert!(matches!(app.reduce(), Some(Environment::Application(_))));
}

#[rstest]
fn test_application_skips_missing_coordinates() {
    let app: Environment = ApplicationEnvironment::new("shop")
        .with_component("web")
        .into();
    assert_eq!(app.canonical_form(), "shop.web");
    assert_eq!(app.reduce().unwrap().canonical_form(), "shop");
}

#[rstest]
#[case("en_US_POSIX", vec!["en.US.POSIX", "en.US", "en", ""])]
#[case("de-DE", vec!["de.DE", "de", ""])]
#[case("fr", vec!["fr", ""])]
fn test_locale_reduce_chain(#[case] locale: &str, #[case] expected: Vec<&str>) {
    let env: Environment = LocaleEnvironment::parse(locale).unwrap().into();
    let chain: Vec<String> = env
        .fallback_chain()
        .iter()
        .map(Environment::canonical_form)
        .collect();
    assert_eq!(chain, expected);
}

#[rstest]
fn test_locale_requires_language() {
    assert!(LocaleEnvironment::parse("").is_none());
    assert!(LocaleEnvironment::parse("__").is_none());
}

#[rstest]
fn test_display() {
    assert_eq!(Environment::Global.to_string(), "(global)");
    assert_eq!(env("dev.eu").to_string(), "dev.eu");
}
