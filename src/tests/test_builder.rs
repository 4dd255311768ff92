use std::path::Path;

use crate::builder::{ConfigValue, DEFAULT_OUTPUT_DIR, DownSelectBuilder};
use crate::tests::init;
use crate::tests::test_data::toy_five;

#[test]
fn builder_defaults() {
    init();

    let builder = DownSelectBuilder::new();
    assert_eq!(builder.n(), 3);
    assert!(!builder.benchmark());
    assert_eq!(builder.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
}

#[test]
fn builder_fluent_setters() {
    let builder = DownSelectBuilder::new()
        .with_n(7)
        .with_benchmark(true)
        .with_output_dir("out/selection");

    assert_eq!(builder.n(), 7);
    assert!(builder.benchmark());
    assert_eq!(builder.output_dir(), Path::new("out/selection"));
}

#[test]
fn build_hands_config_to_selector() {
    init();

    let selector = DownSelectBuilder::new()
        .with_n(4)
        .with_benchmark(true)
        .build(toy_five());

    assert_eq!(selector.requested_n(), 4);
    assert_eq!(selector.config().n(), 4);
    assert!(selector.config().benchmark());
    assert!(selector.result().is_none(), "Nothing runs at build time");
}

#[test]
fn typed_config_export() {
    let config = DownSelectBuilder::new()
        .with_n(12)
        .with_output_dir("results")
        .builder_config_typed();

    assert_eq!(config.len(), 3);
    assert_eq!(config.get("n"), Some(&ConfigValue::Usize(12)));
    assert_eq!(config.get("benchmark"), Some(&ConfigValue::Bool(false)));
    assert_eq!(
        config.get("output_dir").and_then(ConfigValue::as_str),
        Some("results")
    );
}

#[test]
fn typed_config_roundtrip_through_json() {
    let original = DownSelectBuilder::new().with_n(9).with_benchmark(true);
    let json = serde_json::to_string(&original.builder_config_typed()).unwrap();

    let config = serde_json::from_str(&json).unwrap();
    let rebuilt = DownSelectBuilder::from_config(&config);

    assert_eq!(rebuilt, original);
}

#[test]
fn from_config_keeps_defaults_for_missing_keys() {
    let mut config = std::collections::HashMap::new();
    config.insert("n".to_string(), ConfigValue::Usize(5));

    let builder = DownSelectBuilder::from_config(&config);
    assert_eq!(builder.n(), 5);
    assert!(!builder.benchmark());
    assert_eq!(builder.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
}

#[test]
fn config_value_accessors() {
    assert_eq!(ConfigValue::OptionUsize(Some(3)).as_usize(), Some(3));
    assert_eq!(ConfigValue::OptionUsize(None).as_usize(), None);
    assert_eq!(ConfigValue::Bool(true).as_usize(), None);
    assert_eq!(ConfigValue::String("x".into()).as_bool(), None);

    assert_eq!(ConfigValue::OptionUsize(None).to_string(), "None");
    assert_eq!(ConfigValue::Usize(4).to_string(), "4");
}
