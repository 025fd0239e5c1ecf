mod common;

use lending_api::models::RatesResponse;
use lending_api::wire::decode;
use lending_api::{Config, ConfigError, ProviderRegistry};
use std::fs;
use std::sync::Arc;
use std::thread;

#[test]
fn test_load_catalog_and_check_response() {
    let path = common::write_temp_json("catalog", &common::provider_catalog());
    let registry = ProviderRegistry::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(registry.ids(), vec!["acme"]);

    let response: RatesResponse = decode(&common::rates_response().to_string()).unwrap();
    assert!(registry.check_response(&response).is_ok());
}

#[test]
fn test_load_invalid_catalog() {
    let mut catalog = common::provider_catalog();
    catalog[0]["assets"][0]["terms"] = serde_json::json!([30, 7]);

    let path = common::write_temp_json("bad-catalog", &catalog);
    let result = ProviderRegistry::load(&path);
    fs::remove_file(&path).ok();

    match result {
        Err(ConfigError::Model(err)) => assert!(err.to_string().contains("terms")),
        other => panic!("expected a model error, got {:?}", other),
    }
}

#[test]
fn test_unknown_provider_rejected() {
    let path = common::write_temp_json("catalog-unknown", &common::provider_catalog());
    let config = Config {
        providers_file: Some(path.clone()),
        require_known_provider: true,
    };
    let registry = config.load_registry().unwrap();
    fs::remove_file(&path).ok();

    let mut response = common::rates_response();
    response["provider"] = serde_json::json!("globex");
    let response: RatesResponse = decode(&response.to_string()).unwrap();

    let err = registry.check_response(&response).unwrap_err();
    assert_eq!(err.field(), Some("provider"));
}

#[test]
fn test_registry_shared_across_threads() {
    let path = common::write_temp_json("catalog-threads", &common::provider_catalog());
    let registry = Arc::new(ProviderRegistry::load(&path).unwrap());
    fs::remove_file(&path).ok();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.get("acme").map(|p| p.assets().len()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(2));
    }
}
