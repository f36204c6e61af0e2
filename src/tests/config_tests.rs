use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::errors::ConfigError;

fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_only_need_an_api_key() {
    let config = config_from(&[("GOOGLE_MAPS_API_KEY", "key")]).unwrap();

    assert_eq!(config.prefecture.code, "11");
    assert_eq!(config.listings_dir(), PathBuf::from("data/listings"));
    assert_eq!(config.geocode_dir(), PathBuf::from("data/geocode"));
    assert_eq!(config.max_pages, 500);
    assert_eq!(config.max_in_flight, 5);
    assert_eq!(config.request_delay, Duration::from_millis(50));
    assert_eq!(config.deadline, None);
    assert_eq!(config.geocode_region, "jp");
}

#[test]
fn overrides_are_read() {
    let config = config_from(&[
        ("GOOGLE_MAPS_API_KEY", "key"),
        ("SUUMO_PREFECTURE", "13"),
        ("DATA_DIR", "/var/lib/suumo"),
        ("SCRAPE_MAX_PAGES", "20"),
        ("SCRAPE_WARD_WORKERS", "8"),
        ("SCRAPE_DEADLINE_SECS", "3600"),
    ])
    .unwrap();

    assert_eq!(config.prefecture.url_path, "tokyo");
    assert_eq!(config.listings_dir(), PathBuf::from("/var/lib/suumo/listings"));
    assert_eq!(config.max_pages, 20);
    assert_eq!(config.ward_workers, 8);
    assert_eq!(config.deadline, Some(Duration::from_secs(3600)));
}

#[test]
fn missing_key_and_bad_values_are_errors() {
    assert!(matches!(
        config_from(&[]),
        Err(ConfigError::Missing("GOOGLE_MAPS_API_KEY"))
    ));
    assert!(matches!(
        config_from(&[("GOOGLE_MAPS_API_KEY", "key"), ("SCRAPE_MAX_PAGES", "lots")]),
        Err(ConfigError::Invalid { name: "SCRAPE_MAX_PAGES", .. })
    ));
    assert!(matches!(
        config_from(&[("GOOGLE_MAPS_API_KEY", "key"), ("SUUMO_PREFECTURE", "47")]),
        Err(ConfigError::UnknownPrefecture(_))
    ));
}
