//! End-to-end scenarios against the in-memory backend
//!
//! Run with `cargo test --features mock`.

use cfgstore::platform::mock::MockStorage;
use cfgstore::platform::traits::Storage;
use cfgstore::{Config, ConfigError, Migration, Status, Value, DEFAULT_NAMESPACE};
use std::sync::{Arc, Mutex};

#[test]
fn test_port_set_get_unset() {
    let mut storage = MockStorage::new();
    let mut config = Config::new(&mut storage);
    config.configure("port", 80u16).unwrap();
    assert!(config.begin(DEFAULT_NAMESPACE, false));

    assert_eq!(config.set("port", 8080u16), Status::Persisted);
    assert_eq!(config.get::<u16>("port"), Ok(8080));
    assert_eq!(config.unset("port"), Status::Removed);
    assert_eq!(config.get::<u16>("port"), Ok(80));
}

#[test]
fn test_empty_string_is_a_real_value() {
    let mut storage = MockStorage::new();
    let mut config = Config::new(&mut storage);
    config.configure("n", "default").unwrap();
    config.begin(DEFAULT_NAMESPACE, false);

    assert_eq!(config.set("n", ""), Status::Persisted);
    assert_eq!(config.is_empty("n"), Ok(true));
    assert!(config.stored("n"));
}

#[test]
fn test_migrate_legacy_string_then_open() {
    let mut storage = MockStorage::new();
    storage.seed("key1", "true");

    {
        let mut config = Config::new(&mut storage);
        config.configure("key1", false).unwrap();

        let mut migration = Migration::new(&mut config);
        assert!(migration.begin(DEFAULT_NAMESPACE));
        assert_eq!(migration.migrate_from_string(), 0);
        migration.end();

        assert!(config.begin(DEFAULT_NAMESPACE, true));
        assert_eq!(config.get::<bool>("key1"), Ok(true));
    }

    assert_eq!(storage.entry("key1"), Some(&Value::Bool(true)));
    storage.open(DEFAULT_NAMESPACE).unwrap();
    assert_eq!(storage.load_str("key1"), None);
    assert_eq!(storage.load_bool("key1"), Some(true));
}

#[test]
fn test_type_mismatch_leaves_storage_unchanged() {
    let mut storage = MockStorage::new();
    let mut config = Config::new(&mut storage);
    config.configure("x", 0i32).unwrap();
    config.begin(DEFAULT_NAMESPACE, false);

    assert_eq!(config.set("x", "oops"), Status::ErrInvalidType);
    assert_eq!(config.get::<String>("x"), Err(ConfigError::TypeMismatch));
    assert_eq!(config.storage().write_count(), 0);
}

#[test]
fn test_restore_turns_features_on_last() {
    let mut storage = MockStorage::new();
    let mut blob = String::new();
    {
        let mut config = Config::new(&mut storage);
        config.configure("mqtt_server", "").unwrap();
        config.configure("mqtt_enable", false).unwrap();
        config.configure("wifi_pwd", "").unwrap();
        config.begin(DEFAULT_NAMESPACE, false);
        config.set("mqtt_server", "broker.local");
        config.set("mqtt_enable", true);
        config.set("wifi_pwd", "hunter2");
        config.backup(&mut blob, false).unwrap();
    }

    let mut target = MockStorage::new();
    let mut config = Config::new(&mut target);
    config.configure("mqtt_server", "").unwrap();
    config.configure("mqtt_enable", false).unwrap();
    config.configure("wifi_pwd", "").unwrap();
    config.begin(DEFAULT_NAMESPACE, false);

    let events = Arc::new(Mutex::new(Vec::new()));
    let log = events.clone();
    config.listen(move |key, _| log.lock().unwrap().push(key.to_string()));

    assert_eq!(config.restore_text(&blob), Ok(true));
    assert_eq!(*events.lock().unwrap(), ["mqtt_server", "wifi_pwd", "mqtt_enable"]);
    assert!(config.is_equal("wifi_pwd", "hunter2").unwrap());

    let mut dump = String::new();
    config.dump(&mut dump).unwrap();
    assert!(dump.contains("wifi_pwd=********"));
}

#[test]
fn test_validator_veto_keeps_previous_value() {
    let mut storage = MockStorage::new();
    let mut config = Config::new(&mut storage);
    config
        .configure_with("port", 80u16, |_, v| matches!(v, Value::U16(p) if *p != 0))
        .unwrap();
    config.begin(DEFAULT_NAMESPACE, false);

    assert_eq!(config.set("port", 8080u16), Status::Persisted);
    assert_eq!(config.set("port", 0u16), Status::ErrInvalidValue);
    assert_eq!(config.get::<u16>("port"), Ok(8080));
}

#[test]
fn test_values_survive_reopen() {
    let mut storage = MockStorage::new();
    {
        let mut config = Config::new(&mut storage);
        config.configure("ratio", 0.5f64).unwrap();
        config.begin(DEFAULT_NAMESPACE, false);
        config.set("ratio", 0.25f64);
    }

    let mut config = Config::new(&mut storage);
    config.configure("ratio", 0.5f64).unwrap();
    config.begin(DEFAULT_NAMESPACE, true);
    assert_eq!(config.get::<f64>("ratio"), Ok(0.25));
}
