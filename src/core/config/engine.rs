//! Configuration engine
//!
//! [`Config`] owns the key registry, cache, validators and listeners, and
//! borrows the storage backend for its whole lifetime.
//!
//! # State machine
//!
//! ```text
//! Unopened --begin(ns, preload)--> Open --end()--> Unopened
//! ```
//!
//! Keys can be configured in either state. While unopened, reads silently
//! fall back to the compiled-in defaults and every write reports
//! [`Status::ErrDisabled`]: reads must be safe from anywhere, write failures
//! must be visible.
//!
//! # Read path
//!
//! cache hit -> typed load from storage (cached) -> compiled-in default (not
//! cached, so a value persisted later by another writer is still seen).
//!
//! # Write path
//!
//! unknown key -> type check -> DEFAULTED short-circuit -> global validator
//! -> per-key validator -> storage write -> cache update -> change callback.

use super::cache::Cache;
use super::notify::Notifier;
use super::validation::Validators;
use super::ConfigOptions;
use crate::platform::traits::storage::{load_value, store_value, Storage};
use crate::{log_debug, log_error, log_info, log_trace, log_warn};
use alloc::boxed::Box;
use alloc::vec::Vec;
use cfgstore_core::{
    ConfigError, FromValue, Key, KeyRegistry, ManagedStr, Status, TextFormat, Value, MAX_KEY_LEN,
};
use core::cell::RefCell;

/// Open namespace name; backends cap namespaces like key names
pub type Namespace = heapless::String<MAX_KEY_LEN>;

/// Typed persistent configuration store
///
/// # Example
///
/// ```ignore
/// use cfgstore::core::config::Config;
/// use cfgstore::platform::mock::MockStorage;
/// use cfgstore::Status;
///
/// let mut storage = MockStorage::new();
/// let mut config = Config::new(&mut storage);
/// config.configure("port", 80u16).unwrap();
/// config.begin("CONFIG", false);
///
/// assert_eq!(config.set("port", 8080u16), Status::Persisted);
/// assert_eq!(config.get::<u16>("port"), Ok(8080));
/// ```
pub struct Config<'s, S: Storage + ?Sized> {
    /// Borrowed backend
    storage: &'s mut S,
    /// Open namespace; `None` while unopened
    namespace: Option<Namespace>,
    options: ConfigOptions,
    registry: KeyRegistry,
    /// Filled by `&self` reads
    cache: RefCell<Cache>,
    validators: Validators,
    notifier: Notifier,
}

impl<'s, S: Storage + ?Sized> Config<'s, S> {
    /// Create an unopened engine with default options
    pub fn new(storage: &'s mut S) -> Self {
        Self::with_options(storage, ConfigOptions::default())
    }

    /// Create an unopened engine
    pub fn with_options(storage: &'s mut S, options: ConfigOptions) -> Self {
        Self {
            storage,
            namespace: None,
            registry: KeyRegistry::with_suffixes(options.enable_suffix, options.password_suffix),
            options,
            cache: RefCell::new(Cache::new()),
            validators: Validators::new(),
            notifier: Notifier::new(),
        }
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    /// Register a key with its default value
    ///
    /// The alternative of `default` becomes the permanent type of the key.
    ///
    /// # Errors
    ///
    /// [`ConfigError::KeyTooLong`] / [`ConfigError::InvalidKeyName`] for a bad
    /// name, [`ConfigError::DuplicateKey`] if the name is already registered.
    pub fn configure(&mut self, name: &str, default: impl Into<Value>) -> Result<(), ConfigError> {
        match self.registry.configure(name, default.into()) {
            Ok(_) => {
                log_debug!("configure({})", name);
                Ok(())
            }
            Err(err) => {
                log_warn!("configure({}): {}", name, err.as_str());
                Err(err)
            }
        }
    }

    /// Register a key together with its validator
    pub fn configure_with<F>(
        &mut self,
        name: &str,
        default: impl Into<Value>,
        validator: F,
    ) -> Result<(), ConfigError>
    where
        F: FnMut(&str, &Value) -> bool + Send + 'static,
    {
        self.configure(name, default)?;
        self.set_validator(name, validator)
    }

    /// Install or replace the validator of a registered key
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownKey`] if the key is not registered.
    pub fn set_validator<F>(&mut self, key: &str, validator: F) -> Result<(), ConfigError>
    where
        F: FnMut(&str, &Value) -> bool + Send + 'static,
    {
        let Some(k) = self.registry.lookup(key) else {
            log_warn!("set_validator({}): unknown key", key);
            return Err(ConfigError::UnknownKey);
        };
        self.validators.insert(k.name_key().clone(), Box::new(validator));
        log_debug!("set_validator({})", key);
        Ok(())
    }

    /// Remove the validator of a key; returns true if one was installed
    pub fn remove_validator(&mut self, key: &str) -> bool {
        match self.registry.lookup(key) {
            Some(k) => self.validators.remove(k.name_key()),
            None => false,
        }
    }

    /// Install or replace the validator applied to every key
    pub fn set_global_validator<F>(&mut self, validator: F)
    where
        F: FnMut(&str, &Value) -> bool + Send + 'static,
    {
        self.validators.set_global(Box::new(validator));
        log_debug!("set_global_validator()");
    }

    /// Remove the global validator
    pub fn clear_global_validator(&mut self) {
        self.validators.clear_global();
    }

    /// Install or replace the change callback
    ///
    /// Called with `Some(value)` after a persisted write and `None` after a
    /// removal, synchronously and on the caller's stack.
    pub fn listen<F>(&mut self, callback: F)
    where
        F: FnMut(&str, Option<&Value>) + Send + 'static,
    {
        self.notifier.listen(Box::new(callback));
    }

    /// Install or replace the restore-completed callback
    pub fn on_restored<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.notifier.on_restored(Box::new(callback));
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Open `namespace` on the backend
    ///
    /// With `preload`, the persisted value of every registered key is loaded
    /// into the cache. Returns false if the name is longer than
    /// [`MAX_KEY_LEN`] or the backend could not be opened; the engine then
    /// stays unopened.
    pub fn begin(&mut self, namespace: &str, preload: bool) -> bool {
        if self.enabled() {
            self.end();
        }

        let Ok(name) = Namespace::try_from(namespace) else {
            log_error!("Namespace too long: '{}'", namespace);
            return false;
        };

        log_info!("Initializing Config '{}'", namespace);
        if let Err(err) = self.storage.open(namespace) {
            log_error!("Failed to initialize storage backend: {}", err.as_str());
            return false;
        }

        if preload {
            log_info!("Preloading Config '{}'", namespace);
            let cache = self.cache.get_mut();
            for key in self.registry.iter() {
                if let Some(value) = load_value(&*self.storage, key.name(), key.kind()) {
                    cache.insert(key.name_key().clone(), value);
                    log_debug!("get({}): CACHED", key.name());
                }
            }
        }

        self.namespace = Some(name);
        true
    }

    /// Close the backend and drop every cached value
    pub fn end(&mut self) {
        if let Some(namespace) = self.namespace.take() {
            self.storage.close();
            log_info!("Config '{}' closed", namespace.as_str());
        }
        self.cache.get_mut().clear();
    }

    /// Returns true while opened
    pub fn enabled(&self) -> bool {
        self.namespace.is_some()
    }

    /// Open namespace
    pub fn name(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Engine settings
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Text form used by backup, restore and migration
    pub fn text_format(&self) -> &TextFormat {
        &self.options.text
    }

    /// Borrowed backend
    pub fn storage(&self) -> &S {
        &*self.storage
    }

    /// Borrowed backend, mutably
    ///
    /// Writing through the backend directly bypasses the cache.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut *self.storage
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns true if the key is registered
    pub fn configured(&self, key: &str) -> bool {
        self.registry.lookup(key).is_some()
    }

    /// Returns true if the key has a persisted value
    ///
    /// Always false while unopened.
    pub fn stored(&self, key: &str) -> bool {
        self.enabled() && self.storage.has_key(key)
    }

    /// Registered keys in name order
    pub fn keys(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Registered key definition
    pub fn key(&self, name: &str) -> Option<&Key> {
        self.registry.lookup(name)
    }

    /// Canonical name of a registered key, for a name held in any buffer
    pub fn key_ref(&self, name: &str) -> Option<&str> {
        self.registry.lookup(name).map(Key::name)
    }

    /// Returns true for registered feature-flag keys
    pub fn is_enable_key(&self, name: &str) -> bool {
        self.registry.lookup(name).is_some_and(Key::is_enable_key)
    }

    /// Returns true for registered secret keys
    pub fn is_password_key(&self, name: &str) -> bool {
        self.registry.lookup(name).is_some_and(Key::is_password_key)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    fn lookup_for(&self, op: &str, key: &str) -> Result<&Key, ConfigError> {
        self.registry.lookup(key).ok_or_else(|| {
            log_warn!("{}({}): ERR_UNKNOWN_KEY", op, key);
            ConfigError::UnknownKey
        })
    }

    /// Run `f` on the current value of `key`: cache, then storage, then default
    ///
    /// `f` runs while the cache is borrowed and must not call back into the
    /// engine.
    pub(crate) fn with_resolved<R>(&self, key: &Key, f: impl FnOnce(&Value) -> R) -> R {
        if !self.enabled() {
            log_warn!("get({}): ERR_DISABLED", key.name());
            return f(key.default_value());
        }

        {
            let cache = self.cache.borrow();
            if let Some(value) = cache.get(key.name_key()) {
                log_trace!("get({}): CACHE HIT", key.name());
                return f(value);
            }
        }

        match load_value(&*self.storage, key.name(), key.kind()) {
            Some(value) => {
                log_debug!("get({}): CACHED", key.name());
                let result = f(&value);
                self.cache.borrow_mut().insert(key.name_key().clone(), value);
                result
            }
            None => {
                log_trace!("get({}): DEFAULT", key.name());
                f(key.default_value())
            }
        }
    }

    /// Current value of `key` as `T`
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownKey`] if the key is not registered,
    /// [`ConfigError::TypeMismatch`] if `T` is not the key's type.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T, ConfigError> {
        let k = self.lookup_for("get", key)?;
        self.with_resolved(k, |value| value.get::<T>())
    }

    /// Current value of `key`
    pub fn get_value(&self, key: &str) -> Result<Value, ConfigError> {
        self.get::<Value>(key)
    }

    /// Current value of a string key
    ///
    /// A literal default is returned borrowed, without allocation.
    pub fn get_string(&self, key: &str) -> Result<ManagedStr, ConfigError> {
        self.get::<ManagedStr>(key)
    }

    /// Returns true if a string key currently holds `""`
    pub fn is_empty(&self, key: &str) -> Result<bool, ConfigError> {
        let k = self.lookup_for("is_empty", key)?;
        self.with_resolved(k, |value| value.as_str().map(str::is_empty))
    }

    /// Returns true if a string key currently holds `expected`
    pub fn is_equal(&self, key: &str, expected: &str) -> Result<bool, ConfigError> {
        let k = self.lookup_for("is_equal", key)?;
        self.with_resolved(k, |value| {
            value
                .as_str()
                .map(|s| core::ptr::eq(s, expected) || s == expected)
        })
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Persist a value and fire the change callback
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Status {
        self.set_with(key, value, true)
    }

    /// Persist a value
    ///
    /// Writing the default of a key that has nothing persisted is a no-op
    /// reported as [`Status::Defaulted`].
    pub fn set_with(&mut self, key: &str, value: impl Into<Value>, fire: bool) -> Status {
        if !self.enabled() {
            log_warn!("set({}): {}", key, Status::ErrDisabled.as_str());
            return Status::ErrDisabled;
        }
        match self.registry.position(key) {
            Some(index) => self.write(index, value.into(), fire),
            None => {
                log_warn!("set({}): {}", key, Status::ErrUnknownKey.as_str());
                Status::ErrUnknownKey
            }
        }
    }

    /// Persist a copy of `value` into a string key
    pub fn set_string(&mut self, key: &str, value: &str) -> Status {
        self.set(key, ManagedStr::owned(value))
    }

    fn write(&mut self, index: usize, value: Value, fire: bool) -> Status {
        if !self.enabled() {
            return Status::ErrDisabled;
        }
        let Some(key) = self.registry.get(index) else {
            return Status::ErrUnknownKey;
        };
        let name = key.name();

        if value.kind() != key.kind() {
            log_warn!("set({}): {}", name, Status::ErrInvalidType.as_str());
            return Status::ErrInvalidType;
        }

        if !self.storage.has_key(name) && value == *key.default_value() {
            log_debug!("set({}): {}", name, Status::Defaulted.as_str());
            return Status::Defaulted;
        }

        if !self.validators.check(key.name_key(), &value) {
            log_debug!("set({}): {}", name, Status::ErrInvalidValue.as_str());
            return Status::ErrInvalidValue;
        }

        if let Err(err) = store_value(&mut *self.storage, name, &value) {
            log_error!("set({}): {} ({})", name, Status::ErrFailOnWrite.as_str(), err.as_str());
            return Status::ErrFailOnWrite;
        }
        log_debug!("set({}): {}", name, Status::Persisted.as_str());

        let cache = self.cache.get_mut();
        cache.insert(key.name_key().clone(), value);
        if fire {
            self.notifier.changed(name, cache.get(key.name_key()));
        }
        Status::Persisted
    }

    /// Apply several values, feature-flag keys last
    ///
    /// Non-enable keys are written first and enable keys second, each group
    /// in registry order, so a feature never switches on with stale
    /// dependent settings. Unknown names are skipped. Returns true if at least
    /// one write touched storage.
    pub fn set_all<I, K, V>(&mut self, settings: I, fire: bool) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut pending = self.pending();
        for (name, value) in settings {
            let name = name.as_ref();
            match self.registry.position(name) {
                Some(index) => pending[index] = Some(value.into()),
                None => log_warn!("set_all({}): {}", name, Status::ErrUnknownKey.as_str()),
            }
        }
        self.apply(pending, fire)
    }

    /// One empty slot per registered key
    pub(crate) fn pending(&self) -> Vec<Option<Value>> {
        let mut pending = Vec::new();
        pending.resize_with(self.registry.len(), || None);
        pending
    }

    /// Write pending values indexed by registry position, enable keys last
    pub(crate) fn apply(&mut self, mut pending: Vec<Option<Value>>, fire: bool) -> bool {
        let mut updated = false;
        for enable_pass in [false, true] {
            for (index, slot) in pending.iter_mut().enumerate() {
                let is_enable = self.registry.get(index).is_some_and(Key::is_enable_key);
                if is_enable != enable_pass {
                    continue;
                }
                if let Some(value) = slot.take() {
                    updated |= self.write(index, value, fire).is_storage_updated();
                }
            }
        }
        updated
    }

    /// Remove the persisted value and fire the change callback
    pub fn unset(&mut self, key: &str) -> Status {
        self.unset_with(key, true)
    }

    /// Remove the persisted value; the key reverts to its default
    ///
    /// Removing a key that was never persisted succeeds.
    pub fn unset_with(&mut self, key: &str, fire: bool) -> Status {
        if !self.enabled() {
            log_warn!("unset({}): {}", key, Status::ErrDisabled.as_str());
            return Status::ErrDisabled;
        }
        let Some(k) = self.registry.lookup(key) else {
            log_warn!("unset({}): {}", key, Status::ErrUnknownKey.as_str());
            return Status::ErrUnknownKey;
        };

        if let Err(err) = self.storage.remove(k.name()) {
            log_error!("unset({}): {} ({})", key, Status::ErrFailOnRemove.as_str(), err.as_str());
            return Status::ErrFailOnRemove;
        }

        self.cache.get_mut().remove(k.name_key());
        log_debug!("unset({}): {}", key, Status::Removed.as_str());
        if fire {
            self.notifier.changed(k.name(), None);
        }
        Status::Removed
    }

    /// Remove every persisted value and drop the cache
    ///
    /// Keys, validators and listeners are kept.
    pub fn clear(&mut self) -> Status {
        if !self.enabled() {
            log_warn!("clear(): {}", Status::ErrDisabled.as_str());
            return Status::ErrDisabled;
        }
        if let Err(err) = self.storage.remove_all() {
            log_error!("clear(): {} ({})", Status::ErrFailOnRemove.as_str(), err.as_str());
            return Status::ErrFailOnRemove;
        }
        self.cache.get_mut().clear();
        log_info!("clear(): {}", Status::Removed.as_str());
        Status::Removed
    }

    pub(crate) fn notify_restored(&mut self) {
        self.notifier.restored();
    }

    /// Split borrow for the migration pass
    pub(crate) fn migration_parts(&mut self) -> (&KeyRegistry, &mut S, &TextFormat) {
        (&self.registry, &mut *self.storage, &self.options.text)
    }

    /// Estimated heap bytes held by the engine
    ///
    /// Sums the registry and owned default strings, cached values and their
    /// owned strings, and the per-key validator table. An estimate, not an
    /// exact accounting.
    pub fn heap_usage(&self) -> usize {
        self.registry.heap_usage()
            + self.cache.borrow().heap_usage()
            + self.validators.heap_usage()
    }
}

impl<S: Storage + ?Sized> Drop for Config<'_, S> {
    fn drop(&mut self) {
        self.end();
    }
}

impl<S: Storage + ?Sized> core::fmt::Debug for Config<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("namespace", &self.namespace)
            .field("keys", &self.registry.len())
            .field("cached", &self.cache.borrow().len())
            .field("validators", &self.validators)
            .field("notifier", &self.notifier)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockStorage;
    use std::sync::{Arc, Mutex};

    type Events = Arc<Mutex<Vec<(String, Option<Value>)>>>;

    fn configured(storage: &mut MockStorage) -> Config<'_, MockStorage> {
        let mut config = Config::new(storage);
        config.configure("port", 80u16).unwrap();
        config.configure("host", "localhost").unwrap();
        config.configure("ratio", 0.5f32).unwrap();
        config.configure("mqtt_enable", false).unwrap();
        config.configure("mqtt_pwd", "").unwrap();
        config
    }

    fn opened(storage: &mut MockStorage) -> Config<'_, MockStorage> {
        let mut config = configured(storage);
        assert!(config.begin("CONFIG", false));
        config
    }

    fn record(config: &mut Config<'_, MockStorage>) -> Events {
        let events: Events = Arc::new(Mutex::new(Vec::new()));
        let log = events.clone();
        config.listen(move |key, value| {
            log.lock().unwrap().push((key.to_string(), value.cloned()));
        });
        events
    }

    #[test]
    fn test_defaults_before_any_set() {
        let mut storage = MockStorage::new();
        let config = opened(&mut storage);
        assert_eq!(config.get::<u16>("port"), Ok(80));
        assert_eq!(config.get_string("host").unwrap(), "localhost");
        assert_eq!(config.get::<f32>("ratio"), Ok(0.5));
        assert!(!config.stored("port"));
    }

    #[test]
    fn test_set_get_unset_cycle() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);

        assert_eq!(config.set("port", 8080u16), Status::Persisted);
        assert_eq!(config.get::<u16>("port"), Ok(8080));
        assert!(config.stored("port"));

        assert_eq!(config.unset("port"), Status::Removed);
        assert_eq!(config.get::<u16>("port"), Ok(80));
        assert!(!config.stored("port"));
    }

    #[test]
    fn test_unset_never_stored_is_removed() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        assert_eq!(config.unset("port"), Status::Removed);
        assert_eq!(config.storage().remove_count(), 0);
    }

    #[test]
    fn test_disabled_engine() {
        let mut storage = MockStorage::new();
        storage.seed("port", 8080u16);
        let mut config = configured(&mut storage);

        // Reads fall back to the default even though a value is persisted
        assert_eq!(config.get::<u16>("port"), Ok(80));
        assert!(!config.stored("port"));
        assert_eq!(config.set("port", 1u16), Status::ErrDisabled);
        assert_eq!(config.unset("port"), Status::ErrDisabled);
        assert_eq!(config.clear(), Status::ErrDisabled);
        // Disabled is reported before the key is looked up
        assert_eq!(config.set("nope", 1u16), Status::ErrDisabled);
    }

    #[test]
    fn test_unknown_key() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        assert_eq!(config.get::<u16>("nope"), Err(ConfigError::UnknownKey));
        assert_eq!(config.set("nope", 1u16), Status::ErrUnknownKey);
        assert_eq!(config.unset("nope"), Status::ErrUnknownKey);
        assert_eq!(config.is_empty("nope"), Err(ConfigError::UnknownKey));
    }

    #[test]
    fn test_type_mismatch_leaves_storage() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);

        assert_eq!(config.set("port", "oops"), Status::ErrInvalidType);
        assert_eq!(config.set("port", 8080i32), Status::ErrInvalidType);
        assert_eq!(config.get::<i32>("port"), Err(ConfigError::TypeMismatch));
        assert!(config.storage().is_empty());
    }

    #[test]
    fn test_defaulted_is_silent_noop() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        let events = record(&mut config);
        let validated = Arc::new(Mutex::new(0u32));
        let counter = validated.clone();
        config.set_global_validator(move |_, _| {
            *counter.lock().unwrap() += 1;
            true
        });

        assert_eq!(config.set("port", 80u16), Status::Defaulted);
        assert_eq!(config.storage().write_count(), 0);
        assert_eq!(*validated.lock().unwrap(), 0);
        assert!(events.lock().unwrap().is_empty());
        assert!(!config.stored("port"));
    }

    #[test]
    fn test_unset_skips_validators() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        assert_eq!(config.set("port", 8080u16), Status::Persisted);

        let validated = Arc::new(Mutex::new(0u32));
        let counter = validated.clone();
        config.set_global_validator(move |_, _| {
            *counter.lock().unwrap() += 1;
            false
        });

        assert_eq!(config.unset("port"), Status::Removed);
        assert_eq!(config.unset("host"), Status::Removed);
        assert_eq!(*validated.lock().unwrap(), 0);
        assert_eq!(config.get::<u16>("port"), Ok(80));
    }

    #[test]
    fn test_change_callback_receives_cached_value() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        let events = record(&mut config);

        assert_eq!(config.set_string("host", "example.com"), Status::Persisted);
        let cached = config.get_value("host").unwrap();
        assert_eq!(*events.lock().unwrap(), [(String::from("host"), Some(cached))]);
    }

    #[test]
    fn test_default_written_when_persisted() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);

        assert_eq!(config.set("port", 8080u16), Status::Persisted);
        assert_eq!(config.set("port", 80u16), Status::Persisted);
        assert_eq!(config.storage().entry("port"), Some(&Value::from(80u16)));
    }

    #[test]
    fn test_empty_string_is_not_default() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);

        assert_eq!(config.set_string("host", ""), Status::Persisted);
        assert_eq!(config.is_empty("host"), Ok(true));
        assert_eq!(config.is_equal("host", ""), Ok(true));
        assert_eq!(config.is_empty("port"), Err(ConfigError::TypeMismatch));
    }

    #[test]
    fn test_validator_veto_keeps_previous_value() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        let events = record(&mut config);

        assert_eq!(config.set("port", 8080u16), Status::Persisted);
        config
            .set_validator("port", |_, v| matches!(v, Value::U16(p) if *p >= 1024))
            .unwrap();

        assert_eq!(config.set("port", 22u16), Status::ErrInvalidValue);
        assert_eq!(config.get::<u16>("port"), Ok(8080));
        assert_eq!(config.storage().entry("port"), Some(&Value::from(8080u16)));
        assert_eq!(events.lock().unwrap().len(), 1);

        assert!(config.remove_validator("port"));
        assert_eq!(config.set("port", 22u16), Status::Persisted);
    }

    #[test]
    fn test_global_validator_applies_to_all_keys() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        config.set_global_validator(|key, _| key != "host");

        assert_eq!(config.set("host", "example.com"), Status::ErrInvalidValue);
        assert_eq!(config.set("port", 1u16), Status::Persisted);

        config.clear_global_validator();
        assert_eq!(config.set("host", "example.com"), Status::Persisted);
    }

    #[test]
    fn test_configure_with_validator() {
        let mut storage = MockStorage::new();
        let mut config = Config::new(&mut storage);
        config
            .configure_with("level", 1u8, |_, v| matches!(v, Value::U8(l) if *l <= 5))
            .unwrap();
        config.begin("CONFIG", false);

        assert_eq!(config.set("level", 9u8), Status::ErrInvalidValue);
        assert_eq!(config.set("level", 5u8), Status::Persisted);
        assert_eq!(config.set_validator("nope", |_, _| true), Err(ConfigError::UnknownKey));
    }

    #[test]
    fn test_write_failure_leaves_cache() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        let events = record(&mut config);

        assert_eq!(config.set("port", 8080u16), Status::Persisted);
        config.storage_mut().set_fail_writes(true);
        assert_eq!(config.set("port", 9090u16), Status::ErrFailOnWrite);
        assert_eq!(config.get::<u16>("port"), Ok(8080));
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_failure() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        assert_eq!(config.set("port", 8080u16), Status::Persisted);

        config.storage_mut().set_fail_removes(true);
        assert_eq!(config.unset("port"), Status::ErrFailOnRemove);
        assert_eq!(config.get::<u16>("port"), Ok(8080));
        assert_eq!(config.clear(), Status::ErrFailOnRemove);
    }

    #[test]
    fn test_change_events() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        let events = record(&mut config);

        config.set("port", 8080u16);
        config.unset("port");
        config.set_with("port", 1u16, false);
        config.unset_with("port", false);

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            [
                (String::from("port"), Some(Value::from(8080u16))),
                (String::from("port"), None),
            ]
        );
    }

    #[test]
    fn test_read_through_cache() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);

        assert_eq!(config.set("port", 8080u16), Status::Persisted);
        // Backend changed behind the engine: the cache wins
        config.storage_mut().store_u16("port", 1).unwrap();
        assert_eq!(config.get::<u16>("port"), Ok(8080));
    }

    #[test]
    fn test_defaults_are_not_cached() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);

        assert_eq!(config.get::<u16>("port"), Ok(80));
        config.storage_mut().store_u16("port", 443).unwrap();
        assert_eq!(config.get::<u16>("port"), Ok(443));
    }

    #[test]
    fn test_preload() {
        let mut storage = MockStorage::new();
        storage.seed("port", 8080u16);
        storage.seed("host", "legacy-string-type-ok");
        let mut config = configured(&mut storage);
        assert!(config.begin("CONFIG", true));

        config.storage_mut().store_u16("port", 1).unwrap();
        assert_eq!(config.get::<u16>("port"), Ok(8080));
        assert_eq!(config.get_string("host").unwrap(), "legacy-string-type-ok");
    }

    #[test]
    fn test_begin_failure_stays_unopened() {
        let mut storage = MockStorage::new();
        storage.set_fail_open(true);
        let mut config = configured(&mut storage);
        assert!(!config.begin("CONFIG", false));
        assert!(!config.enabled());
        assert_eq!(config.name(), None);
    }

    #[test]
    fn test_begin_rejects_long_namespace() {
        let mut storage = MockStorage::new();
        let mut config = configured(&mut storage);
        assert!(!config.begin("a_namespace_too_long", false));
        assert!(!config.storage().is_open());
        assert!(config.begin("exactly_15_char", false));
    }

    #[test]
    fn test_end_closes_and_drops_cache() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        assert_eq!(config.name(), Some("CONFIG"));
        config.set("port", 8080u16);

        config.end();
        assert!(!config.enabled());
        assert!(!config.storage().is_open());
        assert_eq!(config.get::<u16>("port"), Ok(80));

        assert!(config.begin("CONFIG", false));
        assert_eq!(config.get::<u16>("port"), Ok(8080));
    }

    #[test]
    fn test_drop_closes_storage() {
        let mut storage = MockStorage::new();
        {
            let _config = opened(&mut storage);
        }
        assert!(!storage.is_open());
    }

    #[test]
    fn test_set_all_enable_keys_last() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        let events = record(&mut config);

        let updated = config.set_all(
            [
                ("mqtt_enable", Value::from(true)),
                ("port", Value::from(1883u16)),
                ("unknown", Value::from(1u8)),
                ("host", Value::from("broker")),
            ],
            true,
        );
        assert!(updated);

        let order: Vec<String> = events.lock().unwrap().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(order, ["host", "port", "mqtt_enable"]);
    }

    #[test]
    fn test_set_all_without_change() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        assert!(!config.set_all([("port", 80u16)], true));
        assert!(!config.set_all([("port", "wrong type")], true));
    }

    #[test]
    fn test_clear() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        config.set("port", 8080u16);
        config.set("host", "example.com");
        config.set_validator("port", |_, _| true).unwrap();

        assert_eq!(config.clear(), Status::Removed);
        assert!(config.storage().is_empty());
        assert_eq!(config.get::<u16>("port"), Ok(80));
        assert!(config.configured("port"));
    }

    #[test]
    fn test_string_reads() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);

        let default = config.get_string("host").unwrap();
        assert!(default.is_borrowed());
        assert_eq!(config.is_equal("host", "localhost"), Ok(true));

        config.set_string("host", "example.com");
        let stored = config.get_string("host").unwrap();
        assert!(!stored.is_borrowed());
        assert_eq!(config.get::<String>("host").as_deref(), Ok("example.com"));
        assert_eq!(config.is_equal("host", "localhost"), Ok(false));
    }

    #[test]
    fn test_key_queries() {
        let mut storage = MockStorage::new();
        let mut config = configured(&mut storage);

        let buffer = String::from("mqtt_enable");
        let canonical = config.key_ref(&buffer).unwrap();
        assert_eq!(canonical, "mqtt_enable");
        assert!(!core::ptr::eq(canonical, buffer.as_str()));

        assert!(config.is_enable_key("mqtt_enable"));
        assert!(config.is_password_key("mqtt_pwd"));
        assert!(!config.is_password_key("nope"));
        assert_eq!(config.key("ratio").map(Key::kind), Some(cfgstore_core::ValueKind::F32));

        let names: Vec<&str> = config.keys().iter().map(Key::name).collect();
        assert_eq!(names, ["host", "mqtt_enable", "mqtt_pwd", "port", "ratio"]);

        assert_eq!(config.configure("port", 1u16), Err(ConfigError::DuplicateKey));
        assert_eq!(
            config.configure("a_very_long_key_name", 1u16),
            Err(ConfigError::KeyTooLong)
        );
    }

    #[test]
    fn test_heap_usage_follows_owned_cache_entries() {
        let mut storage = MockStorage::new();
        let mut config = opened(&mut storage);
        let base = config.heap_usage();

        config.set_string("host", "a-rather-long-host-name");
        let with_string = config.heap_usage();
        assert!(with_string > base);

        config.unset("host");
        assert!(config.heap_usage() < with_string);
    }
}
