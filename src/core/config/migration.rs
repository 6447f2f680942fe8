//! One-shot schema migration
//!
//! Runs once per boot after a schema change and before [`Config::begin`]:
//! persisted entries written under an old type are reinterpreted under the
//! key's current type. Migration never touches the cache and never fires
//! change callbacks.
//!
//! # Example
//!
//! ```ignore
//! let mut migration = Migration::new(&mut config);
//! if migration.begin(DEFAULT_NAMESPACE) {
//!     let errors = migration.migrate_from_string();
//!     migration.end();
//!     if errors == 0 {
//!         config.begin(DEFAULT_NAMESPACE, false);
//!     }
//! }
//! ```

use super::engine::Config;
use crate::platform::traits::storage::{load_value, store_value, Storage};
use crate::{log_debug, log_error, log_info};
use cfgstore_core::{Status, Value, ValueKind, ValueType};

/// Migration session over an unopened engine
pub struct Migration<'c, 's, S: Storage + ?Sized> {
    config: &'c mut Config<'s, S>,
    /// Backend opened by `begin`
    opened: bool,
}

impl<'c, 's, S: Storage + ?Sized> Migration<'c, 's, S> {
    /// Create a migration session
    pub fn new(config: &'c mut Config<'s, S>) -> Self {
        Self {
            config,
            opened: false,
        }
    }

    /// Open the backend without enabling the engine
    ///
    /// Refused while the engine is opened: its cache would go stale.
    pub fn begin(&mut self, namespace: &str) -> bool {
        if self.config.enabled() {
            log_error!("Cannot migrate '{}': Config is opened", namespace);
            return false;
        }
        log_info!("Migrating Config '{}'", namespace);
        let (_, storage, _) = self.config.migration_parts();
        match storage.open(namespace) {
            Ok(()) => {
                self.opened = true;
                true
            }
            Err(err) => {
                log_error!("Failed to open storage backend: {}", err.as_str());
                false
            }
        }
    }

    /// Close the backend opened by `begin`
    pub fn end(&mut self) {
        if !self.opened {
            return;
        }
        self.opened = false;
        let (_, storage, _) = self.config.migration_parts();
        storage.close();
        log_info!("Migration ended");
    }

    /// Reinterpret the entry of `key` persisted as `T`
    ///
    /// - Nothing persisted as `T` (never stored, or already migrated):
    ///   [`Status::ErrUnknownKey`], nothing changes
    /// - `transform` returns `None`: the entry is removed, [`Status::Removed`]
    /// - `transform` returns a value of another type than the key's:
    ///   [`Status::ErrInvalidType`], nothing changes
    /// - Otherwise the new value replaces the entry: [`Status::Persisted`]
    ///
    /// Returns [`Status::ErrDisabled`] outside of `begin` / `end`.
    pub fn migrate<T, F>(&mut self, key: &str, transform: F) -> Status
    where
        T: ValueType,
        F: FnOnce(T) -> Option<Value>,
    {
        if !self.opened {
            log_error!("migrate({}): {}", key, Status::ErrDisabled.as_str());
            return Status::ErrDisabled;
        }
        let (registry, storage, _) = self.config.migration_parts();
        let Some(k) = registry.lookup(key) else {
            log_error!("migrate({}): {}", key, Status::ErrUnknownKey.as_str());
            return Status::ErrUnknownKey;
        };

        let Some(old) = load_value(&*storage, k.name(), T::KIND).and_then(|v| T::from_value(&v))
        else {
            log_debug!("migrate({}): nothing to migrate", key);
            return Status::ErrUnknownKey;
        };

        let Some(migrated) = transform(old) else {
            return match storage.remove(k.name()) {
                Ok(()) => {
                    log_debug!("migrate({}): {}", key, Status::Removed.as_str());
                    Status::Removed
                }
                Err(err) => {
                    log_error!("migrate({}): {} ({})", key, Status::ErrFailOnRemove.as_str(), err.as_str());
                    Status::ErrFailOnRemove
                }
            };
        };

        if migrated.kind() != k.kind() {
            log_error!("migrate({}): {}", key, Status::ErrInvalidType.as_str());
            return Status::ErrInvalidType;
        }

        // Backends keep one entry per name; drop the old typed entry first
        if T::KIND != k.kind() {
            if let Err(err) = storage.remove(k.name()) {
                log_error!("migrate({}): {} ({})", key, Status::ErrFailOnRemove.as_str(), err.as_str());
                return Status::ErrFailOnRemove;
            }
        }

        if let Err(err) = store_value(storage, k.name(), &migrated) {
            log_error!("migrate({}): {} ({})", key, Status::ErrFailOnWrite.as_str(), err.as_str());
            return Status::ErrFailOnWrite;
        }

        log_debug!("migrate({}): {}", key, Status::Persisted.as_str());
        Status::Persisted
    }

    /// Convert legacy string entries of non-string keys to their typed form
    ///
    /// Keys that are not persisted, or not persisted as a string, are left
    /// alone. Failures are counted and do not stop the pass. Returns the
    /// number of failures; the engine is only safe to open when it is zero.
    /// Outside of `begin` / `end` nothing runs and one failure is reported.
    pub fn migrate_from_string(&mut self) -> usize {
        if !self.opened {
            log_error!("migrate_from_string(): {}", Status::ErrDisabled.as_str());
            return 1;
        }
        let (registry, storage, format) = self.config.migration_parts();
        let mut errors = 0;

        for key in registry.iter() {
            if key.kind() == ValueKind::Str || !storage.has_key(key.name()) {
                continue;
            }

            // Not a string: already migrated
            let Some(text) = storage.load_str(key.name()) else {
                continue;
            };

            let Some(converted) = Value::parse(&text, key.default_value(), format) else {
                log_error!("migrate_from_string({}): Failed to convert from string", key.name());
                errors += 1;
                continue;
            };

            if storage.remove(key.name()).is_err() {
                log_error!("migrate_from_string({}): Failed to remove old string value", key.name());
                errors += 1;
                continue;
            }

            if store_value(storage, key.name(), &converted).is_err() {
                log_error!("migrate_from_string({}): Failed to store converted value", key.name());
                errors += 1;
                continue;
            }

            log_debug!("migrate_from_string({}): {}", key.name(), Status::Persisted.as_str());
        }

        if errors > 0 {
            log_error!("migrate_from_string(): {} error(s)!", errors);
        }
        errors
    }
}
