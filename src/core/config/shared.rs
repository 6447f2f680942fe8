//! Shared access to one engine
//!
//! [`Config`] takes `&mut self` for every write. Application code that reads
//! and writes from several tasks wraps the engine in one of the
//! [`SharedConfig`] implementations:
//!
//! - `EmbassyConfig` for embedded targets, behind Embassy's critical-section
//!   Mutex (feature `embassy`)
//! - [`LocalConfig`] for host tests and single-threaded code, behind a
//!   `RefCell`
//!
//! Callbacks and validators run while the engine is locked; calling back into
//! the same wrapper from them panics (`LocalConfig`) or re-enters the
//! critical section (`EmbassyConfig`).

use super::engine::Config;
use crate::platform::traits::storage::Storage;
use cfgstore_core::{ConfigError, FromValue, Status, Value};
use core::cell::RefCell;

/// Synchronized access to a [`Config`]
///
/// # Example
///
/// ```ignore
/// fn bump_boot_count<C: SharedConfig<'static, FlashStorage>>(config: &C) -> Status {
///     let count = config.get::<u32>("boot_count").unwrap_or(0);
///     config.set("boot_count", count + 1)
/// }
/// ```
pub trait SharedConfig<'s, S: Storage + ?Sized + 's> {
    /// Access the engine immutably
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Config<'s, S>) -> R;

    /// Access the engine mutably
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Config<'s, S>) -> R;

    /// See [`Config::get`]
    fn get<T: FromValue>(&self, key: &str) -> Result<T, ConfigError> {
        self.with(|config| config.get::<T>(key))
    }

    /// See [`Config::set`]
    fn set(&self, key: &str, value: impl Into<Value>) -> Status {
        self.with_mut(|config| config.set(key, value))
    }

    /// See [`Config::unset`]
    fn unset(&self, key: &str) -> Status {
        self.with_mut(|config| config.unset(key))
    }

    /// See [`Config::enabled`]
    fn enabled(&self) -> bool {
        self.with(|config| config.enabled())
    }
}

#[cfg(feature = "embassy")]
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Engine behind Embassy's critical-section Mutex
///
/// Safe to use from async tasks and interrupt handlers.
#[cfg(feature = "embassy")]
pub struct EmbassyConfig<'s, S: Storage + ?Sized> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Config<'s, S>>>,
}

#[cfg(feature = "embassy")]
impl<'s, S: Storage + ?Sized> EmbassyConfig<'s, S> {
    /// Wrap an engine
    pub const fn new(config: Config<'s, S>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(config)),
        }
    }
}

#[cfg(feature = "embassy")]
impl<'s, S: Storage + ?Sized + 's> SharedConfig<'s, S> for EmbassyConfig<'s, S> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Config<'s, S>) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Config<'s, S>) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Engine behind a `RefCell`, for single-threaded use
///
/// # Panics
///
/// `with_mut` panics if called while another access is active, e.g. from a
/// change callback.
pub struct LocalConfig<'s, S: Storage + ?Sized> {
    inner: RefCell<Config<'s, S>>,
}

impl<'s, S: Storage + ?Sized> LocalConfig<'s, S> {
    /// Wrap an engine
    pub fn new(config: Config<'s, S>) -> Self {
        Self {
            inner: RefCell::new(config),
        }
    }

    /// Unwrap the engine
    pub fn into_inner(self) -> Config<'s, S> {
        self.inner.into_inner()
    }
}

impl<'s, S: Storage + ?Sized + 's> SharedConfig<'s, S> for LocalConfig<'s, S> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Config<'s, S>) -> R,
    {
        f(&self.inner.borrow())
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Config<'s, S>) -> R,
    {
        f(&mut self.inner.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockStorage;

    fn bump<'s, C: SharedConfig<'s, MockStorage>>(config: &C) -> Status {
        let count = config.get::<u32>("boots").unwrap_or(0);
        config.set("boots", count + 1)
    }

    #[test]
    fn test_local_config_roundtrip() {
        let mut storage = MockStorage::new();
        let mut config = Config::new(&mut storage);
        config.configure("boots", 0u32).unwrap();
        config.begin("CONFIG", false);

        let shared = LocalConfig::new(config);
        assert!(shared.enabled());
        assert_eq!(bump(&shared), Status::Persisted);
        assert_eq!(bump(&shared), Status::Persisted);
        assert_eq!(shared.get::<u32>("boots"), Ok(2));
        assert_eq!(shared.with(|c| c.storage().write_count()), 2);

        assert_eq!(shared.unset("boots"), Status::Removed);
        let config = shared.into_inner();
        assert_eq!(config.get::<u32>("boots"), Ok(0));
    }

    #[test]
    #[should_panic(expected = "already borrowed")]
    fn test_local_config_reentry_panics() {
        let mut storage = MockStorage::new();
        let shared = LocalConfig::new(Config::new(&mut storage));
        shared.with(|_| {
            shared.with_mut(|_| ());
        });
    }

    #[cfg(feature = "embassy")]
    #[test]
    fn test_embassy_config() {
        let mut storage = MockStorage::new();
        let mut config = Config::new(&mut storage);
        config.configure("boots", 0u32).unwrap();
        config.begin("CONFIG", false);

        let shared = EmbassyConfig::new(config);
        assert_eq!(bump(&shared), Status::Persisted);
        assert_eq!(shared.get::<u32>("boots"), Ok(1));
    }
}
