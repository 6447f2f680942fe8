//! Mock storage implementation for testing
//!
//! Provides an in-memory typed key-value backend for unit tests.

use crate::platform::{error::StorageError, traits::Storage, Result};
use alloc::collections::BTreeMap;
use alloc::string::String;
use cfgstore_core::Value;

/// Mock storage backend
///
/// Keeps entries in memory together with the type they were written with, so
/// typed loads behave like an NVS partition (a `u16` read of a string entry
/// misses). Supports:
/// - Failure injection on open, write and remove
/// - Write/remove counters to check that no-op paths never touch storage
/// - Seeding raw entries (e.g. legacy strings) before any namespace is open
///
/// Entries are only readable and writable while a namespace is open.
///
/// # Example
///
/// ```ignore
/// use cfgstore::platform::mock::MockStorage;
/// use cfgstore::platform::traits::Storage;
///
/// let mut storage = MockStorage::new();
/// storage.seed("key1", "true");
/// storage.open("CONFIG").unwrap();
///
/// assert_eq!(storage.load_str("key1").as_deref(), Some("true"));
/// assert_eq!(storage.load_bool("key1"), None);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    /// Open namespace
    namespace: Option<String>,
    /// Persisted entries
    entries: BTreeMap<String, Value>,
    /// Make the next `open` calls fail
    fail_open: bool,
    /// Make every store fail
    fail_writes: bool,
    /// Make every removal fail
    fail_removes: bool,
    /// Successful stores
    write_count: usize,
    /// Successful removals of an existing entry
    remove_count: usize,
}

impl MockStorage {
    /// Create an empty mock backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw entry regardless of open state or injected failures
    pub fn seed(&mut self, name: &str, value: impl Into<Value>) {
        self.entries.insert(String::from(name), value.into());
    }

    /// Raw entry with its stored type (for test verification)
    pub fn entry(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Number of persisted entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is persisted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open namespace, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns true while a namespace is open
    pub fn is_open(&self) -> bool {
        self.namespace.is_some()
    }

    /// Inject open failures
    pub fn set_fail_open(&mut self, fail: bool) {
        self.fail_open = fail;
    }

    /// Inject write failures
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Inject removal failures
    pub fn set_fail_removes(&mut self, fail: bool) {
        self.fail_removes = fail;
    }

    /// Number of successful stores
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Number of removals that deleted an entry
    pub fn remove_count(&self) -> usize {
        self.remove_count
    }

    fn store(&mut self, name: &str, value: Value) -> Result<()> {
        if self.fail_writes || !self.is_open() {
            return Err(StorageError::WriteFailed.into());
        }
        self.entries.insert(String::from(name), value);
        self.write_count += 1;
        Ok(())
    }

    fn load(&self, name: &str) -> Option<&Value> {
        if !self.is_open() {
            return None;
        }
        self.entries.get(name)
    }
}

/// Implement the typed store/load pair for a scalar alternative
macro_rules! mock_scalar {
    ($($store:ident, $load:ident => $ty:ty, $variant:ident;)*) => {
        $(
            fn $store(&mut self, name: &str, value: $ty) -> Result<()> {
                self.store(name, Value::$variant(value))
            }

            fn $load(&self, name: &str) -> Option<$ty> {
                match self.load(name) {
                    Some(Value::$variant(v)) => Some(*v),
                    _ => None,
                }
            }
        )*
    };
}

impl Storage for MockStorage {
    fn open(&mut self, namespace: &str) -> Result<()> {
        if self.fail_open {
            return Err(StorageError::OpenFailed.into());
        }
        self.namespace = Some(String::from(namespace));
        Ok(())
    }

    fn close(&mut self) {
        self.namespace = None;
    }

    fn has_key(&self, name: &str) -> bool {
        self.load(name).is_some()
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        if self.fail_removes || !self.is_open() {
            return Err(StorageError::RemoveFailed.into());
        }
        if self.entries.remove(name).is_some() {
            self.remove_count += 1;
        }
        Ok(())
    }

    fn remove_all(&mut self) -> Result<()> {
        if self.fail_removes || !self.is_open() {
            return Err(StorageError::RemoveFailed.into());
        }
        self.remove_count += self.entries.len();
        self.entries.clear();
        Ok(())
    }

    mock_scalar! {
        store_bool, load_bool => bool, Bool;
        store_i8, load_i8 => i8, I8;
        store_u8, load_u8 => u8, U8;
        store_i16, load_i16 => i16, I16;
        store_u16, load_u16 => u16, U16;
        store_i32, load_i32 => i32, I32;
        store_u32, load_u32 => u32, U32;
        store_i64, load_i64 => i64, I64;
        store_u64, load_u64 => u64, U64;
        store_f32, load_f32 => f32, F32;
        store_f64, load_f64 => f64, F64;
    }

    fn store_str(&mut self, name: &str, value: &str) -> Result<()> {
        self.store(name, Value::from(String::from(value)))
    }

    fn load_str(&self, name: &str) -> Option<String> {
        match self.load(name) {
            Some(Value::Str(s)) => Some(String::from(s.as_str())),
            _ => None,
        }
    }
}
