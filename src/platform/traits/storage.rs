//! Storage backend trait
//!
//! Narrow capability interface between the configuration engine and a
//! persistent key-value backend (NVS partition, file, flash sector log).
//! Only `open`, `has_key` and the removal methods are mandatory. Typed store
//! and load pairs default to "unsupported" so a backend implements exactly
//! the value types it can persist; the engine only calls the pair matching a
//! key's configured type.
//!
//! Typed loads must be type-checked: `load_u16` on an entry written with
//! `store_str` returns `None`. Migration relies on this to detect legacy
//! string entries.

use crate::platform::error::StorageError;
use crate::platform::Result;
use alloc::string::String;
use cfgstore_core::{ManagedStr, Value, ValueKind};

/// Persistent key-value storage backend
pub trait Storage {
    /// Open a namespace
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::OpenFailed`] if the namespace is unavailable.
    fn open(&mut self, namespace: &str) -> Result<()>;

    /// Close the open namespace
    fn close(&mut self) {}

    /// Check if an entry exists (any type)
    fn has_key(&self, name: &str) -> bool;

    /// Remove an entry
    ///
    /// Removing an absent entry succeeds.
    fn remove(&mut self, name: &str) -> Result<()>;

    /// Remove every entry of the open namespace
    fn remove_all(&mut self) -> Result<()>;

    fn store_bool(&mut self, _name: &str, _value: bool) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_i8(&mut self, _name: &str, _value: i8) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_u8(&mut self, _name: &str, _value: u8) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_i16(&mut self, _name: &str, _value: i16) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_u16(&mut self, _name: &str, _value: u16) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_i32(&mut self, _name: &str, _value: i32) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_u32(&mut self, _name: &str, _value: u32) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_i64(&mut self, _name: &str, _value: i64) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_u64(&mut self, _name: &str, _value: u64) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_f32(&mut self, _name: &str, _value: f32) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_f64(&mut self, _name: &str, _value: f64) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }
    fn store_str(&mut self, _name: &str, _value: &str) -> Result<()> {
        Err(StorageError::Unsupported.into())
    }

    fn load_bool(&self, _name: &str) -> Option<bool> {
        None
    }
    fn load_i8(&self, _name: &str) -> Option<i8> {
        None
    }
    fn load_u8(&self, _name: &str) -> Option<u8> {
        None
    }
    fn load_i16(&self, _name: &str) -> Option<i16> {
        None
    }
    fn load_u16(&self, _name: &str) -> Option<u16> {
        None
    }
    fn load_i32(&self, _name: &str) -> Option<i32> {
        None
    }
    fn load_u32(&self, _name: &str) -> Option<u32> {
        None
    }
    fn load_i64(&self, _name: &str) -> Option<i64> {
        None
    }
    fn load_u64(&self, _name: &str) -> Option<u64> {
        None
    }
    fn load_f32(&self, _name: &str) -> Option<f32> {
        None
    }
    fn load_f64(&self, _name: &str) -> Option<f64> {
        None
    }
    fn load_str(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Write `value` through the typed store method of its alternative
pub fn store_value<S: Storage + ?Sized>(storage: &mut S, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Bool(v) => storage.store_bool(name, *v),
        Value::I8(v) => storage.store_i8(name, *v),
        Value::U8(v) => storage.store_u8(name, *v),
        Value::I16(v) => storage.store_i16(name, *v),
        Value::U16(v) => storage.store_u16(name, *v),
        Value::I32(v) => storage.store_i32(name, *v),
        Value::U32(v) => storage.store_u32(name, *v),
        Value::I64(v) => storage.store_i64(name, *v),
        Value::U64(v) => storage.store_u64(name, *v),
        Value::F32(v) => storage.store_f32(name, *v),
        Value::F64(v) => storage.store_f64(name, *v),
        Value::Str(s) => storage.store_str(name, s.as_str()),
    }
}

/// Read an entry through the typed load method of `kind`
///
/// Loaded strings are always owned.
pub fn load_value<S: Storage + ?Sized>(storage: &S, name: &str, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::Bool => storage.load_bool(name).map(Value::Bool),
        ValueKind::I8 => storage.load_i8(name).map(Value::I8),
        ValueKind::U8 => storage.load_u8(name).map(Value::U8),
        ValueKind::I16 => storage.load_i16(name).map(Value::I16),
        ValueKind::U16 => storage.load_u16(name).map(Value::U16),
        ValueKind::I32 => storage.load_i32(name).map(Value::I32),
        ValueKind::U32 => storage.load_u32(name).map(Value::U32),
        ValueKind::I64 => storage.load_i64(name).map(Value::I64),
        ValueKind::U64 => storage.load_u64(name).map(Value::U64),
        ValueKind::F32 => storage.load_f32(name).map(Value::F32),
        ValueKind::F64 => storage.load_f64(name).map(Value::F64),
        ValueKind::Str => storage
            .load_str(name)
            .map(|s| Value::Str(ManagedStr::from(s))),
    }
}
