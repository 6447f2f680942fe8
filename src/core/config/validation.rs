//! Validation pipeline
//!
//! An optional global validator and optional per-key validators inspect a
//! candidate value before it is persisted. The global validator runs first;
//! either one can veto. Validators never run for `unset` or for a write that
//! short-circuits as DEFAULTED.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use cfgstore_core::{KeyName, Value};
use core::mem::size_of;

/// Validator: `(key, candidate) -> accept`
pub type ValidatorCallback = Box<dyn FnMut(&str, &Value) -> bool + Send>;

/// Global and per-key validators
#[derive(Default)]
pub struct Validators {
    global: Option<ValidatorCallback>,
    per_key: BTreeMap<KeyName, ValidatorCallback>,
}

impl Validators {
    /// Create an empty pipeline
    pub const fn new() -> Self {
        Self {
            global: None,
            per_key: BTreeMap::new(),
        }
    }

    /// Install or replace the global validator
    pub fn set_global(&mut self, validator: ValidatorCallback) {
        self.global = Some(validator);
    }

    /// Remove the global validator
    pub fn clear_global(&mut self) {
        self.global = None;
    }

    /// Install or replace the validator of one key
    pub fn insert(&mut self, name: KeyName, validator: ValidatorCallback) {
        self.per_key.insert(name, validator);
    }

    /// Remove the validator of one key; returns true if one was installed
    pub fn remove(&mut self, name: &KeyName) -> bool {
        self.per_key.remove(name).is_some()
    }

    /// Run the pipeline; returns false on the first veto
    pub fn check(&mut self, name: &KeyName, value: &Value) -> bool {
        if let Some(global) = self.global.as_mut() {
            if !global(name.as_str(), value) {
                return false;
            }
        }
        match self.per_key.get_mut(name) {
            Some(validator) => validator(name.as_str(), value),
            None => true,
        }
    }

    /// Estimated heap bytes of the per-key table
    pub fn heap_usage(&self) -> usize {
        self.per_key.len()
            * (3 * size_of::<usize>() + size_of::<KeyName>() + size_of::<ValidatorCallback>())
    }
}

impl core::fmt::Debug for Validators {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Validators")
            .field("global", &self.global.is_some())
            .field("per_key", &self.per_key.len())
            .finish()
    }
}
