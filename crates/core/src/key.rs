//! Key definitions and the sorted key registry
//!
//! A [`Key`] pairs a short name with its default [`Value`]. The registry keeps
//! keys sorted by name so lookup is a binary search and iteration (backup,
//! bulk restore, preload) always runs in name order.

use crate::error::ConfigError;
use crate::value::{Value, ValueKind};
use alloc::vec::Vec;
use bitflags::bitflags;

/// Maximum key name length in bytes (NVS key limit)
pub const MAX_KEY_LEN: usize = 15;

/// Default suffix marking feature-flag keys
pub const DEFAULT_ENABLE_SUFFIX: &str = "_enable";

/// Default suffix marking secret keys
pub const DEFAULT_PASSWORD_SUFFIX: &str = "_pwd";

/// Inline key name storage
pub type KeyName = heapless::String<MAX_KEY_LEN>;

bitflags! {
    /// Key classification flags, derived from the name at registration
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyFlags: u8 {
        /// Name ends with the enable suffix; applied last during bulk restore
        const ENABLE = 0b00000001;
        /// Name ends with the password suffix; value must be masked on export
        const PASSWORD = 0b00000010;
    }
}

/// Registered configuration key
///
/// Immutable once registered. The alternative held by the default is the
/// permanent type of the key.
#[derive(Debug)]
pub struct Key {
    name: KeyName,
    default: Value,
    flags: KeyFlags,
}

impl Key {
    /// Key name
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Key name as inline storage
    pub fn name_key(&self) -> &KeyName {
        &self.name
    }

    /// Compiled-in default value
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Type contract of this key
    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    /// Classification flags
    pub fn flags(&self) -> KeyFlags {
        self.flags
    }

    /// Returns true for feature-flag keys
    pub fn is_enable_key(&self) -> bool {
        self.flags.contains(KeyFlags::ENABLE)
    }

    /// Returns true for secret keys
    pub fn is_password_key(&self) -> bool {
        self.flags.contains(KeyFlags::PASSWORD)
    }
}

/// Check a key name and copy it into inline storage
///
/// # Errors
///
/// - [`ConfigError::InvalidKeyName`] if the name is empty, not ASCII, or
///   contains `=`, CR, LF or another control character (these would break the
///   `name=value` backup format)
/// - [`ConfigError::KeyTooLong`] if the name exceeds [`MAX_KEY_LEN`] bytes
pub fn validate_name(name: &str) -> Result<KeyName, ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::InvalidKeyName);
    }
    if name.len() > MAX_KEY_LEN {
        return Err(ConfigError::KeyTooLong);
    }
    if !name.bytes().all(|b| b.is_ascii() && !b.is_ascii_control() && b != b'=') {
        return Err(ConfigError::InvalidKeyName);
    }

    let mut key = KeyName::new();
    key.push_str(name).map_err(|_| ConfigError::KeyTooLong)?;
    Ok(key)
}

/// Name-sorted collection of registered keys
#[derive(Debug)]
pub struct KeyRegistry {
    keys: Vec<Key>,
    enable_suffix: &'static str,
    password_suffix: &'static str,
}

impl KeyRegistry {
    /// Create an empty registry with the default suffixes
    pub const fn new() -> Self {
        Self::with_suffixes(DEFAULT_ENABLE_SUFFIX, DEFAULT_PASSWORD_SUFFIX)
    }

    /// Create an empty registry with custom enable/password suffixes
    ///
    /// An empty suffix disables the matching classification.
    pub const fn with_suffixes(enable_suffix: &'static str, password_suffix: &'static str) -> Self {
        Self {
            keys: Vec::new(),
            enable_suffix,
            password_suffix,
        }
    }

    /// Register a key
    ///
    /// Returns the registry position of the new key. Positions of keys sorted
    /// after it shift by one.
    ///
    /// # Errors
    ///
    /// Name errors from [`validate_name`], or [`ConfigError::DuplicateKey`]
    /// when the name is already registered (the first definition is kept).
    pub fn configure(&mut self, name: &str, default: Value) -> Result<usize, ConfigError> {
        let name = validate_name(name)?;
        let index = match self.keys.binary_search_by(|k| k.name().cmp(name.as_str())) {
            Ok(_) => return Err(ConfigError::DuplicateKey),
            Err(index) => index,
        };

        let flags = self.classify(name.as_str());
        self.keys.insert(
            index,
            Key {
                name,
                default,
                flags,
            },
        );
        Ok(index)
    }

    fn classify(&self, name: &str) -> KeyFlags {
        let mut flags = KeyFlags::empty();
        if !self.enable_suffix.is_empty() && name.ends_with(self.enable_suffix) {
            flags |= KeyFlags::ENABLE;
        }
        if !self.password_suffix.is_empty() && name.ends_with(self.password_suffix) {
            flags |= KeyFlags::PASSWORD;
        }
        flags
    }

    /// Position of `name` in the registry
    pub fn position(&self, name: &str) -> Option<usize> {
        let index = self.keys.partition_point(|k| k.name() < name);
        let key = self.keys.get(index)?;
        let candidate = key.name();
        // Callers that reuse `Key::name()` hit the identity check
        if core::ptr::eq(candidate, name) || candidate == name {
            Some(index)
        } else {
            None
        }
    }

    /// Find a key by name
    pub fn lookup(&self, name: &str) -> Option<&Key> {
        self.position(name).map(|index| &self.keys[index])
    }

    /// Key at registry position
    pub fn get(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    /// Iterate keys in name order
    pub fn iter(&self) -> core::slice::Iter<'_, Key> {
        self.keys.iter()
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no key is registered
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Estimated heap bytes held by the registry and its default values
    pub fn heap_usage(&self) -> usize {
        self.keys.capacity() * core::mem::size_of::<Key>()
            + self.keys.iter().map(|k| k.default.heap_usage()).sum::<usize>()
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a KeyRegistry {
    type Item = &'a Key;
    type IntoIter = core::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
