//! Configuration error types
//!
//! Schema errors raised at the registration and typed-access boundaries.
//! Outcomes of `set`/`unset` are reported as [`crate::Status`] values instead.

/// Errors from key registration and typed value access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Key is not registered
    UnknownKey,
    /// Requested type does not match the value's active alternative
    TypeMismatch,
    /// Key name exceeds [`crate::MAX_KEY_LEN`] bytes
    KeyTooLong,
    /// Key name is empty, not ASCII, or contains a reserved character
    InvalidKeyName,
    /// Key name is already registered
    DuplicateKey,
    /// Textual value could not be parsed for the key's type
    InvalidData,
}

impl ConfigError {
    /// Error description as a static string (usable with defmt on embedded)
    pub const fn as_str(self) -> &'static str {
        match self {
            ConfigError::UnknownKey => "unknown configuration key",
            ConfigError::TypeMismatch => "value type mismatch",
            ConfigError::KeyTooLong => "key name too long",
            ConfigError::InvalidKeyName => "invalid key name",
            ConfigError::DuplicateKey => "key already configured",
            ConfigError::InvalidData => "invalid value data",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
