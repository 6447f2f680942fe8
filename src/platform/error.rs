//! Platform error types
//!
//! This module defines error types for storage backend operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All storage backends map their driver-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// Storage operation failed
    Storage(StorageError),
}

/// Storage-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Namespace could not be opened
    OpenFailed,
    /// Write operation failed
    WriteFailed,
    /// Remove operation failed
    RemoveFailed,
    /// Backend does not persist this value type
    Unsupported,
}

impl StorageError {
    /// Error name as a static string (usable with defmt on embedded)
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageError::OpenFailed => "open failed",
            StorageError::WriteFailed => "write failed",
            StorageError::RemoveFailed => "remove failed",
            StorageError::Unsupported => "unsupported type",
        }
    }
}

impl From<StorageError> for PlatformError {
    fn from(err: StorageError) -> Self {
        PlatformError::Storage(err)
    }
}

impl PlatformError {
    /// Error description as a static string
    pub const fn as_str(self) -> &'static str {
        match self {
            PlatformError::Storage(e) => e.as_str(),
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Storage(e) => write!(f, "Storage error: {}", e.as_str()),
        }
    }
}
