//! Platform abstraction layer
//!
//! This module isolates everything the engine needs from the device: the
//! persistent storage backend and knowledge of the program memory layout.

pub mod error;
pub mod traits;

// Platform implementations (feature-gated)
#[cfg(feature = "rp2350")]
pub mod rp2350;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result, StorageError};
pub use traits::Storage;
