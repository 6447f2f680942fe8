//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```ignore
//! use cfgstore::platform::mock::MockStorage;
//! use cfgstore::platform::traits::Storage;
//!
//! let mut storage = MockStorage::new();
//! storage.open("CONFIG").unwrap();
//! storage.store_u16("port", 8080).unwrap();
//! assert_eq!(storage.load_u16("port"), Some(8080));
//! ```

#![cfg(any(test, feature = "mock"))]

mod storage;

pub use storage::MockStorage;
