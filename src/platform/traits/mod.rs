//! Platform abstraction traits
//!
//! This module defines the traits that storage backends must provide.

pub mod storage;

// Re-export trait interfaces
pub use storage::{load_value, store_value, Storage};
