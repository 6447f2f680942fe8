#![cfg_attr(not(test), no_std)]

//! cfgstore - Typed persistent key-value configuration store for embedded devices
//!
//! This library registers typed keys with compiled-in defaults, persists
//! changed values through a pluggable storage backend, and keeps a
//! read-through cache in front of it. Validation, change notification, text
//! backup and restore, and one-shot schema migration sit on top.

extern crate alloc;

// Platform abstraction layer (storage backends, program memory layout)
pub mod platform;

// Configuration engine
pub mod core;

pub use crate::core::config::{
    Config, ConfigOptions, LocalConfig, Migration, SharedConfig, DEFAULT_NAMESPACE, PASSWORD_MASK,
};
#[cfg(feature = "embassy")]
pub use crate::core::config::EmbassyConfig;
pub use cfgstore_core::{
    ConfigError, FromValue, Key, KeyFlags, ManagedStr, Status, TextFormat, Value, ValueKind,
    ValueType,
};
