//! cfgstore_core - Pure no_std types for the cfgstore configuration engine
//!
//! This crate contains the platform-agnostic value model of the engine and
//! can be tested on host without any feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: Only `core` and `alloc`
//! - **Trait abstractions**: Platform knowledge (program memory layout) is
//!   injected via traits
//!
//! # Modules
//!
//! - [`value`]: Typed values, ownership-polymorphic strings, text form
//! - [`key`]: Key definitions and the sorted registry
//! - [`status`]: Outcome of a single write or removal
//! - [`error`]: Schema errors

#![no_std]

extern crate alloc;

pub mod error;
pub mod key;
pub mod status;
pub mod value;

pub use error::ConfigError;
pub use key::{Key, KeyFlags, KeyName, KeyRegistry, MAX_KEY_LEN};
pub use status::Status;
pub use value::{
    FromValue, Int, ManagedStr, NoProgramMemory, ProgramMemory, TextFormat, UInt, Value,
    ValueKind, ValueType,
};
