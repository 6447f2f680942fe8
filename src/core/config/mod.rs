//! Configuration engine
//!
//! This module provides the typed configuration store: key registration,
//! the read-through cache, validation, change notification, text backup and
//! restore, one-shot schema migration, and shared access wrappers.
//!
//! Values are persisted through a [`Storage`](crate::platform::traits::Storage)
//! backend that the engine borrows for its whole lifetime.

pub mod backup;
pub mod cache;
pub mod engine;
pub mod migration;
pub mod notify;
pub mod shared;
pub mod validation;

use cfgstore_core::key::{DEFAULT_ENABLE_SUFFIX, DEFAULT_PASSWORD_SUFFIX};
use cfgstore_core::TextFormat;

// Re-export commonly used types
pub use cache::Cache;
pub use engine::{Config, Namespace};
pub use migration::Migration;
pub use notify::{ChangeCallback, Notifier, RestoredCallback};
#[cfg(feature = "embassy")]
pub use shared::EmbassyConfig;
pub use shared::{LocalConfig, SharedConfig};
pub use validation::{ValidatorCallback, Validators};

/// Namespace opened when the caller has no preference
pub const DEFAULT_NAMESPACE: &str = "CONFIG";

/// Replacement text for password values in human-facing exports
pub const PASSWORD_MASK: &str = "********";

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOptions {
    /// Suffix of feature-flag keys, applied last during bulk restore
    pub enable_suffix: &'static str,
    /// Suffix of secret keys
    pub password_suffix: &'static str,
    /// Text form used by backup, restore and migration
    pub text: TextFormat,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            enable_suffix: DEFAULT_ENABLE_SUFFIX,
            password_suffix: DEFAULT_PASSWORD_SUFFIX,
            text: TextFormat::DEFAULT,
        }
    }
}
