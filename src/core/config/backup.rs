//! Text backup and restore
//!
//! # Format
//!
//! One `name=value` line per key, in registry (name) order. Values use the
//! canonical text form of [`TextFormat`]; CR or LF ends a value.
//!
//! ```text
//! host=example.com
//! mqtt_enable=true
//! port=8080
//! ```
//!
//! Restoring is all-or-nothing: lines naming unknown keys or without `=` are
//! ignored, but a malformed value for a registered key aborts the whole
//! restore before anything is written.

use super::engine::Config;
use super::PASSWORD_MASK;
use crate::platform::traits::storage::Storage;
use crate::{log_debug, log_warn};
use alloc::vec::Vec;
use cfgstore_core::{ConfigError, KeyRegistry, TextFormat, Value};
use core::fmt::{self, Write};

/// Parse a backup blob into values indexed by registry position
///
/// A key listed twice keeps its last value.
///
/// # Errors
///
/// [`ConfigError::InvalidData`] if the value of a registered key does not
/// parse as that key's type.
pub fn parse_backup(
    text: &str,
    registry: &KeyRegistry,
    format: &TextFormat,
) -> Result<Vec<Option<Value>>, ConfigError> {
    let mut pending = Vec::new();
    pending.resize_with(registry.len(), || None);

    for line in text.split(['\r', '\n']) {
        let Some((name, raw)) = line.split_once('=') else {
            continue;
        };
        let Some(index) = registry.position(name) else {
            continue;
        };
        let Some(key) = registry.get(index) else {
            continue;
        };
        match Value::parse(raw, key.default_value(), format) {
            Some(value) => pending[index] = Some(value),
            None => {
                log_warn!("restore({}): Invalid data!", key.name());
                return Err(ConfigError::InvalidData);
            }
        }
    }

    Ok(pending)
}

impl<S: Storage + ?Sized> Config<'_, S> {
    /// Write one `name=value` line per key
    ///
    /// Without `include_defaults`, keys that have nothing persisted are
    /// skipped. Secrets are written in clear so the output can be restored.
    pub fn backup<W: Write + ?Sized>(&self, out: &mut W, include_defaults: bool) -> fmt::Result {
        for key in self.keys() {
            if !include_defaults && !self.stored(key.name()) {
                continue;
            }
            out.write_str(key.name())?;
            out.write_char('=')?;
            self.with_resolved(key, |value| value.write_text(out, self.text_format()))?;
            out.write_char('\n')?;
        }
        Ok(())
    }

    /// Write every key like [`Config::backup`], masking password keys
    ///
    /// Meant for logs and diagnostics; the output cannot be restored.
    pub fn dump<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        for key in self.keys() {
            out.write_str(key.name())?;
            out.write_char('=')?;
            if key.is_password_key() {
                out.write_str(PASSWORD_MASK)?;
            } else {
                self.with_resolved(key, |value| value.write_text(out, self.text_format()))?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }

    /// Restore from a backup blob
    ///
    /// Returns `Ok(true)` if at least one key changed in storage, in which
    /// case the restore-completed callback has run once.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidData`] if any registered key has a malformed
    /// value; nothing is written in that case.
    pub fn restore_text(&mut self, text: &str) -> Result<bool, ConfigError> {
        let pending = parse_backup(text, self.keys(), self.text_format())?;
        Ok(self.finish_restore(pending))
    }

    /// Restore from `(name, text)` pairs
    ///
    /// Unknown names are skipped.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidData`] if any value fails to parse as its key's
    /// type; nothing is written in that case.
    pub fn restore_strings<I, K, V>(&mut self, settings: I) -> Result<bool, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pending = self.pending();
        for (name, raw) in settings {
            let name = name.as_ref();
            let Some(index) = self.keys().position(name) else {
                log_warn!("restore({}): Unknown key", name);
                continue;
            };
            let Some(key) = self.keys().get(index) else {
                continue;
            };
            match Value::parse(raw.as_ref(), key.default_value(), self.text_format()) {
                Some(value) => pending[index] = Some(value),
                None => {
                    log_warn!("restore({}): Invalid data!", name);
                    return Err(ConfigError::InvalidData);
                }
            }
        }
        Ok(self.finish_restore(pending))
    }

    /// Restore from `(name, value)` pairs
    ///
    /// Returns true if at least one key changed in storage.
    pub fn restore<I, K, V>(&mut self, settings: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut pending = self.pending();
        for (name, value) in settings {
            match self.keys().position(name.as_ref()) {
                Some(index) => pending[index] = Some(value.into()),
                None => log_warn!("restore({}): Unknown key", name.as_ref()),
            }
        }
        self.finish_restore(pending)
    }

    fn finish_restore(&mut self, pending: Vec<Option<Value>>) -> bool {
        log_debug!("Restoring {} settings", pending.iter().filter(|v| v.is_some()).count());
        let restored = self.apply(pending, true);
        if restored {
            log_debug!("Config restored");
            self.notify_restored();
        } else {
            log_debug!("No change detected");
        }
        restored
    }
}
