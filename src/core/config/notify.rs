//! Change notification
//!
//! One change callback and one restore-completed callback. Both run
//! synchronously on the caller's stack, inline with the triggering write.

use alloc::boxed::Box;
use cfgstore_core::Value;

/// Change callback: `(key, new value)`; `None` means reverted to default
///
/// The value reference is only valid for the duration of the call.
pub type ChangeCallback = Box<dyn FnMut(&str, Option<&Value>) + Send>;

/// Called once after a restore that changed at least one key
pub type RestoredCallback = Box<dyn FnMut() + Send>;

/// Registered listeners
#[derive(Default)]
pub struct Notifier {
    change: Option<ChangeCallback>,
    restored: Option<RestoredCallback>,
}

impl Notifier {
    /// Create a notifier without listeners
    pub const fn new() -> Self {
        Self {
            change: None,
            restored: None,
        }
    }

    /// Install or replace the change callback
    pub fn listen(&mut self, callback: ChangeCallback) {
        self.change = Some(callback);
    }

    /// Install or replace the restore-completed callback
    pub fn on_restored(&mut self, callback: RestoredCallback) {
        self.restored = Some(callback);
    }

    /// Notify a persisted value (`Some`) or a removal (`None`)
    pub fn changed(&mut self, key: &str, value: Option<&Value>) {
        if let Some(callback) = self.change.as_mut() {
            callback(key, value);
        }
    }

    /// Notify the end of a restore
    pub fn restored(&mut self) {
        if let Some(callback) = self.restored.as_mut() {
            callback();
        }
    }
}

impl core::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notifier")
            .field("change", &self.change.is_some())
            .field("restored", &self.restored.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;
    use std::sync::{Arc, Mutex};
    use std::vec::Vec;

    #[test]
    fn test_without_listeners_is_noop() {
        let mut notifier = Notifier::new();
        notifier.changed("a", None);
        notifier.restored();
    }

    #[test]
    fn test_change_events() {
        let events: Arc<Mutex<Vec<(String, Option<Value>)>>> = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = Notifier::new();

        let log = events.clone();
        notifier.listen(Box::new(move |key, value| {
            log.lock().unwrap().push((String::from(key), value.cloned()));
        }));

        notifier.changed("port", Some(&Value::from(8080u16)));
        notifier.changed("port", None);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], (String::from("port"), Some(Value::from(8080u16))));
        assert_eq!(events[1], (String::from("port"), None));
    }

    #[test]
    fn test_restored_replaces_previous() {
        let count = Arc::new(Mutex::new(0u32));
        let mut notifier = Notifier::new();
        notifier.on_restored(Box::new(|| panic!("replaced callback must not run")));

        let counter = count.clone();
        notifier.on_restored(Box::new(move || *counter.lock().unwrap() += 1));
        notifier.restored();
        notifier.restored();

        assert_eq!(*count.lock().unwrap(), 2);
    }
}
