//! Outcome of a single `set` / `unset` / `migrate` operation

/// Status of a write operation
///
/// Successes are [`Status::Persisted`], [`Status::Defaulted`] and
/// [`Status::Removed`]; every other variant is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Value written to storage
    Persisted,
    /// Value equals the default and nothing is stored: no write happened
    Defaulted,
    /// Key removed from storage (or was already absent)
    Removed,
    /// Engine is not opened
    ErrDisabled,
    /// Key is not registered
    ErrUnknownKey,
    /// Value type differs from the key's registered type
    ErrInvalidType,
    /// A validator rejected the value
    ErrInvalidValue,
    /// Storage backend failed to write
    ErrFailOnWrite,
    /// Storage backend failed to remove
    ErrFailOnRemove,
}

impl Status {
    /// Returns true if the operation succeeded
    pub const fn is_ok(self) -> bool {
        matches!(self, Status::Persisted | Status::Defaulted | Status::Removed)
    }

    /// Returns true if the operation failed
    pub const fn is_err(self) -> bool {
        !self.is_ok()
    }

    /// Returns true only when the storage backend was actually touched
    pub const fn is_storage_updated(self) -> bool {
        matches!(self, Status::Persisted | Status::Removed)
    }

    /// Return variant name as a static string (usable with defmt on embedded)
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Persisted => "PERSISTED",
            Status::Defaulted => "DEFAULTED",
            Status::Removed => "REMOVED",
            Status::ErrDisabled => "ERR_DISABLED",
            Status::ErrUnknownKey => "ERR_UNKNOWN_KEY",
            Status::ErrInvalidType => "ERR_INVALID_TYPE",
            Status::ErrInvalidValue => "ERR_INVALID_VALUE",
            Status::ErrFailOnWrite => "ERR_FAIL_ON_WRITE",
            Status::ErrFailOnRemove => "ERR_FAIL_ON_REMOVE",
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
