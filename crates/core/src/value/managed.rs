//! Ownership-polymorphic string
//!
//! [`ManagedStr`] either borrows memory that stays valid for the whole
//! program (string literals, read-only flash) or owns an independent heap
//! copy. Literal defaults therefore cost zero bytes of heap, which matters on
//! devices that register hundreds of keys.
//!
//! # Ownership rules
//!
//! - Cloning a borrowed string yields another borrowed string (no allocation)
//! - Cloning an owned string deep-copies the buffer
//! - Moving is always O(1); `core::mem::take` leaves an empty borrowed string
//! - Dropping frees memory only in the owned mode

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::ops::Deref;

/// Answers whether an address range is permanently mapped program memory
///
/// The decision "can this string be aliased instead of copied" is platform
/// specific (e.g. the XIP flash window on RP2350), so it is injected rather
/// than hardcoded.
///
/// # Safety
///
/// Implementations must only return `true` for ranges that stay mapped,
/// readable and unmodified until the program terminates. Returning `true`
/// for heap or stack memory leads to use-after-free.
pub unsafe trait ProgramMemory {
    /// Returns true if `len` bytes starting at `ptr` are program memory
    fn contains(&self, ptr: *const u8, len: usize) -> bool;
}

/// Program memory predicate that never matches
///
/// Default for host builds: every runtime string is copied.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgramMemory;

// SAFETY: never claims any range.
unsafe impl ProgramMemory for NoProgramMemory {
    fn contains(&self, _ptr: *const u8, _len: usize) -> bool {
        false
    }
}

/// String that is either borrowed for `'static` or owned on the heap
#[derive(Clone)]
pub enum ManagedStr {
    /// Permanently valid memory, never freed
    Borrowed(&'static str),
    /// Heap buffer owned by this value
    Owned(Box<str>),
}

impl ManagedStr {
    /// Wrap a string known at compile time to live forever
    pub const fn from_static(s: &'static str) -> Self {
        ManagedStr::Borrowed(s)
    }

    /// Deep-copy an arbitrary runtime string
    pub fn owned(s: &str) -> Self {
        ManagedStr::Owned(Box::from(s))
    }

    /// Borrow `s` if `memory` reports it as program memory, copy otherwise
    pub fn from_str_in<M: ProgramMemory + ?Sized>(s: &str, memory: &M) -> Self {
        if memory.contains(s.as_ptr(), s.len()) {
            // SAFETY: `ProgramMemory` guarantees the range is never unmapped or modified.
            let s: &'static str = unsafe { &*(s as *const str) };
            ManagedStr::Borrowed(s)
        } else {
            ManagedStr::owned(s)
        }
    }

    /// Get the string contents
    pub fn as_str(&self) -> &str {
        match self {
            ManagedStr::Borrowed(s) => s,
            ManagedStr::Owned(s) => s,
        }
    }

    /// Returns true if this string aliases permanent memory
    pub fn is_borrowed(&self) -> bool {
        matches!(self, ManagedStr::Borrowed(_))
    }

    /// Heap bytes owned by this string
    ///
    /// Zero for borrowed strings, `len + 1` for owned ones (the terminator
    /// the flash backends expect is counted).
    pub fn heap_usage(&self) -> usize {
        match self {
            ManagedStr::Borrowed(_) => 0,
            ManagedStr::Owned(s) => s.len() + 1,
        }
    }

    /// Convert into an owned `String`, reusing the buffer when owned
    pub fn into_string(self) -> String {
        match self {
            ManagedStr::Borrowed(s) => String::from(s),
            ManagedStr::Owned(s) => s.into_string(),
        }
    }
}

impl Default for ManagedStr {
    fn default() -> Self {
        ManagedStr::Borrowed("")
    }
}

impl Deref for ManagedStr {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for ManagedStr {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for ManagedStr {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.as_str(), other.as_str());
        core::ptr::eq(a, b) || a == b
    }
}

impl Eq for ManagedStr {}

impl PartialEq<str> for ManagedStr {
    fn eq(&self, other: &str) -> bool {
        let a = self.as_str();
        core::ptr::eq(a, other) || a == other
    }
}

impl PartialEq<&str> for ManagedStr {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl From<&'static str> for ManagedStr {
    fn from(s: &'static str) -> Self {
        ManagedStr::Borrowed(s)
    }
}

impl From<String> for ManagedStr {
    fn from(s: String) -> Self {
        ManagedStr::Owned(s.into_boxed_str())
    }
}

impl fmt::Debug for ManagedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ManagedStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
