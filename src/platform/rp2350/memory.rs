//! RP2350 program memory layout
//!
//! Flash is memory-mapped read-only through the XIP window. String literals
//! linked into the firmware image live there, so a `ManagedStr` can alias
//! them instead of copying.
//!
//! # Flash Layout
//!
//! ```text
//! [Firmware]      0x000000 - 0x040000 (256 KB) - program image
//! [Data]          0x040000 - 0x400000           - rewritten at runtime
//! ```
//!
//! Only the firmware region is reported as program memory: data sectors can
//! be erased while a borrowed string still points at them.

use cfgstore_core::ProgramMemory;

/// Start of the XIP flash window
pub const XIP_BASE: usize = 0x1000_0000;

/// Default firmware image size (first 256 KB of flash)
pub const FIRMWARE_SIZE: usize = 0x40000;

/// Program memory predicate for the RP2350 XIP window
#[derive(Debug, Clone, Copy)]
pub struct XipFlash {
    image_size: usize,
}

impl XipFlash {
    /// Predicate covering the default firmware region
    pub const fn new() -> Self {
        Self::with_image_size(FIRMWARE_SIZE)
    }

    /// Predicate covering `image_size` bytes from the start of flash
    ///
    /// `image_size` must not extend into sectors that are erased or written
    /// at runtime.
    pub const fn with_image_size(image_size: usize) -> Self {
        Self { image_size }
    }

    /// Size of the region treated as program memory
    pub const fn image_size(&self) -> usize {
        self.image_size
    }
}

impl Default for XipFlash {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: the firmware region is never erased while the program runs.
unsafe impl ProgramMemory for XipFlash {
    fn contains(&self, ptr: *const u8, len: usize) -> bool {
        let start = ptr as usize;
        let Some(end) = start.checked_add(len) else {
            return false;
        };
        start >= XIP_BASE && end <= XIP_BASE + self.image_size
    }
}
