//! RP2350 platform support for Raspberry Pi Pico 2 W
//!
//! # Feature Gate
//!
//! This module is only available when the `rp2350` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! cfgstore = { version = "0.1", features = ["rp2350"] }
//! ```

mod memory;

pub use memory::{XipFlash, FIRMWARE_SIZE, XIP_BASE};
