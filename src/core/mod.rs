//! Core configuration functionality
//!
//! This module contains the configuration engine and the logging macros it
//! reports through.

pub mod config;
pub mod logging;
