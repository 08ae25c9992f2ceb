//! Operator interface building blocks used by the user task.
//!
//! - [`entry`] - Keystroke numeric entry
//! - [`recorder`] - Fixed-capacity capture buffers
//! - [`terminal`] - Non-blocking console trait and implementations

pub mod entry;
pub mod recorder;
pub mod terminal;
