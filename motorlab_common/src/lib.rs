//! Motorlab Common Library
//!
//! Shared building blocks for every crate in the motorlab workspace:
//! constants, the wrapping microsecond time base, TOML configuration
//! loading, and the hardware abstraction traits that encoder and motor
//! drivers implement.
//!
//! # Module Structure
//!
//! - [`consts`] - Workspace-wide numeric limits and defaults
//! - [`time`] - `Ticks` time base and `Clock` implementations
//! - [`config`] - Configuration loading traits and types
//! - [`hal`] - Hardware abstraction traits, duty/fault types, board config
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use motorlab_common::prelude::*;
//!
//! let duty = Duty::saturating(150.0);
//! assert_eq!(duty.percent(), 100.0);
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod time;
