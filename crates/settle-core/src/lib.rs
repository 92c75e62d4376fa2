//! Core types for feed stabilization detection
//!
//! This crate holds the pieces shared by the detector and the driver:
//!
//! - [`Error`] / [`Result`]: the single error type of the workspace
//! - [`IntoSize`]: clamping of raw measurements into content sizes
//! - [`Observation`]: one timestamped measurement
//!
//! # Example
//!
//! ```rust
//! use settle_core::{clamp_size, Observation};
//!
//! assert_eq!(clamp_size(-12i64), 0);
//! assert_eq!(clamp_size(f64::NAN), 0);
//!
//! let obs = Observation::now(640.0f64);
//! assert_eq!(obs.size, 640);
//! ```

pub mod error;
pub mod observation;
pub mod size;

pub use error::{Error, Result};
pub use observation::Observation;
pub use size::{clamp_size, IntoSize};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::observation::Observation;
    pub use crate::size::{clamp_size, IntoSize};
}
