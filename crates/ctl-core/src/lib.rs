//! ctl-core: stable foundation for ctlkit.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - timebase (continuous / discrete / unspecified system timebases)
//! - naming (system names and signal labels)
//! - units (angle and decibel conversions)
//! - config (analysis defaults)
//! - error (shared error types)

pub mod config;
pub mod error;
pub mod naming;
pub mod numeric;
pub mod timebase;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use config::AnalysisDefaults;
pub use error::{CtlError, CtlResult};
pub use naming::*;
pub use numeric::*;
pub use timebase::{Timebase, common_timebase};
pub use units::*;
