//! Analysis of linear systems: pole/zero maps, root loci and disk margins.
//!
//! Every function returns plot-ready data; rendering is left to callers.

pub mod error;
pub mod margins;
pub mod pzmap;
pub mod rlocus;

pub use error::{AnalysisError, AnalysisResult};
pub use margins::{DiskMargins, MarginSummary, disk_margins, disk_to_margins};
pub use pzmap::{PoleDamping, PoleZeroData, pole_zero_map, pole_zero_map_one};
pub use rlocus::{
    LocusLimits, closed_loop_roots, default_gains, root_locus_map, root_locus_map_with,
    root_locus_maps, sort_loci,
};
