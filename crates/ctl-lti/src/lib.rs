//! Linear time-invariant system representations for ctlkit.
//!
//! Three representations share the [`Lti`] interface:
//! - [`TransferFunction`]: rational transfer matrices
//! - [`StateSpace`]: `(A, B, C, D)` realizations
//! - [`FrequencyResponseData`]: complex responses on a frequency grid,
//!   optionally interpolated between grid points
//!
//! [`System`] wraps any of them and picks the result representation for
//! interconnections.

pub mod convert;
pub mod error;
pub mod frd;
pub mod interp;
pub mod lti;
pub mod poly;
pub mod statesp;
pub mod system;
pub mod xferfcn;

pub use convert::{ss2tf, tf2ss};
pub use error::{LtiError, LtiResult};
pub use frd::{FrdOperand, FrequencyResponseData, ResponseTable, convert_to_frd, frequency_response};
pub use lti::{CMatrix, Lti, frequency_point};
pub use statesp::StateSpace;
pub use system::System;
pub use xferfcn::TransferFunction;
