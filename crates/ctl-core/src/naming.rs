//! System and signal names.
//!
//! Every system carries a name plus labels for its inputs, outputs and
//! states. Unnamed systems get a generated `sys[k]` name from a
//! process-wide counter.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYSTEM_ID: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh generic system name.
pub fn generic_system_name() -> String {
    let id = NEXT_SYSTEM_ID.fetch_add(1, Ordering::Relaxed);
    format!("sys[{id}]")
}

/// `prefix[0]`, `prefix[1]`, ...
pub fn indexed_labels(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}[{i}]")).collect()
}

/// Name and signal labels of an input/output system.
#[derive(Debug, Clone, PartialEq)]
pub struct IoSignature {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub states: Vec<String>,
}

impl IoSignature {
    /// Generated name and default labels `u[i]`, `y[i]`, `x[i]`.
    pub fn generic(ninputs: usize, noutputs: usize, nstates: usize) -> Self {
        Self {
            name: generic_system_name(),
            inputs: indexed_labels("u", ninputs),
            outputs: indexed_labels("y", noutputs),
            states: indexed_labels("x", nstates),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn ninputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn noutputs(&self) -> usize {
        self.outputs.len()
    }
}
