//! Model file schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub systems: Vec<SystemDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Absent, `0` or `false`: continuous. `true`: discrete with an
    /// unspecified period. A positive number: the sample period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<TimebaseDef>,
    pub model: ModelDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TimebaseDef {
    Flag(bool),
    Period(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelDef {
    /// `num[out][in]` and `den[out][in]` coefficient lists, highest power first.
    TransferFunction {
        num: Vec<Vec<Vec<f64>>>,
        den: Vec<Vec<Vec<f64>>>,
    },
    SisoTransferFunction {
        num: Vec<f64>,
        den: Vec<f64>,
    },
    /// Row-major matrices. `b` and `c` may be empty for a static gain.
    StateSpace {
        #[serde(default)]
        a: Vec<Vec<f64>>,
        #[serde(default)]
        b: Vec<Vec<f64>>,
        #[serde(default)]
        c: Vec<Vec<f64>>,
        d: Vec<Vec<f64>>,
    },
    /// `real[out][in][k]` and `imag[out][in][k]` at `omega[k]`.
    FrequencyData {
        omega: Vec<f64>,
        real: Vec<Vec<Vec<f64>>>,
        imag: Vec<Vec<Vec<f64>>>,
        #[serde(default)]
        smooth: bool,
    },
    /// Interconnection of previously declared systems.
    Connection {
        op: ConnectionOp,
        systems: Vec<String>,
        #[serde(default = "default_sign")]
        sign: f64,
    },
}

fn default_sign() -> f64 {
    -1.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionOp {
    /// Signal flows through the listed systems in order.
    Series,
    Parallel,
    /// `[forward, return]`, combined with `sign`.
    Feedback,
    Append,
}
