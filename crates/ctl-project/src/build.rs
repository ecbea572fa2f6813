//! Turn validated model definitions into systems.

use ctl_core::{AnalysisDefaults, Timebase};
use ctl_lti::{CMatrix, FrequencyResponseData, StateSpace, System, TransferFunction};
use nalgebra::DMatrix;
use num_complex::Complex64;
use tracing::debug;

use crate::schema::{ConnectionOp, ModelDef, Project, SystemDef, TimebaseDef};
use crate::validate::validate_project;
use crate::{ProjectError, ProjectResult};

/// Systems of a model file in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SystemSet {
    entries: Vec<(String, System)>,
}

impl SystemSet {
    pub fn get(&self, id: &str) -> Option<&System> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, sys)| sys)
    }

    /// Like `get`, but a missing id is an error.
    pub fn require(&self, id: &str) -> ProjectResult<&System> {
        self.get(id).ok_or_else(|| ProjectError::UnknownSystem { id: id.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &System)> {
        self.entries.iter().map(|(id, sys)| (id.as_str(), sys))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn timebase(dt: Option<TimebaseDef>) -> Timebase {
    match dt {
        None | Some(TimebaseDef::Flag(false)) => Timebase::Continuous,
        Some(TimebaseDef::Flag(true)) => Timebase::Discrete(None),
        Some(TimebaseDef::Period(dt)) if dt == 0.0 => Timebase::Continuous,
        Some(TimebaseDef::Period(dt)) => Timebase::Discrete(Some(dt)),
    }
}

fn matrix(rows: &[Vec<f64>], nrows: usize, ncols: usize) -> DMatrix<f64> {
    if ncols == 0 || nrows == 0 {
        return DMatrix::zeros(nrows, ncols);
    }
    DMatrix::from_fn(nrows, ncols, |i, j| rows[i][j])
}

fn build_model(
    def: &SystemDef,
    built: &SystemSet,
    defaults: &AnalysisDefaults,
) -> ProjectResult<System> {
    let tb = timebase(def.dt);
    let sys = match &def.model {
        ModelDef::TransferFunction { num, den } => {
            System::Tf(TransferFunction::new(num.clone(), den.clone())?.with_timebase(tb))
        }
        ModelDef::SisoTransferFunction { num, den } => {
            System::Tf(TransferFunction::siso(num, den)?.with_timebase(tb))
        }
        ModelDef::StateSpace { a, b, c, d } => {
            let n = a.len();
            let (p, m) = (d.len(), d.first().map(Vec::len).unwrap_or(0));
            let ss = StateSpace::new(
                matrix(a, n, n),
                matrix(b, n, m),
                matrix(c, p, n),
                matrix(d, p, m),
            )?;
            System::Ss(ss.with_timebase(tb))
        }
        ModelDef::FrequencyData {
            omega,
            real,
            imag,
            smooth,
        } => {
            let (p, m) = (real.len(), real.first().map(Vec::len).unwrap_or(0));
            let fresp = (0..omega.len())
                .map(|k| {
                    CMatrix::from_fn(p, m, |i, j| Complex64::new(real[i][j][k], imag[i][j][k]))
                })
                .collect();
            let frd = FrequencyResponseData::new(fresp, omega.clone())?
                .with_defaults(defaults)?
                .with_smoothing(*smooth)?
                .with_timebase(tb);
            System::Frd(frd)
        }
        ModelDef::Connection { op, systems, sign } => {
            let parts = systems
                .iter()
                .map(|id| built.require(id))
                .collect::<ProjectResult<Vec<_>>>()?;
            connect(*op, &parts, *sign)?
        }
    };
    Ok(sys.with_name(def.name.clone().unwrap_or_else(|| def.id.clone())))
}

fn connect(op: ConnectionOp, parts: &[&System], sign: f64) -> ProjectResult<System> {
    let Some((first, rest)) = parts.split_first() else {
        return Err(ProjectError::Build {
            what: "connection without systems".to_string(),
        });
    };
    let mut acc = (*first).clone();
    for next in rest {
        acc = match op {
            // Signal flows from `acc` into `next`
            ConnectionOp::Series => next.series(&acc)?,
            ConnectionOp::Parallel => acc.parallel(next)?,
            ConnectionOp::Feedback => acc.feedback(next, sign)?,
            ConnectionOp::Append => acc.append(next)?,
        };
    }
    Ok(acc)
}

/// Build every system of a validated project.
pub fn build_systems_with(
    project: &Project,
    defaults: &AnalysisDefaults,
) -> ProjectResult<SystemSet> {
    validate_project(project)?;
    let mut set = SystemSet::default();
    for def in &project.systems {
        let sys = build_model(def, &set, defaults)?;
        debug!(id = %def.id, kind = sys.kind(), "built system");
        set.entries.push((def.id.clone(), sys));
    }
    Ok(set)
}

pub fn build_systems(project: &Project) -> ProjectResult<SystemSet> {
    build_systems_with(project, &AnalysisDefaults::default())
}
