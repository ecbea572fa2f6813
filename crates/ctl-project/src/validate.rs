//! Model file validation logic.

use crate::schema::{ConnectionOp, ModelDef, Project, SystemDef, TimebaseDef};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    // Connections may only refer to systems declared before them
    let mut declared: HashSet<&String> = HashSet::new();
    for system in &project.systems {
        if system.id.trim().is_empty() {
            return Err(invalid("system.id", "''", "must not be empty"));
        }
        validate_system(system, &declared)?;
        if !declared.insert(&system.id) {
            return Err(ValidationError::DuplicateId {
                id: system.id.clone(),
                context: "systems".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_system(system: &SystemDef, declared: &HashSet<&String>) -> Result<(), ValidationError> {
    let id = &system.id;
    if let Some(TimebaseDef::Period(dt)) = system.dt {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(invalid(format!("{id}.dt"), dt, "must be 0 or a positive period"));
        }
    }

    match &system.model {
        ModelDef::TransferFunction { num, den } => validate_tf(id, num, den),
        ModelDef::SisoTransferFunction { num, den } => {
            validate_poly(&format!("{id}.num"), num, false)?;
            validate_poly(&format!("{id}.den"), den, true)
        }
        ModelDef::StateSpace { a, b, c, d } => validate_ss(id, a, b, c, d),
        ModelDef::FrequencyData {
            omega, real, imag, ..
        } => validate_frd(id, omega, real, imag),
        ModelDef::Connection { op, systems, sign } => {
            if system.dt.is_some() {
                return Err(invalid(
                    format!("{id}.dt"),
                    "set",
                    "connections take the timebase of their parts",
                ));
            }
            validate_connection(id, *op, systems, *sign, declared)
        }
    }
}

fn validate_poly(field: &str, p: &[f64], denominator: bool) -> Result<(), ValidationError> {
    if p.is_empty() {
        return Err(invalid(field, "[]", "coefficient list must not be empty"));
    }
    if let Some(v) = p.iter().find(|v| !v.is_finite()) {
        return Err(invalid(field, v, "coefficients must be finite"));
    }
    if denominator && p.iter().all(|&v| v == 0.0) {
        return Err(invalid(field, format!("{p:?}"), "denominator must not be zero"));
    }
    Ok(())
}

fn validate_tf(
    id: &str,
    num: &[Vec<Vec<f64>>],
    den: &[Vec<Vec<f64>>],
) -> Result<(), ValidationError> {
    let ninputs = num.first().map(Vec::len).unwrap_or(0);
    if num.is_empty() || ninputs == 0 {
        return Err(invalid(format!("{id}.num"), "[]", "needs at least one input and output"));
    }
    if den.len() != num.len() {
        return Err(invalid(
            format!("{id}.den"),
            den.len(),
            "must have one row per numerator row",
        ));
    }
    for (i, (nrow, drow)) in num.iter().zip(den).enumerate() {
        if nrow.len() != ninputs || drow.len() != ninputs {
            return Err(invalid(
                format!("{id}[{i}]"),
                nrow.len(),
                "rows must all have one entry per input",
            ));
        }
        for (j, (n, d)) in nrow.iter().zip(drow).enumerate() {
            validate_poly(&format!("{id}.num[{i}][{j}]"), n, false)?;
            validate_poly(&format!("{id}.den[{i}][{j}]"), d, true)?;
        }
    }
    Ok(())
}

fn validate_matrix(
    field: &str,
    m: &[Vec<f64>],
    rows: usize,
    cols: usize,
) -> Result<(), ValidationError> {
    // A matrix without columns may be written as an empty list
    if cols == 0 && m.is_empty() {
        return Ok(());
    }
    if m.len() != rows || m.iter().any(|r| r.len() != cols) {
        return Err(invalid(field, format!("{m:?}"), &format!("must be {rows}x{cols}")));
    }
    if let Some(v) = m.iter().flatten().find(|v| !v.is_finite()) {
        return Err(invalid(field, v, "entries must be finite"));
    }
    Ok(())
}

fn validate_ss(
    id: &str,
    a: &[Vec<f64>],
    b: &[Vec<f64>],
    c: &[Vec<f64>],
    d: &[Vec<f64>],
) -> Result<(), ValidationError> {
    let n = a.len();
    let p = d.len();
    let m = d.first().map(Vec::len).unwrap_or(0);
    if p == 0 || m == 0 {
        return Err(invalid(format!("{id}.d"), "[]", "needs at least one input and output"));
    }
    validate_matrix(&format!("{id}.a"), a, n, n)?;
    if n == 0 {
        if !b.is_empty() {
            return Err(invalid(format!("{id}.b"), format!("{b:?}"), "must be empty without states"));
        }
    } else {
        validate_matrix(&format!("{id}.b"), b, n, m)?;
    }
    validate_matrix(&format!("{id}.c"), c, p, n)?;
    validate_matrix(&format!("{id}.d"), d, p, m)
}

fn validate_frd(
    id: &str,
    omega: &[f64],
    real: &[Vec<Vec<f64>>],
    imag: &[Vec<Vec<f64>>],
) -> Result<(), ValidationError> {
    if omega.is_empty() {
        return Err(invalid(format!("{id}.omega"), "[]", "needs at least one frequency"));
    }
    if let Some(w) = omega.iter().find(|w| !w.is_finite()) {
        return Err(invalid(format!("{id}.omega"), w, "frequencies must be finite"));
    }
    let mut seen = omega.to_vec();
    seen.sort_by(f64::total_cmp);
    if let Some(w) = seen.windows(2).find(|w| w[0] == w[1]) {
        return Err(invalid(format!("{id}.omega"), w[0], "frequencies must be distinct"));
    }

    let noutputs = real.len();
    let ninputs = real.first().map(Vec::len).unwrap_or(0);
    if noutputs == 0 || ninputs == 0 {
        return Err(invalid(format!("{id}.real"), "[]", "needs at least one input and output"));
    }
    for (field, part) in [("real", real), ("imag", imag)] {
        if part.len() != noutputs || part.iter().any(|row| row.len() != ninputs) {
            return Err(invalid(
                format!("{id}.{field}"),
                part.len(),
                &format!("must be {noutputs}x{ninputs} series"),
            ));
        }
        for series in part.iter().flatten() {
            if series.len() != omega.len() {
                return Err(invalid(
                    format!("{id}.{field}"),
                    series.len(),
                    &format!("each series needs {} values, one per frequency", omega.len()),
                ));
            }
            if let Some(v) = series.iter().find(|v| !v.is_finite()) {
                return Err(invalid(format!("{id}.{field}"), v, "values must be finite"));
            }
        }
    }
    Ok(())
}

fn validate_connection(
    id: &str,
    op: ConnectionOp,
    systems: &[String],
    sign: f64,
    declared: &HashSet<&String>,
) -> Result<(), ValidationError> {
    if systems.is_empty() {
        return Err(invalid(format!("{id}.systems"), "[]", "must list at least one system"));
    }
    if op == ConnectionOp::Feedback && systems.len() != 2 {
        return Err(invalid(
            format!("{id}.systems"),
            systems.len(),
            "feedback takes a forward and a return system",
        ));
    }
    if !sign.is_finite() {
        return Err(invalid(format!("{id}.sign"), sign, "must be finite"));
    }
    for part in systems {
        if !declared.contains(part) {
            return Err(ValidationError::MissingReference {
                id: part.clone(),
                context: format!("connection {id} (systems must be declared before use)"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn siso(id: &str) -> SystemDef {
        SystemDef {
            id: id.to_string(),
            name: None,
            dt: None,
            model: ModelDef::SisoTransferFunction {
                num: vec![1.0],
                den: vec![1.0, 1.0],
            },
        }
    }

    fn project(systems: Vec<SystemDef>) -> Project {
        Project {
            version: 1,
            name: "test".to_string(),
            systems,
        }
    }

    #[test]
    fn duplicate_ids() {
        let err = validate_project(&project(vec![siso("g"), siso("g")])).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { .. }));
    }

    #[test]
    fn forward_references_are_missing() {
        let loop_def = SystemDef {
            id: "loop".to_string(),
            name: None,
            dt: None,
            model: ModelDef::Connection {
                op: ConnectionOp::Series,
                systems: vec!["g".to_string()],
                sign: -1.0,
            },
        };
        let err = validate_project(&project(vec![loop_def.clone(), siso("g")])).unwrap_err();
        assert!(matches!(err, ValidationError::MissingReference { .. }));
        validate_project(&project(vec![siso("g"), loop_def])).unwrap();
    }

    #[test]
    fn zero_denominator() {
        let mut g = siso("g");
        g.model = ModelDef::SisoTransferFunction {
            num: vec![1.0],
            den: vec![0.0, 0.0],
        };
        assert!(matches!(
            validate_project(&project(vec![g])),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn ragged_state_space() {
        let mut g = siso("g");
        g.model = ModelDef::StateSpace {
            a: vec![vec![0.0, 1.0], vec![-1.0]],
            b: vec![vec![0.0], vec![1.0]],
            c: vec![vec![1.0, 0.0]],
            d: vec![vec![0.0]],
        };
        assert!(validate_project(&project(vec![g])).is_err());
    }

    #[test]
    fn static_gain_state_space() {
        let mut k = siso("k");
        k.model = ModelDef::StateSpace {
            a: vec![],
            b: vec![],
            c: vec![],
            d: vec![vec![1.0, -2.0], vec![0.0, 1.0]],
        };
        validate_project(&project(vec![k])).unwrap();
    }

    #[test]
    fn frequency_data_lengths() {
        let mut f = siso("f");
        f.model = ModelDef::FrequencyData {
            omega: vec![1.0, 2.0],
            real: vec![vec![vec![1.0, 0.5]]],
            imag: vec![vec![vec![0.0]]],
            smooth: false,
        };
        assert!(validate_project(&project(vec![f])).is_err());
    }

    #[test]
    fn feedback_arity_and_period() {
        let fb = SystemDef {
            id: "cl".to_string(),
            name: None,
            dt: None,
            model: ModelDef::Connection {
                op: ConnectionOp::Feedback,
                systems: vec!["g".to_string()],
                sign: -1.0,
            },
        };
        assert!(validate_project(&project(vec![siso("g"), fb])).is_err());

        let mut g = siso("g");
        g.dt = Some(TimebaseDef::Period(-0.1));
        assert!(validate_project(&project(vec![g])).is_err());
    }

    #[test]
    fn newer_versions_are_rejected() {
        let mut p = project(vec![]);
        p.version = 99;
        assert!(matches!(
            validate_project(&p),
            Err(ValidationError::UnsupportedVersion { version: 99 })
        ));
    }
}
