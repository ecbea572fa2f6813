//! Analysis defaults.
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CtlError, CtlResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisDefaults {
    pub frd: FrdDefaults,
    pub rlocus: RootLocusDefaults,
    pub margins: MarginDefaults,
    pub sweep: SweepDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrdDefaults {
    /// Bound for treating two frequencies as the same point (rad/s).
    pub match_tolerance: f64,
}

impl Default for FrdDefaults {
    fn default() -> Self {
        Self {
            match_tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootLocusDefaults {
    /// Length of the generated gain vector.
    pub points: usize,
    /// Real-axis limits used for strictly discrete systems.
    pub discrete_xlim: (f64, f64),
    /// Imaginary-axis limits used for strictly discrete systems.
    pub discrete_ylim: (f64, f64),
}

impl Default for RootLocusDefaults {
    fn default() -> Self {
        Self {
            points: 200,
            discrete_xlim: (-1.2, 1.2),
            discrete_ylim: (-1.3, 1.3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarginDefaults {
    /// Disk skew: 1 for S-based, -1 for T-based, 0 for balanced disks.
    pub skew: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepDefaults {
    pub points_per_decade: usize,
}

impl Default for SweepDefaults {
    fn default() -> Self {
        Self {
            points_per_decade: 50,
        }
    }
}

impl AnalysisDefaults {
    pub fn from_yaml_str(content: &str) -> CtlResult<Self> {
        serde_yaml::from_str(content).map_err(|e| CtlError::ConfigParse {
            what: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> CtlResult<Self> {
        serde_json::from_str(content).map_err(|e| CtlError::ConfigParse {
            what: e.to_string(),
        })
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load(path: &Path) -> CtlResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CtlError::ConfigRead {
            path: path.display().to_string(),
            what: e.to_string(),
        })?;
        let defaults = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_yaml_str(&content)?,
        };
        defaults.validate()?;
        Ok(defaults)
    }

    pub fn validate(&self) -> CtlResult<()> {
        if !(self.frd.match_tolerance >= 0.0) {
            return Err(CtlError::InvalidArg {
                what: "frd.match_tolerance must be non-negative",
            });
        }
        if self.rlocus.points < 2 {
            return Err(CtlError::InvalidArg {
                what: "rlocus.points must be at least 2",
            });
        }
        if !self.margins.skew.is_finite() {
            return Err(CtlError::InvalidArg {
                what: "margins.skew must be finite",
            });
        }
        if self.sweep.points_per_decade == 0 {
            return Err(CtlError::InvalidArg {
                what: "sweep.points_per_decade must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = AnalysisDefaults::from_yaml_str("rlocus:\n  points: 50\n").unwrap();
        assert_eq!(cfg.rlocus.points, 50);
        assert_eq!(cfg.rlocus.discrete_xlim, (-1.2, 1.2));
        assert_eq!(cfg.frd.match_tolerance, 1e-8);
        assert_eq!(cfg.margins.skew, 0.0);
    }

    #[test]
    fn json_config() {
        let cfg = AnalysisDefaults::from_json_str(r#"{"margins": {"skew": 1.0}}"#).unwrap();
        assert_eq!(cfg.margins.skew, 1.0);
        assert_eq!(cfg.sweep.points_per_decade, 50);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = AnalysisDefaults::default();
        assert!(cfg.validate().is_ok());
        cfg.rlocus.points = 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join("ctl_core_config_load.yaml");
        std::fs::write(&path, "sweep:\n  points_per_decade: 10\n").unwrap();
        let cfg = AnalysisDefaults::load(&path).unwrap();
        assert_eq!(cfg.sweep.points_per_decade, 10);
    }
}
