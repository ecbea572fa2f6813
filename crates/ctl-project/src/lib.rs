//! ctl-project: model file format, validation and system construction.

pub mod build;
pub mod migrate;
pub mod schema;
pub mod validate;

pub use build::{SystemSet, build_systems, build_systems_with};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_project};

use std::fs;
use std::path::Path;

use ctl_lti::LtiError;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Unknown system: {id}")]
    UnknownSystem { id: String },

    #[error("Build error: {what}")]
    Build { what: String },

    #[error("System error: {0}")]
    System(#[from] LtiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk encoding of a model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.json` files are JSON, anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Decode, upgrade to the latest schema version and validate.
pub fn parse(content: &str, format: Format) -> ProjectResult<Project> {
    let raw: Project = match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    let project = migrate_to_latest(raw)?;
    validate_project(&project)?;
    Ok(project)
}

/// Validate and encode. Invalid projects are never written.
pub fn render(project: &Project, format: Format) -> ProjectResult<String> {
    validate_project(project)?;
    Ok(match format {
        Format::Yaml => serde_yaml::to_string(project)?,
        Format::Json => serde_json::to_string_pretty(project)?,
    })
}

pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    parse(&fs::read_to_string(path)?, Format::Yaml)
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    fs::write(path, render(project, Format::Yaml)?)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Project> {
    parse(&fs::read_to_string(path)?, Format::Json)
}

pub fn save_json(path: &Path, project: &Project) -> ProjectResult<()> {
    fs::write(path, render(project, Format::Json)?)?;
    Ok(())
}

pub fn load(path: &Path) -> ProjectResult<Project> {
    parse(&fs::read_to_string(path)?, Format::from_path(path))
}

pub fn save(path: &Path, project: &Project) -> ProjectResult<()> {
    fs::write(path, render(project, Format::from_path(path))?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path(Path::new("loop.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("loop.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("loop")), Format::Yaml);
    }

    #[test]
    fn old_versions_are_upgraded_on_parse() {
        let text = "version: 0\nname: old\nsystems:\n  - id: g\n    model:\n      type: siso_transfer_function\n      num: [1]\n      den: [1, 1]\n";
        let project = parse(text, Format::Yaml).unwrap();
        assert_eq!(project.version, LATEST_VERSION);
        assert_eq!(project.systems[0].name.as_deref(), Some("g"));
    }

    #[test]
    fn json_renders_and_parses() {
        let project = Project {
            version: LATEST_VERSION,
            name: "empty".to_string(),
            systems: vec![],
        };
        let text = render(&project, Format::Json).unwrap();
        assert_eq!(parse(&text, Format::Json).unwrap(), project);
    }
}
