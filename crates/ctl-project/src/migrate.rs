//! Upgrades of older model files.

use crate::schema::Project;
use crate::{ProjectError, ProjectResult};

type Step = fn(&mut Project) -> ProjectResult<()>;

/// `STEPS[v]` upgrades a version `v` file to version `v + 1`.
const STEPS: &[Step] = &[name_systems_after_ids];

pub const LATEST_VERSION: u32 = STEPS.len() as u32;

/// Apply every pending upgrade step. Files newer than [`LATEST_VERSION`]
/// are left alone for validation to reject.
pub fn migrate_to_latest(mut project: Project) -> ProjectResult<Project> {
    while let Some(step) = STEPS.get(project.version as usize) {
        let from = project.version;
        step(&mut project).map_err(|e| ProjectError::Migration {
            what: format!("upgrading from version {from}: {e}"),
        })?;
        project.version = from + 1;
    }
    Ok(project)
}

/// Version 0 files carried no display names.
fn name_systems_after_ids(project: &mut Project) -> ProjectResult<()> {
    for system in &mut project.systems {
        if system.name.is_none() {
            system.name = Some(system.id.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ModelDef, SystemDef};

    #[test]
    fn v0_systems_get_names() {
        let project = Project {
            version: 0,
            name: "legacy".to_string(),
            systems: vec![SystemDef {
                id: "g".to_string(),
                name: None,
                dt: None,
                model: ModelDef::SisoTransferFunction {
                    num: vec![1.0],
                    den: vec![1.0, 1.0],
                },
            }],
        };
        let migrated = migrate_to_latest(project).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.systems[0].name.as_deref(), Some("g"));
    }

    #[test]
    fn newer_files_pass_through() {
        let project = Project {
            version: LATEST_VERSION + 1,
            name: "future".to_string(),
            systems: vec![],
        };
        assert_eq!(migrate_to_latest(project.clone()).unwrap(), project);
    }

    #[test]
    fn latest_is_unchanged() {
        let project = Project {
            version: LATEST_VERSION,
            name: "current".to_string(),
            systems: vec![],
        };
        assert_eq!(migrate_to_latest(project.clone()).unwrap(), project);
    }
}
