use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::file_utils::backup_watch_definition;
use crate::model::xray_api::{Watch, WatchRepositoryResource};
use crate::repository_utils::{classify_rclass, strip_cache_suffix, ResourceClass};
use crate::xray_utils::XrayClient;

static REPOSITORY_RESOURCE_TYPE: &str = "repository";
static DEFAULT_BIN_MGR_ID: &str = "default";

/// How a watch-update run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchUpdateOutcome {
    /// The repository was appended and the watch rewritten; the previous
    /// definition was saved at the given path.
    Updated { backup: PathBuf },
    AlreadyAssigned,
    /// The repository's backend class maps to neither local nor remote.
    Skipped { rclass: String },
}

pub fn is_assigned(watch: &Watch, repo_key: &str) -> bool {
    watch
        .project_resources
        .resources
        .iter()
        .any(|resource| resource.name == repo_key)
}

pub fn repository_resource(repo_key: &str, class: ResourceClass) -> WatchRepositoryResource {
    WatchRepositoryResource {
        resource_type: REPOSITORY_RESOURCE_TYPE.to_string(),
        name: repo_key.to_string(),
        bin_mgr_id: Some(DEFAULT_BIN_MGR_ID.to_string()),
        repo_type: Some(class.to_string()),
        extra: Default::default(),
    }
}

/// Add a repository to a watch, in place. The current definition is written
/// to `<watch>.json.bak` in `backup_dir` before the modified definition is
/// sent back, so a bad update can be reverted by hand.
pub fn add_repository_to_watch(
    client: &XrayClient,
    watch_name: &str,
    repo_key: &str,
    backup_dir: &Path,
) -> Result<WatchUpdateOutcome> {
    let mut watch = client.get_watch(watch_name)?;
    if is_assigned(&watch, repo_key) {
        return Ok(WatchUpdateOutcome::AlreadyAssigned);
    }

    let configuration = client.get_repository_configuration(strip_cache_suffix(repo_key))?;
    let Some(class) = classify_rclass(&configuration.rclass) else {
        return Ok(WatchUpdateOutcome::Skipped {
            rclass: configuration.rclass,
        });
    };

    let definition =
        serde_json::to_string_pretty(&watch).context("cannot serialize the watch definition")?;
    let backup = backup_watch_definition(backup_dir, watch_name, &definition)?;

    watch
        .project_resources
        .resources
        .push(repository_resource(repo_key, class));
    client.update_watch(&watch)?;
    Ok(WatchUpdateOutcome::Updated { backup })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn watch_with_one_repo() -> Watch {
        serde_json::from_value(json!({
            "general_data": {"name": "prod-watch"},
            "project_resources": {
                "resources": [
                    {"type": "repository", "name": "libs-release-local", "repo_type": "local"}
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn assignment_check_is_exact() {
        let watch = watch_with_one_repo();
        assert!(is_assigned(&watch, "libs-release-local"));
        assert!(!is_assigned(&watch, "libs-release"));
        assert!(!is_assigned(&watch, "npm-remote"));
    }

    // the backup written before an update must parse back to the exact
    // definition that was fetched, unknown fields included
    #[test]
    fn watch_backup_round_trips_the_definition() {
        let dir = tempfile::tempdir().unwrap();
        let watch = watch_with_one_repo();
        let definition = serde_json::to_string_pretty(&watch).unwrap();
        let backup =
            crate::file_utils::backup_watch_definition(dir.path(), "prod-watch", &definition)
                .unwrap();
        let written = std::fs::read_to_string(&backup).unwrap();
        assert_eq!(written, definition);
        let restored: Watch = serde_json::from_str(&written).unwrap();
        assert_eq!(
            serde_json::to_value(&restored).unwrap(),
            serde_json::to_value(&watch).unwrap()
        );
    }

    #[test]
    fn repository_resource_carries_the_classified_type() {
        let resource = repository_resource("npm-remote", ResourceClass::Remote);
        assert_eq!(resource.resource_type, "repository");
        assert_eq!(resource.name, "npm-remote");
        assert_eq!(resource.bin_mgr_id.as_deref(), Some("default"));
        assert_eq!(resource.repo_type.as_deref(), Some("remote"));
    }
}
