use std::fmt;

use crate::constants::NO_ASSIGNMENT;
use crate::model::xray_api::RepositoryPermissions;
use crate::xray_utils::XrayClient;

/// The two coarse categories a watch resource accepts. Storage backends
/// report a finer-grained `rclass`; anything that maps to neither of these
/// is skipped by callers, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Local,
    Remote,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceClass::Local => write!(f, "local"),
            ResourceClass::Remote => write!(f, "remote"),
        }
    }
}

// federated repositories behave like local ones from the watch's point of view
pub fn classify_rclass(rclass: &str) -> Option<ResourceClass> {
    match rclass {
        "local" | "federated" => Some(ResourceClass::Local),
        "remote" => Some(ResourceClass::Remote),
        _ => None,
    }
}

/// Remote repositories surface in violation reports under their `-cache`
/// alias; the metadata endpoints only know the plain key.
pub fn strip_cache_suffix(key: &str) -> &str {
    if key.to_lowercase().ends_with("-cache") {
        &key[..key.len() - "-cache".len()]
    } else {
        key
    }
}

// The owning team of a repository is encoded as the group whose name ends
// with `-manage` among the principals granted on it.
pub fn find_manage_group(permissions: &RepositoryPermissions) -> Option<String> {
    permissions
        .principals
        .groups
        .keys()
        .find(|group_name| group_name.to_lowercase().ends_with("-manage"))
        .cloned()
}

pub fn format_users(members: &[String]) -> String {
    if members.is_empty() {
        NO_ASSIGNMENT.to_string()
    } else {
        members.join("|")
    }
}

/// Best-effort lookup of the users managing a repository. Every failure
/// (unknown repository, no manage group, unreadable group) degrades to the
/// `NA` sentinel; the enrichment never fails a run.
pub fn repository_users(client: &XrayClient, key: &str) -> String {
    let lookup_key = strip_cache_suffix(key);
    let permissions = match client.get_repository_permissions(lookup_key) {
        Ok(permissions) => permissions,
        Err(error) => {
            eprintln!("cannot read permissions of {}: {:#}", lookup_key, error);
            return NO_ASSIGNMENT.to_string();
        }
    };
    let Some(manage_group) = find_manage_group(&permissions) else {
        return NO_ASSIGNMENT.to_string();
    };
    match client.get_group(&manage_group) {
        Ok(group) => format_users(&group.members),
        Err(error) => {
            eprintln!("cannot read group {}: {:#}", manage_group, error);
            NO_ASSIGNMENT.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_known_rclasses() {
        assert_eq!(classify_rclass("local"), Some(ResourceClass::Local));
        assert_eq!(classify_rclass("federated"), Some(ResourceClass::Local));
        assert_eq!(classify_rclass("remote"), Some(ResourceClass::Remote));
    }

    // virtual repositories (and anything unknown) are skipped, not mapped
    #[test]
    fn classify_unknown_rclass() {
        assert_eq!(classify_rclass("virtual"), None);
        assert_eq!(classify_rclass(""), None);
        assert_eq!(classify_rclass("LOCAL"), None);
    }

    #[test]
    fn resource_class_display() {
        assert_eq!(ResourceClass::Local.to_string(), "local");
        assert_eq!(ResourceClass::Remote.to_string(), "remote");
    }

    #[test]
    fn cache_suffix_is_stripped_case_insensitively() {
        assert_eq!(strip_cache_suffix("npm-remote-cache"), "npm-remote");
        assert_eq!(strip_cache_suffix("npm-remote-CACHE"), "npm-remote");
        assert_eq!(strip_cache_suffix("npm-remote"), "npm-remote");
        assert_eq!(strip_cache_suffix("cache"), "cache");
    }

    #[test]
    fn manage_group_lookup() {
        let permissions = serde_json::from_value::<RepositoryPermissions>(json!({
            "principals": {
                "groups": {
                    "readers": ["r"],
                    "Libs-Release-Manage": ["m"],
                    "writers": ["w"]
                }
            }
        }))
        .unwrap();
        assert_eq!(
            find_manage_group(&permissions).as_deref(),
            Some("Libs-Release-Manage")
        );

        let no_match = serde_json::from_value::<RepositoryPermissions>(json!({
            "principals": {"groups": {"readers": ["r"]}}
        }))
        .unwrap();
        assert_eq!(find_manage_group(&no_match), None);
    }

    #[test]
    fn users_are_pipe_joined_with_na_fallback() {
        assert_eq!(
            format_users(&["alice".to_string(), "bob".to_string()]),
            "alice|bob"
        );
        assert_eq!(format_users(&[]), "NA");
    }
}
