use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Data for the paginated violations query

#[derive(Serialize, Debug, Clone)]
pub struct ViolationsRequestFilters {
    #[serde(rename = "watch_name")]
    pub watch_name: String,
    #[serde(rename = "include_details")]
    pub include_details: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct ViolationsRequestPagination {
    #[serde(rename = "limit")]
    pub limit: u64,
    #[serde(rename = "offset")]
    pub offset: u64,
}

#[derive(Serialize, Debug, Clone)]
pub struct ViolationsRequest {
    #[serde(rename = "filters")]
    pub filters: ViolationsRequestFilters,
    #[serde(rename = "pagination")]
    pub pagination: ViolationsRequestPagination,
}

impl ViolationsRequest {
    pub fn new(watch_name: &str, limit: u64, offset: u64) -> Self {
        ViolationsRequest {
            filters: ViolationsRequestFilters {
                watch_name: watch_name.to_string(),
                include_details: true,
            },
            pagination: ViolationsRequestPagination { limit, offset },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ApplicabilityDetail {
    #[serde(rename = "vulnerability_id")]
    pub vulnerability_id: Option<String>,
}

/// One violation as reported by the service. Every scalar field may be
/// absent upstream; the fallback for each column is resolved once, in the
/// flattener, not here.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Violation {
    #[serde(rename = "type")]
    pub violation_type: Option<String>,
    #[serde(rename = "watch_name")]
    pub watch_name: Option<String>,
    #[serde(rename = "severity")]
    pub severity: Option<String>,
    #[serde(rename = "impacted_artifacts", default)]
    pub impacted_artifacts: Vec<String>,
    #[serde(rename = "applicability_details", default)]
    pub applicability_details: Vec<ApplicabilityDetail>,
    #[serde(rename = "issue_id")]
    pub issue_id: Option<String>,
    #[serde(rename = "description")]
    pub description: Option<String>,
}

/// One page of the result set. `total_violations` is only reported on the
/// first page (offset 0) and is authoritative for the whole query.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ViolationsResponse {
    #[serde(rename = "violations", default)]
    pub violations: Vec<Violation>,
    #[serde(rename = "total_violations")]
    pub total_violations: Option<u64>,
}

// Data for the watch endpoints

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WatchGeneralData {
    #[serde(rename = "name")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WatchRepositoryResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "bin_mgr_id", skip_serializing_if = "Option::is_none")]
    pub bin_mgr_id: Option<String>,
    #[serde(rename = "repo_type", skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WatchProjectResources {
    #[serde(rename = "resources", default)]
    pub resources: Vec<WatchRepositoryResource>,
}

/// A watch definition. Only the fields the exporter reads or rewrites are
/// typed; everything else the server sent is carried in `extra` so that an
/// in-place update round-trips the definition unchanged.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Watch {
    #[serde(rename = "general_data")]
    pub general_data: WatchGeneralData,
    #[serde(rename = "project_resources", default)]
    pub project_resources: WatchProjectResources,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Data for the repository metadata endpoints

#[derive(Deserialize, Debug, Clone)]
pub struct RepositoryConfiguration {
    #[serde(rename = "key")]
    pub key: String,
    #[serde(rename = "rclass")]
    pub rclass: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PermissionPrincipals {
    // group name -> granted permission letters, order kept for determinism
    #[serde(rename = "groups", default)]
    pub groups: std::collections::BTreeMap<String, Value>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RepositoryPermissions {
    #[serde(rename = "principals", default)]
    pub principals: PermissionPrincipals,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Group {
    #[serde(rename = "name")]
    pub name: String,
    #[serde(rename = "members", default)]
    pub members: Vec<String>,
}
