use crate::constants::NOT_AVAILABLE;
use crate::model::xray_api::Violation;

/// The flattened projection of one violation: the 8 ordered scalar columns
/// of the report, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub violation_type: String,
    pub watch_name: String,
    pub severity: String,
    pub repo_name: String,
    pub impacted_artifact: String,
    pub vulnerability_id: String,
    pub issue_id: String,
    pub description: String,
}

impl ReportRow {
    pub fn as_record(&self) -> [&str; 8] {
        [
            &self.violation_type,
            &self.watch_name,
            &self.severity,
            &self.repo_name,
            &self.impacted_artifact,
            &self.vulnerability_id,
            &self.issue_id,
            &self.description,
        ]
    }
}

// The repository name is the segment after the first `/` of the artifact
// path (paths look like `default/repo-name/path/to/artifact`). A path with
// fewer than two segments yields an empty string, never an error.
fn repo_name_of_artifact(artifact_path: &str) -> String {
    artifact_path.split('/').nth(1).unwrap_or_default().to_string()
}

/// Flatten one violation into a report row. Only the first impacted artifact
/// and the first applicability detail are surfaced; a missing vulnerability
/// id becomes the `N/A` sentinel and every other missing field an empty
/// string. This is the only place fallbacks are applied.
pub fn flatten_violation(violation: &Violation) -> ReportRow {
    let impacted_artifact = violation
        .impacted_artifacts
        .first()
        .cloned()
        .unwrap_or_default();
    let vulnerability_id = violation
        .applicability_details
        .first()
        .and_then(|detail| detail.vulnerability_id.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    ReportRow {
        violation_type: violation.violation_type.clone().unwrap_or_default(),
        watch_name: violation.watch_name.clone().unwrap_or_default(),
        severity: violation.severity.clone().unwrap_or_default(),
        repo_name: repo_name_of_artifact(&impacted_artifact),
        impacted_artifact,
        vulnerability_id,
        issue_id: violation.issue_id.clone().unwrap_or_default(),
        description: violation.description.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::xray_api::ApplicabilityDetail;

    fn sample_violation() -> Violation {
        Violation {
            violation_type: Some("security".to_string()),
            watch_name: Some("prod-watch".to_string()),
            severity: Some("Critical".to_string()),
            impacted_artifacts: vec![
                "default/libs-release-local/org/demo/demo.jar".to_string(),
                "default/libs-release-local/org/demo/demo-sources.jar".to_string(),
            ],
            applicability_details: vec![
                ApplicabilityDetail {
                    vulnerability_id: Some("XRAY-12345".to_string()),
                },
                ApplicabilityDetail {
                    vulnerability_id: Some("XRAY-99999".to_string()),
                },
            ],
            issue_id: Some("XRAY-12345".to_string()),
            description: Some("deserialization of untrusted data".to_string()),
        }
    }

    #[test]
    fn flatten_complete_violation() {
        let row = flatten_violation(&sample_violation());
        assert_eq!(row.violation_type, "security");
        assert_eq!(row.watch_name, "prod-watch");
        assert_eq!(row.severity, "Critical");
        assert_eq!(row.repo_name, "libs-release-local");
        assert_eq!(
            row.impacted_artifact,
            "default/libs-release-local/org/demo/demo.jar"
        );
        assert_eq!(row.vulnerability_id, "XRAY-12345");
        assert_eq!(row.issue_id, "XRAY-12345");
        assert_eq!(row.description, "deserialization of untrusted data");
    }

    // only the first impacted artifact and applicability detail are surfaced
    #[test]
    fn flatten_narrows_to_first_entries() {
        let row = flatten_violation(&sample_violation());
        assert!(!row.impacted_artifact.contains("demo-sources"));
        assert_ne!(row.vulnerability_id, "XRAY-99999");
    }

    #[test]
    fn flatten_empty_violation_uses_fallbacks() {
        let row = flatten_violation(&Violation::default());
        assert_eq!(row.violation_type, "");
        assert_eq!(row.watch_name, "");
        assert_eq!(row.severity, "");
        assert_eq!(row.repo_name, "");
        assert_eq!(row.impacted_artifact, "");
        assert_eq!(row.vulnerability_id, "N/A");
        assert_eq!(row.issue_id, "");
        assert_eq!(row.description, "");
    }

    #[test]
    fn flatten_detail_without_vulnerability_id() {
        let violation = Violation {
            applicability_details: vec![ApplicabilityDetail {
                vulnerability_id: None,
            }],
            ..Violation::default()
        };
        assert_eq!(flatten_violation(&violation).vulnerability_id, "N/A");
    }

    #[test]
    fn repo_name_derivation() {
        assert_eq!(
            repo_name_of_artifact("default/libs-release-local/a/b.jar"),
            "libs-release-local"
        );
        // fewer than two segments: empty, not an error
        assert_eq!(repo_name_of_artifact("no-slash-at-all"), "");
        assert_eq!(repo_name_of_artifact(""), "");
        // trailing slash means an empty second segment
        assert_eq!(repo_name_of_artifact("default/"), "");
    }
}
