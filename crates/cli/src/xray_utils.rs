use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use thiserror::Error;

use crate::constants::{
    HEADER_CONTENT_TYPE, HEADER_CONTENT_TYPE_APPLICATION_JSON, METADATA_TIMEOUT_SECONDS,
    VIOLATIONS_TIMEOUT_SECONDS,
};
use crate::model::xray_api::{
    Group, RepositoryConfiguration, RepositoryPermissions, ViolationsRequest, ViolationsResponse,
    Watch,
};
use crate::pagination::ViolationSource;

const VIOLATIONS_API_PATH: &str = "xray/api/v1/violations";
const WATCHES_API_PATH: &str = "xray/api/v2/watches";
const REPOSITORIES_API_PATH: &str = "artifactory/api/repositories";
const STORAGE_API_PATH: &str = "artifactory/api/storage";
const GROUPS_API_PATH: &str = "access/api/v2/groups";

// Get environment variables for the JFrog platform. First try to get the
// variables prefixed with JF_ and then, try JFROG_.
// If nothing works, just returns an error.
pub fn get_jfrog_variable_value(variable: &str) -> Result<String> {
    let prefixes = vec!["JF", "JFROG"];
    for prefix in prefixes {
        let name = format!("{}_{}", prefix, variable);
        let var_content = env::var(name);
        if let Ok(var_value) = var_content {
            if var_value.is_empty() {
                continue;
            }
            return Ok(var_value);
        }
    }
    Err(anyhow!("cannot find variable JF_{}", variable))
}

pub fn get_access_token() -> Result<String> {
    get_jfrog_variable_value("ACCESS_TOKEN")
}

/// How a single page fetch can fail. An empty response body is deliberately
/// distinct from a page that parses but contains zero violations: the latter
/// is data, the former is a broken upstream.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server returned error {0}")]
    Status(u16),
    #[error("server returned an empty response body")]
    EmptyResponse,
    #[error("server returned a malformed response body: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

pub struct XrayClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl XrayClient {
    pub fn new(base_url: &str, access_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(VIOLATIONS_TIMEOUT_SECONDS))
            .build()
            .context("cannot build the HTTP client")?;
        Ok(XrayClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    // Metadata calls are small; give them a shorter timeout than the
    // violation pages.
    fn get_metadata(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .timeout(Duration::from_secs(METADATA_TIMEOUT_SECONDS))
            .bearer_auth(&self.access_token)
    }

    /// Fetch one page of violations for a watch and also return the raw
    /// response body (the single-page variant dumps it next to the report).
    pub fn fetch_violations_page_with_raw(
        &self,
        watch_name: &str,
        limit: u64,
        offset: u64,
    ) -> Result<(ViolationsResponse, String), FetchError> {
        let request = ViolationsRequest::new(watch_name, limit, offset);
        let response = self
            .client
            .post(self.url(VIOLATIONS_API_PATH))
            .header(HEADER_CONTENT_TYPE, HEADER_CONTENT_TYPE_APPLICATION_JSON)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .map_err(FetchError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().map_err(FetchError::Transport)?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyResponse);
        }
        let page =
            serde_json::from_str::<ViolationsResponse>(&body).map_err(FetchError::MalformedJson)?;
        Ok((page, body))
    }

    pub fn fetch_violations_page(
        &self,
        watch_name: &str,
        limit: u64,
        offset: u64,
    ) -> Result<ViolationsResponse, FetchError> {
        self.fetch_violations_page_with_raw(watch_name, limit, offset)
            .map(|(page, _)| page)
    }

    /// A watch-bound view of the client usable as a `ViolationSource`.
    pub fn violation_source<'a>(&'a self, watch_name: &'a str) -> WatchViolations<'a> {
        WatchViolations {
            client: self,
            watch_name,
        }
    }

    pub fn get_watch_names(&self) -> Result<Vec<String>> {
        let response = self
            .get_metadata(WATCHES_API_PATH)
            .send()
            .context("cannot query the watch list")?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "server returned error {} when listing watches",
                status.as_u16()
            ));
        }
        let watches: Vec<Watch> = response.json().context("cannot parse the watch list")?;
        Ok(watches
            .into_iter()
            .map(|watch| watch.general_data.name)
            .collect())
    }

    /// Confirm the watch exists before any violation query is issued. The
    /// lookup is an exact, case-sensitive match against the watch list.
    pub fn validate_watch(&self, watch_name: &str) -> Result<()> {
        let names = self.get_watch_names()?;
        if watch_exists(&names, watch_name) {
            Ok(())
        } else {
            Err(anyhow!("watch {} does not exist on the server", watch_name))
        }
    }

    pub fn get_watch(&self, watch_name: &str) -> Result<Watch> {
        let response = self
            .get_metadata(&format!("{}/{}", WATCHES_API_PATH, watch_name))
            .send()
            .with_context(|| format!("cannot query watch {}", watch_name))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "server returned error {} for watch {}",
                status.as_u16(),
                watch_name
            ));
        }
        response
            .json()
            .with_context(|| format!("cannot parse the definition of watch {}", watch_name))
    }

    pub fn update_watch(&self, watch: &Watch) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("{}/{}", WATCHES_API_PATH, watch.general_data.name)))
            .timeout(Duration::from_secs(METADATA_TIMEOUT_SECONDS))
            .header(HEADER_CONTENT_TYPE, HEADER_CONTENT_TYPE_APPLICATION_JSON)
            .bearer_auth(&self.access_token)
            .json(watch)
            .send()
            .with_context(|| format!("cannot update watch {}", watch.general_data.name))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "server returned error {} when updating watch {}",
                status.as_u16(),
                watch.general_data.name
            ));
        }
        Ok(())
    }

    pub fn get_repository_configuration(&self, key: &str) -> Result<RepositoryConfiguration> {
        let response = self
            .get_metadata(&format!("{}/{}", REPOSITORIES_API_PATH, key))
            .send()
            .with_context(|| format!("cannot query repository {}", key))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "server returned error {} for repository {}",
                status.as_u16(),
                key
            ));
        }
        response
            .json()
            .with_context(|| format!("cannot parse the configuration of repository {}", key))
    }

    pub fn get_repository_permissions(&self, key: &str) -> Result<RepositoryPermissions> {
        let response = self
            .get_metadata(&format!("{}/{}?permissions", STORAGE_API_PATH, key))
            .send()
            .with_context(|| format!("cannot query permissions of repository {}", key))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "server returned error {} for permissions of repository {}",
                status.as_u16(),
                key
            ));
        }
        response
            .json()
            .with_context(|| format!("cannot parse the permissions of repository {}", key))
    }

    pub fn get_group(&self, group_name: &str) -> Result<Group> {
        let response = self
            .get_metadata(&format!("{}/{}", GROUPS_API_PATH, group_name))
            .send()
            .with_context(|| format!("cannot query group {}", group_name))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "server returned error {} for group {}",
                status.as_u16(),
                group_name
            ));
        }
        response
            .json()
            .with_context(|| format!("cannot parse group {}", group_name))
    }
}

// Exact, case-sensitive membership: a substring or case variant of an
// existing watch name is not a match.
pub fn watch_exists(names: &[String], watch_name: &str) -> bool {
    names.iter().any(|name| name == watch_name)
}

pub struct WatchViolations<'a> {
    client: &'a XrayClient,
    watch_name: &'a str,
}

impl ViolationSource for WatchViolations<'_> {
    fn fetch_page(&self, limit: u64, offset: u64) -> Result<ViolationsResponse, FetchError> {
        self.client
            .fetch_violations_page(self.watch_name, limit, offset)
    }
}
