//! Blocking HTTP client for the Endor Labs API.

use super::types::{
    AuthRequest, AuthResponse, DependencyGraph, DependencyRecord, ExportFormat, ListEnvelope,
    PackageVersionRecord, ProjectDetails, ProjectRecord, SbomExportRequest, SbomKind,
};
use crate::config::ApiConfig;
use crate::error::{ApiErrorKind, Result, SbomExportError};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Helper to convert reqwest errors to API errors
fn network_error(msg: &str, err: reqwest::Error) -> SbomExportError {
    SbomExportError::api(msg, ApiErrorKind::NetworkError(err.to_string()))
}

/// Helper for non-success HTTP statuses, keeping the body for diagnostics
fn status_error(msg: &str, status: u16, body: String) -> SbomExportError {
    SbomExportError::api(msg, ApiErrorKind::ErrorStatus { status, body })
}

/// Authenticated client for the Endor Labs v1 API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Authenticate with an API key and secret, returning a client that
    /// sends the bearer token on every request.
    pub fn authenticate(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| network_error("Failed to create HTTP client", e))?;

        let url = format!("{}/auth/api-key", config.base_url);
        let response = client
            .post(&url)
            .header("Request-Timeout", "60")
            .json(&AuthRequest {
                key: config.key.clone(),
                secret: config.secret.clone(),
            })
            .send()
            .map_err(|e| network_error("Failed to send auth request", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SbomExportError::api(
                "authenticating",
                ApiErrorKind::AuthFailed(format!("status {}: {}", status.as_u16(), body)),
            ));
        }

        let auth: AuthResponse = response.json().map_err(|e| {
            SbomExportError::api(
                "parsing auth response",
                ApiErrorKind::InvalidResponse(e.to_string()),
            )
        })?;
        let token = auth.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            SbomExportError::api(
                "authenticating",
                ApiErrorKind::MissingData("no token in auth response".to_string()),
            )
        })?;

        tracing::debug!("Authenticated against {}", config.base_url);
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token,
        })
    }

    /// Fetch all pages of a list endpoint, following `next_page_id` cursors.
    fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<Vec<T>> {
        let mut objects = Vec::new();
        let mut page_id: Option<String> = None;
        let mut page_num = 1u32;

        loop {
            let mut request = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .header("Request-Timeout", "600")
                .query(params);
            if let Some(id) = &page_id {
                request = request.query(&[("list_parameters.page_id", id.as_str())]);
            }

            let response = request
                .send()
                .map_err(|e| network_error("Failed to send list request", e))?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(status_error(context, status.as_u16(), body));
            }

            let envelope: ListEnvelope<T> = response.json().map_err(|e| {
                SbomExportError::api(context, ApiErrorKind::InvalidResponse(e.to_string()))
            })?;

            let next = envelope.next_page_id().map(str::to_string);
            let page = envelope.into_objects();
            tracing::debug!("{context}: page {page_num} returned {} objects", page.len());
            objects.extend(page);

            match next {
                Some(id) => {
                    page_id = Some(id);
                    page_num += 1;
                }
                None => break,
            }
        }

        Ok(objects)
    }

    /// Resolve a project's name and tenant namespace from its UUID.
    pub fn project(&self, namespace: &str, project_uuid: &str) -> Result<ProjectDetails> {
        let url = format!("{}/namespaces/{namespace}/projects", self.base_url);
        let filter = format!("uuid=={project_uuid}");
        tracing::info!("Fetching project details for {project_uuid}");

        let records: Vec<ProjectRecord> = self.get_all_pages(
            &url,
            &[
                ("list_parameters.filter", filter.as_str()),
                ("list_parameters.mask", "meta.name,tenant_meta.namespace"),
                ("list_parameters.traverse", "true"),
            ],
            "fetching project details",
        )?;

        let record = records.into_iter().next().ok_or_else(|| {
            SbomExportError::api(
                "fetching project details",
                ApiErrorKind::MissingData(format!("project {project_uuid} not found")),
            )
        })?;

        let name = record.meta.and_then(|m| m.name);
        let tenant_namespace = record.tenant_meta.and_then(|t| t.namespace);
        match (name, tenant_namespace) {
            (Some(name), Some(namespace)) => {
                tracing::info!("Project name: {name}, namespace: {namespace}");
                Ok(ProjectDetails { name, namespace })
            }
            _ => Err(SbomExportError::api(
                "fetching project details",
                ApiErrorKind::MissingData(
                    "project record missing name or tenant namespace".to_string(),
                ),
            )),
        }
    }

    /// List all package versions of a project, optionally scoped to a branch
    /// context (the main context is used otherwise).
    pub fn package_versions(
        &self,
        namespace: &str,
        project_uuid: &str,
        branch: Option<&str>,
    ) -> Result<Vec<PackageVersionRecord>> {
        let url = format!("{}/namespaces/{namespace}/package-versions", self.base_url);
        let filter = package_version_filter(project_uuid, branch);
        tracing::info!("Fetching package versions for project {project_uuid}");

        let records: Vec<PackageVersionRecord> = self.get_all_pages(
            &url,
            &[
                ("list_parameters.filter", filter.as_str()),
                ("list_parameters.mask", "uuid,meta.name"),
            ],
            "fetching package versions",
        )?;

        for record in &records {
            tracing::debug!(
                "Found package version {} ({})",
                record.name(),
                record.uuid.as_deref().unwrap_or("?")
            );
        }
        tracing::info!("Total package versions found: {}", records.len());
        Ok(records)
    }

    /// Fetch dependency metadata for a project and fold it into a graph.
    pub fn dependency_metadata(
        &self,
        namespace: &str,
        project_uuid: &str,
    ) -> Result<DependencyGraph> {
        let url = format!(
            "{}/namespaces/{namespace}/dependency-metadata",
            self.base_url
        );
        let filter = format!("spec.importer_data.project_uuid=={project_uuid}");
        tracing::info!("Fetching dependency metadata for project {project_uuid}");

        let records: Vec<DependencyRecord> = self.get_all_pages(
            &url,
            &[
                ("list_parameters.filter", filter.as_str()),
                (
                    "list_parameters.mask",
                    "meta.name,spec.dependency_data,spec.importer_data",
                ),
            ],
            "fetching dependency metadata",
        )?;

        let mut graph = DependencyGraph::default();
        for record in records {
            graph.insert(record);
        }
        tracing::info!(
            "Fetched {} dependencies, {} direct",
            graph.len(),
            graph.direct.len()
        );
        Ok(graph)
    }

    /// Request an SBOM export and return the raw document payload.
    ///
    /// The payload normally arrives as a string at `spec.data` in the
    /// response. Some deployments return the document inline instead, in
    /// which case the response body itself is used.
    pub fn export_sbom(
        &self,
        namespace: &str,
        kind: SbomKind,
        format: ExportFormat,
        package_version_uuids: Vec<String>,
    ) -> Result<String> {
        let url = format!("{}/namespaces/{namespace}/sbom-export", self.base_url);
        let count = package_version_uuids.len();
        let request = SbomExportRequest::new(namespace, kind, format, package_version_uuids);
        tracing::info!("Creating {kind:?} SBOM export for {count} package versions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Request-Timeout", "600")
            .json(&request)
            .send()
            .map_err(|e| network_error("Failed to send export request", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(
                "creating SBOM export",
                status.as_u16(),
                body,
            ));
        }

        let value: Value = response.json().map_err(|e| {
            SbomExportError::api(
                "parsing export response",
                ApiErrorKind::InvalidResponse(e.to_string()),
            )
        })?;

        extract_export_payload(&value)
    }
}

/// Build the package-version list filter for a project and optional branch.
fn package_version_filter(project_uuid: &str, branch: Option<&str>) -> String {
    match branch {
        Some(branch) if !branch.eq_ignore_ascii_case("main") => {
            format!("context.id=={branch} and spec.project_uuid=={project_uuid}")
        }
        _ => format!("context.type==CONTEXT_TYPE_MAIN and spec.project_uuid=={project_uuid}"),
    }
}

/// Pull the SBOM document payload out of an export response.
fn extract_export_payload(value: &Value) -> Result<String> {
    if let Some(data) = value.pointer("/spec/data").and_then(Value::as_str) {
        if !data.is_empty() {
            return Ok(data.to_string());
        }
    }

    // Fallback: some responses carry the document inline
    if value.get("packages").is_some() || value.get("components").is_some() {
        tracing::warn!("No SBOM payload at spec.data; using the response body");
        return Ok(serde_json::to_string(value).map_err(SbomExportError::from)?);
    }

    Err(SbomExportError::api(
        "creating SBOM export",
        ApiErrorKind::MissingData("no SBOM payload at spec.data".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_version_filter_main_context() {
        let filter = package_version_filter("uuid-1", None);
        assert_eq!(
            filter,
            "context.type==CONTEXT_TYPE_MAIN and spec.project_uuid==uuid-1"
        );
        // "main" (any case) means the default context
        assert_eq!(package_version_filter("uuid-1", Some("Main")), filter);
    }

    #[test]
    fn test_package_version_filter_branch_context() {
        let filter = package_version_filter("uuid-1", Some("release/2.0"));
        assert_eq!(
            filter,
            "context.id==release/2.0 and spec.project_uuid==uuid-1"
        );
    }

    #[test]
    fn test_extract_export_payload_from_spec_data() {
        let value: Value =
            serde_json::from_str(r#"{"spec": {"data": "{\"packages\": []}"}}"#).unwrap();
        assert_eq!(
            extract_export_payload(&value).unwrap(),
            "{\"packages\": []}"
        );
    }

    #[test]
    fn test_extract_export_payload_inline_fallback() {
        let value: Value = serde_json::from_str(r#"{"packages": [], "name": "doc"}"#).unwrap();
        let payload = extract_export_payload(&value).unwrap();
        assert!(payload.contains("\"packages\""));
    }

    #[test]
    fn test_extract_export_payload_missing() {
        let value: Value = serde_json::from_str(r#"{"spec": {}}"#).unwrap();
        assert!(extract_export_payload(&value).is_err());
    }
}
