//! Request and response types for the Endor Labs REST API.
//!
//! The API wraps list results in a `list.objects` envelope with cursor
//! pagination via `list.response.next_page_id`, and uses snake_case field
//! names throughout.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// POST body for `/auth/api-key`.
#[derive(Debug, Serialize)]
pub struct AuthRequest {
    pub key: String,
    pub secret: String,
}

/// Response from `/auth/api-key`.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: Option<String>,
}

/// Generic list envelope wrapping paginated results.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    pub list: Option<ListBody<T>>,
}

#[derive(Debug, Deserialize)]
pub struct ListBody<T> {
    #[serde(default = "Vec::new")]
    pub objects: Vec<T>,
    pub response: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    pub next_page_id: Option<String>,
}

impl<T> ListEnvelope<T> {
    /// Extract the objects of this page, consuming the envelope.
    pub fn into_objects(self) -> Vec<T> {
        self.list.map(|body| body.objects).unwrap_or_default()
    }

    /// Cursor for the next page, if any.
    pub fn next_page_id(&self) -> Option<&str> {
        self.list
            .as_ref()
            .and_then(|body| body.response.as_ref())
            .and_then(|r| r.next_page_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Common `meta` block.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

/// Common `tenant_meta` block.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantMeta {
    pub namespace: Option<String>,
}

/// A package version record (masked to `uuid,meta.name`).
#[derive(Debug, Clone, Deserialize)]
pub struct PackageVersionRecord {
    pub uuid: Option<String>,
    pub meta: Option<Meta>,
}

impl PackageVersionRecord {
    pub fn name(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// A project record (masked to `meta.name,tenant_meta.namespace`).
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
    pub meta: Option<Meta>,
    pub tenant_meta: Option<TenantMeta>,
}

/// Resolved project details.
#[derive(Debug, Clone)]
pub struct ProjectDetails {
    pub name: String,
    pub namespace: String,
}

/// A dependency metadata record.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyRecord {
    pub meta: Option<Meta>,
    pub spec: Option<DependencySpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependencySpec {
    pub dependency_data: Option<DependencyData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependencyData {
    pub package_name: Option<String>,
    pub resolved_version: Option<String>,
    #[serde(default)]
    pub direct: bool,
    pub parent_version_name: Option<String>,
}

/// A single resolved dependency.
///
/// `full_name` is the API's qualified form, e.g. `pypi://requests@2.32.3`.
#[derive(Debug, Clone)]
pub struct DependencyInfo {
    pub full_name: String,
    pub package_name: String,
    pub version: String,
    pub direct: bool,
    pub parent: Option<String>,
}

/// Dependency relationships for a project, folded from all metadata pages.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub dependencies: Vec<DependencyInfo>,
    /// Qualified names of direct dependencies of the project
    pub direct: HashSet<String>,
    /// Parent qualified name -> child qualified names
    pub children: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Fold one dependency record into the graph.
    pub fn insert(&mut self, record: DependencyRecord) {
        let full_name = record
            .meta
            .as_ref()
            .and_then(|m| m.name.clone())
            .unwrap_or_default();
        let data = record
            .spec
            .and_then(|s| s.dependency_data)
            .unwrap_or(DependencyData {
                package_name: None,
                resolved_version: None,
                direct: false,
                parent_version_name: None,
            });

        let parent = data.parent_version_name.filter(|p| !p.is_empty());

        if data.direct {
            self.direct.insert(full_name.clone());
        }
        if let Some(parent_name) = &parent {
            self.children
                .entry(parent_name.clone())
                .or_default()
                .push(full_name.clone());
        }

        self.dependencies.push(DependencyInfo {
            full_name,
            package_name: data.package_name.unwrap_or_default(),
            version: data.resolved_version.unwrap_or_default(),
            direct: data.direct,
            parent,
        });
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Split a qualified dependency name like `pypi://requests@2.32.3` into
/// `(name, version)`.
pub fn split_qualified_name(full_name: &str) -> Option<(&str, &str)> {
    let (head, version) = full_name.rsplit_once('@')?;
    let name = match head.split_once("://") {
        Some((_, name)) => name,
        None => head,
    };
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name, version))
}

/// SBOM kind for the export endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SbomKind {
    #[serde(rename = "SBOM_KIND_SPDX")]
    Spdx,
    #[serde(rename = "SBOM_KIND_CYCLONEDX")]
    CycloneDx,
}

/// Payload format for the export endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "FORMAT_JSON")]
    Json,
    #[serde(rename = "FORMAT_XML")]
    Xml,
}

/// POST body for `/namespaces/{ns}/sbom-export`.
#[derive(Debug, Serialize)]
pub struct SbomExportRequest {
    pub tenant_meta: ExportTenantMeta,
    pub meta: ExportMeta,
    pub spec: ExportSpec,
}

#[derive(Debug, Serialize)]
pub struct ExportTenantMeta {
    pub namespace: String,
}

#[derive(Debug, Serialize)]
pub struct ExportMeta {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ExportSpec {
    pub kind: SbomKind,
    pub format: ExportFormat,
    pub component_type: String,
    pub export_parameters: ExportParameters,
}

#[derive(Debug, Serialize)]
pub struct ExportParameters {
    pub package_version_uuids: Vec<String>,
}

impl SbomExportRequest {
    /// Build an export request for the given package versions.
    pub fn new(
        namespace: &str,
        kind: SbomKind,
        format: ExportFormat,
        package_version_uuids: Vec<String>,
    ) -> Self {
        let label = match kind {
            SbomKind::Spdx => "SPDX SBOM Export",
            SbomKind::CycloneDx => "SBOM Export",
        };
        Self {
            tenant_meta: ExportTenantMeta {
                namespace: namespace.to_string(),
            },
            meta: ExportMeta {
                name: format!("{label}: {namespace}-sbom"),
            },
            spec: ExportSpec {
                kind,
                format,
                component_type: "COMPONENT_TYPE_APPLICATION".to_string(),
                export_parameters: ExportParameters {
                    package_version_uuids,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_envelope_pagination() {
        let json = r#"{
            "list": {
                "objects": [
                    {"uuid": "u1", "meta": {"name": "pkg-a"}},
                    {"uuid": "u2", "meta": {"name": "pkg-b"}}
                ],
                "response": {"next_page_id": "page-2"}
            }
        }"#;
        let envelope: ListEnvelope<PackageVersionRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.next_page_id(), Some("page-2"));
        let objects = envelope.into_objects();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name(), "pkg-a");
    }

    #[test]
    fn test_list_envelope_last_page() {
        let json = r#"{"list": {"objects": [], "response": {"next_page_id": ""}}}"#;
        let envelope: ListEnvelope<PackageVersionRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.next_page_id(), None);
        assert!(envelope.into_objects().is_empty());
    }

    #[test]
    fn test_dependency_graph_fold() {
        let mut graph = DependencyGraph::default();
        let record: DependencyRecord = serde_json::from_str(
            r#"{
                "meta": {"name": "pypi://requests@2.32.3"},
                "spec": {
                    "dependency_data": {
                        "package_name": "requests",
                        "resolved_version": "2.32.3",
                        "direct": true,
                        "parent_version_name": ""
                    }
                }
            }"#,
        )
        .unwrap();
        graph.insert(record);

        let record: DependencyRecord = serde_json::from_str(
            r#"{
                "meta": {"name": "pypi://urllib3@2.2.1"},
                "spec": {
                    "dependency_data": {
                        "package_name": "urllib3",
                        "resolved_version": "2.2.1",
                        "direct": false,
                        "parent_version_name": "pypi://requests@2.32.3"
                    }
                }
            }"#,
        )
        .unwrap();
        graph.insert(record);

        assert_eq!(graph.len(), 2);
        assert!(graph.direct.contains("pypi://requests@2.32.3"));
        assert_eq!(
            graph.children["pypi://requests@2.32.3"],
            vec!["pypi://urllib3@2.2.1"]
        );
    }

    #[test]
    fn test_split_qualified_name() {
        assert_eq!(
            split_qualified_name("pypi://requests@2.32.3"),
            Some(("requests", "2.32.3"))
        );
        assert_eq!(
            split_qualified_name("npm://@scope/pkg@1.0.0"),
            Some(("@scope/pkg", "1.0.0"))
        );
        assert_eq!(split_qualified_name("plain@1.0"), Some(("plain", "1.0")));
        assert_eq!(split_qualified_name("no-version"), None);
    }

    #[test]
    fn test_export_request_shape() {
        let request = SbomExportRequest::new(
            "acme",
            SbomKind::CycloneDx,
            ExportFormat::Json,
            vec!["uuid-1".to_string()],
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["spec"]["kind"], "SBOM_KIND_CYCLONEDX");
        assert_eq!(json["spec"]["format"], "FORMAT_JSON");
        assert_eq!(json["spec"]["component_type"], "COMPONENT_TYPE_APPLICATION");
        assert_eq!(json["tenant_meta"]["namespace"], "acme");
        assert_eq!(
            json["spec"]["export_parameters"]["package_version_uuids"][0],
            "uuid-1"
        );
    }
}
