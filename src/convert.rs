//! CycloneDX to SPDX 2.3 conversion.
//!
//! Builds a fresh SPDX document from a CycloneDX bom, with dependency
//! relationships reconstructed from the API's dependency metadata: direct
//! dependencies hang off a synthetic application package, transitive ones
//! off their parents, each with an inverse DEPENDENCY_OF edge.

use crate::api::{split_qualified_name, DependencyGraph};
use crate::model::{CdxBom, CdxComponent, SpdxDocument, SpdxPackage, SpdxRelationship};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Fallbacks for SPDX required fields absent from the CycloneDX input.
const UNKNOWN_SUPPLIER: &str = "Unknown Supplier";
const UNKNOWN_COMPONENT: &str = "Unknown Component";
const NOASSERTION: &str = "NOASSERTION";

/// Document-level inputs for the conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub namespace: String,
    pub project_uuid: String,
    pub organization: Option<String>,
    pub person_email: Option<String>,
}

/// Convert a CycloneDX bom into an SPDX 2.3 document.
pub fn cyclonedx_to_spdx(
    bom: &CdxBom,
    options: &ConvertOptions,
    graph: &DependencyGraph,
) -> SpdxDocument {
    let created = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let document_uuid = Uuid::new_v4();

    let components = bom.component_list();
    if components.is_empty() {
        tracing::warn!("No components found in CycloneDX bom");
    }

    // Synthetic application package the document describes; dependency
    // edges for direct dependencies are rooted here.
    let app_uuid_prefix: String = options
        .project_uuid
        .replace('-', "")
        .chars()
        .take(8)
        .collect();
    let application_id = format!("SPDXRef-Application-{app_uuid_prefix}-{}", Uuid::new_v4());

    let mut creators = Vec::new();
    if let Some(org) = &options.organization {
        creators.push(format!("Organization: {org}"));
    }
    creators.push(concat!("Tool: ", env!("CARGO_PKG_NAME")).to_string());
    if let Some(email) = &options.person_email {
        creators.push(format!("Person: {email}"));
    }

    let mut doc = SpdxDocument {
        spdx_id: crate::model::DOCUMENT_SPDX_ID.to_string(),
        spdx_version: "SPDX-2.3".to_string(),
        name: format!(
            "SBOM for {} Project {}",
            options.namespace, options.project_uuid
        ),
        data_license: "CC0-1.0".to_string(),
        document_namespace: Some(format!(
            "https://api.endorlabs.com/spdx/documents/{document_uuid}"
        )),
        document_describes: Some(vec![application_id.clone()]),
        creation_info: Some(crate::model::SpdxCreationInfo {
            created: Some(created),
            creators,
            ..Default::default()
        }),
        ..Default::default()
    };

    doc.packages.push(SpdxPackage {
        spdx_id: application_id.clone(),
        name: format!("{} Application", options.namespace),
        version_info: Some("1.0.0".to_string()),
        supplier: Some(format!(
            "Organization: {}",
            options.organization.as_deref().unwrap_or(UNKNOWN_SUPPLIER)
        )),
        download_location: Some(NOASSERTION.to_string()),
        license_concluded: Some(NOASSERTION.to_string()),
        license_declared: Some(NOASSERTION.to_string()),
        ..Default::default()
    });
    doc.relationships.push(SpdxRelationship::new(
        doc.spdx_id.clone(),
        "DESCRIBES",
        application_id.clone(),
    ));

    // Map each component to an SPDX package, remembering name@version -> id
    // for relationship building.
    let mut id_by_name_version: HashMap<String, String> = HashMap::new();
    for component in components {
        let package = component_to_package(component);
        let key = format!(
            "{}@{}",
            package.name,
            package.version_info.as_deref().unwrap_or_default()
        );
        id_by_name_version.insert(key, package.spdx_id.clone());
        doc.packages.push(package);
    }

    add_dependency_relationships(&mut doc, &application_id, graph, &id_by_name_version);

    doc
}

/// Map a CycloneDX component onto an SPDX package with the minimum required
/// fields populated.
fn component_to_package(component: &CdxComponent) -> SpdxPackage {
    let name = component
        .name
        .as_deref()
        .unwrap_or(UNKNOWN_COMPONENT)
        .to_string();
    let version = component.version.as_deref().unwrap_or("0.0.0").to_string();

    let supplier = component
        .supplier
        .as_ref()
        .and_then(|s| s.name.as_deref())
        .or(component.publisher.as_deref())
        .unwrap_or(UNKNOWN_SUPPLIER);

    // vcs/distribution external references win, then the purl
    let download_location = component
        .external_references
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .find(|r| matches!(r.ref_type.as_deref(), Some("vcs") | Some("distribution")))
        .and_then(|r| r.url.as_deref())
        .or(component.purl.as_deref())
        .unwrap_or(NOASSERTION)
        .to_string();

    let license = component
        .licenses
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|choice| choice.identifier())
        .collect::<Vec<_>>()
        .join(" AND ");
    let license = if license.is_empty() {
        NOASSERTION.to_string()
    } else {
        license
    };

    SpdxPackage {
        spdx_id: format!("SPDXRef-Package-{}-{version}", name.replace(' ', "-")),
        name,
        version_info: Some(version),
        supplier: Some(format!("Organization: {supplier}")),
        download_location: Some(download_location),
        license_concluded: Some(license.clone()),
        license_declared: Some(license),
        ..Default::default()
    }
}

/// Add DEPENDS_ON / DEPENDENCY_OF edges from the dependency graph.
fn add_dependency_relationships(
    doc: &mut SpdxDocument,
    application_id: &str,
    graph: &DependencyGraph,
    id_by_name_version: &HashMap<String, String>,
) {
    // Qualified API names ("pypi://requests@2.32.3") -> SPDX package ids
    let mut id_by_qualified: HashMap<&str, &str> = HashMap::new();
    for dep in &graph.dependencies {
        if let Some((name, version)) = split_qualified_name(&dep.full_name) {
            if let Some(id) = id_by_name_version.get(&format!("{name}@{version}")) {
                id_by_qualified.insert(dep.full_name.as_str(), id.as_str());
            }
        }
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut add_edge = |doc: &mut SpdxDocument, from: &str, to: &str| {
        if !seen.insert((from.to_string(), to.to_string())) {
            return;
        }
        doc.relationships
            .push(SpdxRelationship::new(from, "DEPENDS_ON", to));
        doc.relationships
            .push(SpdxRelationship::new(to, "DEPENDENCY_OF", from));
    };

    for dep_name in &graph.direct {
        if let Some(dep_id) = id_by_qualified.get(dep_name.as_str()) {
            add_edge(doc, application_id, dep_id);
        }
    }

    for (parent_name, children) in &graph.children {
        let Some(parent_id) = id_by_qualified.get(parent_name.as_str()) else {
            continue;
        };
        let parent_id = (*parent_id).to_string();
        for child_name in children {
            if let Some(child_id) = id_by_qualified.get(child_name.as_str()) {
                add_edge(doc, &parent_id, child_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DependencyInfo;

    fn bom_with(components: &str) -> CdxBom {
        serde_json::from_str(&format!(
            r#"{{"bomFormat": "CycloneDX", "specVersion": "1.5", "components": {components}}}"#
        ))
        .unwrap()
    }

    fn options() -> ConvertOptions {
        ConvertOptions {
            namespace: "acme".to_string(),
            project_uuid: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            organization: Some("Acme Corp".to_string()),
            person_email: Some("dev@acme.test".to_string()),
        }
    }

    fn graph_with(deps: Vec<DependencyInfo>) -> DependencyGraph {
        let mut graph = DependencyGraph::default();
        for dep in deps {
            if dep.direct {
                graph.direct.insert(dep.full_name.clone());
            }
            if let Some(parent) = &dep.parent {
                graph
                    .children
                    .entry(parent.clone())
                    .or_default()
                    .push(dep.full_name.clone());
            }
            graph.dependencies.push(dep);
        }
        graph
    }

    fn dep(full_name: &str, direct: bool, parent: Option<&str>) -> DependencyInfo {
        let (name, version) = split_qualified_name(full_name).unwrap();
        DependencyInfo {
            full_name: full_name.to_string(),
            package_name: name.to_string(),
            version: version.to_string(),
            direct,
            parent: parent.map(str::to_string),
        }
    }

    #[test]
    fn test_document_skeleton() {
        let bom = bom_with(r#"[{"name": "requests", "version": "2.32.3"}]"#);
        let doc = cyclonedx_to_spdx(&bom, &options(), &DependencyGraph::default());

        assert_eq!(doc.spdx_version, "SPDX-2.3");
        assert_eq!(doc.data_license, "CC0-1.0");
        assert!(doc
            .document_namespace
            .as_deref()
            .unwrap()
            .starts_with("https://api.endorlabs.com/spdx/documents/"));

        // Application package + one component
        assert_eq!(doc.package_count(), 2);
        let app_id = &doc.document_describes.as_ref().unwrap()[0];
        assert!(app_id.starts_with("SPDXRef-Application-123e4567-"));
        assert_eq!(doc.packages[0].spdx_id, *app_id);

        // DESCRIBES edge from the document to the application
        assert_eq!(doc.relationships[0].relationship_type, "DESCRIBES");
        assert_eq!(doc.relationships[0].related_spdx_element, *app_id);

        let creators = &doc.creation_info.as_ref().unwrap().creators;
        assert!(creators.iter().any(|c| c == "Organization: Acme Corp"));
        assert!(creators.iter().any(|c| c == "Person: dev@acme.test"));
        assert!(creators.iter().any(|c| c.starts_with("Tool: ")));
    }

    #[test]
    fn test_component_mapping_defaults() {
        let bom = bom_with(r#"[{"name": "left pad"}]"#);
        let doc = cyclonedx_to_spdx(&bom, &options(), &DependencyGraph::default());

        let pkg = &doc.packages[1];
        assert_eq!(pkg.spdx_id, "SPDXRef-Package-left-pad-0.0.0");
        assert_eq!(pkg.name, "left pad");
        assert_eq!(pkg.version_info.as_deref(), Some("0.0.0"));
        assert_eq!(
            pkg.supplier.as_deref(),
            Some("Organization: Unknown Supplier")
        );
        assert_eq!(pkg.download_location.as_deref(), Some(NOASSERTION));
        assert_eq!(pkg.license_concluded.as_deref(), Some(NOASSERTION));
    }

    #[test]
    fn test_download_location_preference() {
        let bom = bom_with(
            r#"[{
                "name": "requests",
                "version": "2.32.3",
                "purl": "pkg:pypi/requests@2.32.3",
                "externalReferences": [
                    {"type": "website", "url": "https://requests.example"},
                    {"type": "vcs", "url": "https://github.com/psf/requests"}
                ]
            }]"#,
        );
        let doc = cyclonedx_to_spdx(&bom, &options(), &DependencyGraph::default());
        assert_eq!(
            doc.packages[1].download_location.as_deref(),
            Some("https://github.com/psf/requests")
        );
    }

    #[test]
    fn test_purl_fallback_for_download_location() {
        let bom = bom_with(
            r#"[{"name": "requests", "version": "2.32.3", "purl": "pkg:pypi/requests@2.32.3"}]"#,
        );
        let doc = cyclonedx_to_spdx(&bom, &options(), &DependencyGraph::default());
        assert_eq!(
            doc.packages[1].download_location.as_deref(),
            Some("pkg:pypi/requests@2.32.3")
        );
    }

    #[test]
    fn test_licenses_joined() {
        let bom = bom_with(
            r#"[{
                "name": "dual",
                "version": "1.0.0",
                "licenses": [
                    {"license": {"id": "MIT"}},
                    {"expression": "Apache-2.0"}
                ]
            }]"#,
        );
        let doc = cyclonedx_to_spdx(&bom, &options(), &DependencyGraph::default());
        assert_eq!(
            doc.packages[1].license_declared.as_deref(),
            Some("MIT AND Apache-2.0")
        );
    }

    #[test]
    fn test_dependency_edges() {
        let bom = bom_with(
            r#"[
                {"name": "requests", "version": "2.32.3"},
                {"name": "urllib3", "version": "2.2.1"}
            ]"#,
        );
        let graph = graph_with(vec![
            dep("pypi://requests@2.32.3", true, None),
            dep("pypi://urllib3@2.2.1", false, Some("pypi://requests@2.32.3")),
        ]);
        let doc = cyclonedx_to_spdx(&bom, &options(), &graph);

        let app_id = doc.document_describes.as_ref().unwrap()[0].clone();
        let requests_id = "SPDXRef-Package-requests-2.32.3";
        let urllib3_id = "SPDXRef-Package-urllib3-2.2.1";

        let has_edge = |from: &str, rel: &str, to: &str| {
            doc.relationships.iter().any(|r| {
                r.spdx_element_id == from
                    && r.relationship_type == rel
                    && r.related_spdx_element == to
            })
        };

        assert!(has_edge(&app_id, "DEPENDS_ON", requests_id));
        assert!(has_edge(requests_id, "DEPENDENCY_OF", &app_id));
        assert!(has_edge(requests_id, "DEPENDS_ON", urllib3_id));
        assert!(has_edge(urllib3_id, "DEPENDENCY_OF", requests_id));

        // No dangling edges in the converted document
        assert!(!doc.has_dangling_relationships());
    }

    #[test]
    fn test_duplicate_edges_suppressed() {
        let bom = bom_with(
            r#"[
                {"name": "a", "version": "1"},
                {"name": "b", "version": "1"}
            ]"#,
        );
        let mut graph = graph_with(vec![
            dep("pypi://a@1", true, None),
            dep("pypi://b@1", false, Some("pypi://a@1")),
        ]);
        // Duplicate parent->child entry, as pagination can produce
        graph
            .children
            .get_mut("pypi://a@1")
            .unwrap()
            .push("pypi://b@1".to_string());
        let doc = cyclonedx_to_spdx(&bom, &options(), &graph);

        let depends_on_count = doc
            .relationships
            .iter()
            .filter(|r| {
                r.relationship_type == "DEPENDS_ON"
                    && r.spdx_element_id == "SPDXRef-Package-a-1"
                    && r.related_spdx_element == "SPDXRef-Package-b-1"
            })
            .count();
        assert_eq!(depends_on_count, 1);
    }

    #[test]
    fn test_unmapped_dependency_skipped() {
        // Dependency metadata mentions a package the bom does not contain
        let bom = bom_with(r#"[{"name": "a", "version": "1"}]"#);
        let graph = graph_with(vec![dep("pypi://ghost@9", true, None)]);
        let doc = cyclonedx_to_spdx(&bom, &options(), &graph);

        assert_eq!(doc.relationships.len(), 1); // only DESCRIBES
        assert!(!doc.has_dangling_relationships());
    }
}
