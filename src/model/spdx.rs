//! SPDX 2.3 document model.
//!
//! Covers the fields the tool reads or writes; everything else is carried in
//! flattened extras maps so foreign documents survive a parse/serialize
//! round-trip intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// SPDX identifier of the document element itself. Always a valid
/// relationship endpoint even though it never appears in `packages`.
pub const DOCUMENT_SPDX_ID: &str = "SPDXRef-DOCUMENT";

/// An SPDX 2.x document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxDocument {
    #[serde(rename = "SPDXID", default)]
    pub spdx_id: String,
    #[serde(default)]
    pub spdx_version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data_license: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_describes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_info: Option<SpdxCreationInfo>,
    /// Missing array deserializes as empty, per SPDX-JSON in the wild.
    #[serde(default)]
    pub packages: Vec<SpdxPackage>,
    #[serde(default)]
    pub relationships: Vec<SpdxRelationship>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SpdxDocument {
    /// Number of packages in the document.
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Whether every relationship references identifiers that exist in the
    /// package list (or the document element itself).
    pub fn has_dangling_relationships(&self) -> bool {
        let ids: std::collections::HashSet<&str> = self
            .packages
            .iter()
            .map(|p| p.spdx_id.as_str())
            .chain(std::iter::once(DOCUMENT_SPDX_ID))
            .collect();
        self.relationships
            .iter()
            .any(|r| !ids.contains(r.spdx_element_id.as_str()) || !ids.contains(r.related_spdx_element.as_str()))
    }
}

/// SPDX creation info block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxCreationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default)]
    pub creators: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A package entry in an SPDX document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxPackage {
    #[serde(rename = "SPDXID", default)]
    pub spdx_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_concluded: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_declared: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directed relationship between two SPDX elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxRelationship {
    #[serde(default)]
    pub spdx_element_id: String,
    #[serde(default)]
    pub related_spdx_element: String,
    #[serde(default)]
    pub relationship_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SpdxRelationship {
    /// Build a relationship of the given type between two elements.
    pub fn new(
        from: impl Into<String>,
        rel_type: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            spdx_element_id: from.into(),
            relationship_type: rel_type.into(),
            related_spdx_element: to.into(),
            extra: Map::new(),
        }
    }
}
