//! CycloneDX bom model (read-only).
//!
//! Only the fields consumed by the SPDX conversion are modeled.

use serde::Deserialize;

/// A CycloneDX bom as returned by the export API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxBom {
    pub bom_format: Option<String>,
    pub spec_version: Option<String>,
    pub metadata: Option<CdxMetadata>,
    pub components: Option<Vec<CdxComponent>>,
}

impl CdxBom {
    /// Components of the bom. Some exports nest the component list under
    /// `metadata.component.components` instead of the top level.
    pub fn component_list(&self) -> &[CdxComponent] {
        match &self.components {
            Some(components) if !components.is_empty() => components,
            _ => self
                .metadata
                .as_ref()
                .and_then(|m| m.component.as_ref())
                .and_then(|c| c.components.as_deref())
                .unwrap_or(&[]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxMetadata {
    pub component: Option<CdxComponent>,
}

/// A CycloneDX component.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxComponent {
    pub name: Option<String>,
    pub version: Option<String>,
    pub supplier: Option<CdxSupplier>,
    pub publisher: Option<String>,
    pub purl: Option<String>,
    pub licenses: Option<Vec<CdxLicenseChoice>>,
    pub external_references: Option<Vec<CdxExternalReference>>,
    /// Nested components (metadata.component fallback)
    pub components: Option<Vec<CdxComponent>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxSupplier {
    pub name: Option<String>,
}

/// Either a concrete license or an SPDX expression.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxLicenseChoice {
    pub license: Option<CdxLicense>,
    pub expression: Option<String>,
}

impl CdxLicenseChoice {
    /// The license identifier this entry names, if any.
    pub fn identifier(&self) -> Option<&str> {
        if let Some(license) = &self.license {
            license.id.as_deref().or(license.name.as_deref())
        } else {
            self.expression.as_deref()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxLicense {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxExternalReference {
    #[serde(rename = "type")]
    pub ref_type: Option<String>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_bom() {
        let json = r#"{
            "bomFormat": "CycloneDX",
            "specVersion": "1.5",
            "components": [
                {"name": "requests", "version": "2.32.3", "purl": "pkg:pypi/requests@2.32.3"}
            ]
        }"#;
        let bom: CdxBom = serde_json::from_str(json).unwrap();
        assert_eq!(bom.component_list().len(), 1);
        assert_eq!(bom.component_list()[0].name.as_deref(), Some("requests"));
    }

    #[test]
    fn test_nested_components_fallback() {
        let json = r#"{
            "bomFormat": "CycloneDX",
            "metadata": {
                "component": {
                    "name": "app",
                    "components": [{"name": "flask", "version": "3.0.0"}]
                }
            }
        }"#;
        let bom: CdxBom = serde_json::from_str(json).unwrap();
        assert_eq!(bom.component_list().len(), 1);
        assert_eq!(bom.component_list()[0].name.as_deref(), Some("flask"));
    }

    #[test]
    fn test_license_identifier() {
        let choice: CdxLicenseChoice =
            serde_json::from_str(r#"{"license": {"id": "MIT"}}"#).unwrap();
        assert_eq!(choice.identifier(), Some("MIT"));

        let choice: CdxLicenseChoice =
            serde_json::from_str(r#"{"license": {"name": "Custom"}}"#).unwrap();
        assert_eq!(choice.identifier(), Some("Custom"));

        let choice: CdxLicenseChoice =
            serde_json::from_str(r#"{"expression": "MIT OR Apache-2.0"}"#).unwrap();
        assert_eq!(choice.identifier(), Some("MIT OR Apache-2.0"));

        let choice: CdxLicenseChoice = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(choice.identifier(), None);
    }
}
