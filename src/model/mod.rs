//! Typed SBOM document models.
//!
//! SPDX documents round-trip: unknown fields are preserved through flattened
//! extras maps so a fetched document can be filtered and re-serialized
//! without losing data the tool does not model. CycloneDX is read-only input
//! for conversion.

mod cyclonedx;
mod spdx;

pub use cyclonedx::{CdxBom, CdxComponent, CdxExternalReference, CdxLicenseChoice, CdxSupplier};
pub use spdx::{SpdxCreationInfo, SpdxDocument, SpdxPackage, SpdxRelationship, DOCUMENT_SPDX_ID};
