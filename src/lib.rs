//! **Export and post-process SBOMs from the Endor Labs API.**
//!
//! `sbom-export` fetches Software Bills of Materials for a project from the
//! Endor Labs REST API and post-processes them locally. It powers the
//! `sbom-export` command-line tool and can be used as a library.
//!
//! ## Key Features
//!
//! - **SPDX generation**: requests a CycloneDX export for a project and
//!   converts it into an SPDX 2.3 document, reconstructing DEPENDS_ON /
//!   DEPENDENCY_OF relationships from the project's dependency metadata.
//! - **Test dependency cleaning**: downloads the project's SPDX SBOM and
//!   removes packages named in a plain-text exclusion list, together with
//!   every relationship that touches them.
//! - **Lossless filtering**: SPDX fields the tool does not model are carried
//!   through untouched, so filtered documents stay faithful to the source.
//!
//! ## Core Concepts & Modules
//!
//! - **[`api`]**: blocking client for the Endor Labs v1 API (authentication,
//!   paginated listing, SBOM export).
//! - **[`model`]**: serde models for SPDX and CycloneDX documents.
//! - **[`filter`]**: the exclusion-list filter, a pure function from a
//!   document and a name set to a new document.
//! - **[`convert`]**: CycloneDX to SPDX conversion.
//! - **[`cli`]**: handlers for the `generate` and `clean` subcommands.
//!
//! ## Filtering an SPDX document
//!
//! ```no_run
//! use sbom_export::filter::{filter_document, ExclusionList};
//! use sbom_export::model::SpdxDocument;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let content = std::fs::read_to_string("project-spdx.json")?;
//!     let document: SpdxDocument = serde_json::from_str(&content)?;
//!
//!     let exclusions = ExclusionList::from_names(["pytest", "pytest-cov"]);
//!     let cleaned = filter_document(&document, &exclusions);
//!
//!     println!(
//!         "{} packages kept of {}",
//!         cleaned.package_count(),
//!         document.package_count()
//!     );
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod model;
pub mod output;

// Re-export main types for convenience
pub use api::{ApiClient, DependencyGraph, ExportFormat, SbomKind};
pub use config::{ApiConfig, EnvConfig};
pub use convert::{cyclonedx_to_spdx, ConvertOptions};
pub use error::{ErrorContext, Result, SbomExportError};
pub use filter::{filter_document, ExclusionList};
pub use model::{CdxBom, SpdxDocument, SpdxPackage, SpdxRelationship};
