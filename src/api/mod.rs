//! Endor Labs REST API client.
//!
//! Single-attempt, fail-fast: every request is tried once and any failure is
//! surfaced to the caller with its HTTP status and body.

mod client;
mod types;

pub use client::ApiClient;
pub use types::{
    DependencyGraph, DependencyInfo, ExportFormat, PackageVersionRecord, ProjectDetails, SbomKind,
    split_qualified_name,
};
