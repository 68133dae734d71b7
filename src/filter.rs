//! Exclusion-list filtering of SPDX documents.
//!
//! Removes packages whose names appear in a user-supplied exclusion list
//! (typically test/dev dependencies) together with every relationship that
//! touches them, so the filtered document has no dangling edges.

use crate::model::{SpdxDocument, SpdxRelationship};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;

/// Creator entry appended to cleaned documents.
const CLEANER_CREATOR: &str = concat!("Tool: ", env!("CARGO_PKG_NAME"), " cleaner");

/// A set of package names to exclude from an SPDX document.
///
/// Entries match a package either by exact name or by exact
/// `name@versionInfo`. Matching is case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    names: HashSet<String>,
}

impl ExclusionList {
    /// An empty list; filtering with it is the identity transform.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a list from an iterator of names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Load an exclusion list from a newline-delimited file.
    ///
    /// Blank lines and lines starting with `#` are skipped. A missing file
    /// is not an error: it yields an empty list.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Exclusion file {} not found; no packages will be removed",
                path.display()
            );
            return Ok(Self::empty());
        }
        let content = std::fs::read_to_string(path)?;
        let list = Self::parse(&content);
        tracing::info!(
            "Loaded {} exclusion entries from {}",
            list.len(),
            path.display()
        );
        Ok(list)
    }

    /// Parse exclusion entries from file content.
    pub fn parse(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether a package with this name and version is excluded.
    pub fn matches(&self, name: &str, version: Option<&str>) -> bool {
        if self.names.contains(name) {
            return true;
        }
        match version {
            Some(version) => self.names.contains(&format!("{name}@{version}")),
            None => false,
        }
    }
}

/// Derive a new document with excluded packages and their relationships
/// removed.
///
/// Packages are excluded on an exact name (or `name@version`) match; every
/// relationship whose source or target identifier belongs to an excluded
/// package is dropped with it. Relative order of the kept packages and
/// relationships is preserved. Relationships referencing identifiers that
/// were already absent from the package list pass through untouched.
///
/// An empty exclusion list returns the document unchanged.
pub fn filter_document(doc: &SpdxDocument, exclusions: &ExclusionList) -> SpdxDocument {
    if exclusions.is_empty() {
        return doc.clone();
    }

    let mut filtered = doc.clone();

    let excluded_ids: HashSet<&str> = doc
        .packages
        .iter()
        .filter(|pkg| exclusions.matches(&pkg.name, pkg.version_info.as_deref()))
        .map(|pkg| pkg.spdx_id.as_str())
        .collect();

    if excluded_ids.is_empty() {
        return filtered;
    }

    for pkg in doc
        .packages
        .iter()
        .filter(|pkg| excluded_ids.contains(pkg.spdx_id.as_str()))
    {
        tracing::debug!(
            "Removing {}@{} ({})",
            pkg.name,
            pkg.version_info.as_deref().unwrap_or("?"),
            pkg.spdx_id
        );
    }

    filtered
        .packages
        .retain(|pkg| !excluded_ids.contains(pkg.spdx_id.as_str()));
    filtered.relationships.retain(|rel| {
        !excluded_ids.contains(rel.spdx_element_id.as_str())
            && !excluded_ids.contains(rel.related_spdx_element.as_str())
    });

    tracing::info!(
        "Removed {} packages and {} relationships",
        doc.packages.len() - filtered.packages.len(),
        doc.relationships.len() - filtered.relationships.len()
    );

    filtered
}

/// Stamp a cleaned document with the cleaning tool and a fresh timestamp.
///
/// Deliberately separate from [`filter_document`], which stays pure: callers
/// apply this to the cleaned copy only, right before writing it out.
pub fn record_cleaning_tool(doc: &mut SpdxDocument) {
    record_cleaning_tool_at(doc, Utc::now());
}

/// Timestamp-injectable variant of [`record_cleaning_tool`].
pub fn record_cleaning_tool_at(doc: &mut SpdxDocument, now: DateTime<Utc>) {
    let info = doc.creation_info.get_or_insert_with(Default::default);
    info.created = Some(now.format("%Y-%m-%dT%H:%M:%SZ").to_string());
    if !info.creators.iter().any(|c| c == CLEANER_CREATOR) {
        info.creators.push(CLEANER_CREATOR.to_string());
    }
}

/// Convenience for tests and callers that build relationships inline.
pub fn depends_on(from: &str, to: &str) -> SpdxRelationship {
    SpdxRelationship::new(from, "DEPENDS_ON", to)
}
