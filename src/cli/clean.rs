//! Clean command handler.
//!
//! Downloads the project's SPDX SBOM and removes the packages named in the
//! exclusion list, writing both the original and the cleaned document.

use crate::api::{ApiClient, ExportFormat, SbomKind};
use crate::config::EnvConfig;
use crate::filter::{filter_document, record_cleaning_tool, ExclusionList};
use crate::model::SpdxDocument;
use crate::output::{cleaned_spdx_name, original_spdx_name, write_json_pretty};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Settings for the `clean` subcommand.
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// UUID of the project to export
    pub project_uuid: String,
    /// Branch context to analyze (main context if absent)
    pub branch: Option<String>,
    /// Exclusion list file
    pub exclude_file: PathBuf,
    /// Cleaned output path (defaults to `{uuid}[-branch]-cleaned-spdx.json`)
    pub output: Option<PathBuf>,
}

/// Run the clean command.
pub fn run_clean(config: CleanConfig) -> Result<()> {
    let env = EnvConfig::load()?;
    let Some(initial_namespace) = env.namespace.clone() else {
        bail!("ENDOR_NAMESPACE must be set for the clean command");
    };

    let client = ApiClient::authenticate(&env.api).context("authentication failed")?;

    // The project may live in a child namespace of the configured one
    let project = client
        .project(&initial_namespace, &config.project_uuid)
        .with_context(|| format!("could not resolve project {}", config.project_uuid))?;
    tracing::info!(
        "Using namespace {} for project {}",
        project.namespace,
        project.name
    );

    let package_versions = client.package_versions(
        &project.namespace,
        &config.project_uuid,
        config.branch.as_deref(),
    )?;
    if package_versions.is_empty() {
        bail!(
            "No package versions found for project {}",
            config.project_uuid
        );
    }
    let uuids: Vec<String> = package_versions
        .into_iter()
        .filter_map(|pv| pv.uuid)
        .collect();

    let payload = client.export_sbom(
        &project.namespace,
        SbomKind::Spdx,
        ExportFormat::Json,
        uuids,
    )?;
    let document: SpdxDocument =
        serde_json::from_str(&payload).context("SPDX export payload is not valid SPDX-JSON")?;

    let exclusions = ExclusionList::load(&config.exclude_file)
        .with_context(|| format!("reading {}", config.exclude_file.display()))?;

    let mut cleaned = filter_document(&document, &exclusions);
    if !exclusions.is_empty() {
        record_cleaning_tool(&mut cleaned);
    }

    let cleaned_path = config
        .output
        .unwrap_or_else(|| cleaned_spdx_name(&config.project_uuid, config.branch.as_deref()));
    let original_path = original_spdx_name(&cleaned_path);

    write_json_pretty(&original_path, &document)?;
    write_json_pretty(&cleaned_path, &cleaned)?;

    println!("SBOM processing complete");
    println!("Original SBOM saved to: {}", original_path.display());
    println!("Cleaned SBOM saved to:  {}", cleaned_path.display());
    println!("Original packages: {}", document.package_count());
    println!("Cleaned packages:  {}", cleaned.package_count());
    println!(
        "Removed packages:  {}",
        document.package_count() - cleaned.package_count()
    );

    Ok(())
}
