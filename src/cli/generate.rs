//! Generate command handler.
//!
//! Builds an SPDX SBOM for a project by requesting a CycloneDX export from
//! the API and converting it, with dependency relationships reconstructed
//! from the project's dependency metadata.

use crate::api::{ApiClient, ExportFormat, SbomKind};
use crate::config::EnvConfig;
use crate::convert::{cyclonedx_to_spdx, ConvertOptions};
use crate::model::CdxBom;
use crate::output::{generated_spdx_name, write_json_pretty, write_raw};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Settings for the `generate` subcommand.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Tenant namespace
    pub namespace: String,
    /// UUID of the project to export
    pub project_uuid: String,
    /// SPDX output path (defaults to `{uuid}-spdx.json`)
    pub output: Option<PathBuf>,
    /// Also persist the raw CycloneDX export here
    pub cyclonedx_output: Option<PathBuf>,
    /// Format of the raw CycloneDX dump (conversion always uses JSON)
    pub cyclonedx_format: ExportFormat,
}

/// Run the generate command.
pub fn run_generate(config: GenerateConfig) -> Result<()> {
    let env = EnvConfig::load()?;
    let client = ApiClient::authenticate(&env.api).context("authentication failed")?;

    let package_versions =
        client.package_versions(&config.namespace, &config.project_uuid, None)?;
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

    let graph = client.dependency_metadata(&config.namespace, &config.project_uuid)?;

    let payload = client.export_sbom(
        &config.namespace,
        SbomKind::CycloneDx,
        ExportFormat::Json,
        uuids.clone(),
    )?;
    let bom: CdxBom = serde_json::from_str(&payload)
        .context("CycloneDX export payload is not valid CycloneDX-JSON")?;

    if let Some(path) = &config.cyclonedx_output {
        // An XML dump needs its own export; the JSON payload is already here
        let raw = match config.cyclonedx_format {
            ExportFormat::Json => payload,
            ExportFormat::Xml => client.export_sbom(
                &config.namespace,
                SbomKind::CycloneDx,
                ExportFormat::Xml,
                uuids,
            )?,
        };
        write_raw(path, &raw)?;
    }

    let options = ConvertOptions {
        namespace: config.namespace.clone(),
        project_uuid: config.project_uuid.clone(),
        organization: env.organization,
        person_email: env.person_email,
    };
    let document = cyclonedx_to_spdx(&bom, &options, &graph);

    let output = config
        .output
        .unwrap_or_else(|| generated_spdx_name(&config.project_uuid));
    write_json_pretty(&output, &document)?;

    println!("SPDX SBOM generation complete. Saved to {}", output.display());
    println!("Packages: {}", document.package_count());
    println!("Relationships: {}", document.relationships.len());

    Ok(())
}
