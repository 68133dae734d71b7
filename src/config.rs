//! Configuration loaded from the environment.
//!
//! Credentials and tenant defaults come from environment variables, with
//! `.env` file support for local use. Only the API key and secret are
//! required; everything else has a sensible default or is optional.

use crate::error::{Result, SbomExportError};
use std::time::Duration;

/// Default base URL for the Endor Labs REST API.
pub const DEFAULT_API_BASE: &str = "https://api.endorlabs.com/v1";

/// Default request timeout. SBOM exports for large projects are slow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default exclusion list file name for the `clean` subcommand.
pub const DEFAULT_EXCLUDE_FILE: &str = "test_dependencies.txt";

/// API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the API (no trailing slash)
    pub base_url: String,
    /// API key
    pub key: String,
    /// API secret
    pub secret: String,
    /// Request timeout
    pub timeout: Duration,
}

/// Environment-derived settings for a run.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub api: ApiConfig,
    /// Tenant namespace used to look projects up (`ENDOR_NAMESPACE`)
    pub namespace: Option<String>,
    /// Organization recorded as an SPDX creator (`ORGANIZATION`)
    pub organization: Option<String>,
    /// Contact email recorded as an SPDX creator (`PERSON_EMAIL`)
    pub person_email: Option<String>,
}

impl EnvConfig {
    /// Load configuration from the process environment, reading a `.env`
    /// file first if one is present.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup("API_KEY");
        let secret = lookup("API_SECRET");

        let (key, secret) = match (key, secret) {
            (Some(k), Some(s)) if !k.is_empty() && !s.is_empty() => (k, s),
            _ => {
                return Err(SbomExportError::config(
                    "API_KEY and API_SECRET must be set (in the environment or a .env file)",
                ));
            }
        };

        let base_url = lookup("ENDOR_API_URL")
            .filter(|v| !v.is_empty())
            .map_or_else(|| DEFAULT_API_BASE.to_string(), |v| {
                v.trim_end_matches('/').to_string()
            });

        Ok(Self {
            api: ApiConfig {
                base_url,
                key,
                secret,
                timeout: DEFAULT_TIMEOUT,
            },
            namespace: lookup("ENDOR_NAMESPACE").filter(|v| !v.is_empty()),
            organization: lookup("ORGANIZATION").filter(|v| !v.is_empty()),
            person_email: lookup("PERSON_EMAIL").filter(|v| !v.is_empty()),
        })
    }
}
