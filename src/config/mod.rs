//! Configuration management for fmaportal

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default sheets API host
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sheets API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Spreadsheet holding every portal table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    /// Sheets API host
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Base URL the page partials are served from. Unset means the
    /// partials bundled with the binary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,

    /// How long fetched tables stay fresh, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Sheet names for each portal table
    #[serde(default)]
    pub sheets: SheetNames,
}

/// Names of the sheets backing each portal table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub implementation_structure: String,
    pub municipalities: String,
    pub activities: String,
    pub internal_directory: String,
    pub external_directory: String,
    pub npmo_directory: String,
    pub reference_files: String,
    pub fma_profile: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            implementation_structure: "Implementation_Structure".to_string(),
            municipalities: "Municipalities".to_string(),
            activities: "Activities".to_string(),
            internal_directory: "Internal_Directory".to_string(),
            external_directory: "External_Directory".to_string(),
            npmo_directory: "NPMO_Directory".to_string(),
            reference_files: "Reference_Files".to_string(),
            fma_profile: "FMA_Profile".to_string(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    crate::cache::DEFAULT_TTL.as_secs()
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".fmaportal").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete config path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional path (defaults to ~/.fmaportal/config.yaml)
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // The file holds the API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Apply `FMAPORTAL_API_BASE` / `FMAPORTAL_SITE_URL` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var("FMAPORTAL_API_BASE")
            && !base.trim().is_empty()
        {
            self.api_base = base;
        }
        if let Ok(site) = std::env::var("FMAPORTAL_SITE_URL")
            && !site.trim().is_empty()
        {
            self.site_url = Some(site);
        }
    }

    /// Validate that the data source is fully configured
    pub fn validate(&self) -> Result<()> {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingApiKey.into());
        }
        if self.spreadsheet_id.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingSpreadsheetId.into());
        }
        if reqwest::Url::parse(&self.api_base).is_err() {
            return Err(
                ConfigError::Invalid(format!("api_base is not a URL: {}", self.api_base)).into(),
            );
        }
        if let Some(site) = &self.site_url
            && reqwest::Url::parse(site).is_err()
        {
            return Err(ConfigError::Invalid(format!("site_url is not a URL: {}", site)).into());
        }
        Ok(())
    }

    /// Cache time-to-live as a `Duration`
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            spreadsheet_id: None,
            api_base: default_api_base(),
            site_url: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            sheets: SheetNames::default(),
        }
    }
}
