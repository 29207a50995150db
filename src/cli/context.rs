//! Command execution context
//!
//! Loads and validates configuration once and builds the data service and
//! router the commands work with.

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::SheetsClient;
use crate::config::Config;
use crate::data::DataService;
use crate::error::Result;
use crate::router::{Router, SitePartials};
use crate::storage::Session;

/// Router over the live sheets API and the configured partial site
pub type PortalRouter = Router<SheetsClient, SitePartials>;

/// Context for command execution containing config and runtime options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// Loads the config file (or the default location), applies environment
    /// and `--site-url` overrides and validates the result.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded or lacks the API key or
    /// spreadsheet ID.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;
        config.apply_env_overrides();

        if let Some(site) = opts.site_url_ref()
            && !site.trim().is_empty()
        {
            config.site_url = Some(site.to_string());
        }

        config.validate()?;

        Ok(Self {
            config,
            format: opts.format,
        })
    }

    /// Cached data access over the sheets API
    pub fn data_service(&self) -> Result<DataService<SheetsClient>> {
        let client = SheetsClient::from_config(&self.config)?;
        Ok(DataService::new(
            client,
            self.config.sheets.clone(),
            self.config.cache_ttl(),
        ))
    }

    /// Router with the durable session store
    pub fn router(&self) -> Result<PortalRouter> {
        let partials = SitePartials::from_site_url(self.config.site_url.as_deref())?;
        Ok(Router::new(
            self.data_service()?,
            partials,
            Session::open_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn opts(path: &std::path::Path, site_url: Option<&str>) -> GlobalOptions {
        GlobalOptions {
            format: OutputFormat::Table,
            config: Some(path.to_string_lossy().into_owned()),
            debug: false,
            site_url: site_url.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let err = CommandContext::new(&opts(&dir.path().join("none.yaml"), None))
            .err()
            .unwrap();
        assert!(err.to_string().contains("fmaportal init"));
    }

    #[test]
    fn test_site_url_flag_overrides_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let config = Config {
            api_key: Some("key".to_string()),
            spreadsheet_id: Some("sheet".to_string()),
            site_url: Some("http://from-config.test".to_string()),
            ..Config::default()
        };
        config.save_to(path.clone()).unwrap();

        let ctx = CommandContext::new(&opts(&path, Some("http://from-flag.test"))).unwrap();

        assert_eq!(ctx.config.site_url.as_deref(), Some("http://from-flag.test"));
        assert_eq!(ctx.format, OutputFormat::Table);
    }

    #[test]
    fn test_incomplete_config_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let config = Config {
            api_key: Some("key".to_string()),
            ..Config::default()
        };
        config.save_to(path.clone()).unwrap();

        let err = CommandContext::new(&opts(&path, None)).err().unwrap();
        assert!(err.to_string().contains("Spreadsheet ID"));
    }
}
