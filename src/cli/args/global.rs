//! Global CLI options shared across all commands
//!
//! Collects the global flags into one struct so handlers take a single
//! argument. When a global option is added, only this struct and `main.rs`
//! need to change.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json, html)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.fmaportal/config.yaml)
    pub config: Option<String>,

    /// Debug logging requested
    pub debug: bool,

    /// Site serving the page partials (overrides the config file)
    pub site_url: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            debug: cli.debug,
            site_url: cli.site_url.clone(),
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get site URL override as `Option<&str>`.
    pub fn site_url_ref(&self) -> Option<&str> {
        self.site_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_global_options_accessors() {
        let opts = GlobalOptions {
            format: OutputFormat::Json,
            config: Some("/custom/path".to_string()),
            debug: true,
            site_url: Some("http://localhost:8080".to_string()),
        };

        assert_eq!(opts.config_ref(), Some("/custom/path"));
        assert_eq!(opts.site_url_ref(), Some("http://localhost:8080"));
        assert!(opts.debug);
    }

    #[test]
    fn test_from_cli_reads_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fmaportal",
            "stats",
            "--format",
            "json",
            "--site-url",
            "http://site.test",
        ])
        .unwrap();

        let opts = GlobalOptions::from_cli(&cli);

        assert_eq!(opts.format, OutputFormat::Json);
        assert_eq!(opts.site_url_ref(), Some("http://site.test"));
        assert_eq!(opts.config_ref(), None);
    }
}
