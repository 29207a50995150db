//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod browse;
pub mod context;
pub mod directory;
pub mod init;
pub mod open;
pub mod recent;
pub mod search;
pub mod sheet;
pub mod stats;
pub mod status;

pub use args::OutputFormat;
pub use context::CommandContext;

/// fmaportal - terminal client for the FMA portal
#[derive(Parser, Debug)]
#[command(name = "fmaportal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json, html)
    #[arg(
        long,
        global = true,
        env = "FMAPORTAL_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "FMAPORTAL_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "FMAPORTAL_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Load page partials from this site instead of the bundled copies
    #[arg(long, global = true, env = "FMAPORTAL_SITE_URL", hide_env = true)]
    pub site_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize fmaportal configuration
    Init,

    /// Show configuration and local storage status
    Status,

    /// Display version information
    Version,

    /// Open a page by fragment and print it
    Open {
        /// Location fragment, e.g. '#directory?type=npmo'
        fragment: String,
    },

    /// Browse the portal interactively
    #[command(after_help = "\
At the prompt, enter:
  #<page>[?query]   open a page, e.g. #references or #search?q=plan
  <page>            same as #<page>
  back              previous page
  search <query>    search every table
  refresh           drop cached data and reload the page
  export <file>     save the shown directory as CSV
  quit              leave")]
    Browse {
        /// Start page; defaults to the last page visited
        fragment: Option<String>,
    },

    /// Show the home page counters
    Stats,

    /// List a contact directory
    Directory {
        /// Directory type: internal, external or npmo
        #[arg(default_value = "internal")]
        kind: String,

        /// Write the directory as CSV to this file instead of listing it
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Search every portal table
    Search {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show recent searches
    Recent {
        /// Forget the recent searches
        #[arg(long)]
        clear: bool,
    },

    /// Print the raw rows of a sheet
    Sheet {
        /// Sheet name as it appears in the spreadsheet
        name: String,
    },

    /// Generate shell completions
    #[command(after_help = "\
Install completions:
  bash:   fmaportal completion bash > /etc/bash_completion.d/fmaportal
  zsh:    fmaportal completion zsh > \"${fpath[1]}/_fmaportal\"
  fish:   fmaportal completion fish > ~/.config/fish/completions/fmaportal.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_directory_defaults_to_internal() {
        let cli = Cli::try_parse_from(["fmaportal", "directory"]).unwrap();
        match cli.command {
            Commands::Directory { kind, export } => {
                assert_eq!(kind, "internal");
                assert!(export.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_joins_multiple_words() {
        let cli = Cli::try_parse_from(["fmaportal", "search", "coastal", "plan"]).unwrap();
        match cli.command {
            Commands::Search { query } => assert_eq!(query, vec!["coastal", "plan"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["fmaportal", "search"]).is_err());
    }

    #[test]
    fn test_html_format_accepted() {
        let cli = Cli::try_parse_from(["fmaportal", "--format", "html", "open", "#about"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Html);
    }
}
