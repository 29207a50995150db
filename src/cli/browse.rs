//! Interactive browse session

use std::path::PathBuf;

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::cli::context::PortalRouter;
use crate::cli::open::{print_page, print_toast};
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::output::progress;
use crate::router::Page;

/// One line entered at the browse prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Open a fragment
    Go(String),
    Back,
    Search(String),
    Refresh,
    Export(PathBuf),
    Help,
    Quit,
    /// Blank line or a command missing its argument
    Nothing,
}

impl BrowseCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (input, ""),
        };

        match word {
            "" => Self::Nothing,
            "quit" | "exit" | "q" => Self::Quit,
            "back" => Self::Back,
            "refresh" => Self::Refresh,
            "help" | "?" => Self::Help,
            "search" | "/" if rest.is_empty() => Self::Nothing,
            "search" | "/" => Self::Search(rest.to_string()),
            "export" if rest.is_empty() => Self::Nothing,
            "export" => Self::Export(PathBuf::from(rest)),
            _ => Self::Go(input.to_string()),
        }
    }
}

/// Run the browse command
pub async fn run(opts: &GlobalOptions, fragment: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut router = ctx.router()?;

    let bar = progress::spinner(ctx.format, "Loading...");
    let started = router.bootstrap(fragment).await;
    bar.finish_and_clear();
    report(&router, ctx.format, started.map(Some))?;

    loop {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt(&router))
            .allow_empty(true)
            .interact_text()?;

        let command = BrowseCommand::parse(&line);
        let bar = progress::spinner(ctx.format, "Loading...");
        let outcome = match command {
            BrowseCommand::Quit => {
                bar.finish_and_clear();
                break;
            }
            BrowseCommand::Nothing => Ok(None),
            BrowseCommand::Help => {
                bar.finish_and_clear();
                print_help();
                continue;
            }
            BrowseCommand::Back => router.back().await,
            BrowseCommand::Search(query) => router.global_search(&query).await,
            BrowseCommand::Refresh => router.refresh().await,
            BrowseCommand::Go(fragment) => router.navigate(&fragment).await.map(Some),
            BrowseCommand::Export(path) => {
                // The outcome is shown by the toast
                if let Err(e) = router.export_directory(&path).await {
                    log::debug!("Export to {} failed: {}", path.display(), e);
                }
                bar.finish_and_clear();
                if let Some(toast) = router.document_mut().dismiss_toast() {
                    print_toast(&toast);
                }
                continue;
            }
        };
        bar.finish_and_clear();
        report(&router, ctx.format, outcome)?;
    }

    Ok(())
}

/// Print the page after a navigation. `Ok(None)` means nothing changed.
fn report(router: &PortalRouter, format: OutputFormat, outcome: Result<Option<Page>>) -> Result<()> {
    match outcome {
        Ok(None) => Ok(()),
        Ok(Some(_)) => print_page(router, format),
        Err(e) => {
            print_page(router, format)?;
            eprintln!("{} {}", "✗".red(), e);
            Ok(())
        }
    }
}

fn prompt(router: &PortalRouter) -> String {
    match router.current() {
        Some(route) => format!("fmaportal {}", route.fragment),
        None => "fmaportal".to_string(),
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  {}  open a page", "#<page>[?query]".cyan());
    println!("  {}             previous page", "back".cyan());
    println!("  {}   search every table", "search <query>".cyan());
    println!("  {}          drop cached data and reload", "refresh".cyan());
    println!("  {}    save the shown directory as CSV", "export <file>".cyan());
    println!("  {}             leave", "quit".cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(
            BrowseCommand::parse("#directory?type=npmo"),
            BrowseCommand::Go("#directory?type=npmo".to_string())
        );
        assert_eq!(
            BrowseCommand::parse("  about "),
            BrowseCommand::Go("about".to_string())
        );
        assert_eq!(BrowseCommand::parse("back"), BrowseCommand::Back);
        assert_eq!(BrowseCommand::parse("refresh"), BrowseCommand::Refresh);
        assert_eq!(BrowseCommand::parse("q"), BrowseCommand::Quit);
    }

    #[test]
    fn test_parse_search_keeps_spaces() {
        assert_eq!(
            BrowseCommand::parse("search  coastal plan "),
            BrowseCommand::Search("coastal plan".to_string())
        );
        assert_eq!(BrowseCommand::parse("search"), BrowseCommand::Nothing);
    }

    #[test]
    fn test_parse_export() {
        assert_eq!(
            BrowseCommand::parse("export out/dir.csv"),
            BrowseCommand::Export(PathBuf::from("out/dir.csv"))
        );
        assert_eq!(BrowseCommand::parse("export"), BrowseCommand::Nothing);
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(BrowseCommand::parse("   "), BrowseCommand::Nothing);
    }
}
