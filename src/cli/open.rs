//! Open command: navigate once and print the page

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::SheetSource;
use crate::error::Result;
use crate::output::{json, progress};
use crate::router::render::to_text;
use crate::router::{Page, PartialSource, Router, Toast, ToastKind};

/// The page on display, as printed with `--format json`
#[derive(Debug, Serialize)]
pub struct PageView<'a> {
    pub fragment: Option<&'a str>,
    pub page: Option<Page>,
    pub active_nav: Option<Page>,
    pub content: &'a str,
    pub toast: Option<&'a Toast>,
}

impl<'a> PageView<'a> {
    pub fn of<S: SheetSource, P: PartialSource>(router: &'a Router<S, P>) -> Self {
        let current = router.current();
        Self {
            fragment: current.map(|r| r.fragment.as_str()),
            page: current.map(|r| r.page),
            active_nav: router.document().active_nav(),
            content: router.document().content(),
            toast: router.document().toast(),
        }
    }
}

/// Run the open command
pub async fn run(opts: &GlobalOptions, fragment: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut router = ctx.router()?;

    let bar = progress::spinner(ctx.format, format!("Loading {}...", fragment));
    let result = router.navigate(fragment).await;
    bar.finish_and_clear();

    // A failed partial leaves the error banner as the page content
    print_page(&router, ctx.format)?;
    result.map(|_| ())
}

/// Print the page on display in the requested format
pub fn print_page<S: SheetSource, P: PartialSource>(
    router: &Router<S, P>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Html => println!("{}", router.document().render()),
        OutputFormat::Json => println!("{}", json::format_json(&PageView::of(router))?),
        OutputFormat::Table => println!("{}", to_text(router.document().content())),
        OutputFormat::Pretty => {
            let title = router
                .current()
                .map(|r| format!("{} ({})", r.page.nav_label().unwrap_or(r.page.name()), r.fragment))
                .unwrap_or_else(|| "fmaportal".to_string());
            println!("{}\n", title.bold().cyan());
            println!("{}", to_text(router.document().content()));
            if let Some(toast) = router.document().toast() {
                println!();
                print_toast(toast);
            }
        }
    }
    Ok(())
}

/// Print a toast notification as a status line
pub fn print_toast(toast: &Toast) {
    match toast.kind {
        ToastKind::Success => println!("{} {}", "✓".green(), toast.message),
        ToastKind::Danger => println!("{} {}", "✗".red(), toast.message),
        ToastKind::Info => println!("{} {}", "○".dimmed(), toast.message),
    }
}
