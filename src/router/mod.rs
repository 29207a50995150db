//! Fragment router
//!
//! Maps a location fragment to a page, loads that page's partial into the
//! document and runs the page initializer. Navigation is sequential: the
//! router is driven through `&mut self`, so there is one current page and
//! the last navigation wins.

pub mod document;
pub mod pages;
pub mod partials;
pub mod render;
pub mod routes;

use std::path::Path;

use crate::client::SheetSource;
use crate::data::{DataService, DirectoryKind, to_delimited_text};
use crate::error::Result;
use crate::storage::Session;

pub use document::{HtmlDocument, Toast, ToastKind};
pub use partials::{BundledPartials, HttpPartialSource, PartialSource, SitePartials};
pub use routes::{Page, Route, search_fragment};

/// Application state shared by the page initializers
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Directory shown by the directory page and used by export
    pub directory_kind: DirectoryKind,
}

pub struct Router<S: SheetSource, P: PartialSource> {
    data: DataService<S>,
    partials: P,
    session: Session,
    document: HtmlDocument,
    state: AppState,
    history: Vec<String>,
    current: Option<Route>,
    last_handled: Option<String>,
}

impl<S: SheetSource, P: PartialSource> Router<S, P> {
    pub fn new(data: DataService<S>, partials: P, session: Session) -> Self {
        Self {
            data,
            partials,
            session,
            document: HtmlDocument::new(),
            state: AppState::default(),
            history: Vec::new(),
            current: None,
            last_handled: None,
        }
    }

    pub fn data(&self) -> &DataService<S> {
        &self.data
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn document(&self) -> &HtmlDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut HtmlDocument {
        &mut self.document
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Route of the page on display
    pub fn current(&self) -> Option<&Route> {
        self.current.as_ref()
    }

    /// Fragments navigated to, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Navigate to a fragment and record it in history.
    ///
    /// A partial that fails to load leaves an error banner as the page
    /// content and returns the error. Data failures are rendered by the
    /// page initializer and do not fail the navigation.
    pub async fn navigate(&mut self, fragment: &str) -> Result<Page> {
        self.load(fragment, true).await
    }

    async fn load(&mut self, fragment: &str, push: bool) -> Result<Page> {
        let route = Route::parse(fragment);
        if route.is_fallback() {
            log::debug!("Unknown page '{}', showing home", route.requested);
        }
        log::info!("Loading page: {}, fetching {}.html", route.page, route.page.partial());

        self.session.remember_page(&route.fragment);
        self.document.set_content(render::LOADING);

        let html = match self.partials.fetch_partial(route.page.partial()).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("Navigation error: {}", e);
                self.document.set_content(format!(
                    r#"<div class="alert alert-danger m-4">Failed to load page: {}<br><small>Route: {}.html</small></div>"#,
                    render::escape_html(&e.to_string()),
                    route.page.partial()
                ));
                // A later event for the same fragment retries
                self.last_handled = None;
                return Err(e);
            }
        };

        self.last_handled = Some(route.fragment.clone());
        self.document.set_content(html);
        if push {
            self.history.push(route.fragment.clone());
        }

        let page = route.page;
        pages::init_page(
            page,
            &route,
            &self.data,
            &mut self.document,
            &mut self.state,
        )
        .await;
        self.current = Some(route);
        Ok(page)
    }

    /// Start-up navigation.
    ///
    /// A non-blank `fragment` is opened as given. Otherwise the remembered
    /// last page is restored, falling back to `#home`.
    pub async fn bootstrap(&mut self, fragment: Option<&str>) -> Result<Page> {
        let fragment = match fragment.map(str::trim) {
            Some(f) if !f.is_empty() && f != "#" => f.to_string(),
            _ => self
                .session
                .last_page()
                .unwrap_or_else(|| Page::Home.fragment()),
        };
        log::info!("Initializing app with fragment: {}", fragment);
        self.navigate(&fragment).await
    }

    fn already_handled(&self, fragment: &str) -> bool {
        let fragment = Route::parse(fragment).fragment;
        if self.last_handled.as_deref() == Some(fragment.as_str()) {
            log::debug!("Ignoring repeated location event for {}", fragment);
            true
        } else {
            false
        }
    }

    /// History traversal to `fragment`. Does not add a history entry.
    /// Returns `None` when the fragment was just handled.
    pub async fn on_pop_state(&mut self, fragment: &str) -> Result<Option<Page>> {
        if self.already_handled(fragment) {
            return Ok(None);
        }
        self.load(fragment, false).await.map(Some)
    }

    /// Location fragment changed to `fragment`. Blank fragments and the
    /// fragment just handled are ignored.
    pub async fn on_hash_change(&mut self, fragment: &str) -> Result<Option<Page>> {
        if fragment.trim().is_empty() || self.already_handled(fragment) {
            return Ok(None);
        }
        self.navigate(fragment).await.map(Some)
    }

    /// Go back one history entry. Returns `None` at the first entry.
    ///
    /// The previous entry is always reloaded, even when it names the page
    /// on display.
    pub async fn back(&mut self) -> Result<Option<Page>> {
        if self.history.len() < 2 {
            return Ok(None);
        }
        self.history.pop();
        let previous = self.history.last().cloned().unwrap_or_default();
        self.load(&previous, false).await.map(Some)
    }

    /// Remember `query` among the recent searches and open its results.
    /// A blank query does nothing.
    pub async fn global_search(&mut self, query: &str) -> Result<Option<Page>> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        self.session.record_search(query);
        self.navigate(&search_fragment(query)).await.map(Some)
    }

    /// Drop all cached data and reload the current page in place
    pub async fn refresh(&mut self) -> Result<Option<Page>> {
        self.data.invalidate_all();
        let Some(fragment) = self.current.as_ref().map(|r| r.fragment.clone()) else {
            return Ok(None);
        };
        self.load(&fragment, false).await.map(Some)
    }

    /// Write the current directory as delimited text and report it in a toast.
    /// Returns the number of rows written.
    pub async fn export_directory(&mut self, path: &Path) -> Result<usize> {
        let kind = self.state.directory_kind;
        let result = self.write_directory(kind, path).await;

        match &result {
            Ok(count) => self.document.show_toast(
                format!("Exported {} {} entries to {}", count, kind, path.display()),
                ToastKind::Success,
            ),
            Err(e) => self
                .document
                .show_toast(format!("Export failed: {}", e), ToastKind::Danger),
        }
        result
    }

    async fn write_directory(&self, kind: DirectoryKind, path: &Path) -> Result<usize> {
        let rows = self.data.get_directory_rows(kind).await?;
        std::fs::write(path, to_delimited_text(&rows))?;
        log::info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(rows.len())
    }
}
