//! The rendered portal document
//!
//! Holds the page content area, the active navigation entry and the toast
//! slot. Page initializers address regions of the content by element id;
//! a region is the inner HTML of the first element whose `id` attribute
//! equals the id. Content is parsed as an HTML fragment for every lookup,
//! so quoting style and commented-out markup do not matter.

use scraper::node::Comment;
use scraper::{Html, Node, Selector};
use serde::Serialize;

use super::render::escape_html;
use super::routes::Page;

/// Stands in for a region's children while the tree is serialized
const MARKER: &str = "fmaportal-region";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Danger,
    Info,
}

impl ToastKind {
    fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Danger => "danger",
            ToastKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    content: String,
    active_nav: Option<Page>,
    toast: Option<Toast>,
}

impl HtmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inner HTML of the page content area
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, html: impl Into<String>) {
        self.content = html.into();
    }

    pub fn has_region(&self, id: &str) -> bool {
        self.region(id).is_some()
    }

    /// Inner HTML of a region
    pub fn region(&self, id: &str) -> Option<String> {
        let selector = Selector::parse(&id_selector(id)).ok()?;
        let doc = Html::parse_fragment(&self.content);
        doc.select(&selector).next().map(|el| el.inner_html())
    }

    /// Replace the inner HTML of a region. Returns false when the content
    /// has no such region.
    pub fn set_region(&mut self, id: &str, html: &str) -> bool {
        self.replace(&id_selector(id), html)
    }

    /// Replace a region with escaped text
    pub fn set_text(&mut self, id: &str, text: &str) -> bool {
        self.set_region(id, &escape_html(text))
    }

    /// Replace the `<tbody>` of the table with the given id
    pub fn set_table_body(&mut self, table_id: &str, rows: &str) -> bool {
        self.replace(&format!("{} tbody", id_selector(table_id)), rows)
    }

    fn replace(&mut self, selector: &str, html: &str) -> bool {
        match replace_inner(&self.content, selector, html) {
            Some(content) => {
                self.content = content;
                true
            }
            None => {
                log::debug!("No element matches {}", selector);
                false
            }
        }
    }

    pub fn active_nav(&self) -> Option<Page> {
        self.active_nav
    }

    /// Mark the navigation entry of `page` active. Pages without an entry
    /// leave no entry active.
    pub fn set_active_nav(&mut self, page: Page) {
        self.active_nav = page.nav_label().map(|_| page);
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
        });
    }

    pub fn dismiss_toast(&mut self) -> Option<Toast> {
        self.toast.take()
    }

    /// Navigation bar with the active entry marked
    pub fn render_nav(&self) -> String {
        let links: String = Page::ALL
            .iter()
            .filter_map(|page| {
                let label = page.nav_label()?;
                let class = if self.active_nav == Some(*page) {
                    "nav-link active"
                } else {
                    "nav-link"
                };
                Some(format!(
                    r#"<li class="nav-item"><a class="{}" href="{}">{}</a></li>"#,
                    class,
                    page.fragment(),
                    label
                ))
            })
            .collect();
        format!(r#"<nav class="navbar"><ul class="navbar-nav">{}</ul></nav>"#, links)
    }

    /// Whole document: navigation, content area and toast slot
    pub fn render(&self) -> String {
        let toast = match &self.toast {
            Some(t) => format!(
                r#"<div id="app-toast" class="toast align-items-center text-white bg-{} border-0"><div class="toast-body">{}</div></div>"#,
                t.kind.class(),
                escape_html(&t.message)
            ),
            None => r#"<div id="app-toast" class="toast"><div class="toast-body"></div></div>"#
                .to_string(),
        };

        format!(
            "<!DOCTYPE html>\n<html>\n<body>\n{}\n<main id=\"page-content\">\n{}\n</main>\n{}\n</body>\n</html>\n",
            self.render_nav(),
            self.content,
            toast
        )
    }
}

/// Parsed content with the inner HTML of one element swapped for `html`.
///
/// The element's children are replaced by a marker comment which is then
/// spliced out of the serialized tree. `None` when nothing matches.
fn replace_inner(content: &str, selector: &str, html: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let mut doc = Html::parse_fragment(content);
    let node_id = doc.select(&selector).next()?.id();

    let mut node = doc.tree.get_mut(node_id)?;
    while let Some(mut child) = node.first_child() {
        child.detach();
    }
    node.append(Node::Comment(Comment {
        comment: MARKER.into(),
    }));

    let serialized = doc.root_element().inner_html();
    Some(serialized.replacen(&format!("<!--{}-->", MARKER), html, 1))
}

/// Selector matching the element whose `id` attribute is exactly `id`
fn id_selector(id: &str) -> String {
    format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
}
