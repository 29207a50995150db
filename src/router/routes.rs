//! Fragment routes

use std::fmt;

use serde::Serialize;

/// Every page the portal serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    Structure,
    Municipalities,
    Activities,
    Directory,
    References,
    Search,
    About,
    #[serde(rename = "learnmore")]
    LearnMore,
    #[serde(rename = "fmaprofile")]
    FmaProfile,
}

impl Page {
    pub const ALL: [Page; 10] = [
        Page::Home,
        Page::Structure,
        Page::Municipalities,
        Page::Activities,
        Page::Directory,
        Page::References,
        Page::Search,
        Page::About,
        Page::LearnMore,
        Page::FmaProfile,
    ];

    /// Identifier used in fragments
    pub fn name(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Structure => "structure",
            Page::Municipalities => "municipalities",
            Page::Activities => "activities",
            Page::Directory => "directory",
            Page::References => "references",
            Page::Search => "search",
            Page::About => "about",
            Page::LearnMore => "learnmore",
            Page::FmaProfile => "fmaprofile",
        }
    }

    /// Partial file stem (`<partial>.html`)
    pub fn partial(&self) -> &'static str {
        self.name()
    }

    /// Exact-match lookup of a fragment page identifier
    pub fn from_name(name: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Label in the navigation bar, for pages that have one
    pub fn nav_label(&self) -> Option<&'static str> {
        match self {
            Page::Home => Some("Home"),
            Page::Structure => Some("Structure"),
            Page::Municipalities => Some("Municipalities"),
            Page::Activities => Some("Activities"),
            Page::Directory => Some("Directory"),
            Page::References => Some("References"),
            Page::FmaProfile => Some("FMA Profile"),
            Page::About => Some("About"),
            Page::Search | Page::LearnMore => None,
        }
    }

    pub fn fragment(&self) -> String {
        format!("#{}", self.name())
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed location fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Fragment as navigated to, with its leading `#`
    pub fragment: String,
    /// Page identifier as written, before fallback
    pub requested: String,
    /// Page actually served
    pub page: Page,
    /// Text after the first `?`, if any
    pub query: Option<String>,
}

impl Route {
    /// Parse `#<page>` or `#<page>?<query>`.
    ///
    /// A blank fragment means `#home`. An empty or unknown page identifier
    /// is served as home.
    pub fn parse(fragment: &str) -> Route {
        let fragment = match fragment.trim() {
            "" | "#" => "#home".to_string(),
            f if f.starts_with('#') => f.to_string(),
            f => format!("#{}", f),
        };

        let body = &fragment[1..];
        let (requested, query) = match body.split_once('?') {
            Some((page, query)) => (page, Some(query.to_string())),
            None => (body, None),
        };

        let page = Page::from_name(requested).unwrap_or(Page::Home);

        Route {
            requested: requested.to_string(),
            page,
            query,
            fragment,
        }
    }

    /// Whether the requested page was unknown and home is served instead
    pub fn is_fallback(&self) -> bool {
        self.requested != self.page.name()
    }

    /// First value of a query parameter, percent- and `+`-decoded
    pub fn param(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Fragment of the search page for `query`
pub fn search_fragment(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("#search?q={}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_page_round_trips_by_name() {
        for page in Page::ALL {
            assert_eq!(Page::from_name(page.name()), Some(page));
            assert_eq!(Route::parse(&page.fragment()).page, page);
        }
    }

    #[test]
    fn test_parse_with_query() {
        let route = Route::parse("#directory?type=npmo");

        assert_eq!(route.page, Page::Directory);
        assert_eq!(route.query.as_deref(), Some("type=npmo"));
        assert_eq!(route.param("type").as_deref(), Some("npmo"));
        assert_eq!(route.param("missing"), None);
    }

    #[test]
    fn test_blank_fragment_is_home() {
        for raw in ["", "#", "   "] {
            let route = Route::parse(raw);
            assert_eq!(route.page, Page::Home);
            assert_eq!(route.fragment, "#home");
        }
    }

    #[test]
    fn test_unknown_and_empty_page_fall_back_to_home() {
        let route = Route::parse("#nonexistent");
        assert_eq!(route.page, Page::Home);
        assert!(route.is_fallback());
        assert_eq!(route.fragment, "#nonexistent");

        let route = Route::parse("#?q=x");
        assert_eq!(route.page, Page::Home);
        assert_eq!(route.requested, "");
    }

    #[test]
    fn test_page_match_is_exact() {
        assert_eq!(Route::parse("#Home").page, Page::Home);
        assert!(Route::parse("#Home").is_fallback());
        assert!(Route::parse("#Structure").is_fallback());
    }

    #[test]
    fn test_missing_hash_is_added() {
        let route = Route::parse("references");
        assert_eq!(route.fragment, "#references");
        assert_eq!(route.page, Page::References);
    }

    #[test]
    fn test_search_fragment_encodes_query() {
        let fragment = search_fragment("fish & chips");
        assert_eq!(fragment, "#search?q=fish+%26+chips");

        let route = Route::parse(&fragment);
        assert_eq!(route.param("q").as_deref(), Some("fish & chips"));
    }
}
