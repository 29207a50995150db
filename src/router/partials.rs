//! Page partial sources

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Url};

use crate::error::{ApiError, ConfigError, Result};

/// Fetches the HTML partial of a page by its file stem
#[async_trait]
pub trait PartialSource: Send + Sync {
    async fn fetch_partial(&self, name: &str) -> Result<String>;
}

#[async_trait]
impl<P: PartialSource + ?Sized> PartialSource for std::sync::Arc<P> {
    async fn fetch_partial(&self, name: &str) -> Result<String> {
        (**self).fetch_partial(name).await
    }
}

/// Partials compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledPartials;

impl BundledPartials {
    pub fn get(name: &str) -> Option<&'static str> {
        let html = match name {
            "home" => include_str!("../../site/home.html"),
            "structure" => include_str!("../../site/structure.html"),
            "municipalities" => include_str!("../../site/municipalities.html"),
            "activities" => include_str!("../../site/activities.html"),
            "directory" => include_str!("../../site/directory.html"),
            "references" => include_str!("../../site/references.html"),
            "search" => include_str!("../../site/search.html"),
            "about" => include_str!("../../site/about.html"),
            "learnmore" => include_str!("../../site/learnmore.html"),
            "fmaprofile" => include_str!("../../site/fmaprofile.html"),
            _ => return None,
        };
        Some(html)
    }
}

#[async_trait]
impl PartialSource for BundledPartials {
    async fn fetch_partial(&self, name: &str) -> Result<String> {
        Self::get(name).map(str::to_string).ok_or_else(|| {
            ApiError::Http {
                status: 404,
                reason: "Not Found".to_string(),
            }
            .into()
        })
    }
}

/// Partials served over HTTP as `<site>/<name>.html`
pub struct HttpPartialSource {
    http: HttpClient,
    base_url: Url,
}

impl HttpPartialSource {
    pub fn new(site_url: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        // Keep the last path segment when joining
        let mut base = site_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ConfigError::Invalid(format!("site_url '{}': {}", site_url, e)))?;

        Ok(Self { http, base_url })
    }

    pub fn partial_url(&self, name: &str) -> Result<Url> {
        self.base_url
            .join(&format!("{}.html", name))
            .map_err(|e| ApiError::InvalidResponse(format!("bad partial name '{}': {}", name, e)).into())
    }
}

#[async_trait]
impl PartialSource for HttpPartialSource {
    async fn fetch_partial(&self, name: &str) -> Result<String> {
        let url = self.partial_url(name)?;
        log::debug!("GET {}", url);

        let response = self.http.get(url).send().await.map_err(ApiError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status).into());
        }

        let html = response.text().await.map_err(ApiError::from)?;
        log::debug!("Loaded {}.html ({} bytes)", name, html.len());
        Ok(html)
    }
}

/// Where the running portal loads its partials from
pub enum SitePartials {
    Bundled(BundledPartials),
    Http(HttpPartialSource),
}

impl SitePartials {
    /// HTTP when a site URL is configured, bundled otherwise
    pub fn from_site_url(site_url: Option<&str>) -> Result<Self> {
        match site_url {
            Some(url) => Ok(Self::Http(HttpPartialSource::new(url)?)),
            None => Ok(Self::Bundled(BundledPartials)),
        }
    }
}

#[async_trait]
impl PartialSource for SitePartials {
    async fn fetch_partial(&self, name: &str) -> Result<String> {
        match self {
            Self::Bundled(p) => p.fetch_partial(name).await,
            Self::Http(p) => p.fetch_partial(name).await,
        }
    }
}

/// Bundled partials with injectable failures and call counting
#[cfg(test)]
#[derive(Default)]
pub struct MockPartialSource {
    failures: std::collections::HashMap<String, u16>,
    offline: bool,
    calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockPartialSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self, name: &str, status: u16) -> Self {
        self.failures.insert(name.to_string(), status);
        self
    }

    /// Fail every fetch as a transport error
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Partial names requested so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
#[async_trait]
impl PartialSource for MockPartialSource {
    async fn fetch_partial(&self, name: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name.to_string());
        }
        if self.offline {
            return Err(ApiError::Network("Failed to connect".to_string()).into());
        }
        if let Some(status) = self.failures.get(name) {
            let status = reqwest::StatusCode::from_u16(*status)
                .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            return Err(ApiError::from_status(status).into());
        }
        BundledPartials.fetch_partial(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Page;

    #[test]
    fn test_every_page_has_a_bundled_partial() {
        for page in Page::ALL {
            assert!(BundledPartials::get(page.partial()).is_some(), "{}", page);
        }
        assert!(BundledPartials::get("index").is_none());
    }

    #[test]
    fn test_partial_url_keeps_site_path() {
        let source = HttpPartialSource::new("http://example.com/portal").unwrap();
        assert_eq!(
            source.partial_url("home").unwrap().as_str(),
            "http://example.com/portal/home.html"
        );
    }

    #[tokio::test]
    async fn test_http_partial_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/about.html")
            .with_status(200)
            .with_body("<h1>About</h1>")
            .create_async()
            .await;

        let source = HttpPartialSource::new(&server.url()).unwrap();
        let html = source.fetch_partial("about").await.unwrap();

        assert_eq!(html, "<h1>About</h1>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_partial_failure_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/structure.html")
            .with_status(404)
            .create_async()
            .await;

        let source = HttpPartialSource::new(&server.url()).unwrap();
        let err = source.fetch_partial("structure").await.unwrap_err();

        assert_eq!(err.to_string(), "404 Not Found");
    }
}
