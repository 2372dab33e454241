//! HTTP-backed media catalog.

use quire_editor_core::{CatalogResponse, EditorError, MediaCatalog};
use reqwest::Url;

use crate::dom;
use crate::error::BrowserError;

/// Resolve the catalog endpoint against the page URL and add the search term.
pub fn catalog_url(base: &str, endpoint: &str, query: Option<&str>) -> Result<Url, BrowserError> {
    let mut url = Url::parse(base)
        .and_then(|base| base.join(endpoint))
        .map_err(|e| BrowserError::Http(format!("bad catalog URL {endpoint:?}: {e}")))?;
    if let Some(q) = query {
        url.query_pairs_mut().append_pair("q", q);
    }
    Ok(url)
}

/// Lists media with a GET to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCatalog {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get(&self, query: Option<&str>) -> Result<CatalogResponse, BrowserError> {
        let base = dom::window()?.location().href()?;
        let url = catalog_url(&base, &self.endpoint, query)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Http(format!("catalog returned {status}")));
        }
        let body = response.text().await?;
        Ok(CatalogResponse::from_json(&body)?)
    }
}

impl MediaCatalog for HttpCatalog {
    async fn fetch(&self, query: Option<&str>) -> Result<CatalogResponse, EditorError> {
        self.get(query).await.map_err(|e| match e {
            BrowserError::Core(inner) => inner,
            other => EditorError::Catalog(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_url() {
        let url = catalog_url("https://site.test/admin/posts/3", "/admin/api/media", None).unwrap();
        assert_eq!(url.as_str(), "https://site.test/admin/api/media");

        let url = catalog_url("https://site.test/admin/", "api/media", Some("red cat")).unwrap();
        assert_eq!(url.as_str(), "https://site.test/admin/api/media?q=red+cat");
    }

    #[test]
    fn test_catalog_url_rejects_bad_base() {
        assert!(matches!(
            catalog_url("not a url", "/media", None),
            Err(BrowserError::Http(_))
        ));
    }
}
