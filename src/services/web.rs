//! Web page fetching and search-result scraping.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

const USER_AGENT: &str = "Lynx/2.8.9rel.1 libwww-FM/2.14 SSL-MM/1.4.1 GNUTLS/3.6.13";
const SEARCH_ENDPOINT: &str = "https://www.google.com/search";

fn http_client(timeout: Duration) -> Result<Client, FetchError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()?)
}

/// Downloads raw page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page body. Failures are logged and yield an empty page.
    async fn fetch(&self, url: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(body) => {
                debug!(url, bytes = body.len(), "fetched page");
                body
            }
            Err(e) => {
                warn!(url, error = %e, "failed to fetch page");
                String::new()
            }
        }
    }
}

/// Returns result URLs for a free-text query.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, FetchError>;
}

/// Scrapes the Google results page.
#[derive(Debug, Clone)]
pub struct GoogleSearch {
    client: Client,
}

impl GoogleSearch {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl WebSearch for GoogleSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        let num = (limit + 2).to_string();
        let body = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&[("q", query), ("num", num.as_str()), ("hl", "en")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let urls = parse_search_results(&body, limit);
        debug!(query, results = urls.len(), "search completed");
        Ok(urls)
    }
}

/// Result links of a search page, in page order, without duplicates.
pub fn parse_search_results(html: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut urls: Vec<String> = Vec::new();
    for link in document.select(&selector) {
        if urls.len() >= limit {
            break;
        }
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        match result_target(href) {
            Some(url) if !urls.contains(&url) => urls.push(url),
            _ => {}
        }
    }
    urls
}

/// Unwrap a result link; the basic results page wraps targets as
/// `/url?q=<target>&sa=...`.
fn result_target(href: &str) -> Option<String> {
    let target = if href.starts_with("/url?") {
        let wrapped = Url::parse("https://www.google.com").ok()?.join(href).ok()?;
        wrapped
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?
    } else {
        href.to_string()
    };

    let url = Url::parse(&target).ok()?;
    let host = url.host_str()?;
    let external = matches!(url.scheme(), "http" | "https")
        && !host.ends_with("google.com")
        && !host.ends_with("googleusercontent.com");
    external.then(|| url.to_string())
}

/// Visible text of an HTML document, one block per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    let mut last_was_block = false;

    for node in document.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            let hidden = node
                .ancestors()
                .filter_map(|a| a.value().as_element())
                .any(|e| matches!(e.name(), "script" | "style" | "noscript" | "head"));
            let t = text_node.trim();
            if hidden || t.is_empty() {
                continue;
            }
            if last_was_block && !text.is_empty() {
                text.push('\n');
            } else if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(t);
            last_was_block = false;
        } else if let Some(elem) = node.value().as_element() {
            if matches!(
                elem.name(),
                "p" | "div"
                    | "br"
                    | "h1"
                    | "h2"
                    | "h3"
                    | "h4"
                    | "h5"
                    | "h6"
                    | "li"
                    | "tr"
                    | "pre"
                    | "blockquote"
            ) {
                last_was_block = true;
            }
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_results() {
        let html = r#"
            <html><body>
              <a href="/url?q=https://www.rust-lang.org/&amp;sa=U&amp;ved=1">Rust</a>
              <a href="/search?q=rust&amp;start=10">Next</a>
              <a href="https://maps.google.com/maps?q=rust">Maps</a>
              <a href="https://doc.rust-lang.org/book/">Book</a>
              <a href="/url?q=https://www.rust-lang.org/&amp;sa=U">Duplicate</a>
              <a href="https://crates.io/">Crates</a>
            </body></html>
        "#;

        let urls = parse_search_results(html, 5);
        assert_eq!(
            urls,
            vec![
                "https://www.rust-lang.org/",
                "https://doc.rust-lang.org/book/",
                "https://crates.io/",
            ]
        );
        assert_eq!(parse_search_results(html, 1).len(), 1);
    }

    #[test]
    fn test_html_to_text_skips_scripts() {
        let html = r#"
            <html>
              <head><title>T</title><style>p { color: red; }</style></head>
              <body>
                <h1>Heading</h1>
                <script>var x = 1;</script>
                <p>First paragraph.</p>
                <p>Second <b>bold</b> paragraph.</p>
              </body>
            </html>
        "#;

        let text = html_to_text(html);
        assert_eq!(text, "Heading\nFirst paragraph.\nSecond bold paragraph.");
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_empty_page() {
        let fetcher = HttpPageFetcher::new(Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.fetch("not a url").await, "");
    }
}
