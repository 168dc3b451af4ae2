use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::readability::html_to_text;

// --- PageScraper trait ---

#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Fetch `url` and return its main readable text. An empty string means
    /// the page loaded but nothing readable survived extraction.
    async fn scrape(&self, url: &str) -> Result<String>;
    fn name(&self) -> &str;
}

// --- Plain HTTP + Readability scraper ---

/// Pages larger than this are rejected.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; groundcheck/0.1; +https://github.com/groundcheck/groundcheck)";

/// Scraper that downloads the page with reqwest and runs spider_transformations
/// Readability over the HTML. No JS rendering.
pub struct HttpScraper {
    client: reqwest::Client,
}

impl HttpScraper {
    /// `timeout` is a transport backstop; callers enforce their own deadline.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to build HTTP client")?;
        info!(timeout_secs = timeout.as_secs(), "Using HttpScraper");
        Ok(Self { client })
    }
}

#[async_trait]
impl PageScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).context("Invalid URL")?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("Only http/https URLs are allowed, got: {}", parsed.scheme());
        }

        info!(url, scraper = "http", "Scraping URL");

        let mut resp = self
            .client
            .get(parsed)
            .send()
            .await
            .context("Page request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {status} for {url}");
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if !content_type.is_empty() && !is_html_mime(&content_type) {
            anyhow::bail!("Unsupported content type {content_type:?} for {url}");
        }

        if let Some(len) = resp.content_length() {
            if len > MAX_BODY_BYTES as u64 {
                anyhow::bail!("Page body of {len} bytes exceeds size cap for {url}");
            }
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = resp.chunk().await.context("Failed to read page body")? {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                anyhow::bail!("Page body exceeds size cap of {MAX_BODY_BYTES} bytes for {url}");
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            warn!(url, scraper = "http", "Empty HTML response");
            return Ok(String::new());
        }

        if content_type.is_empty() && !sniff_html(&body) {
            anyhow::bail!("Untyped body for {url} does not look like HTML");
        }

        let text = html_to_text(&body, Some(url));

        if text.trim().is_empty() {
            warn!(
                url,
                scraper = "http",
                "Empty content after Readability extraction"
            );
            return Ok(String::new());
        }

        info!(
            url,
            scraper = "http",
            bytes = text.len(),
            "Scraped successfully"
        );
        Ok(text)
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn is_html_mime(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Looks for an HTML marker near the top of a body served without a content type.
fn sniff_html(body: &[u8]) -> bool {
    let head = &body[..body.len().min(1024)];
    let head = String::from_utf8_lossy(head).to_lowercase();
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<!doctype html")
        || head.contains("<html")
        || head.contains("<head")
        || head.contains("<body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_html_mimes_are_accepted() {
        assert!(is_html_mime("text/html"));
        assert!(is_html_mime("text/html; charset=utf-8"));
        assert!(is_html_mime("application/xhtml+xml"));
        assert!(!is_html_mime("text/plain"));
        assert!(!is_html_mime("text/csv"));
        assert!(!is_html_mime("application/javascript"));
        assert!(!is_html_mime("application/json"));
    }

    #[test]
    fn untyped_bodies_are_sniffed() {
        assert!(sniff_html(b"<!DOCTYPE html><html><body>hi</body></html>"));
        assert!(sniff_html(b"  \n<html lang=\"en\">"));
        assert!(!sniff_html(b"a,b,c\n1,2,3"));
        assert!(!sniff_html(b"{\"k\": 1}"));
    }
}
