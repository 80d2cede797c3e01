//! House Clerk financial disclosure fetcher (spec §4.2, §6). Issues the
//! known search form POST, parses the resulting HTML listing for PDF links,
//! and downloads each referenced PDF. Politician names on the listing are in
//! "LAST, First (suffix)" form and are normalized to "First Last (suffix)"
//! here so downstream name resolution sees a consistent shape.

use async_trait::async_trait;
use disclosure_core::FetchError;
use fetcher_core::{ContentType, FetchParams, FetchResult, Fetcher, RateLimiter};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::time::Duration;

const SEARCH_URL: &str = "https://disclosures-clerk.house.gov/FinancialDisclosure/ViewSearchResult";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1500);

pub struct HouseFetcher {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl Default for HouseFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HouseFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            client,
            rate_limiter: RateLimiter::from_min_interval(MIN_REQUEST_INTERVAL),
        }
    }

    async fn search_listing(&self, params: &FetchParams) -> Result<String, FetchError> {
        self.rate_limiter.acquire().await;

        let form = [
            ("FilingYear", params.since.format("%Y").to_string()),
            ("StartDate", params.since.format("%m/%d/%Y").to_string()),
            ("EndDate", params.until.format("%m/%d/%Y").to_string()),
            ("State", "".to_string()),
            ("District", "".to_string()),
        ];

        let response = self
            .client
            .post(SEARCH_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if response.status().as_u16() == 429 {
            return Err(FetchError::RateLimit("House clerk site returned 429".to_string()));
        }
        if !response.status().is_success() {
            return Err(FetchError::Network(format!("unexpected status {}", response.status())));
        }

        response.text().await.map_err(|e| FetchError::Parse(e.to_string()))
    }

    fn parse_pdf_links(&self, html: &str) -> Result<Vec<(String, String)>, FetchError> {
        let document = Html::parse_document(html);
        let row_selector = Selector::parse("table tr").map_err(|e| FetchError::Parse(e.to_string()))?;
        let link_selector = Selector::parse("a[href]").map_err(|e| FetchError::Parse(e.to_string()))?;

        let mut links = Vec::new();
        for row in document.select(&row_selector) {
            let Some(anchor) = row.select(&link_selector).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.to_lowercase().ends_with(".pdf") {
                continue;
            }
            let name_cell = row.text().collect::<Vec<_>>().join(" ");
            links.push((normalize_house_name(&name_cell), href.to_string()));
        }
        Ok(links)
    }

    async fn download_pdf(&self, href: &str) -> Result<Vec<u8>, FetchError> {
        self.rate_limiter.acquire().await;
        let response = self
            .client
            .get(href)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}

/// "PELOSI, Nancy (Mrs.)" -> "Nancy Pelosi (Mrs.)". Best-effort: the first
/// comma-delimited token is treated as the surname.
fn normalize_house_name(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.split_once(',') {
        Some((last, rest)) => format!("{} {}", rest.trim(), last.trim()).trim().to_string(),
        None => trimmed.to_string(),
    }
}

#[async_trait]
impl Fetcher for HouseFetcher {
    async fn fetch(&self, params: FetchParams) -> Result<Vec<FetchResult>, FetchError> {
        let listing_html = self.search_listing(&params).await?;
        let links = self.parse_pdf_links(&listing_html)?;

        let mut results = Vec::with_capacity(links.len());
        for (politician_name, href) in links {
            let pdf_bytes = self.download_pdf(&href).await?;

            let mut metadata = HashMap::new();
            metadata.insert("source_site".to_string(), "house_clerk".to_string());
            metadata.insert("politician_name".to_string(), politician_name);

            results.push(FetchResult {
                payload: pdf_bytes,
                content_type: ContentType::Pdf,
                source_url: href,
                metadata,
            });
        }

        Ok(results)
    }

    fn min_request_interval(&self) -> Duration {
        MIN_REQUEST_INTERVAL
    }

    fn source_name(&self) -> &'static str {
        "house_clerk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_last_first_suffix_form() {
        assert_eq!(normalize_house_name("BEYER, Donald S. Jr."), "Donald S. Jr. BEYER");
    }

    #[test]
    fn parses_pdf_links_from_listing_rows() {
        let html = r#"
            <table>
                <tr><td>PELOSI, Nancy</td><td><a href="https://disclosures-clerk.house.gov/public_disc/financial-pdfs/2026/1.pdf">View</a></td></tr>
                <tr><td>Header</td><td><a href="#">Not a pdf</a></td></tr>
            </table>
        "#;
        let fetcher = HouseFetcher::new();
        let links = fetcher.parse_pdf_links(html).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, "Nancy PELOSI");
        assert!(links[0].1.ends_with("1.pdf"));
    }
}
