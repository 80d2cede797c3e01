//! Capitol Trades fallback fetcher (spec §4.2, §6). Capitol Trades is a
//! third-party aggregator used only when the Senate and House fetchers both
//! fail for a window. Its listing pages are heavy with navigation chrome, so
//! each row is trimmed down to the handful of cells the Transformer actually
//! needs — roughly 1% of the original page size — before being handed
//! downstream. The site's paginator is 1-based; it 404s on `page=0`.

use async_trait::async_trait;
use disclosure_core::FetchError;
use fetcher_core::{ContentType, FetchParams, FetchResult, Fetcher, RateLimiter};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::time::Duration;

const BASE_URL: &str = "https://www.capitoltrades.com/trades";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(2000);
const MAX_PAGES_PER_CALL: u32 = 20;

pub struct CapitolTradesFetcher {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl Default for CapitolTradesFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CapitolTradesFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; disclosure-signals/1.0)")
            .build()
            .unwrap_or_default();

        Self {
            client,
            rate_limiter: RateLimiter::from_min_interval(MIN_REQUEST_INTERVAL),
        }
    }

    /// The caller's `page` is 0-based (spec §4.2); the provider is 1-based
    /// and treats `page=0` as invalid, so every request adds one.
    fn provider_page(page: u32) -> u32 {
        page + 1
    }

    async fn fetch_page(&self, since: chrono::NaiveDate, until: chrono::NaiveDate, page: u32) -> Result<String, FetchError> {
        self.rate_limiter.acquire().await;

        let url = format!(
            "{}?txDateFrom={}&txDateTo={}&page={}",
            BASE_URL,
            since.format("%Y-%m-%d"),
            until.format("%Y-%m-%d"),
            Self::provider_page(page)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if response.status().as_u16() == 429 {
            return Err(FetchError::RateLimit("capitoltrades.com returned 429".to_string()));
        }
        if !response.status().is_success() {
            return Err(FetchError::Network(format!("unexpected status {}", response.status())));
        }

        response.text().await.map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Strip a listing row down to the text cells the Transformer needs and
    /// re-serialize as a minimal HTML fragment, discarding the surrounding
    /// chrome (icons, avatar images, sparkline SVGs).
    fn trim_row(row: &ElementRef) -> String {
        let cells: Vec<String> = row
            .text()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| format!("<td>{t}</td>"))
            .collect();
        format!("<tr>{}</tr>", cells.join(""))
    }

    fn parse_rows(&self, html: &str) -> Result<Vec<String>, FetchError> {
        let document = Html::parse_document(html);
        let row_selector = Selector::parse("table tbody tr").map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(document.select(&row_selector).map(|row| Self::trim_row(&row)).collect())
    }
}

#[async_trait]
impl Fetcher for CapitolTradesFetcher {
    async fn fetch(&self, params: FetchParams) -> Result<Vec<FetchResult>, FetchError> {
        let mut results = Vec::new();
        let mut page = params.page;
        let mut pages_fetched = 0;

        loop {
            let html = self.fetch_page(params.since, params.until, page).await?;
            let rows = self.parse_rows(&html)?;
            if rows.is_empty() {
                break;
            }

            for row_html in rows {
                let mut metadata = HashMap::new();
                metadata.insert("source_site".to_string(), "capitol_trades".to_string());
                metadata.insert("provider_page".to_string(), Self::provider_page(page).to_string());

                results.push(FetchResult {
                    payload: row_html.into_bytes(),
                    content_type: ContentType::Html,
                    source_url: format!("{BASE_URL}?page={}", Self::provider_page(page)),
                    metadata,
                });
            }

            page += 1;
            pages_fetched += 1;
            if pages_fetched >= MAX_PAGES_PER_CALL {
                break;
            }
        }

        Ok(results)
    }

    fn min_request_interval(&self) -> Duration {
        MIN_REQUEST_INTERVAL
    }

    fn source_name(&self) -> &'static str {
        "capitol_trades"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_page_never_emits_zero() {
        assert_eq!(CapitolTradesFetcher::provider_page(0), 1);
        assert_eq!(CapitolTradesFetcher::provider_page(5), 6);
    }

    #[test]
    fn parse_rows_trims_to_text_cells() {
        let html = r#"
            <table><tbody>
                <tr><td><img src="x.png"><span>Nancy Pelosi</span></td><td>NVDA</td><td>Buy</td></tr>
            </tbody></table>
        "#;
        let fetcher = CapitolTradesFetcher::new();
        let rows = fetcher.parse_rows(html).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("Nancy Pelosi"));
        assert!(rows[0].contains("NVDA"));
        assert!(!rows[0].contains("img"));
    }

    #[test]
    fn empty_page_stops_pagination() {
        let fetcher = CapitolTradesFetcher::new();
        let rows = fetcher.parse_rows("<table><tbody></tbody></table>").unwrap();
        assert!(rows.is_empty());
    }
}
