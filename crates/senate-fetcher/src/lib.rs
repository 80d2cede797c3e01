//! Senate EFD fetcher (spec §4.2, §6). The Senate disclosure search sits
//! behind a gatekeeper checkbox and a bot-detection gate that blocks
//! headless sessions — this fetcher drives a real, headful WebDriver session
//! with human-shaped interaction (explicit waits, element clicks, typed
//! keystrokes) rather than a raw HTTP client.

use async_trait::async_trait;
use disclosure_core::FetchError;
use fetcher_core::{ContentType, FetchParams, FetchResult, Fetcher, RateLimiter};
use std::collections::HashMap;
use std::time::Duration;
use thirtyfour::prelude::*;

const SEARCH_URL: &str = "https://efdsearch.senate.gov/search/";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(3);

pub struct SenateFetcher {
    webdriver_url: String,
    rate_limiter: RateLimiter,
}

impl SenateFetcher {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            rate_limiter: RateLimiter::from_min_interval(MIN_REQUEST_INTERVAL),
        }
    }

    async fn open_session(&self) -> Result<WebDriver, FetchError> {
        // Headless modes are detected and blocked by the gate (spec §4.2) —
        // this capability set deliberately omits the `--headless` flag.
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--disable-blink-features=AutomationControlled")
            .map_err(|e| FetchError::Blocked(e.to_string()))?;

        WebDriver::new(&self.webdriver_url, caps)
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }

    /// Accept the "I certify I am not using this site for a commercial
    /// purpose" gatekeeper checkbox that guards the search form.
    async fn accept_gate(&self, driver: &WebDriver) -> Result<(), FetchError> {
        let checkbox = driver
            .find(By::Id("agree_statement"))
            .await
            .map_err(|e| FetchError::Blocked(format!("gatekeeper checkbox not found: {e}")))?;
        checkbox.click().await.map_err(|e| FetchError::Blocked(e.to_string()))?;
        Ok(())
    }

    async fn run_search(&self, driver: &WebDriver, params: &FetchParams) -> Result<String, FetchError> {
        let from_date = driver
            .find(By::Id("fromDate"))
            .await
            .map_err(|e| FetchError::Parse(format!("fromDate field missing: {e}")))?;
        from_date
            .send_keys(params.since.format("%m/%d/%Y").to_string())
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let to_date = driver
            .find(By::Id("toDate"))
            .await
            .map_err(|e| FetchError::Parse(format!("toDate field missing: {e}")))?;
        to_date
            .send_keys(params.until.format("%m/%d/%Y").to_string())
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let submit = driver
            .find(By::Css("button[type='submit']"))
            .await
            .map_err(|e| FetchError::Parse(format!("submit button missing: {e}")))?;
        submit.click().await.map_err(|e| FetchError::Network(e.to_string()))?;

        driver
            .query(By::Id("reportsTable"))
            .wait(Duration::from_secs(20), Duration::from_millis(250))
            .first()
            .await
            .map_err(|e| FetchError::Parse(format!("results table never rendered: {e}")))?;

        driver.source().await.map_err(|e| FetchError::Network(e.to_string()))
    }
}

#[async_trait]
impl Fetcher for SenateFetcher {
    async fn fetch(&self, params: FetchParams) -> Result<Vec<FetchResult>, FetchError> {
        self.rate_limiter.acquire().await;

        let driver = self.open_session().await?;
        let outcome = async {
            self.accept_gate(&driver).await?;
            self.run_search(&driver, &params).await
        }
        .await;

        let _ = driver.quit().await;

        let html = outcome?;
        if html.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut metadata = HashMap::new();
        metadata.insert("source_site".to_string(), "senate_efd".to_string());

        Ok(vec![FetchResult {
            payload: html.into_bytes(),
            content_type: ContentType::Html,
            source_url: SEARCH_URL.to_string(),
            metadata,
        }])
    }

    fn min_request_interval(&self) -> Duration {
        MIN_REQUEST_INTERVAL
    }

    fn source_name(&self) -> &'static str {
        "senate_efd"
    }
}
