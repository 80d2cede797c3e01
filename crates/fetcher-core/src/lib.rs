//! L1: the shared fetcher contract. Each concrete source (Senate, House,
//! Capitol Trades) is a sum-type variant dispatched by tag, not an
//! inheritance tree (spec §9) — here realized as one trait with three
//! structurally independent implementor crates, the same split the teacher
//! uses for `broker-trait` + `{alpaca,ibkr}-broker`.

mod rate_limiter;

pub use rate_limiter::RateLimiter;

use async_trait::async_trait;
use chrono::NaiveDate;
use disclosure_core::FetchError;
use std::collections::HashMap;

/// Parameters common to every fetcher invocation.
#[derive(Debug, Clone)]
pub struct FetchParams {
    pub since: NaiveDate,
    pub until: NaiveDate,
    /// 0-based page counter as understood by the orchestrator; individual
    /// fetchers translate this into their own pagination convention (the
    /// Capitol Trades fetcher, for instance, never emits `page=0` to the
    /// provider — see spec §4.2).
    pub page: u32,
}

/// A content-type tag routed on by the Transformer (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Pdf,
}

/// One fetched record: opaque payload bytes plus enough metadata for the
/// Transformer to pick a prompt and for the Loader to attribute provenance.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub payload: Vec<u8>,
    pub content_type: ContentType,
    pub source_url: String,
    pub metadata: HashMap<String, String>,
}

impl FetchResult {
    /// Routing key consumed by the Transformer's `(content_type, source_site)` dispatch.
    pub fn source_site(&self) -> &str {
        self.metadata.get("source_site").map(|s| s.as_str()).unwrap_or("unknown")
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Acquire results for the given window. An empty `Ok(vec![])` and an
    /// `Err(FetchError)` are both treated as failure by the orchestrator's
    /// fallback logic (spec §4.5) — only a non-empty `Ok` counts as success.
    async fn fetch(&self, params: FetchParams) -> Result<Vec<FetchResult>, FetchError>;

    /// Minimum delay the orchestrator must respect between successive calls
    /// to this fetcher, regardless of internal rate limiting.
    fn min_request_interval(&self) -> std::time::Duration;

    /// Human-readable name for logging and `ExtractionLog.source_identifier`.
    fn source_name(&self) -> &'static str;
}
