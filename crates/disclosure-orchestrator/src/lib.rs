//! L4: the pipeline orchestrator (spec §4.5). Drives L1 -> L2 -> L3 per
//! chamber with a fallback chain, generalizing
//! `analysis_orchestrator::AnalysisOrchestrator`'s per-symbol concurrent
//! fan-out into a per-chamber one.

use chrono::NaiveDate;
use disclosure_core::Chamber;
use disclosure_extractor::{LlmProvider, Transformer};
use disclosure_loader::ticker_normalization::ExternalTickerLookup;
use disclosure_loader::{LoadSummary, Loader};
use disclosure_store::Store;
use fetcher_core::{FetchParams, Fetcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Global cap on simultaneous LLM calls across both chambers (spec §5).
pub const DEFAULT_LLM_CONCURRENCY: usize = 2;
/// Per-Transformer-invocation deadline (spec §5: LLM default 60s).
pub const TRANSFORM_TIMEOUT: Duration = Duration::from_secs(60);
/// Per-fetcher-invocation deadline (spec §5: fetcher default 120s).
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of running one chamber's fallback chain through fetch, transform,
/// and load.
#[derive(Debug, Default)]
pub struct ChamberReport {
    pub chamber: Option<Chamber>,
    /// `source_name()` of whichever fetcher in the chain ultimately
    /// produced a non-empty result, if any.
    pub succeeded_via: Option<&'static str>,
    /// `source_name()` of every fetcher tried before the one that succeeded
    /// (or all of them, if every fetcher in the chain failed).
    pub attempted: Vec<&'static str>,
    pub batches_processed: usize,
    pub trades_inserted: usize,
    pub trades_duplicate: usize,
    pub transform_failures: usize,
}

impl ChamberReport {
    /// A chamber is successful once any fetcher in its chain returned a
    /// non-empty result (spec §4.5): the run can still have 0 inserted
    /// trades (e.g. everything was a duplicate) and count as a success.
    pub fn fetch_succeeded(&self) -> bool {
        self.succeeded_via.is_some()
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub senate: ChamberReport,
    pub house: ChamberReport,
}

impl RunReport {
    /// spec §7: "A run is considered successful if every chamber produced
    /// at least one trade after fallbacks; otherwise the run fails and no
    /// downstream analysis runs."
    pub fn is_successful(&self) -> bool {
        self.senate.fetch_succeeded() && self.house.fetch_succeeded()
    }
}

pub struct Orchestrator<'a> {
    store: &'a Store,
    provider: &'a dyn LlmProvider,
    external_ticker_lookup: &'a dyn ExternalTickerLookup,
    senate_chain: Vec<Box<dyn Fetcher>>,
    house_chain: Vec<Box<dyn Fetcher>>,
    llm_semaphore: Arc<Semaphore>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        store: &'a Store,
        provider: &'a dyn LlmProvider,
        external_ticker_lookup: &'a dyn ExternalTickerLookup,
        senate_chain: Vec<Box<dyn Fetcher>>,
        house_chain: Vec<Box<dyn Fetcher>>,
    ) -> Self {
        Self {
            store,
            provider,
            external_ticker_lookup,
            senate_chain,
            house_chain,
            llm_semaphore: Arc::new(Semaphore::new(DEFAULT_LLM_CONCURRENCY)),
        }
    }

    /// Run both chambers concurrently for `[since, until]` (spec §5: two
    /// chambers run in parallel OS-level workers).
    pub async fn run(&self, since: NaiveDate, until: NaiveDate) -> RunReport {
        let params = FetchParams { since, until, page: 0 };
        let (senate, house) = tokio::join!(
            self.run_chamber(Chamber::Senate, &self.senate_chain, params.clone()),
            self.run_chamber(Chamber::House, &self.house_chain, params),
        );
        RunReport { senate, house }
    }

    /// Drive one chamber's fallback chain (spec §4.5): try each fetcher in
    /// order; a fetcher is failed if it errors or returns an empty set; the
    /// chamber is complete once any fetcher returns non-empty, and that
    /// result alone (never doubled) is passed on to Transform + Load.
    async fn run_chamber(
        &self,
        chamber: Chamber,
        chain: &[Box<dyn Fetcher>],
        params: FetchParams,
    ) -> ChamberReport {
        let mut report = ChamberReport { chamber: Some(chamber), ..Default::default() };

        for fetcher in chain {
            report.attempted.push(fetcher.source_name());
            let outcome =
                tokio::time::timeout(FETCH_TIMEOUT, fetcher.fetch(params.clone())).await;

            let results = match outcome {
                Ok(Ok(results)) if !results.is_empty() => results,
                Ok(Ok(_)) => {
                    tracing::info!(fetcher = fetcher.source_name(), "fetcher returned empty result, trying fallback");
                    continue;
                }
                Ok(Err(e)) => {
                    tracing::warn!(fetcher = fetcher.source_name(), error = %e, "fetcher failed, trying fallback");
                    continue;
                }
                Err(_) => {
                    tracing::warn!(fetcher = fetcher.source_name(), "fetcher timed out, trying fallback");
                    continue;
                }
            };

            report.succeeded_via = Some(fetcher.source_name());

            for fetch_result in results {
                self.transform_and_load(fetcher.source_name(), fetch_result, &mut report).await;
            }
            break;
        }

        report
    }

    async fn transform_and_load(
        &self,
        source_identifier: &'static str,
        fetch_result: fetcher_core::FetchResult,
        report: &mut ChamberReport,
    ) {
        let _permit = self.llm_semaphore.acquire().await.expect("semaphore never closed");
        let transformer = Transformer::new(self.provider);

        let extraction = match tokio::time::timeout(TRANSFORM_TIMEOUT, transformer.run(&fetch_result)).await {
            Ok(Ok(extraction)) => extraction,
            Ok(Err(e)) => {
                tracing::warn!(source = source_identifier, error = %e, "transformer exhausted retries");
                report.transform_failures += 1;
                return;
            }
            Err(_) => {
                tracing::warn!(source = source_identifier, "transformer timed out");
                report.transform_failures += 1;
                return;
            }
        };

        let loader = Loader::new(self.store, self.external_ticker_lookup);
        match loader.load(source_identifier, extraction).await {
            Ok(summary) => {
                report.batches_processed += 1;
                report.trades_inserted += summary.inserted_count;
                report.trades_duplicate += summary.duplicate_count;
            }
            Err(e) => {
                tracing::warn!(source = source_identifier, error = %e, "loader rejected batch");
                report.transform_failures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use disclosure_core::{FetchError, TransformError};
    use disclosure_loader::ticker_normalization::NoopExternalLookup;
    use fetcher_core::{ContentType, FetchResult};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedFetcher {
        name: &'static str,
        outcome: FetcherOutcome,
        calls: AtomicUsize,
    }

    enum FetcherOutcome {
        Fails,
        Empty,
        NonEmpty,
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, _params: FetchParams) -> Result<Vec<FetchResult>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                FetcherOutcome::Fails => Err(FetchError::Blocked("bot detection".to_string())),
                FetcherOutcome::Empty => Ok(Vec::new()),
                FetcherOutcome::NonEmpty => {
                    let mut metadata = HashMap::new();
                    metadata.insert("source_site".to_string(), "capitol_trades".to_string());
                    Ok(vec![FetchResult {
                        payload: b"<table></table>".to_vec(),
                        content_type: ContentType::Html,
                        source_url: "https://www.capitoltrades.com/trades".to_string(),
                        metadata,
                    }])
                }
            }
        }

        fn min_request_interval(&self) -> Duration {
            Duration::from_millis(0)
        }

        fn source_name(&self) -> &'static str {
            self.name
        }
    }

    struct EmptyProvider;

    #[async_trait]
    impl LlmProvider for EmptyProvider {
        async fn complete(&self, _request: disclosure_extractor::LlmRequest) -> Result<String, TransformError> {
            Ok(r#"{"confidence": 0.95, "trades": []}"#.to_string())
        }

        fn backend_name(&self) -> &'static str {
            "empty"
        }
    }

    #[tokio::test]
    async fn falls_back_to_next_fetcher_after_blocked_primary() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let provider = EmptyProvider;
        let senate_chain: Vec<Box<dyn Fetcher>> = vec![
            Box::new(ScriptedFetcher { name: "senate_efd", outcome: FetcherOutcome::Fails, calls: AtomicUsize::new(0) }),
            Box::new(ScriptedFetcher { name: "capitol_trades", outcome: FetcherOutcome::NonEmpty, calls: AtomicUsize::new(0) }),
        ];
        let house_chain: Vec<Box<dyn Fetcher>> = vec![Box::new(ScriptedFetcher {
            name: "house_clerk",
            outcome: FetcherOutcome::NonEmpty,
            calls: AtomicUsize::new(0),
        })];

        let orchestrator = Orchestrator::new(&store, &provider, &NoopExternalLookup, senate_chain, house_chain);
        let since = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let until = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let report = orchestrator.run(since, until).await;

        assert_eq!(report.senate.succeeded_via, Some("capitol_trades"));
        assert_eq!(report.senate.attempted, vec!["senate_efd", "capitol_trades"]);
        assert!(report.is_successful());
    }

    #[tokio::test]
    async fn chamber_with_no_successful_fetcher_fails_the_run() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let provider = EmptyProvider;
        let senate_chain: Vec<Box<dyn Fetcher>> = vec![
            Box::new(ScriptedFetcher { name: "senate_efd", outcome: FetcherOutcome::Fails, calls: AtomicUsize::new(0) }),
            Box::new(ScriptedFetcher { name: "capitol_trades", outcome: FetcherOutcome::Empty, calls: AtomicUsize::new(0) }),
        ];
        let house_chain: Vec<Box<dyn Fetcher>> = vec![Box::new(ScriptedFetcher {
            name: "house_clerk",
            outcome: FetcherOutcome::NonEmpty,
            calls: AtomicUsize::new(0),
        })];

        let orchestrator = Orchestrator::new(&store, &provider, &NoopExternalLookup, senate_chain, house_chain);
        let since = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let until = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let report = orchestrator.run(since, until).await;

        assert!(!report.senate.fetch_succeeded());
        assert!(!report.is_successful());
    }
}
