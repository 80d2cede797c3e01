//! L2: the Transformer (spec §4.3). Turns a `FetchResult` into an
//! `ExtractionResult` by driving the retry state machine in [`fsm`] to
//! completion. This crate never touches the Store — `disclosure-loader` is
//! the only caller that persists what comes out of [`Transformer::run`].

mod fsm;
mod json_recovery;
mod llm_provider;
mod prompts;
mod rasterize;
mod schema;

pub use fsm::{ExtractionResult, TransformerState, MAX_ATTEMPTS};
pub use llm_provider::{HttpLlmConfig, HttpLlmProvider, ImagePage, LlmProvider, LlmRequest};
pub use prompts::PromptKind;
pub use rasterize::rasterize_pdf;

use disclosure_core::TransformError;
use fetcher_core::{ContentType, FetchResult};
use fsm::TransformerContext;

/// Global concurrency cap on simultaneous LLM calls across all Transformer
/// invocations (spec §5: default 2), shared by every call site via a
/// `tokio::sync::Semaphore` the caller owns — this crate only documents the
/// expected permit width, it does not allocate the semaphore itself, since
/// the semaphore is process-wide state that belongs to the orchestrator.
pub const DEFAULT_LLM_CONCURRENCY: usize = 2;

pub struct Transformer<'a> {
    provider: &'a dyn LlmProvider,
}

impl<'a> Transformer<'a> {
    pub fn new(provider: &'a dyn LlmProvider) -> Self {
        Self { provider }
    }

    /// Drive the FSM from `S0 EXTRACT` to a terminal state for one
    /// `FetchResult`. Returns `Ok` on `S4 DONE`, `Err` on `S5 FAILED`.
    pub async fn run(&self, fetch_result: &FetchResult) -> Result<ExtractionResult, TransformError> {
        let prompt_kind = PromptKind::resolve(fetch_result.content_type, fetch_result.source_site())
            .map_err(|e| TransformError::SchemaValidation(e.to_string()))?;

        let (body_text, images) = match fetch_result.content_type {
            ContentType::Html => (String::from_utf8_lossy(&fetch_result.payload).into_owned(), Vec::new()),
            ContentType::Pdf => {
                let pages = rasterize::rasterize_pdf(&fetch_result.payload)
                    .map_err(TransformError::SchemaValidation)?;
                (String::new(), pages)
            }
        };

        let ctx = TransformerContext {
            provider: self.provider,
            prompt_kind,
            body_text,
            images,
            source_url: fetch_result.source_url.clone(),
        };

        let mut state = TransformerState::initial();
        loop {
            state = state.step(&ctx).await;
            if state.is_terminal() {
                break;
            }
        }

        match state {
            TransformerState::Done { result } => Ok(result),
            TransformerState::Failed { error } => {
                tracing::warn!(source_url = %fetch_result.source_url, error = %error, "transformer exhausted retries");
                Err(error)
            }
            _ => unreachable!("loop only exits on a terminal state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        responses: Vec<&'static str>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, _request: LlmRequest) -> Result<String, TransformError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            Ok(self.responses.get(idx).copied().unwrap_or("").to_string())
        }

        fn backend_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn senate_fetch_result() -> FetchResult {
        let mut metadata = HashMap::new();
        metadata.insert("source_site".to_string(), "senate_efd".to_string());
        FetchResult {
            payload: b"<table></table>".to_vec(),
            content_type: ContentType::Html,
            source_url: "https://efdsearch.senate.gov/search/".to_string(),
            metadata,
        }
    }

    #[tokio::test]
    async fn malformed_then_missing_field_then_valid_succeeds_on_third_call() {
        let provider = ScriptedProvider {
            responses: vec![
                r#"{"trades": [<malformed>"#,
                r#"{"confidence": 0.9, "trades": [{"politician_name": "Nancy Pelosi"}]}"#,
                r#"{"confidence": 0.9, "trades": [{
                    "politician_name": "Nancy Pelosi",
                    "transaction_date": "2026-01-10",
                    "filing_date": "2026-01-15",
                    "ticker": "AAPL",
                    "asset_name": "Apple Inc.",
                    "asset_type": "Stock",
                    "transaction_type": "Buy",
                    "amount_bucket_label": "$1,001 - $15,000",
                    "owner": "Joint",
                    "comment": null
                }]}"#,
            ],
            calls: AtomicU32::new(0),
        };

        let transformer = Transformer::new(&provider);
        let result = transformer.run(&senate_fetch_result()).await.unwrap();

        assert_eq!(result.attempts_used, 3);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn all_attempts_malformed_fails_after_exactly_three_calls() {
        let provider = ScriptedProvider {
            responses: vec![
                r#"{"trades": [<malformed>"#,
                r#"{"trades": [<malformed>"#,
                r#"{"trades": [<malformed>"#,
            ],
            calls: AtomicU32::new(0),
        };

        let transformer = Transformer::new(&provider);
        let err = transformer.run(&senate_fetch_result()).await.unwrap_err();

        assert!(matches!(err, TransformError::RetryExhausted { attempts: 3, .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn confidence_is_self_reported_and_bounded() {
        let provider = ScriptedProvider {
            responses: vec![r#"{"confidence": 0.42, "trades": []}"#],
            calls: AtomicU32::new(0),
        };

        let transformer = Transformer::new(&provider);
        let result = transformer.run(&senate_fetch_result()).await.unwrap();
        assert_eq!(result.confidence, 0.42);
    }
}
