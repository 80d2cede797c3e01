//! L3: the Loader (spec §4.4). Accepts an `ExtractionResult` from the
//! Transformer and is the sole writer of `Trade` and `ExtractionLog`
//! (spec §3, §9).

pub mod name_normalization;
pub mod ticker_normalization;

use chrono::Utc;
use disclosure_core::{ExtractionLog, ExtractionStatus, LoadError, Trade};
use disclosure_extractor::ExtractionResult;
use disclosure_store::{InsertOutcome, Store};
use ticker_normalization::{ExternalTickerLookup, TickerResolverChain};

/// Batch confidence below this is a hard rejection (spec §4.4 step 1).
pub const CONFIDENCE_REJECT_THRESHOLD: f64 = 0.5;
/// Batch confidence below this (but >= reject) routes individual trades to
/// manual review instead of the canonical trade set.
pub const CONFIDENCE_MANUAL_REVIEW_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub raw_count: usize,
    pub inserted_count: usize,
    pub duplicate_count: usize,
    pub manual_review_count: usize,
    pub status: Option<ExtractionStatus>,
}

pub struct Loader<'a> {
    store: &'a Store,
    external_ticker_lookup: &'a dyn ExternalTickerLookup,
}

impl<'a> Loader<'a> {
    pub fn new(store: &'a Store, external_ticker_lookup: &'a dyn ExternalTickerLookup) -> Self {
        Self { store, external_ticker_lookup }
    }

    /// Run the full five-step pipeline (spec §4.4) over one `ExtractionResult`.
    pub async fn load(
        &self,
        source_identifier: &str,
        extraction: ExtractionResult,
    ) -> Result<LoadSummary, LoadError> {
        let raw_count = extraction.trades.len();

        // Step 1: confidence gate.
        if extraction.confidence < CONFIDENCE_REJECT_THRESHOLD {
            self.append_log(
                source_identifier,
                raw_count,
                0,
                0,
                extraction.confidence,
                ExtractionStatus::Failed,
                Some(format!("batch confidence {} below reject threshold", extraction.confidence)),
            )
            .await?;
            return Err(LoadError::ConfidenceRejected(extraction.confidence));
        }

        let manual_review = extraction.confidence < CONFIDENCE_MANUAL_REVIEW_THRESHOLD;
        let resolver = TickerResolverChain::new(self.external_ticker_lookup);

        let mut summary = LoadSummary { raw_count, ..Default::default() };

        for mut trade in extraction.trades {
            // Step 2: name normalization. The surface form is retained for
            // audit; `politician_name` becomes the canonical identity.
            let canonical = name_normalization::canonicalize(&trade.politician_name);
            if canonical != trade.surface_name {
                tracing::debug!(surface = %trade.surface_name, canonical = %canonical, "name resolved");
            }
            trade.politician_name = canonical;

            // Step 3: ticker normalization. A trade that already carries a
            // resolved ticker from the extractor is trusted as-is; only a
            // missing ticker goes through the resolver chain.
            if trade.ticker.is_none() {
                trade.ticker = resolver.resolve(&trade.asset_name);
            }

            // Step 4: hash + insert (dedup). `data_hash` must reflect the
            // possibly-just-normalized ticker, so it is recomputed here
            // rather than trusted from the extractor.
            trade.data_hash = Trade::compute_hash(
                &trade.politician_name,
                trade.transaction_date,
                trade.ticker.as_deref(),
                &trade.amount_bucket_label,
                trade.transaction_type,
            );

            match self.store.trade_writer().insert(&trade, manual_review).await {
                Ok(InsertOutcome::Inserted) => {
                    summary.inserted_count += 1;
                    if manual_review {
                        summary.manual_review_count += 1;
                    }
                }
                Ok(InsertOutcome::Duplicate) => summary.duplicate_count += 1,
                Err(e) => return Err(LoadError::StoreWriteFailed(e.to_string())),
            }
        }

        let status = if manual_review {
            ExtractionStatus::ManualReview
        } else if !extraction.row_errors.is_empty() {
            ExtractionStatus::Partial
        } else {
            ExtractionStatus::Success
        };
        summary.status = Some(status);

        // Step 5: exactly one audit row per batch.
        self.append_log(
            source_identifier,
            raw_count,
            summary.inserted_count,
            summary.duplicate_count,
            extraction.confidence,
            status,
            (!extraction.row_errors.is_empty()).then(|| extraction.row_errors.join("; ")),
        )
        .await?;

        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    async fn append_log(
        &self,
        source_identifier: &str,
        raw_count: usize,
        extracted_count: usize,
        duplicate_count: usize,
        confidence: f64,
        status: ExtractionStatus,
        error_message: Option<String>,
    ) -> Result<(), LoadError> {
        let log = ExtractionLog {
            source_identifier: source_identifier.to_string(),
            raw_record_count: raw_count,
            extracted_count,
            duplicate_count,
            confidence,
            status,
            error_message,
            timestamp: Utc::now(),
        };
        self.store
            .extraction_log_writer()
            .append(&log)
            .await
            .map_err(|e| LoadError::StoreWriteFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use disclosure_core::{AssetType, Chamber, Owner, SourceFormat, TransactionType};
    use ticker_normalization::NoopExternalLookup;

    fn trade_with(confidence: f64, ticker: Option<&str>) -> Trade {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let ticker = ticker.map(|s| s.to_string());
        Trade {
            data_hash: String::new(),
            chamber: Chamber::House,
            politician_name: "Don Beyer".to_string(),
            surface_name: "Don Beyer".to_string(),
            transaction_date: date,
            filing_date: date,
            ticker,
            asset_name: "Apple Inc".to_string(),
            asset_type: AssetType::Stock,
            transaction_type: TransactionType::Buy,
            amount_bucket_label: "$1,001 - $15,000".to_string(),
            amount_bucket: disclosure_core::AmountBucket::parse("$1,001 - $15,000"),
            owner: Owner::Joint,
            comment: None,
            source_url: "https://example.test".to_string(),
            source_format: SourceFormat::HousePdf,
            extraction_confidence: confidence,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn confidence_below_half_rejects_whole_batch() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let loader = Loader::new(&store, &NoopExternalLookup);
        let extraction = ExtractionResult {
            confidence: 0.4,
            trades: vec![trade_with(0.4, Some("AAPL"))],
            row_errors: Vec::new(),
            attempts_used: 1,
            source_format: SourceFormat::HousePdf,
        };

        let err = loader.load("test-source", extraction).await.unwrap_err();
        assert!(matches!(err, LoadError::ConfidenceRejected(_)));
        assert_eq!(store.trade_reader().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn confidence_between_half_and_seventy_routes_to_manual_review() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let loader = Loader::new(&store, &NoopExternalLookup);
        let extraction = ExtractionResult {
            confidence: 0.6,
            trades: vec![trade_with(0.6, Some("AAPL"))],
            row_errors: Vec::new(),
            attempts_used: 1,
            source_format: SourceFormat::HousePdf,
        };

        let summary = loader.load("test-source", extraction).await.unwrap();
        assert_eq!(summary.manual_review_count, 1);
        assert_eq!(store.trade_reader().canonical_trades().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn name_is_canonicalized_before_hashing() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let loader = Loader::new(&store, &NoopExternalLookup);
        let extraction = ExtractionResult {
            confidence: 0.95,
            trades: vec![trade_with(0.95, Some("AAPL"))],
            row_errors: Vec::new(),
            attempts_used: 1,
            source_format: SourceFormat::HousePdf,
        };

        loader.load("test-source", extraction).await.unwrap();
        let trades = store.trade_reader().canonical_trades().await.unwrap();
        assert_eq!(trades[0].politician_name, "Donald Sternoff Beyer Jr.");
    }

    #[tokio::test]
    async fn duplicate_insert_is_counted_not_re_raised() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let loader = Loader::new(&store, &NoopExternalLookup);
        let make = || ExtractionResult {
            confidence: 0.95,
            trades: vec![trade_with(0.95, Some("AAPL"))],
            row_errors: Vec::new(),
            attempts_used: 1,
            source_format: SourceFormat::HousePdf,
        };

        let first = loader.load("test-source", make()).await.unwrap();
        let second = loader.load("test-source", make()).await.unwrap();
        assert_eq!(first.inserted_count, 1);
        assert_eq!(second.duplicate_count, 1);
        assert_eq!(store.trade_reader().count().await.unwrap(), 1);
    }
}
