//! L0: append-only persistence for trades, logs, scores, convergences, and
//! signals (spec §4.1). Single-writer-per-table discipline is enforced by
//! construction — each table has exactly one `*Writer` type, handed to the
//! one subsystem that owns it; every other caller gets only a `*Reader`.

mod convergence;
mod extraction_log;
mod schema;
mod scoring;
mod signals;
mod trades;

pub use convergence::{ConvergenceReader, ConvergenceWriter};
pub use extraction_log::{ExtractionLogReader, ExtractionLogWriter};
pub use scoring::{SqsReader, SqsWriter};
pub use signals::{AlphaSignalReader, AlphaSignalWriter, EnhancedSignalWriter};
pub use trades::{InsertOutcome, TradeReader, TradeWriter};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Handle to the whole store. Connecting opens (or creates) the SQLite file,
/// enables WAL mode for concurrent readers alongside the single writer per
/// table (spec §5), and ensures every table exists.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new().max_connections(8).connect_with(options).await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for statement in schema::ALL {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn trade_writer(&self) -> TradeWriter {
        TradeWriter::new(self.pool.clone())
    }

    pub fn trade_reader(&self) -> TradeReader {
        TradeReader::new(self.pool.clone())
    }

    pub fn extraction_log_writer(&self) -> ExtractionLogWriter {
        ExtractionLogWriter::new(self.pool.clone())
    }

    pub fn extraction_log_reader(&self) -> ExtractionLogReader {
        ExtractionLogReader::new(self.pool.clone())
    }

    pub fn sqs_writer(&self) -> SqsWriter {
        SqsWriter::new(self.pool.clone())
    }

    pub fn sqs_reader(&self) -> SqsReader {
        SqsReader::new(self.pool.clone())
    }

    pub fn convergence_writer(&self) -> ConvergenceWriter {
        ConvergenceWriter::new(self.pool.clone())
    }

    pub fn convergence_reader(&self) -> ConvergenceReader {
        ConvergenceReader::new(self.pool.clone())
    }

    pub fn alpha_signal_writer(&self) -> AlphaSignalWriter {
        AlphaSignalWriter::new(self.pool.clone())
    }

    pub fn alpha_signal_reader(&self) -> AlphaSignalReader {
        AlphaSignalReader::new(self.pool.clone())
    }

    pub fn enhanced_signal_writer(&self) -> EnhancedSignalWriter {
        EnhancedSignalWriter::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use disclosure_core::{AssetType, Chamber, Owner, SourceFormat, Trade, TransactionType};

    fn sample_trade() -> Trade {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        Trade {
            data_hash: Trade::compute_hash("Nancy Pelosi", date, Some("AAPL"), "$1,001 - $15,000", TransactionType::Buy),
            chamber: Chamber::House,
            politician_name: "Nancy Pelosi".to_string(),
            surface_name: "Nancy Pelosi".to_string(),
            transaction_date: date,
            filing_date: date,
            ticker: Some("AAPL".to_string()),
            asset_name: "Apple Inc.".to_string(),
            asset_type: AssetType::Stock,
            transaction_type: TransactionType::Buy,
            amount_bucket_label: "$1,001 - $15,000".to_string(),
            amount_bucket: disclosure_core::AmountBucket::parse("$1,001 - $15,000"),
            owner: Owner::Joint,
            comment: None,
            source_url: "https://example.test/filing".to_string(),
            source_format: SourceFormat::HousePdf,
            extraction_confidence: 0.95,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn dedup_insert_is_idempotent() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let writer = store.trade_writer();
        let trade = sample_trade();

        assert_eq!(writer.insert(&trade, false).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(writer.insert(&trade, false).await.unwrap(), InsertOutcome::Duplicate);

        let reader = store.trade_reader();
        assert_eq!(reader.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn manual_review_trades_excluded_from_canonical_set() {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        let writer = store.trade_writer();
        let trade = sample_trade();
        writer.insert(&trade, true).await.unwrap();

        let reader = store.trade_reader();
        assert_eq!(reader.canonical_trades().await.unwrap().len(), 0);
        assert_eq!(reader.count().await.unwrap(), 1);
    }
}
