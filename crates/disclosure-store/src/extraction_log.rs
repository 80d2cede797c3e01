use disclosure_core::{ExtractionLog, ExtractionStatus};
use sqlx::SqlitePool;

/// Sole write handle to `extraction_logs`, owned by the Loader. Exactly one
/// row is appended per batch (spec §4.4 step 5).
#[derive(Clone)]
pub struct ExtractionLogWriter {
    pool: SqlitePool,
}

impl ExtractionLogWriter {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, log: &ExtractionLog) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO extraction_logs (
                source_identifier, raw_record_count, extracted_count, duplicate_count,
                confidence, status, error_message, timestamp
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&log.source_identifier)
        .bind(log.raw_record_count as i64)
        .bind(log.extracted_count as i64)
        .bind(log.duplicate_count as i64)
        .bind(log.confidence)
        .bind(status_label(log.status))
        .bind(&log.error_message)
        .bind(log.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ExtractionLogReader {
    pool: SqlitePool,
}

impl ExtractionLogReader {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count_for_source(&self, source_identifier: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM extraction_logs WHERE source_identifier = ?")
                .bind(source_identifier)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }
}

fn status_label(status: ExtractionStatus) -> &'static str {
    match status {
        ExtractionStatus::Success => "success",
        ExtractionStatus::Partial => "partial",
        ExtractionStatus::ManualReview => "manual_review",
        ExtractionStatus::Failed => "failed",
    }
}
