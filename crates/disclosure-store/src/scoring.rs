use disclosure_core::{QualityGrade, SqsRecord};
use sqlx::{Row, SqlitePool};

/// Sole write handle to `sqs_records`, owned by the SQS scorer.
#[derive(Clone)]
pub struct SqsWriter {
    pool: SqlitePool,
}

impl SqsWriter {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent: re-running the scorer on the same trade overwrites the
    /// prior row with a byte-identical result (spec §8 round-trip law).
    pub async fn upsert(&self, record: &SqsRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO sqs_records (
                data_hash, actionability, timeliness, conviction, information_edge,
                market_impact, sqs, grade
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(data_hash) DO UPDATE SET
                actionability = excluded.actionability,
                timeliness = excluded.timeliness,
                conviction = excluded.conviction,
                information_edge = excluded.information_edge,
                market_impact = excluded.market_impact,
                sqs = excluded.sqs,
                grade = excluded.grade",
        )
        .bind(&record.data_hash)
        .bind(record.actionability)
        .bind(record.timeliness)
        .bind(record.conviction)
        .bind(record.information_edge)
        .bind(record.market_impact)
        .bind(record.sqs)
        .bind(grade_label(record.grade))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqsReader {
    pool: SqlitePool,
}

impl SqsReader {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn by_hash(&self, data_hash: &str) -> Result<Option<SqsRecord>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM sqs_records WHERE data_hash = ?")
            .bind(data_hash)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_sqs).transpose()
    }
}

fn grade_label(grade: QualityGrade) -> &'static str {
    match grade {
        QualityGrade::Platinum => "Platinum",
        QualityGrade::Gold => "Gold",
        QualityGrade::Silver => "Silver",
        QualityGrade::Bronze => "Bronze",
        QualityGrade::Discard => "Discard",
    }
}

fn row_to_sqs(row: &sqlx::sqlite::SqliteRow) -> Result<SqsRecord, sqlx::Error> {
    let grade = match row.try_get::<String, _>("grade")?.as_str() {
        "Platinum" => QualityGrade::Platinum,
        "Gold" => QualityGrade::Gold,
        "Silver" => QualityGrade::Silver,
        "Bronze" => QualityGrade::Bronze,
        _ => QualityGrade::Discard,
    };
    Ok(SqsRecord {
        data_hash: row.try_get("data_hash")?,
        actionability: row.try_get("actionability")?,
        timeliness: row.try_get("timeliness")?,
        conviction: row.try_get("conviction")?,
        information_edge: row.try_get("information_edge")?,
        market_impact: row.try_get("market_impact")?,
        sqs: row.try_get("sqs")?,
        grade,
    })
}
