use chrono::NaiveDate;
use disclosure_core::{ConvergenceEvent, ConvergenceParticipant, ConvergenceScoreBreakdown, TransactionType};
use sqlx::{Row, SqlitePool};

/// Sole write handle to `convergence_events`, owned by the convergence
/// detector.
#[derive(Clone)]
pub struct ConvergenceWriter {
    pool: SqlitePool,
}

impl ConvergenceWriter {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, event: &ConvergenceEvent) -> Result<(), sqlx::Error> {
        let participants_json = serde_json::to_string(&event.participants).unwrap_or_default();
        let breakdown_json = serde_json::to_string(&event.score_breakdown).unwrap_or_default();
        let trade_hashes_json = serde_json::to_string(&event.trade_hashes).unwrap_or_default();

        sqlx::query(
            "INSERT INTO convergence_events (
                ticker, direction, window_start, window_end, span_days,
                participants_json, score, breakdown_json, trade_hashes_json
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(ticker, direction, window_start) DO UPDATE SET
                window_end = excluded.window_end,
                span_days = excluded.span_days,
                participants_json = excluded.participants_json,
                score = excluded.score,
                breakdown_json = excluded.breakdown_json,
                trade_hashes_json = excluded.trade_hashes_json",
        )
        .bind(&event.ticker)
        .bind(event.direction.as_str())
        .bind(event.window_start.to_string())
        .bind(event.window_end.to_string())
        .bind(event.span_days)
        .bind(&participants_json)
        .bind(event.score)
        .bind(&breakdown_json)
        .bind(&trade_hashes_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ConvergenceReader {
    pool: SqlitePool,
}

impl ConvergenceReader {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Events whose window touches `as_of - 30d .. as_of` — the "hot set"
    /// (spec §4.6 step 4); older events remain queryable for audit via
    /// `all()`.
    pub async fn hot_set(&self, as_of: NaiveDate) -> Result<Vec<ConvergenceEvent>, sqlx::Error> {
        let cutoff = (as_of - chrono::Duration::days(30)).to_string();
        let rows = sqlx::query("SELECT * FROM convergence_events WHERE window_end >= ?")
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_event).collect()
    }

    pub async fn all(&self) -> Result<Vec<ConvergenceEvent>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM convergence_events")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_event).collect()
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<ConvergenceEvent, sqlx::Error> {
    let direction = match row.try_get::<String, _>("direction")?.as_str() {
        "Buy" => TransactionType::Buy,
        "Sale" => TransactionType::Sale,
        _ => TransactionType::Exchange,
    };
    let window_start: String = row.try_get("window_start")?;
    let window_end: String = row.try_get("window_end")?;
    let participants: Vec<ConvergenceParticipant> =
        serde_json::from_str(&row.try_get::<String, _>("participants_json")?).unwrap_or_default();
    let breakdown: ConvergenceScoreBreakdown =
        serde_json::from_str(&row.try_get::<String, _>("breakdown_json")?).unwrap_or_default();
    let trade_hashes: Vec<String> =
        serde_json::from_str(&row.try_get::<String, _>("trade_hashes_json")?).unwrap_or_default();

    Ok(ConvergenceEvent {
        ticker: row.try_get("ticker")?,
        direction,
        window_start: NaiveDate::parse_from_str(&window_start, "%Y-%m-%d")
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        window_end: NaiveDate::parse_from_str(&window_end, "%Y-%m-%d")
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        span_days: row.try_get("span_days")?,
        participants,
        score: row.try_get("score")?,
        score_breakdown: breakdown,
        trade_hashes,
    })
}

