use disclosure_core::{AlphaSignal, Direction, EnhancedSignal, QualityGrade};
use sqlx::{Row, SqlitePool};

/// Sole write handle to `alpha_signals`, owned by the signal generator.
#[derive(Clone)]
pub struct AlphaSignalWriter {
    pool: SqlitePool,
}

impl AlphaSignalWriter {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, signal: &AlphaSignal) -> Result<(), sqlx::Error> {
        let reasoning_json = serde_json::to_string(&signal.reasoning).unwrap_or_default();
        sqlx::query(
            "INSERT INTO alpha_signals (
                data_hash, direction, expected_alpha_5d, expected_alpha_20d, confidence,
                signal_strength, combined_multiplier, convergence_bonus, politician_grade,
                filing_lag_days, sqs_snapshot, reasoning_json, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(data_hash) DO UPDATE SET
                direction = excluded.direction,
                expected_alpha_5d = excluded.expected_alpha_5d,
                expected_alpha_20d = excluded.expected_alpha_20d,
                confidence = excluded.confidence,
                signal_strength = excluded.signal_strength,
                combined_multiplier = excluded.combined_multiplier,
                convergence_bonus = excluded.convergence_bonus,
                politician_grade = excluded.politician_grade,
                filing_lag_days = excluded.filing_lag_days,
                sqs_snapshot = excluded.sqs_snapshot,
                reasoning_json = excluded.reasoning_json",
        )
        .bind(&signal.data_hash)
        .bind(direction_label(signal.direction))
        .bind(signal.expected_alpha_5d)
        .bind(signal.expected_alpha_20d)
        .bind(signal.confidence)
        .bind(signal.signal_strength)
        .bind(signal.combined_multiplier)
        .bind(signal.convergence_bonus)
        .bind(grade_label(signal.politician_grade))
        .bind(signal.filing_lag_days)
        .bind(signal.sqs_snapshot)
        .bind(&reasoning_json)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AlphaSignalReader {
    pool: SqlitePool,
}

impl AlphaSignalReader {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn by_hash(&self, data_hash: &str) -> Result<Option<AlphaSignal>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM alpha_signals WHERE data_hash = ?")
            .bind(data_hash)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_alpha_signal).transpose()
    }

    pub async fn all(&self) -> Result<Vec<AlphaSignal>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM alpha_signals").fetch_all(&self.pool).await?;
        rows.iter().map(row_to_alpha_signal).collect()
    }
}

/// Sole write handle to `enhanced_signals`, owned by the enhancer.
#[derive(Clone)]
pub struct EnhancedSignalWriter {
    pool: SqlitePool,
}

impl EnhancedSignalWriter {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, signal: &EnhancedSignal) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO enhanced_signals (
                data_hash, pacs, vix_multiplier, enhanced_strength, amount_sweet_spot_bonus,
                burst_convergence_bonus, contract_award_bonus, decayed_expected_alpha,
                review_required, review_reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(data_hash) DO UPDATE SET
                pacs = excluded.pacs,
                vix_multiplier = excluded.vix_multiplier,
                enhanced_strength = excluded.enhanced_strength,
                amount_sweet_spot_bonus = excluded.amount_sweet_spot_bonus,
                burst_convergence_bonus = excluded.burst_convergence_bonus,
                contract_award_bonus = excluded.contract_award_bonus,
                decayed_expected_alpha = excluded.decayed_expected_alpha,
                review_required = excluded.review_required,
                review_reason = excluded.review_reason",
        )
        .bind(&signal.data_hash)
        .bind(signal.pacs)
        .bind(signal.vix_multiplier)
        .bind(signal.enhanced_strength)
        .bind(signal.amount_sweet_spot_bonus)
        .bind(signal.burst_convergence_bonus)
        .bind(signal.contract_award_bonus)
        .bind(signal.decayed_expected_alpha)
        .bind(signal.review_required as i64)
        .bind(&signal.review_reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Long => "LONG",
        Direction::Short => "SHORT",
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

fn row_to_alpha_signal(row: &sqlx::sqlite::SqliteRow) -> Result<AlphaSignal, sqlx::Error> {
    let direction = match row.try_get::<String, _>("direction")?.as_str() {
        "LONG" => Direction::Long,
        _ => Direction::Short,
    };
    let grade = match row.try_get::<String, _>("politician_grade")?.as_str() {
        "Platinum" => QualityGrade::Platinum,
        "Gold" => QualityGrade::Gold,
        "Silver" => QualityGrade::Silver,
        "Bronze" => QualityGrade::Bronze,
        _ => QualityGrade::Discard,
    };
    let reasoning: Vec<String> =
        serde_json::from_str(&row.try_get::<String, _>("reasoning_json")?).unwrap_or_default();

    Ok(AlphaSignal {
        data_hash: row.try_get("data_hash")?,
        direction,
        expected_alpha_5d: row.try_get("expected_alpha_5d")?,
        expected_alpha_20d: row.try_get("expected_alpha_20d")?,
        confidence: row.try_get("confidence")?,
        signal_strength: row.try_get("signal_strength")?,
        combined_multiplier: row.try_get("combined_multiplier")?,
        convergence_bonus: row.try_get("convergence_bonus")?,
        politician_grade: grade,
        filing_lag_days: row.try_get("filing_lag_days")?,
        sqs_snapshot: row.try_get("sqs_snapshot")?,
        reasoning,
    })
}
