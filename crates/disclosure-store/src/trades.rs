use chrono::NaiveDate;
use disclosure_core::{AmountBucket, AssetType, Chamber, Owner, SourceFormat, Trade, TransactionType};
use sqlx::{Row, SqlitePool};

/// Outcome of an atomic check-hash -> insert attempt (spec §4.4 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

/// Sole write handle to the `trades` table. Owned exclusively by the Loader
/// (spec §3, §9: single-writer discipline enforced by construction — only
/// `disclosure-loader` ever calls `Store::trade_writer`).
#[derive(Clone)]
pub struct TradeWriter {
    pool: SqlitePool,
}

impl TradeWriter {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attempt to atomically insert a trade. A hash collision is not an
    /// error: it is the expected dedup path and returns `Duplicate`.
    pub async fn insert(&self, trade: &Trade, manual_review: bool) -> Result<InsertOutcome, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO trades (
                data_hash, chamber, politician_name, surface_name, transaction_date, filing_date,
                ticker, asset_name, asset_type, transaction_type, amount_bucket_label, amount_bucket,
                owner, comment, source_url, source_format, extraction_confidence, manual_review, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(data_hash) DO NOTHING",
        )
        .bind(&trade.data_hash)
        .bind(trade.chamber.as_str())
        .bind(&trade.politician_name)
        .bind(&trade.surface_name)
        .bind(trade.transaction_date.to_string())
        .bind(trade.filing_date.to_string())
        .bind(&trade.ticker)
        .bind(asset_type_label(&trade.asset_type))
        .bind(trade.transaction_type.as_str())
        .bind(&trade.amount_bucket_label)
        .bind(trade.amount_bucket.map(|b| b.label().to_string()))
        .bind(trade.owner.as_str())
        .bind(&trade.comment)
        .bind(&trade.source_url)
        .bind(trade.source_format.as_str())
        .bind(trade.extraction_confidence)
        .bind(manual_review as i64)
        .bind(trade.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }
}

/// Read-only view of `trades`. Any number of readers may be handed out; none
/// can write.
#[derive(Clone)]
pub struct TradeReader {
    pool: SqlitePool,
}

impl TradeReader {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All trades with `extraction_confidence >= 0.7` and not flagged
    /// `manual_review`, ordered for scoring/convergence/signal generation
    /// (spec §5: ascending transaction_date, filing_date, then data_hash).
    pub async fn canonical_trades(&self) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM trades WHERE extraction_confidence >= 0.7 AND manual_review = 0
             ORDER BY transaction_date ASC, filing_date ASC, data_hash ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_trade).collect()
    }

    pub async fn by_politician_and_ticker(
        &self,
        politician_name: &str,
        ticker: &str,
    ) -> Result<Vec<Trade>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM trades WHERE politician_name = ? AND ticker = ?
             ORDER BY transaction_date ASC, filing_date ASC, data_hash ASC",
        )
        .bind(politician_name)
        .bind(ticker)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_trade).collect()
    }

    pub async fn by_hash(&self, data_hash: &str) -> Result<Option<Trade>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM trades WHERE data_hash = ?")
            .bind(data_hash)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_trade).transpose()
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM trades")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("n")?)
    }
}

fn asset_type_label(t: &AssetType) -> String {
    match t {
        AssetType::Stock => "Stock".to_string(),
        AssetType::Bond => "Bond".to_string(),
        AssetType::Fund => "Fund".to_string(),
        AssetType::Other(s) => s.clone(),
    }
}

fn parse_asset_type(s: &str) -> AssetType {
    match s {
        "Stock" => AssetType::Stock,
        "Bond" => AssetType::Bond,
        "Fund" => AssetType::Fund,
        other => AssetType::Other(other.to_string()),
    }
}

fn row_to_trade(row: &sqlx::sqlite::SqliteRow) -> Result<Trade, sqlx::Error> {
    let chamber = match row.try_get::<String, _>("chamber")?.as_str() {
        "Senate" => Chamber::Senate,
        _ => Chamber::House,
    };
    let transaction_type = match row.try_get::<String, _>("transaction_type")?.as_str() {
        "Buy" => TransactionType::Buy,
        "Sale" => TransactionType::Sale,
        _ => TransactionType::Exchange,
    };
    let owner = match row.try_get::<String, _>("owner")?.as_str() {
        "Self" => Owner::Filer,
        "Spouse" => Owner::Spouse,
        "Joint" => Owner::Joint,
        "Dependent-Child" => Owner::DependentChild,
        _ => Owner::Unknown,
    };
    let source_format = match row.try_get::<String, _>("source_format")?.as_str() {
        "senate_html" => SourceFormat::SenateHtml,
        "house_pdf" => SourceFormat::HousePdf,
        _ => SourceFormat::CapitolTradesHtml,
    };
    let transaction_date: String = row.try_get("transaction_date")?;
    let filing_date: String = row.try_get("filing_date")?;
    let created_at: String = row.try_get("created_at")?;
    let amount_bucket_label: String = row.try_get("amount_bucket_label")?;
    let amount_bucket = AmountBucket::parse(&amount_bucket_label);

    Ok(Trade {
        data_hash: row.try_get("data_hash")?,
        chamber,
        politician_name: row.try_get("politician_name")?,
        surface_name: row.try_get("surface_name")?,
        transaction_date: NaiveDate::parse_from_str(&transaction_date, "%Y-%m-%d")
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        filing_date: NaiveDate::parse_from_str(&filing_date, "%Y-%m-%d")
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        ticker: row.try_get("ticker")?,
        asset_name: row.try_get("asset_name")?,
        asset_type: parse_asset_type(&row.try_get::<String, _>("asset_type")?),
        transaction_type,
        amount_bucket_label,
        amount_bucket,
        owner,
        comment: row.try_get("comment")?,
        source_url: row.try_get("source_url")?,
        source_format,
        extraction_confidence: row.try_get("extraction_confidence")?,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&chrono::Utc),
    })
}
