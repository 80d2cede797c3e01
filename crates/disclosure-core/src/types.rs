use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Chamber of Congress a filer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    Senate,
    House,
}

impl Chamber {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chamber::Senate => "Senate",
            Chamber::House => "House",
        }
    }
}

/// Disclosed transaction type. `Exchange` never produces a directional signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Buy,
    Sale,
    Exchange,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "Buy",
            TransactionType::Sale => "Sale",
            TransactionType::Exchange => "Exchange",
        }
    }
}

/// Who within the filer's household holds the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    #[serde(rename = "Self")]
    Filer,
    Spouse,
    Joint,
    DependentChild,
    Unknown,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Owner::Filer => "Self",
            Owner::Spouse => "Spouse",
            Owner::Joint => "Joint",
            Owner::DependentChild => "Dependent-Child",
            Owner::Unknown => "Unknown",
        }
    }
}

/// Broad asset classification. Unrecognized disclosure categories fall into `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Stock,
    Bond,
    Fund,
    Other(String),
}

/// Which pipeline source a trade's raw record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    SenateHtml,
    HousePdf,
    CapitolTradesHtml,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::SenateHtml => "senate_html",
            SourceFormat::HousePdf => "house_pdf",
            SourceFormat::CapitolTradesHtml => "capitoltrades_html",
        }
    }
}

/// One of the fixed disclosure amount bands. The scalar midpoint is used
/// wherever arithmetic is required; the original bucket string is retained
/// for display and audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmountBucket {
    Under1001,
    Range1001To15000,
    Range15001To50000,
    Range50001To100000,
    Range100001To250000,
    Range250001To500000,
    Range500001To1000000,
    Range1000001To5000000,
    Over5000000,
}

impl AmountBucket {
    /// The label exactly as it appears on disclosure forms.
    pub fn label(&self) -> &'static str {
        match self {
            AmountBucket::Under1001 => "$1 - $1,000",
            AmountBucket::Range1001To15000 => "$1,001 - $15,000",
            AmountBucket::Range15001To50000 => "$15,001 - $50,000",
            AmountBucket::Range50001To100000 => "$50,001 - $100,000",
            AmountBucket::Range100001To250000 => "$100,001 - $250,000",
            AmountBucket::Range250001To500000 => "$250,001 - $500,000",
            AmountBucket::Range500001To1000000 => "$500,001 - $1,000,000",
            AmountBucket::Range1000001To5000000 => "$1,000,001 - $5,000,000",
            AmountBucket::Over5000000 => "Over $5,000,000",
        }
    }

    /// Scalar midpoint of the band, used for any arithmetic (e.g. amount-weight
    /// bonuses in convergence scoring). `Over5000000` has no upper bound, so its
    /// midpoint is a conservative point estimate rather than a true mean.
    pub fn midpoint(&self) -> Decimal {
        match self {
            AmountBucket::Under1001 => Decimal::new(500, 0),
            AmountBucket::Range1001To15000 => Decimal::new(8_000, 0),
            AmountBucket::Range15001To50000 => Decimal::new(32_500, 0),
            AmountBucket::Range50001To100000 => Decimal::new(75_000, 0),
            AmountBucket::Range100001To250000 => Decimal::new(175_000, 0),
            AmountBucket::Range250001To500000 => Decimal::new(375_000, 0),
            AmountBucket::Range500001To1000000 => Decimal::new(750_000, 0),
            AmountBucket::Range1000001To5000000 => Decimal::new(3_000_000, 0),
            AmountBucket::Over5000000 => Decimal::new(7_500_000, 0),
        }
    }

    /// Parse a raw bucket string as it appears on Senate/House/Capitol Trades
    /// disclosures. Returns `None` for unrecognized text (callers should fall
    /// back to storing the raw string without a parsed bucket).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim();
        match normalized {
            "$1 - $1,000" | "$1,000 or less" => Some(AmountBucket::Under1001),
            "$1,001 - $15,000" => Some(AmountBucket::Range1001To15000),
            "$15,001 - $50,000" => Some(AmountBucket::Range15001To50000),
            "$50,001 - $100,000" => Some(AmountBucket::Range50001To100000),
            "$100,001 - $250,000" => Some(AmountBucket::Range100001To250000),
            "$250,001 - $500,000" => Some(AmountBucket::Range250001To500000),
            "$500,001 - $1,000,000" => Some(AmountBucket::Range500001To1000000),
            "$1,000,001 - $5,000,000" => Some(AmountBucket::Range1000001To5000000),
            "Over $5,000,000" | "$5,000,001 +" => Some(AmountBucket::Over5000000),
            _ => None,
        }
    }
}

/// The canonical unit of ingestion. Never mutated after creation; a
/// correction is a new row, and the superseded row remains for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub data_hash: String,
    pub chamber: Chamber,
    pub politician_name: String,
    pub surface_name: String,
    pub transaction_date: NaiveDate,
    pub filing_date: NaiveDate,
    pub ticker: Option<String>,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub transaction_type: TransactionType,
    pub amount_bucket_label: String,
    pub amount_bucket: Option<AmountBucket>,
    pub owner: Owner,
    pub comment: Option<String>,
    pub source_url: String,
    pub source_format: SourceFormat,
    pub extraction_confidence: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Trade {
    /// `data_hash = SHA-256(politician_name || transaction_date || ticker || amount_bucket || transaction_type)`
    pub fn compute_hash(
        politician_name: &str,
        transaction_date: NaiveDate,
        ticker: Option<&str>,
        amount_bucket_label: &str,
        transaction_type: TransactionType,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(politician_name.as_bytes());
        hasher.update(transaction_date.to_string().as_bytes());
        hasher.update(ticker.unwrap_or("").as_bytes());
        hasher.update(amount_bucket_label.as_bytes());
        hasher.update(transaction_type.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Filing lag in calendar days. Invariant: `filing_date >= transaction_date`.
    pub fn filing_lag_days(&self) -> i64 {
        (self.filing_date - self.transaction_date).num_days()
    }
}

/// Terminal outcome of one Transformer invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStatus {
    Success,
    Partial,
    ManualReview,
    Failed,
}

/// One row per Transformer invocation. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionLog {
    pub source_identifier: String,
    pub raw_record_count: usize,
    pub extracted_count: usize,
    pub duplicate_count: usize,
    pub confidence: f64,
    pub status: ExtractionStatus,
    pub error_message: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Quality-grade band assigned from a final SQS value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityGrade {
    Platinum,
    Gold,
    Silver,
    Bronze,
    Discard,
}

impl QualityGrade {
    /// Band assignment is exhaustive and disjoint over `[0, 100]`.
    pub fn from_score(sqs: f64) -> Self {
        if sqs >= 80.0 {
            QualityGrade::Platinum
        } else if sqs >= 60.0 {
            QualityGrade::Gold
        } else if sqs >= 40.0 {
            QualityGrade::Silver
        } else if sqs >= 20.0 {
            QualityGrade::Bronze
        } else {
            QualityGrade::Discard
        }
    }
}

/// Per-trade quality score: five weighted sub-scores plus the final SQS and grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqsRecord {
    pub data_hash: String,
    pub actionability: f64,
    pub timeliness: f64,
    pub conviction: f64,
    pub information_edge: f64,
    pub market_impact: f64,
    pub sqs: f64,
    pub grade: QualityGrade,
}

/// A set of trades on one (ticker, direction) falling inside one window with
/// >= 2 distinct politicians. Keyed on (ticker, direction, window_start).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceEvent {
    pub ticker: String,
    pub direction: TransactionType,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub span_days: i64,
    pub participants: Vec<ConvergenceParticipant>,
    pub score: f64,
    pub score_breakdown: ConvergenceScoreBreakdown,
    pub trade_hashes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceParticipant {
    pub politician_name: String,
    pub chamber: Chamber,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConvergenceScoreBreakdown {
    pub base: f64,
    pub time_density_bonus: f64,
    pub cross_chamber_bonus: f64,
    pub amount_weight_bonus: f64,
    pub high_frequency_discount: f64,
    pub notable_participant_bonus: f64,
}

/// Directional stance produced by the signal generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

/// Per-trade directional signal, recomputed deterministically from the trade
/// and its SQS snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaSignal {
    pub data_hash: String,
    pub direction: Direction,
    pub expected_alpha_5d: f64,
    pub expected_alpha_20d: f64,
    pub confidence: f64,
    pub signal_strength: f64,
    pub combined_multiplier: f64,
    pub convergence_bonus: f64,
    pub politician_grade: QualityGrade,
    pub filing_lag_days: i64,
    pub sqs_snapshot: f64,
    pub reasoning: Vec<String>,
}

/// Derived from `AlphaSignal` by PACS, VIX regime, and optional contract /
/// social-alignment bonuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedSignal {
    pub data_hash: String,
    pub pacs: f64,
    pub vix_multiplier: f64,
    pub enhanced_strength: f64,
    pub amount_sweet_spot_bonus: f64,
    pub burst_convergence_bonus: f64,
    pub contract_award_bonus: f64,
    pub decayed_expected_alpha: f64,
    pub review_required: bool,
    pub review_reason: Option<String>,
}

/// Per-politician aggregate ranking across four sub-dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliticianRanking {
    pub canonical_name: String,
    pub chamber: Chamber,
    pub activity: f64,
    pub conviction: f64,
    pub diversification: f64,
    pub timing: f64,
    pub pis: f64,
}

impl PoliticianRanking {
    pub fn compute_pis(activity: f64, conviction: f64, diversification: f64, timing: f64) -> f64 {
        (activity + conviction + diversification + timing) / 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_for_identical_tuples() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let h1 = Trade::compute_hash("Nancy Pelosi", date, Some("AAPL"), "$1,001 - $15,000", TransactionType::Buy);
        let h2 = Trade::compute_hash("Nancy Pelosi", date, Some("AAPL"), "$1,001 - $15,000", TransactionType::Buy);
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_differs_on_any_field_change() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let h1 = Trade::compute_hash("Nancy Pelosi", date, Some("AAPL"), "$1,001 - $15,000", TransactionType::Buy);
        let h2 = Trade::compute_hash("Nancy Pelosi", date, Some("AAPL"), "$1,001 - $15,000", TransactionType::Sale);
        assert_ne!(h1, h2);
    }

    #[test]
    fn grade_bands_are_exhaustive_and_disjoint() {
        assert_eq!(QualityGrade::from_score(100.0), QualityGrade::Platinum);
        assert_eq!(QualityGrade::from_score(80.0), QualityGrade::Platinum);
        assert_eq!(QualityGrade::from_score(79.9), QualityGrade::Gold);
        assert_eq!(QualityGrade::from_score(60.0), QualityGrade::Gold);
        assert_eq!(QualityGrade::from_score(59.9), QualityGrade::Silver);
        assert_eq!(QualityGrade::from_score(40.0), QualityGrade::Silver);
        assert_eq!(QualityGrade::from_score(39.9), QualityGrade::Bronze);
        assert_eq!(QualityGrade::from_score(20.0), QualityGrade::Bronze);
        assert_eq!(QualityGrade::from_score(19.9), QualityGrade::Discard);
        assert_eq!(QualityGrade::from_score(0.0), QualityGrade::Discard);
    }
}
