//! S2 VALIDATE (spec §4.3): schema validation over the recovered JSON.
//! Invariant (c): each candidate trade is validated independently — a
//! single bad row excludes only that row, it never discards the batch.

use crate::prompts::PromptKind;
use chrono::NaiveDate;
use disclosure_core::{AssetType, Owner, SourceFormat, Trade, TransactionType};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawPayload {
    confidence: f64,
    trades: Vec<RawTrade>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    politician_name: String,
    transaction_date: String,
    filing_date: String,
    ticker: Option<String>,
    asset_name: String,
    asset_type: String,
    transaction_type: String,
    amount_bucket_label: String,
    owner: String,
    comment: Option<String>,
}

pub struct ValidatedBatch {
    pub confidence: f64,
    pub trades: Vec<Trade>,
    /// One message per candidate row that failed independent validation.
    pub row_errors: Vec<String>,
}

pub fn validate(
    value: &Value,
    prompt_kind: PromptKind,
    source_url: &str,
) -> Result<ValidatedBatch, String> {
    let payload: RawPayload = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;

    if !(0.0..=1.0).contains(&payload.confidence) {
        return Err(format!("confidence {} outside [0,1]", payload.confidence));
    }

    let mut trades = Vec::with_capacity(payload.trades.len());
    let mut row_errors = Vec::new();

    for (index, raw) in payload.trades.into_iter().enumerate() {
        match validate_row(raw, prompt_kind, source_url, payload.confidence) {
            Ok(trade) => trades.push(trade),
            Err(message) => row_errors.push(format!("row {index}: {message}")),
        }
    }

    Ok(ValidatedBatch { confidence: payload.confidence, trades, row_errors })
}

fn validate_row(
    raw: RawTrade,
    prompt_kind: PromptKind,
    source_url: &str,
    confidence: f64,
) -> Result<Trade, String> {
    let transaction_date = NaiveDate::parse_from_str(&raw.transaction_date, "%Y-%m-%d")
        .map_err(|e| format!("bad transaction_date: {e}"))?;
    let filing_date = NaiveDate::parse_from_str(&raw.filing_date, "%Y-%m-%d")
        .map_err(|e| format!("bad filing_date: {e}"))?;
    if filing_date < transaction_date {
        return Err(format!("filing_date {filing_date} precedes transaction_date {transaction_date}"));
    }

    let transaction_type = parse_transaction_type(&raw.transaction_type)?;
    let owner = parse_owner(&raw.owner);
    let asset_type = parse_asset_type(&raw.asset_type);
    let ticker = raw.ticker.map(|t| t.trim().to_uppercase()).filter(|t| !t.is_empty());
    let amount_bucket = disclosure_core::AmountBucket::parse(&raw.amount_bucket_label);

    let data_hash = Trade::compute_hash(
        raw.politician_name.trim(),
        transaction_date,
        ticker.as_deref(),
        &raw.amount_bucket_label,
        transaction_type,
    );

    Ok(Trade {
        data_hash,
        chamber: chamber_for(prompt_kind),
        politician_name: raw.politician_name.trim().to_string(),
        surface_name: raw.politician_name.trim().to_string(),
        transaction_date,
        filing_date,
        ticker,
        asset_name: raw.asset_name.trim().to_string(),
        asset_type,
        transaction_type,
        amount_bucket_label: raw.amount_bucket_label.trim().to_string(),
        amount_bucket,
        owner,
        comment: raw.comment.filter(|c| !c.trim().is_empty()),
        source_url: source_url.to_string(),
        source_format: prompt_kind.source_format(),
        extraction_confidence: confidence.clamp(0.0, 1.0),
        created_at: chrono::Utc::now(),
    })
}

fn chamber_for(prompt_kind: PromptKind) -> disclosure_core::Chamber {
    match prompt_kind {
        PromptKind::SenateHtml => disclosure_core::Chamber::Senate,
        PromptKind::HousePdf => disclosure_core::Chamber::House,
        // Capitol Trades aggregates both chambers; chamber is refined later
        // by the Loader from the row's own chamber field when present, but
        // the extractor has no chamber signal of its own for this source,
        // so House is used as the documented default (spec is silent here).
        PromptKind::CapitolTradesHtml => disclosure_core::Chamber::House,
    }
}

fn parse_transaction_type(raw: &str) -> Result<TransactionType, String> {
    match raw.trim().to_lowercase().as_str() {
        "buy" | "purchase" => Ok(TransactionType::Buy),
        "sale" | "sale (full)" | "sale (partial)" | "sell" => Ok(TransactionType::Sale),
        "exchange" => Ok(TransactionType::Exchange),
        other => Err(format!("unrecognized transaction_type: {other}")),
    }
}

fn parse_owner(raw: &str) -> Owner {
    match raw.trim().to_lowercase().as_str() {
        "self" | "filer" => Owner::Filer,
        "spouse" => Owner::Spouse,
        "joint" | "jt" => Owner::Joint,
        "dependent-child" | "dependent child" | "child" => Owner::DependentChild,
        _ => Owner::Unknown,
    }
}

fn parse_asset_type(raw: &str) -> AssetType {
    match raw.trim().to_lowercase().as_str() {
        "stock" | "stock option" | "equity" => AssetType::Stock,
        "bond" | "corporate bond" | "municipal bond" => AssetType::Bond,
        "fund" | "mutual fund" | "etf" => AssetType::Fund,
        other => AssetType::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> Value {
        json!({
            "confidence": 0.92,
            "trades": [{
                "politician_name": "Nancy Pelosi",
                "transaction_date": "2026-01-10",
                "filing_date": "2026-01-20",
                "ticker": "nvda",
                "asset_name": "NVIDIA Corp",
                "asset_type": "Stock",
                "transaction_type": "Buy",
                "amount_bucket_label": "$1,001 - $15,000",
                "owner": "Joint",
                "comment": null,
            }]
        })
    }

    #[test]
    fn validates_a_clean_row() {
        let batch = validate(&sample_payload(), PromptKind::SenateHtml, "https://example.test").unwrap();
        assert_eq!(batch.trades.len(), 1);
        assert!(batch.row_errors.is_empty());
        assert_eq!(batch.trades[0].ticker.as_deref(), Some("NVDA"));
    }

    #[test]
    fn one_bad_row_does_not_discard_the_batch() {
        let mut payload = sample_payload();
        payload["trades"].as_array_mut().unwrap().push(json!({
            "politician_name": "Someone",
            "transaction_date": "2026-01-10",
            "filing_date": "2026-01-01",
            "ticker": null,
            "asset_name": "Bad Asset",
            "asset_type": "Stock",
            "transaction_type": "Buy",
            "amount_bucket_label": "$1,001 - $15,000",
            "owner": "Self",
            "comment": null,
        }));
        let batch = validate(&payload, PromptKind::SenateHtml, "https://example.test").unwrap();
        assert_eq!(batch.trades.len(), 1);
        assert_eq!(batch.row_errors.len(), 1);
        assert!(batch.row_errors[0].contains("precedes"));
    }

    #[test]
    fn rejects_confidence_outside_unit_interval() {
        let mut payload = sample_payload();
        payload["confidence"] = json!(1.4);
        assert!(validate(&payload, PromptKind::SenateHtml, "https://example.test").is_err());
    }
}
