//! Signal Quality Score (spec §4.6): five weighted sub-scores, each a pure
//! function of one trade plus the politician's trade history. Running the
//! scorer twice on the same inputs yields a byte-identical `SqsRecord`.

use disclosure_core::reference::{self, CapTier, CommitteeRole};
use disclosure_core::{AmountBucket, QualityGrade, SqsRecord, Trade, TransactionType};
use rust_decimal::Decimal;

const WEIGHT_ACTIONABILITY: f64 = 0.30;
const WEIGHT_TIMELINESS: f64 = 0.20;
const WEIGHT_CONVICTION: f64 = 0.25;
const WEIGHT_INFORMATION_EDGE: f64 = 0.15;
const WEIGHT_MARKET_IMPACT: f64 = 0.10;

/// Score one trade. `same_direction_history` is every other trade by the
/// same politician on the same (ticker, direction) — used for the
/// multi-trade-same-direction conviction bonus (spec §4.6).
pub fn score_trade(trade: &Trade, same_direction_history: &[&Trade]) -> SqsRecord {
    let actionability = actionability_score(trade);
    let timeliness = timeliness_score(trade.filing_lag_days());
    let conviction = conviction_score(trade, same_direction_history);
    let information_edge = information_edge_score(trade);
    let market_impact = market_impact_score(trade);

    let sqs = WEIGHT_ACTIONABILITY * actionability
        + WEIGHT_TIMELINESS * timeliness
        + WEIGHT_CONVICTION * conviction
        + WEIGHT_INFORMATION_EDGE * information_edge
        + WEIGHT_MARKET_IMPACT * market_impact;

    SqsRecord {
        data_hash: trade.data_hash.clone(),
        actionability,
        timeliness,
        conviction,
        information_edge,
        market_impact,
        sqs,
        grade: QualityGrade::from_score(sqs),
    }
}

fn actionability_score(trade: &Trade) -> f64 {
    match (&trade.ticker, trade.transaction_type) {
        (Some(_), TransactionType::Buy | TransactionType::Sale) => 100.0,
        (Some(_), TransactionType::Exchange) => 70.0,
        (None, _) if !matches!(trade.asset_type, disclosure_core::AssetType::Other(_)) => 30.0,
        (None, _) => 0.0,
    }
}

fn timeliness_score(filing_lag_days: i64) -> f64 {
    match filing_lag_days {
        d if d <= 7 => 100.0,
        8..=15 => 75.0,
        16..=30 => 50.0,
        31..=45 => 25.0,
        _ => 0.0,
    }
}

fn amount_bucket_bonus(bucket: Option<AmountBucket>) -> f64 {
    match bucket {
        Some(AmountBucket::Under1001) => 5.0,
        Some(AmountBucket::Range1001To15000) => 15.0,
        Some(AmountBucket::Range15001To50000) => 30.0,
        Some(AmountBucket::Range50001To100000) => 45.0,
        Some(AmountBucket::Range100001To250000) => 60.0,
        Some(AmountBucket::Range250001To500000) => 75.0,
        Some(AmountBucket::Range500001To1000000) => 85.0,
        Some(AmountBucket::Range1000001To5000000) => 95.0,
        Some(AmountBucket::Over5000000) => 100.0,
        None => 0.0,
    }
}

fn owner_bonus(owner: disclosure_core::Owner) -> f64 {
    use disclosure_core::Owner;
    match owner {
        Owner::Filer => 20.0,
        Owner::Joint => 15.0,
        Owner::Spouse => 10.0,
        Owner::DependentChild => 5.0,
        Owner::Unknown => 0.0,
    }
}

fn multi_trade_bonus(same_direction_history: &[&Trade]) -> f64 {
    match same_direction_history.len() {
        0 => 0.0,
        1..=2 => 15.0,
        _ => 25.0,
    }
}

fn conviction_score(trade: &Trade, same_direction_history: &[&Trade]) -> f64 {
    let sum = amount_bucket_bonus(trade.amount_bucket)
        + owner_bonus(trade.owner)
        + multi_trade_bonus(same_direction_history)
        + trade.extraction_confidence * 20.0;
    sum.min(100.0)
}

fn information_edge_score(trade: &Trade) -> f64 {
    let Some(ticker) = trade.ticker.as_deref() else { return 20.0 };
    let sector = reference::sector_for_ticker(ticker);
    match reference::committee_role_for(&trade.politician_name, sector) {
        Some(CommitteeRole::Chair) | Some(CommitteeRole::RankingMember) => 100.0,
        Some(CommitteeRole::Member) => 70.0,
        None if sector != "Diversified" => 50.0,
        None => 20.0,
    }
}

fn market_impact_score(trade: &Trade) -> f64 {
    let tier = reference::cap_tier_for_ticker(trade.ticker.as_deref());
    let large_trade =
        trade.amount_bucket.map(|b| b.midpoint() >= Decimal::new(50_000, 0)).unwrap_or(false);
    match (tier, large_trade) {
        (CapTier::Mega, _) => 10.0,
        (CapTier::Large, true) => 50.0,
        (CapTier::Large, false) => 30.0,
        (CapTier::SmallOrUnknown, true) => 100.0,
        (CapTier::SmallOrUnknown, false) => 60.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use disclosure_core::{AssetType, Chamber, Owner, SourceFormat};

    fn base_trade() -> Trade {
        let transaction_date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let filing_date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        Trade {
            data_hash: "h1".to_string(),
            chamber: Chamber::House,
            politician_name: "Jane Doe".to_string(),
            surface_name: "Jane Doe".to_string(),
            transaction_date,
            filing_date,
            ticker: Some("SMCI".to_string()),
            asset_name: "Super Micro Computer".to_string(),
            asset_type: AssetType::Stock,
            transaction_type: TransactionType::Buy,
            amount_bucket_label: "$100,001 - $250,000".to_string(),
            amount_bucket: Some(AmountBucket::Range100001To250000),
            owner: Owner::Filer,
            comment: None,
            source_url: "https://example.test".to_string(),
            source_format: SourceFormat::HousePdf,
            extraction_confidence: 0.95,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn sqs_is_bounded_zero_to_hundred() {
        let trade = base_trade();
        let record = score_trade(&trade, &[]);
        assert!(record.sqs >= 0.0 && record.sqs <= 100.0);
    }

    #[test]
    fn scoring_is_deterministic_across_repeated_calls() {
        let trade = base_trade();
        let r1 = score_trade(&trade, &[]);
        let r2 = score_trade(&trade, &[]);
        assert_eq!(r1.sqs, r2.sqs);
        assert_eq!(r1.grade, r2.grade);
    }

    #[test]
    fn small_cap_large_trade_maximizes_market_impact() {
        let trade = base_trade();
        let record = score_trade(&trade, &[]);
        assert_eq!(record.market_impact, 100.0);
    }

    #[test]
    fn mega_cap_minimizes_market_impact() {
        let mut trade = base_trade();
        trade.ticker = Some("AAPL".to_string());
        let record = score_trade(&trade, &[]);
        assert_eq!(record.market_impact, 10.0);
    }

    #[test]
    fn exchange_type_is_actionability_ambiguous() {
        let mut trade = base_trade();
        trade.transaction_type = TransactionType::Exchange;
        let record = score_trade(&trade, &[]);
        assert_eq!(record.actionability, 70.0);
    }

    #[test]
    fn multi_trade_history_raises_conviction() {
        let trade = base_trade();
        let solo = score_trade(&trade, &[]);
        let history = vec![&trade, &trade, &trade];
        let repeated = score_trade(&trade, &history);
        assert!(repeated.conviction >= solo.conviction);
    }
}
