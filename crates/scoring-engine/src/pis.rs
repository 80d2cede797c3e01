//! Politician Impact Score (spec §3, §4.6 glossary): per-politician ranking
//! across activity, conviction, diversification, and timing, each
//! min-max normalized over the current batch of politicians being ranked.

use disclosure_core::{Chamber, PoliticianRanking, SqsRecord, Trade};
use std::collections::HashMap;

/// Rank every politician appearing in `trades`. `sqs_by_hash` supplies the
/// conviction/timeliness sub-scores already computed for each trade.
pub fn rank(trades: &[Trade], sqs_by_hash: &HashMap<String, SqsRecord>) -> Vec<PoliticianRanking> {
    let mut by_politician: HashMap<String, Vec<&Trade>> = HashMap::new();
    for trade in trades {
        by_politician.entry(trade.politician_name.clone()).or_default().push(trade);
    }

    let trade_counts: HashMap<&str, usize> =
        by_politician.iter().map(|(name, trades)| (name.as_str(), trades.len())).collect();
    let ticker_counts: HashMap<&str, usize> = by_politician
        .iter()
        .map(|(name, trades)| {
            let distinct: std::collections::HashSet<&str> =
                trades.iter().filter_map(|t| t.ticker.as_deref()).collect();
            (name.as_str(), distinct.len())
        })
        .collect();

    let activity_norm = BatchNorm::over(trade_counts.values().copied());
    let diversification_norm = BatchNorm::over(ticker_counts.values().copied());

    let mut rankings: Vec<PoliticianRanking> = by_politician
        .into_iter()
        .map(|(name, politician_trades)| {
            let chamber = politician_trades[0].chamber;
            let activity = activity_norm.normalize(trade_counts[name.as_str()] as f64);
            let diversification = diversification_norm.normalize(ticker_counts[name.as_str()] as f64);

            let (conviction_sum, timing_sum, n) = politician_trades.iter().fold(
                (0.0, 0.0, 0usize),
                |(conviction, timing, n), trade| match sqs_by_hash.get(&trade.data_hash) {
                    Some(record) => (conviction + record.conviction, timing + record.timeliness, n + 1),
                    None => (conviction, timing, n),
                },
            );
            let conviction = if n > 0 { conviction_sum / n as f64 } else { 0.0 };
            let timing = if n > 0 { timing_sum / n as f64 } else { 0.0 };

            let pis = PoliticianRanking::compute_pis(activity, conviction, diversification, timing);
            PoliticianRanking { canonical_name: name, chamber, activity, conviction, diversification, timing, pis }
        })
        .collect();

    rankings.sort_by(|a, b| b.pis.partial_cmp(&a.pis).unwrap_or(std::cmp::Ordering::Equal));
    rankings
}

/// Min-max normalization to `[0, 100]` over one batch of counts. Falls back
/// to a flat midpoint when every value in the batch is identical (no spread
/// to normalize against).
struct BatchNorm {
    min: f64,
    max: f64,
}

impl BatchNorm {
    fn over(values: impl Iterator<Item = usize>) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v as f64), max.max(v as f64))
        });
        if min.is_infinite() {
            Self { min: 0.0, max: 1.0 }
        } else {
            Self { min, max }
        }
    }

    fn normalize(&self, value: f64) -> f64 {
        if (self.max - self.min).abs() < f64::EPSILON {
            50.0
        } else {
            100.0 * (value - self.min) / (self.max - self.min)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use disclosure_core::{AssetType, Owner, SourceFormat, TransactionType};

    fn trade(politician: &str, ticker: &str, date: NaiveDate) -> Trade {
        let hash = format!("{politician}-{ticker}-{date}");
        Trade {
            data_hash: hash,
            chamber: Chamber::House,
            politician_name: politician.to_string(),
            surface_name: politician.to_string(),
            transaction_date: date,
            filing_date: date,
            ticker: Some(ticker.to_string()),
            asset_name: ticker.to_string(),
            asset_type: AssetType::Stock,
            transaction_type: TransactionType::Buy,
            amount_bucket_label: "$1,001 - $15,000".to_string(),
            amount_bucket: disclosure_core::AmountBucket::parse("$1,001 - $15,000"),
            owner: Owner::Joint,
            comment: None,
            source_url: "https://example.test".to_string(),
            source_format: SourceFormat::HousePdf,
            extraction_confidence: 0.9,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn most_active_politician_ranks_first() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let trades = vec![
            trade("Frequent Trader", "AAPL", date),
            trade("Frequent Trader", "MSFT", date),
            trade("Frequent Trader", "NVDA", date),
            trade("Rare Trader", "AAPL", date),
        ];
        let sqs_by_hash = HashMap::new();
        let rankings = rank(&trades, &sqs_by_hash);

        assert_eq!(rankings[0].canonical_name, "Frequent Trader");
        assert!(rankings[0].pis >= rankings[1].pis);
    }

    #[test]
    fn pis_is_bounded_by_sub_dimension_range() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let trades = vec![trade("Solo Trader", "AAPL", date)];
        let sqs_by_hash = HashMap::new();
        let rankings = rank(&trades, &sqs_by_hash);

        assert!(rankings[0].pis >= 0.0 && rankings[0].pis <= 100.0);
    }
}
