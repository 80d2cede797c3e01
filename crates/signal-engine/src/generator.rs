//! AlphaSignal generation (spec §4.7): one per `Trade`, a pure deterministic
//! function of the trade and its `SqsRecord` snapshot.

use crate::ladder;
use disclosure_core::{AlphaSignal, Chamber, Direction, QualityGrade, SqsRecord, Trade, TransactionType};

/// Maximum attainable ladder product, used to bound the ladder-implied
/// confidence component to `[0, 1]`.
const MAX_COMBINED_MULTIPLIER: f64 = 1.15 * 4.8 * 4.6 * 2.0;

/// The Sale -> LONG mapping is calibrated from a short-sample empirical
/// result (spec §9 REDESIGN FLAGS) and is exposed as a config flag rather
/// than hard-coded, so a future recalibration can flip it to `Short`
/// without touching the generator.
#[derive(Debug, Clone, Copy)]
pub struct SignalConfig {
    pub sale_direction: Direction,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { sale_direction: Direction::Long }
    }
}

/// Generate the directional signal for one trade, or `None` if the trade
/// cannot produce one (`Exchange` transactions never do, spec §4.7).
pub fn generate(trade: &Trade, sqs: &SqsRecord, convergence_bonus: f64, config: &SignalConfig) -> Option<AlphaSignal> {
    let direction = match trade.transaction_type {
        TransactionType::Buy => Direction::Long,
        TransactionType::Sale => config.sale_direction,
        TransactionType::Exchange => return None,
    };

    let (base_alpha_5d, base_alpha_20d) = match trade.transaction_type {
        TransactionType::Buy => (ladder::BUY_LONG_ALPHA_5D, ladder::BUY_LONG_ALPHA_20D),
        TransactionType::Sale => (ladder::SALE_CONTRARIAN_ALPHA_5D, ladder::SALE_CONTRARIAN_ALPHA_20D),
        TransactionType::Exchange => unreachable!("handled above"),
    };

    let combined_multiplier = chamber_mult(trade.chamber)
        * ladder::amount_multiplier(trade.amount_bucket)
        * ladder::filing_lag_multiplier(trade.filing_lag_days())
        * ladder::politician_grade_multiplier(sqs.grade);

    let expected_alpha_5d = base_alpha_5d * combined_multiplier;
    let expected_alpha_20d = base_alpha_20d * combined_multiplier;

    let ladder_implied_confidence = (combined_multiplier / MAX_COMBINED_MULTIPLIER).clamp(0.0, 1.0);
    let confidence = trade.extraction_confidence.max(ladder_implied_confidence);

    let signal_strength = ((sqs.sqs / 100.0) * 0.6 + ladder_implied_confidence * 0.4).clamp(0.0, 1.0);

    let mut reasoning = vec![
        format!("direction={direction:?} from {:?}", trade.transaction_type),
        format!("combined_multiplier={combined_multiplier:.3}"),
        format!("sqs={:.1} grade={:?}", sqs.sqs, sqs.grade),
    ];
    if convergence_bonus > 0.0 {
        reasoning.push(format!("convergence_bonus={convergence_bonus:.2}"));
    }

    Some(AlphaSignal {
        data_hash: trade.data_hash.clone(),
        direction,
        expected_alpha_5d,
        expected_alpha_20d,
        confidence,
        signal_strength,
        combined_multiplier,
        convergence_bonus,
        politician_grade: sqs.grade,
        filing_lag_days: trade.filing_lag_days(),
        sqs_snapshot: sqs.sqs,
        reasoning,
    })
}

fn chamber_mult(chamber: Chamber) -> f64 {
    ladder::chamber_multiplier(chamber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use disclosure_core::{AmountBucket, AssetType, Owner, QualityGrade, SourceFormat};

    fn trade(transaction_type: TransactionType, lag_days: i64) -> Trade {
        let transaction_date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let filing_date = transaction_date + chrono::Duration::days(lag_days);
        Trade {
            data_hash: "h1".to_string(),
            chamber: Chamber::House,
            politician_name: "Jane Doe".to_string(),
            surface_name: "Jane Doe".to_string(),
            transaction_date,
            filing_date,
            ticker: Some("AAPL".to_string()),
            asset_name: "Apple Inc.".to_string(),
            asset_type: AssetType::Stock,
            transaction_type,
            amount_bucket_label: "$15,001 - $50,000".to_string(),
            amount_bucket: Some(AmountBucket::Range15001To50000),
            owner: Owner::Filer,
            comment: None,
            source_url: "https://example.test".to_string(),
            source_format: SourceFormat::HousePdf,
            extraction_confidence: 0.9,
            created_at: chrono::Utc::now(),
        }
    }

    fn sqs(hash: &str) -> SqsRecord {
        SqsRecord {
            data_hash: hash.to_string(),
            actionability: 80.0,
            timeliness: 80.0,
            conviction: 70.0,
            information_edge: 60.0,
            market_impact: 50.0,
            sqs: 70.0,
            grade: QualityGrade::Gold,
        }
    }

    #[test]
    fn exchange_transactions_produce_no_signal() {
        let t = trade(TransactionType::Exchange, 5);
        let config = SignalConfig::default();
        assert!(generate(&t, &sqs("h1"), 0.0, &config).is_none());
    }

    #[test]
    fn buy_maps_to_long() {
        let t = trade(TransactionType::Buy, 5);
        let config = SignalConfig::default();
        let signal = generate(&t, &sqs("h1"), 0.0, &config).unwrap();
        assert_eq!(signal.direction, Direction::Long);
    }

    #[test]
    fn sale_defaults_to_contrarian_long() {
        let t = trade(TransactionType::Sale, 5);
        let config = SignalConfig::default();
        let signal = generate(&t, &sqs("h1"), 0.0, &config).unwrap();
        assert_eq!(signal.direction, Direction::Long);
    }

    #[test]
    fn sale_direction_is_configurable() {
        let t = trade(TransactionType::Sale, 5);
        let config = SignalConfig { sale_direction: Direction::Short };
        let signal = generate(&t, &sqs("h1"), 0.0, &config).unwrap();
        assert_eq!(signal.direction, Direction::Short);
    }

    #[test]
    fn fast_filing_earns_the_larger_multiplier() {
        let fast = trade(TransactionType::Buy, 5);
        let slow = trade(TransactionType::Buy, 20);
        let config = SignalConfig::default();
        let fast_signal = generate(&fast, &sqs("h1"), 0.0, &config).unwrap();
        let slow_signal = generate(&slow, &sqs("h1"), 0.0, &config).unwrap();
        assert!(fast_signal.combined_multiplier > slow_signal.combined_multiplier);
    }

    #[test]
    fn signal_strength_is_bounded() {
        let t = trade(TransactionType::Buy, 5);
        let config = SignalConfig::default();
        let signal = generate(&t, &sqs("h1"), 0.0, &config).unwrap();
        assert!(signal.signal_strength >= 0.0 && signal.signal_strength <= 1.0);
    }
}
