//! The PACS enhancer (spec §4.7): hard filters, the composite PACS score,
//! the VIX regime multiplier, and the small additive bonuses, all applied
//! to an `AlphaSignal` to produce its `EnhancedSignal`.
//!
//! Batch-relative min-max normalization mirrors `scoring_engine::pis`'s
//! `BatchNorm` — every `norm(...)` term in the PACS formula is min-max over
//! the current batch, not a fixed scale.

use chrono::NaiveDate;
use disclosure_core::{AlphaSignal, AmountBucket, EnhancedSignal, QualityGrade, SqsRecord, Trade};

const PACS_WEIGHT_SIGNAL_STRENGTH: f64 = 0.50;
const PACS_WEIGHT_INVERSE_LAG: f64 = 0.25;
const PACS_WEIGHT_OPTIONS_SENTIMENT: f64 = 0.15;
const PACS_WEIGHT_CONVERGENCE: f64 = 0.10;

const AMOUNT_SWEET_SPOT_BONUS: f64 = 5.0;
const BURST_CONVERGENCE_BONUS: f64 = 0.5;

/// VIX regime bands (spec §4.7). Tuning constants, not business rules.
const VIX_GOLDILOCKS_LOW: f64 = 14.0;
const VIX_GOLDILOCKS_HIGH: f64 = 16.0;
const VIX_MULTIPLIER_GOLDILOCKS: f64 = 1.3;
const VIX_MULTIPLIER_LOW: f64 = 0.7;
const VIX_MULTIPLIER_HIGH: f64 = 0.8;

const DECAY_HORIZON_DAYS: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractAwardTier {
    None,
    Matched,
    LargeMatched,
}

impl ContractAwardTier {
    fn bonus(&self) -> f64 {
        match self {
            ContractAwardTier::None => 0.0,
            ContractAwardTier::Matched => 0.1,
            ContractAwardTier::LargeMatched => 0.2,
        }
    }
}

/// Everything the enhancer needs for one trade's signal, beyond what the
/// batch-relative normalization requires from its peers.
pub struct EnhancementInput<'a> {
    pub trade: &'a Trade,
    pub signal: &'a AlphaSignal,
    pub sqs: &'a SqsRecord,
    /// External options-market sentiment reading for this ticker, already
    /// on whatever scale the provider emits — normalized batch-relative
    /// here like every other PACS term.
    pub options_sentiment: f64,
    pub has_convergence: bool,
    pub has_burst_convergence: bool,
    /// VIX level at filing_date ± 0 trading days (spec §4.7: never a
    /// forward-looking value).
    pub vix_at_filing: f64,
    pub as_of: NaiveDate,
    pub contract_award: ContractAwardTier,
    /// Set when this trade's ticker/window combination tripped an
    /// event-study guardrail (spec §9 worked "Guardrail scenario").
    pub guardrail_triggered: bool,
}

fn hard_filter_excludes(input: &EnhancementInput) -> bool {
    input.sqs.grade == QualityGrade::Discard
        || (input.sqs.conviction > 60.0 && input.signal.signal_strength < 0.3)
        || input.signal.filing_lag_days > 60
        || input.trade.extraction_confidence < 0.7
}

fn vix_multiplier(vix: f64) -> f64 {
    if (VIX_GOLDILOCKS_LOW..=VIX_GOLDILOCKS_HIGH).contains(&vix) {
        VIX_MULTIPLIER_GOLDILOCKS
    } else if vix < VIX_GOLDILOCKS_LOW {
        VIX_MULTIPLIER_LOW
    } else {
        VIX_MULTIPLIER_HIGH
    }
}

fn amount_sweet_spot_bonus(bucket: Option<AmountBucket>) -> f64 {
    if bucket == Some(AmountBucket::Range15001To50000) {
        AMOUNT_SWEET_SPOT_BONUS
    } else {
        0.0
    }
}

fn decayed_expected_alpha(expected_alpha_20d: f64, filing_date: NaiveDate, as_of: NaiveDate) -> f64 {
    let days_elapsed = (as_of - filing_date).num_days().max(0);
    let remaining = (DECAY_HORIZON_DAYS - days_elapsed).max(0) as f64 / DECAY_HORIZON_DAYS as f64;
    expected_alpha_20d * remaining
}

/// Min-max normalize to `[0, 100]` over one batch; a zero-spread batch
/// collapses to a flat midpoint (matching `scoring_engine::pis::BatchNorm`).
struct BatchNorm {
    min: f64,
    max: f64,
}

impl BatchNorm {
    fn over(values: impl Iterator<Item = f64>) -> Self {
        let (min, max) =
            values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| (min.min(v), max.max(v)));
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

/// Apply hard filters, then PACS, VIX regime, and the additive bonuses to
/// every surviving signal in the batch. Order matches the spec: filters
/// first (exclusion is unconditional on PACS), then the composite score.
pub fn enhance_batch(inputs: &[EnhancementInput]) -> Vec<EnhancedSignal> {
    let surviving: Vec<&EnhancementInput> = inputs.iter().filter(|i| !hard_filter_excludes(i)).collect();
    if surviving.is_empty() {
        return Vec::new();
    }

    let strength_norm = BatchNorm::over(surviving.iter().map(|i| i.signal.signal_strength));
    let inverse_lag_norm =
        BatchNorm::over(surviving.iter().map(|i| 1.0 / (i.signal.filing_lag_days.max(0) as f64 + 1.0)));
    let sentiment_norm = BatchNorm::over(surviving.iter().map(|i| i.options_sentiment));

    surviving
        .into_iter()
        .map(|input| {
            let inverse_lag = 1.0 / (input.signal.filing_lag_days.max(0) as f64 + 1.0);
            let pacs = PACS_WEIGHT_SIGNAL_STRENGTH * strength_norm.normalize(input.signal.signal_strength)
                + PACS_WEIGHT_INVERSE_LAG * inverse_lag_norm.normalize(inverse_lag)
                + PACS_WEIGHT_OPTIONS_SENTIMENT * sentiment_norm.normalize(input.options_sentiment)
                + PACS_WEIGHT_CONVERGENCE * if input.has_convergence { 50.0 } else { 0.0 };

            let amount_bonus = amount_sweet_spot_bonus(input.trade.amount_bucket);
            let burst_bonus = if input.has_burst_convergence { BURST_CONVERGENCE_BONUS } else { 0.0 };
            let contract_bonus = input.contract_award.bonus();

            let vix_mult = vix_multiplier(input.vix_at_filing);
            let mut enhanced_strength = (pacs + amount_bonus + burst_bonus + contract_bonus) * vix_mult;

            let (review_required, review_reason) = if input.guardrail_triggered {
                enhanced_strength = enhanced_strength.min(1.0);
                (true, Some("guardrail_triggered".to_string()))
            } else {
                (false, None)
            };

            EnhancedSignal {
                data_hash: input.signal.data_hash.clone(),
                pacs,
                vix_multiplier: vix_mult,
                enhanced_strength,
                amount_sweet_spot_bonus: amount_bonus,
                burst_convergence_bonus: burst_bonus,
                contract_award_bonus: contract_bonus,
                decayed_expected_alpha: decayed_expected_alpha(
                    input.signal.expected_alpha_20d,
                    input.trade.filing_date,
                    input.as_of,
                ),
                review_required,
                review_reason,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use disclosure_core::{AssetType, Chamber, Direction, Owner, SourceFormat, TransactionType};

    fn trade(extraction_confidence: f64, filing_lag: i64, bucket: Option<AmountBucket>) -> Trade {
        let transaction_date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let filing_date = transaction_date + chrono::Duration::days(filing_lag);
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
            transaction_type: TransactionType::Buy,
            amount_bucket_label: "bucket".to_string(),
            amount_bucket: bucket,
            owner: Owner::Filer,
            comment: None,
            source_url: "https://example.test".to_string(),
            source_format: SourceFormat::HousePdf,
            extraction_confidence,
            created_at: chrono::Utc::now(),
        }
    }

    fn signal(filing_lag_days: i64, signal_strength: f64) -> AlphaSignal {
        AlphaSignal {
            data_hash: "h1".to_string(),
            direction: Direction::Long,
            expected_alpha_5d: 0.01,
            expected_alpha_20d: 0.02,
            confidence: 0.9,
            signal_strength,
            combined_multiplier: 2.0,
            convergence_bonus: 0.0,
            politician_grade: QualityGrade::Gold,
            filing_lag_days,
            sqs_snapshot: 70.0,
            reasoning: vec![],
        }
    }

    fn sqs(conviction: f64, grade: QualityGrade) -> SqsRecord {
        SqsRecord {
            data_hash: "h1".to_string(),
            actionability: 80.0,
            timeliness: 80.0,
            conviction,
            information_edge: 60.0,
            market_impact: 50.0,
            sqs: 70.0,
            grade,
        }
    }

    #[test]
    fn discard_grade_is_hard_filtered() {
        let trade = trade(0.9, 5, None);
        let signal = signal(5, 0.5);
        let sqs = sqs(50.0, QualityGrade::Discard);
        let input = EnhancementInput {
            trade: &trade,
            signal: &signal,
            sqs: &sqs,
            options_sentiment: 0.5,
            has_convergence: false,
            has_burst_convergence: false,
            vix_at_filing: 15.0,
            as_of: trade.filing_date,
            contract_award: ContractAwardTier::None,
            guardrail_triggered: false,
        };
        assert!(enhance_batch(&[input]).is_empty());
    }

    #[test]
    fn low_extraction_confidence_is_hard_filtered() {
        let trade = trade(0.5, 5, None);
        let signal = signal(5, 0.5);
        let sqs = sqs(50.0, QualityGrade::Gold);
        let input = EnhancementInput {
            trade: &trade,
            signal: &signal,
            sqs: &sqs,
            options_sentiment: 0.5,
            has_convergence: false,
            has_burst_convergence: false,
            vix_at_filing: 15.0,
            as_of: trade.filing_date,
            contract_award: ContractAwardTier::None,
            guardrail_triggered: false,
        };
        assert!(enhance_batch(&[input]).is_empty());
    }

    #[test]
    fn goldilocks_vix_boosts_enhanced_strength() {
        let trade = trade(0.9, 5, Some(AmountBucket::Range15001To50000));
        let signal = signal(5, 0.8);
        let sqs = sqs(50.0, QualityGrade::Gold);
        let calm = EnhancementInput {
            trade: &trade,
            signal: &signal,
            sqs: &sqs,
            options_sentiment: 0.5,
            has_convergence: true,
            has_burst_convergence: false,
            vix_at_filing: 15.0,
            as_of: trade.filing_date,
            contract_award: ContractAwardTier::None,
            guardrail_triggered: false,
        };
        let low_vix = EnhancementInput { vix_at_filing: 10.0, ..calm_input(&trade, &signal, &sqs) };
        let enhanced_goldilocks = enhance_batch(&[calm]);
        let enhanced_low = enhance_batch(&[low_vix]);
        assert!(enhanced_goldilocks[0].enhanced_strength > enhanced_low[0].enhanced_strength);
    }

    fn calm_input<'a>(trade: &'a Trade, signal: &'a AlphaSignal, sqs: &'a SqsRecord) -> EnhancementInput<'a> {
        EnhancementInput {
            trade,
            signal,
            sqs,
            options_sentiment: 0.5,
            has_convergence: true,
            has_burst_convergence: false,
            vix_at_filing: 15.0,
            as_of: trade.filing_date,
            contract_award: ContractAwardTier::None,
            guardrail_triggered: false,
        }
    }

    #[test]
    fn guardrail_trigger_caps_strength_and_flags_review() {
        let trade = trade(0.9, 5, Some(AmountBucket::Range15001To50000));
        let signal = signal(5, 0.9);
        let sqs = sqs(50.0, QualityGrade::Platinum);
        let input = EnhancementInput { guardrail_triggered: true, ..calm_input(&trade, &signal, &sqs) };
        let enhanced = enhance_batch(&[input]);
        assert!(enhanced[0].review_required);
        assert_eq!(enhanced[0].review_reason.as_deref(), Some("guardrail_triggered"));
        assert!(enhanced[0].enhanced_strength <= 1.0);
    }

    #[test]
    fn alpha_fully_decays_at_twenty_days() {
        let trade = trade(0.9, 5, None);
        let as_of = trade.filing_date + chrono::Duration::days(20);
        let decayed = decayed_expected_alpha(0.02, trade.filing_date, as_of);
        assert!(decayed.abs() < 1e-9);
    }
}
