//! The multiplier ladder (spec §4.7): one named module holding every
//! calibrated constant the signal generator multiplies together, so the
//! whole table is reviewed as a unit when the backtest literature moves.
//!
//! Multipliers are relative to a $1,001-$15,000 / House / Bronze / >=15-day
//! baseline, matching the spec's worked examples (`$15K-$50K -> 1.93x`,
//! `filing_lag < 15d -> 4.6x`).

use disclosure_core::{AmountBucket, Chamber, QualityGrade};

pub fn chamber_multiplier(chamber: Chamber) -> f64 {
    match chamber {
        Chamber::Senate => 1.15,
        Chamber::House => 1.0,
    }
}

pub fn amount_multiplier(bucket: Option<AmountBucket>) -> f64 {
    match bucket {
        Some(AmountBucket::Under1001) => 0.8,
        Some(AmountBucket::Range1001To15000) => 1.0,
        Some(AmountBucket::Range15001To50000) => 1.93,
        Some(AmountBucket::Range50001To100000) => 2.5,
        Some(AmountBucket::Range100001To250000) => 3.1,
        Some(AmountBucket::Range250001To500000) => 3.6,
        Some(AmountBucket::Range500001To1000000) => 4.0,
        Some(AmountBucket::Range1000001To5000000) => 4.4,
        Some(AmountBucket::Over5000000) => 4.8,
        None => 1.0,
    }
}

/// `filing_lag = 15` exactly is the *slower* band (strict-less-than, spec
/// §9 edge case).
pub fn filing_lag_multiplier(filing_lag_days: i64) -> f64 {
    if filing_lag_days < 15 {
        4.6
    } else {
        1.0
    }
}

pub fn politician_grade_multiplier(grade: QualityGrade) -> f64 {
    match grade {
        QualityGrade::Platinum => 2.0,
        QualityGrade::Gold => 1.5,
        QualityGrade::Silver => 1.1,
        QualityGrade::Bronze => 1.0,
        QualityGrade::Discard => 0.3,
    }
}

/// Baseline expected-alpha constants for a Buy-derived LONG signal (spec
/// §4.7, §9). Sale-derived contrarian values are calibrated separately.
pub const BUY_LONG_ALPHA_5D: f64 = 0.0077;
pub const BUY_LONG_ALPHA_20D: f64 = 0.0079;
pub const SALE_CONTRARIAN_ALPHA_5D: f64 = 0.0051;
pub const SALE_CONTRARIAN_ALPHA_20D: f64 = 0.0068;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filing_lag_of_exactly_fifteen_is_the_slower_band() {
        assert_eq!(filing_lag_multiplier(15), 1.0);
        assert_eq!(filing_lag_multiplier(14), 4.6);
    }

    #[test]
    fn amount_multiplier_matches_worked_example() {
        assert_eq!(amount_multiplier(Some(AmountBucket::Range15001To50000)), 1.93);
    }
}
