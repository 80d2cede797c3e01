//! Daily close-price series and return computation (spec §4.8). A
//! `PriceSeries` holds only the trading days a provider actually returned —
//! there is no trading-calendar model here, matching the teacher's
//! `HistoricalBar` sequences in `backtest_engine`, which are likewise plain
//! ordered bar lists rather than calendar-aware.

use chrono::NaiveDate;
use disclosure_core::BacktestError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Calendar-day gaps up to this width are ordinary weekend/holiday closures
/// and never interpolated.
const NORMAL_GAP_DAYS: i64 = 4;
/// A gap one day wider than normal (one missing trading day) is interpolated
/// via previous-close (spec §4.8). Anything wider is a genuine data gap.
const INTERPOLATED_GAP_DAYS: i64 = 5;

#[derive(Debug, Clone, Copy)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Ascending-by-date close-price series for one ticker.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Index of the first bar strictly after `date` — spec's "filing_date+1,
    /// next trading day" anchor.
    pub fn index_after(&self, date: NaiveDate) -> Option<usize> {
        self.bars.iter().position(|b| b.date > date)
    }

    /// Simple daily returns for `count` consecutive trading days starting at
    /// `from_idx`, using the close immediately preceding `from_idx` as the
    /// base price. A one-day-wider-than-normal calendar gap between two
    /// consecutive bars is bridged with a synthetic zero return (previous
    /// close carried forward); a wider gap is `Err(PriceGap)`.
    pub fn returns(&self, from_idx: usize, count: usize) -> Result<Vec<f64>, BacktestError> {
        if from_idx == 0 || from_idx + count > self.bars.len() {
            return Err(BacktestError::PriceGap(format!(
                "requested window [{from_idx}, {from_idx}+{count}) exceeds series length {}",
                self.bars.len()
            )));
        }

        let mut out = Vec::with_capacity(count);
        let mut prev = self.bars[from_idx - 1];
        for bar in &self.bars[from_idx..from_idx + count] {
            let gap = (bar.date - prev.date).num_days();
            if gap > INTERPOLATED_GAP_DAYS {
                return Err(BacktestError::PriceGap(format!(
                    "{gap}-day gap between {} and {}",
                    prev.date, bar.date
                )));
            }
            if gap > NORMAL_GAP_DAYS {
                out.push(0.0);
            }
            let prev_close = prev.close.to_f64().unwrap_or(0.0);
            let close = bar.close.to_f64().unwrap_or(0.0);
            let ret = if prev_close.abs() > f64::EPSILON { (close - prev_close) / prev_close } else { 0.0 };
            out.push(ret);
            prev = *bar;
        }
        Ok(out)
    }

    /// `count` returns ending immediately before `anchor_idx` (the
    /// estimation window, spec §4.8: `[-250, -10]` trading days).
    pub fn returns_before(&self, anchor_idx: usize, offset_start: usize, offset_end: usize) -> Result<Vec<f64>, BacktestError> {
        if anchor_idx < offset_start {
            return Err(BacktestError::InsufficientHistory(anchor_idx));
        }
        let window_start = anchor_idx - offset_start;
        let window_len = offset_start - offset_end;
        self.returns(window_start, window_len)
    }

    /// Same as [`Self::returns`], but paired with the calendar date each
    /// return is attributed to — the real bar date, or for a synthetic
    /// interpolated day, a placeholder one `NORMAL_GAP_DAYS` after the prior
    /// bar (never a real trading day, so factor-data lookups for it
    /// naturally come back empty).
    pub fn returns_with_dates(&self, from_idx: usize, count: usize) -> Result<Vec<(NaiveDate, f64)>, BacktestError> {
        if from_idx == 0 || from_idx + count > self.bars.len() {
            return Err(BacktestError::PriceGap(format!(
                "requested window [{from_idx}, {from_idx}+{count}) exceeds series length {}",
                self.bars.len()
            )));
        }

        let mut out = Vec::with_capacity(count);
        let mut prev = self.bars[from_idx - 1];
        for bar in &self.bars[from_idx..from_idx + count] {
            let gap = (bar.date - prev.date).num_days();
            if gap > INTERPOLATED_GAP_DAYS {
                return Err(BacktestError::PriceGap(format!(
                    "{gap}-day gap between {} and {}",
                    prev.date, bar.date
                )));
            }
            if gap > NORMAL_GAP_DAYS {
                out.push((prev.date + chrono::Duration::days(NORMAL_GAP_DAYS), 0.0));
            }
            let prev_close = prev.close.to_f64().unwrap_or(0.0);
            let close = bar.close.to_f64().unwrap_or(0.0);
            let ret = if prev_close.abs() > f64::EPSILON { (close - prev_close) / prev_close } else { 0.0 };
            out.push((bar.date, ret));
            prev = *bar;
        }
        Ok(out)
    }

    pub fn returns_before_with_dates(
        &self,
        anchor_idx: usize,
        offset_start: usize,
        offset_end: usize,
    ) -> Result<Vec<(NaiveDate, f64)>, BacktestError> {
        if anchor_idx < offset_start {
            return Err(BacktestError::InsufficientHistory(anchor_idx));
        }
        let window_start = anchor_idx - offset_start;
        let window_len = offset_start - offset_end;
        self.returns_with_dates(window_start, window_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: i32, m: u32, d: u32, close: i64) -> PriceBar {
        PriceBar { date: NaiveDate::from_ymd_opt(y, m, d).unwrap(), close: Decimal::new(close, 0) }
    }

    #[test]
    fn simple_returns_are_close_over_close_minus_one() {
        let series = PriceSeries::new(vec![bar(2026, 1, 1, 100), bar(2026, 1, 2, 110), bar(2026, 1, 3, 99)]);
        let returns = series.returns(1, 2).unwrap();
        assert!((returns[0] - 0.10).abs() < 1e-9);
        assert!((returns[1] - (-0.10)).abs() < 1e-9);
    }

    #[test]
    fn weekend_gap_is_not_treated_as_missing_data() {
        let series = PriceSeries::new(vec![
            bar(2026, 1, 2, 100), // Friday
            bar(2026, 1, 5, 105), // Monday, 3-day calendar gap
        ]);
        let returns = series.returns(1, 1).unwrap();
        assert!((returns[0] - 0.05).abs() < 1e-9);
    }

    #[test]
    fn one_extra_missing_day_is_interpolated_not_excluded() {
        let series = PriceSeries::new(vec![
            bar(2026, 1, 1, 100),
            bar(2026, 1, 6, 110), // 5-day gap: one day beyond a normal weekend
        ]);
        let result = series.returns(1, 1);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 2); // synthetic zero day + real return
    }

    #[test]
    fn wide_gap_is_excluded_as_price_gap() {
        let series = PriceSeries::new(vec![bar(2026, 1, 1, 100), bar(2026, 1, 20, 110)]);
        let result = series.returns(1, 1);
        assert!(matches!(result, Err(BacktestError::PriceGap(_))));
    }
}
