//! Three-factor (Mkt-RF, SMB, HML) OLS abnormal-return model (spec §4.8),
//! generalizing the teacher's single-factor CAPM estimator in
//! `backtest_engine::factor_attribution::compute_factor_attribution` from
//! one regressor to three via `nalgebra` least squares.

use disclosure_core::BacktestError;
use nalgebra::{DMatrix, DVector};

/// Minimum estimation-window observations (spec §4.8).
pub const MIN_ESTIMATION_OBSERVATIONS: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct FactorObservation {
    pub mkt_rf: f64,
    pub smb: f64,
    pub hml: f64,
}

pub trait FactorDataProvider {
    fn factor_returns(&self, date: chrono::NaiveDate) -> Option<FactorObservation>;
}

#[derive(Debug, Clone, Copy)]
pub struct FactorLoadings {
    pub alpha: f64,
    pub beta_mkt: f64,
    pub beta_smb: f64,
    pub beta_hml: f64,
    pub r_squared: f64,
}

/// Market-adjusted CAR (spec §4.8): sum of (ticker return - benchmark
/// return) over the event window.
pub fn market_adjusted_car(ticker_returns: &[f64], benchmark_returns: &[f64]) -> f64 {
    ticker_returns.iter().zip(benchmark_returns).map(|(t, b)| t - b).sum()
}

/// Fit alpha/beta_mkt/beta_smb/beta_hml via OLS on the estimation window.
pub fn fit_three_factor(
    returns: &[f64],
    factors: &[FactorObservation],
) -> Result<FactorLoadings, BacktestError> {
    let n = returns.len().min(factors.len());
    if n < MIN_ESTIMATION_OBSERVATIONS {
        return Err(BacktestError::InsufficientHistory(n));
    }
    let returns = &returns[..n];
    let factors = &factors[..n];

    let x = DMatrix::from_fn(n, 4, |r, c| match c {
        0 => 1.0,
        1 => factors[r].mkt_rf,
        2 => factors[r].smb,
        _ => factors[r].hml,
    });
    let y = DVector::from_iterator(n, returns.iter().copied());

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &y;
    let xtx_inv = xtx
        .try_inverse()
        .ok_or_else(|| BacktestError::GuardrailTriggered("singular factor design matrix".to_string()))?;
    let coeffs = xtx_inv * xty;

    let alpha = coeffs[0];
    let beta_mkt = coeffs[1];
    let beta_smb = coeffs[2];
    let beta_hml = coeffs[3];

    let predicted: Vec<f64> = (0..n)
        .map(|i| alpha + beta_mkt * factors[i].mkt_rf + beta_smb * factors[i].smb + beta_hml * factors[i].hml)
        .collect();
    let mean_r = returns.iter().sum::<f64>() / n as f64;
    let ss_res: f64 = returns.iter().zip(&predicted).map(|(r, p)| (r - p).powi(2)).sum();
    let ss_tot: f64 = returns.iter().map(|r| (r - mean_r).powi(2)).sum();
    let r_squared = if ss_tot > 1e-15 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(FactorLoadings { alpha, beta_mkt, beta_smb, beta_hml, r_squared })
}

/// Three-factor-adjusted CAR: sum of residuals (actual - model-expected
/// return) over the event window, using loadings fit on the estimation
/// window (spec §4.8).
pub fn three_factor_car(loadings: &FactorLoadings, event_returns: &[f64], event_factors: &[FactorObservation]) -> f64 {
    event_returns
        .iter()
        .zip(event_factors)
        .map(|(r, f)| {
            let expected =
                loadings.alpha + loadings.beta_mkt * f.mkt_rf + loadings.beta_smb * f.smb + loadings.beta_hml * f.hml;
            r - expected
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_factors(n: usize) -> Vec<FactorObservation> {
        (0..n)
            .map(|i| FactorObservation {
                mkt_rf: 0.001 * ((i % 7) as f64 - 3.0),
                smb: 0.0005 * ((i % 5) as f64 - 2.0),
                hml: 0.0003 * ((i % 3) as f64 - 1.0),
            })
            .collect()
    }

    #[test]
    fn fewer_than_minimum_observations_is_insufficient_history() {
        let factors = synthetic_factors(50);
        let returns = vec![0.001; 50];
        let err = fit_three_factor(&returns, &factors).unwrap_err();
        assert!(matches!(err, BacktestError::InsufficientHistory(50)));
    }

    #[test]
    fn recovers_known_loadings_from_noise_free_data() {
        let factors = synthetic_factors(240);
        let alpha = 0.0002;
        let (beta_mkt, beta_smb, beta_hml) = (1.1, 0.3, -0.2);
        let returns: Vec<f64> =
            factors.iter().map(|f| alpha + beta_mkt * f.mkt_rf + beta_smb * f.smb + beta_hml * f.hml).collect();

        let loadings = fit_three_factor(&returns, &factors).unwrap();
        assert!((loadings.alpha - alpha).abs() < 1e-6);
        assert!((loadings.beta_mkt - beta_mkt).abs() < 1e-6);
        assert!((loadings.r_squared - 1.0).abs() < 1e-6);
    }

    #[test]
    fn market_adjusted_car_is_sum_of_differences() {
        let ticker = vec![0.02, -0.01, 0.015];
        let benchmark = vec![0.01, 0.0, 0.01];
        let car = market_adjusted_car(&ticker, &benchmark);
        assert!((car - (0.01 - 0.01 + 0.005)).abs() < 1e-9);
    }
}
