//! Anti-look-ahead-bias guardrails (spec §4.8, §9 worked "Guardrail
//! scenario"). Any violation marks the result `review_required` and
//! suppresses it from downstream signal enhancement (spec §4.7's
//! `guardrail=alpha_exceeded` handling caps `enhanced_strength` at 1.0).
//! `FactorFitSuspect` is a data-quality check on the three-factor fit
//! itself rather than on the CAR sample, so it's evaluated separately via
//! [`evaluate_factor_fit`] instead of folded into [`evaluate`].
//!
//! The p-value test follows the teacher's `backtest_engine::statistical`
//! approach of building a normal/t distribution via `statrs` rather than
//! hand-rolling the CDF; see `sharpe_p_value`/`normal_cdf` there.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// `CAR_20d` absolute value above this is an alpha-exceeded red flag.
pub const CAR_20D_THRESHOLD: f64 = 0.05;
/// Empirical hit rate above this is implausibly high for a real edge.
pub const HIT_RATE_THRESHOLD: f64 = 0.75;
/// Below this many events, the sample is too small to trust.
pub const MIN_SAMPLE_SIZE: usize = 30;
/// A Welch t-test p-value at or above this fails to reject the null that
/// mean CAR is zero.
pub const P_VALUE_THRESHOLD: f64 = 0.05;
/// Three-factor fit R² above this is a data-quality red flag rather than a
/// sign of genuine explanatory power — this sample size has no business
/// fitting this cleanly.
pub const R_SQUARED_THRESHOLD: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailViolation {
    AlphaExceeded,
    HitRateImplausible,
    SampleTooSmall,
    NotSignificant,
    FactorFitSuspect,
}

impl GuardrailViolation {
    pub fn reason(&self) -> &'static str {
        match self {
            GuardrailViolation::AlphaExceeded => "alpha_exceeded",
            GuardrailViolation::HitRateImplausible => "hit_rate_implausible",
            GuardrailViolation::SampleTooSmall => "sample_too_small",
            GuardrailViolation::NotSignificant => "not_significant",
            GuardrailViolation::FactorFitSuspect => "factor_fit_suspect",
        }
    }
}

/// Two-tailed p-value for the null hypothesis that the population mean of
/// `car_20d_samples` is zero, via a one-sample t-test (Welch's test against
/// a fixed zero degenerates to the one-sample form).
pub fn welch_p_value_against_zero(car_20d_samples: &[f64]) -> f64 {
    let n = car_20d_samples.len();
    if n < 2 {
        return 1.0;
    }
    let mean = car_20d_samples.iter().sum::<f64>() / n as f64;
    let variance =
        car_20d_samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    if variance <= 0.0 {
        return if mean.abs() < f64::EPSILON { 1.0 } else { 0.0 };
    }
    let se = (variance / n as f64).sqrt();
    let t_stat = mean / se;
    let dof = (n - 1) as f64;
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t_stat.abs())),
        Err(_) => 1.0,
    }
}

/// Evaluate all four guardrails against one event-study result's sample.
/// `car_20d_mean` is the mean 20-day CAR across the sample, `hit_rate` the
/// fraction of events with positive CAR, `car_20d_samples` the per-event
/// CAR_20d values used for the significance test.
pub fn evaluate(car_20d_mean: f64, hit_rate: f64, car_20d_samples: &[f64]) -> Vec<GuardrailViolation> {
    let mut violations = Vec::new();
    if car_20d_mean.abs() > CAR_20D_THRESHOLD {
        violations.push(GuardrailViolation::AlphaExceeded);
    }
    if hit_rate > HIT_RATE_THRESHOLD {
        violations.push(GuardrailViolation::HitRateImplausible);
    }
    if car_20d_samples.len() < MIN_SAMPLE_SIZE {
        violations.push(GuardrailViolation::SampleTooSmall);
    }
    let p_value = welch_p_value_against_zero(car_20d_samples);
    if p_value >= P_VALUE_THRESHOLD {
        violations.push(GuardrailViolation::NotSignificant);
    }
    violations
}

/// Flag a three-factor fit whose R² is implausibly high for this sample
/// size (spec §4.8: "higher is a data-quality red flag").
pub fn evaluate_factor_fit(r_squared: f64) -> Option<GuardrailViolation> {
    if r_squared > R_SQUARED_THRESHOLD {
        Some(GuardrailViolation::FactorFitSuspect)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_exceeded_scenario_from_worked_example_is_flagged() {
        let violations = evaluate(0.063, 0.5, &vec![0.063; 40]);
        assert!(violations.contains(&GuardrailViolation::AlphaExceeded));
    }

    #[test]
    fn small_sample_is_flagged_regardless_of_other_metrics() {
        let violations = evaluate(0.01, 0.5, &vec![0.01; 10]);
        assert!(violations.contains(&GuardrailViolation::SampleTooSmall));
    }

    #[test]
    fn clean_sample_passes_all_guardrails() {
        let mut samples: Vec<f64> = vec![0.021; 45];
        samples.extend(vec![-0.01; 15]);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let hit_rate = samples.iter().filter(|x| **x > 0.0).count() as f64 / samples.len() as f64;
        let violations = evaluate(mean, hit_rate, &samples);
        assert!(violations.is_empty(), "expected no violations, got {violations:?}");
    }

    #[test]
    fn noisy_near_zero_mean_is_flagged_not_significant() {
        let samples: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 0.001 } else { -0.0009 }).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let violations = evaluate(mean, 0.5, &samples);
        assert!(violations.contains(&GuardrailViolation::NotSignificant));
    }

    #[test]
    fn suspiciously_clean_factor_fit_is_flagged() {
        assert_eq!(evaluate_factor_fit(0.97), Some(GuardrailViolation::FactorFitSuspect));
    }

    #[test]
    fn ordinary_factor_fit_passes() {
        assert_eq!(evaluate_factor_fit(0.4), None);
    }
}
