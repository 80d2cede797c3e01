//! L5: the event-study backtester (spec §4.8). Computes market-adjusted and
//! three-factor-adjusted cumulative abnormal returns for a trade's ticker
//! around its filing date, and evaluates the anti-look-ahead-bias
//! guardrails across a corpus of results.
//!
//! Pure computation over price series supplied by the caller — no I/O, no
//! Store access, mirroring `scoring_engine`'s shape. The CLI's `backtest`
//! stage owns fetching historical bars and factor data and persisting
//! results.

pub mod engine;
pub mod factor_model;
pub mod guardrails;
pub mod price_series;

pub use engine::{evaluate_corpus_guardrails, run_event_study, CarEstimate, EventStudyResult, EVENT_WINDOWS};
pub use factor_model::{FactorDataProvider, FactorLoadings, FactorObservation};
pub use guardrails::GuardrailViolation;
pub use price_series::{PriceBar, PriceSeries};
