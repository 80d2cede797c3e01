use thiserror::Error;

/// Root of the four-level error hierarchy (spec §7). Every subsystem-specific
/// error converts into this at the orchestrator boundary.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
    #[error("store error: {0}")]
    Store(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("rate limited: {0}")]
    RateLimit(String),
    #[error("blocked by bot detection: {0}")]
    Blocked(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("json parse failed: {0}")]
    JsonParse(String),
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),
    #[error("retry budget exhausted after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },
    #[error("llm call timed out")]
    LlmTimeout,
}

/// `ConfidenceRejected` and `NameUnresolvable` are routine (logged, not
/// re-raised past the Loader). `StoreWriteFailed` is fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("confidence rejected: batch confidence {0} < 0.5")]
    ConfidenceRejected(f64),
    #[error("name unresolvable: {0}")]
    NameUnresolvable(String),
    #[error("store write failed: {0}")]
    StoreWriteFailed(String),
}

/// `InsufficientHistory` and `PriceGap` are routine exclusions.
/// `GuardrailTriggered` is never auto-recovered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("insufficient estimation history: {0} observations, need >= 200")]
    InsufficientHistory(usize),
    #[error("price gap exceeds interpolation window: {0}")]
    PriceGap(String),
    #[error("guardrail triggered: {0}")]
    GuardrailTriggered(String),
}
