pub(crate) const CREATE_TRADES: &str = "CREATE TABLE IF NOT EXISTS trades (
    data_hash TEXT PRIMARY KEY,
    chamber TEXT NOT NULL,
    politician_name TEXT NOT NULL,
    surface_name TEXT NOT NULL,
    transaction_date TEXT NOT NULL,
    filing_date TEXT NOT NULL,
    ticker TEXT,
    asset_name TEXT NOT NULL,
    asset_type TEXT NOT NULL,
    transaction_type TEXT NOT NULL,
    amount_bucket_label TEXT NOT NULL,
    amount_bucket TEXT,
    owner TEXT NOT NULL,
    comment TEXT,
    source_url TEXT NOT NULL,
    source_format TEXT NOT NULL,
    extraction_confidence REAL NOT NULL,
    manual_review INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)";

pub(crate) const CREATE_EXTRACTION_LOGS: &str = "CREATE TABLE IF NOT EXISTS extraction_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_identifier TEXT NOT NULL,
    raw_record_count INTEGER NOT NULL,
    extracted_count INTEGER NOT NULL,
    duplicate_count INTEGER NOT NULL,
    confidence REAL NOT NULL,
    status TEXT NOT NULL,
    error_message TEXT,
    timestamp TEXT NOT NULL
)";

pub(crate) const CREATE_SQS_RECORDS: &str = "CREATE TABLE IF NOT EXISTS sqs_records (
    data_hash TEXT PRIMARY KEY REFERENCES trades(data_hash),
    actionability REAL NOT NULL,
    timeliness REAL NOT NULL,
    conviction REAL NOT NULL,
    information_edge REAL NOT NULL,
    market_impact REAL NOT NULL,
    sqs REAL NOT NULL,
    grade TEXT NOT NULL
)";

pub(crate) const CREATE_CONVERGENCE_EVENTS: &str = "CREATE TABLE IF NOT EXISTS convergence_events (
    ticker TEXT NOT NULL,
    direction TEXT NOT NULL,
    window_start TEXT NOT NULL,
    window_end TEXT NOT NULL,
    span_days INTEGER NOT NULL,
    participants_json TEXT NOT NULL,
    score REAL NOT NULL,
    breakdown_json TEXT NOT NULL,
    trade_hashes_json TEXT NOT NULL,
    PRIMARY KEY (ticker, direction, window_start)
)";

pub(crate) const CREATE_ALPHA_SIGNALS: &str = "CREATE TABLE IF NOT EXISTS alpha_signals (
    data_hash TEXT PRIMARY KEY REFERENCES trades(data_hash),
    direction TEXT NOT NULL,
    expected_alpha_5d REAL NOT NULL,
    expected_alpha_20d REAL NOT NULL,
    confidence REAL NOT NULL,
    signal_strength REAL NOT NULL,
    combined_multiplier REAL NOT NULL,
    convergence_bonus REAL NOT NULL,
    politician_grade TEXT NOT NULL,
    filing_lag_days INTEGER NOT NULL,
    sqs_snapshot REAL NOT NULL,
    reasoning_json TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

pub(crate) const CREATE_ENHANCED_SIGNALS: &str = "CREATE TABLE IF NOT EXISTS enhanced_signals (
    data_hash TEXT PRIMARY KEY REFERENCES alpha_signals(data_hash),
    pacs REAL NOT NULL,
    vix_multiplier REAL NOT NULL,
    enhanced_strength REAL NOT NULL,
    amount_sweet_spot_bonus REAL NOT NULL,
    burst_convergence_bonus REAL NOT NULL,
    contract_award_bonus REAL NOT NULL,
    decayed_expected_alpha REAL NOT NULL,
    review_required INTEGER NOT NULL,
    review_reason TEXT
)";

pub(crate) const ALL: &[&str] = &[
    CREATE_TRADES,
    CREATE_EXTRACTION_LOGS,
    CREATE_SQS_RECORDS,
    CREATE_CONVERGENCE_EVENTS,
    CREATE_ALPHA_SIGNALS,
    CREATE_ENHANCED_SIGNALS,
];
