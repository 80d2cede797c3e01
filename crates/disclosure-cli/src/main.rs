//! `disclosure` — the command-line entry point wiring L1 through L6
//! together (spec §3). Subcommands mirror the pipeline stages: `etl` runs
//! fetch -> transform -> load, `score` runs scoring -> convergence -> PIS
//! -> signal generation -> enhancement, `backtest` runs the event-study
//! backtester over canonical trades.
//!
//! Argument parsing is hand-rolled against `std::env::args()`, matching the
//! teacher's `data-loader` binary rather than pulling in a parser crate for
//! three subcommands.

use chrono::NaiveDate;
use disclosure_core::BacktestError;
use disclosure_extractor::{HttpLlmConfig, HttpLlmProvider};
use disclosure_loader::ticker_normalization::NoopExternalLookup;
use disclosure_orchestrator::Orchestrator;
use disclosure_store::Store;
use event_study::{engine, FactorDataProvider, FactorObservation, PriceBar, PriceSeries};
use fetcher_core::Fetcher;
use std::process::ExitCode;

const DEFAULT_DB_PATH: &str = "disclosure.db";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "disclosure_cli=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let subcommand = args.get(1).map(String::as_str);

    let result = match subcommand {
        Some("etl") => run_etl(&args[2..]).await,
        Some("score") => run_score(&args[2..]).await,
        Some("backtest") => run_backtest(&args[2..]).await,
        _ => {
            print_usage();
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  disclosure etl --since YYYY-MM-DD --until YYYY-MM-DD [--db PATH]");
    eprintln!("  disclosure score [--db PATH]");
    eprintln!("  disclosure backtest [--db PATH]");
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter().position(|a| a == name).and_then(|i| args.get(i + 1)).map(String::as_str)
}

fn db_path(args: &[String]) -> String {
    flag_value(args, "--db").unwrap_or(DEFAULT_DB_PATH).to_string()
}

/// L1-L4: fetch, transform, load for both chambers over `[since, until]`.
async fn run_etl(args: &[String]) -> anyhow::Result<()> {
    let since: NaiveDate = flag_value(args, "--since")
        .ok_or_else(|| anyhow::anyhow!("--since YYYY-MM-DD is required"))?
        .parse()?;
    let until: NaiveDate = flag_value(args, "--until")
        .ok_or_else(|| anyhow::anyhow!("--until YYYY-MM-DD is required"))?
        .parse()?;

    let store = Store::connect(&format!("sqlite:{}?mode=rwc", db_path(args))).await?;
    let provider = HttpLlmProvider::new(HttpLlmConfig::from_env());

    let senate_webdriver_url =
        std::env::var("SENATE_WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:9515".to_string());
    let senate_chain: Vec<Box<dyn Fetcher>> = vec![
        Box::new(senate_fetcher::SenateFetcher::new(senate_webdriver_url)),
        Box::new(capitoltrades_fetcher::CapitolTradesFetcher::new()),
    ];
    let house_chain: Vec<Box<dyn Fetcher>> = vec![
        Box::new(house_fetcher::HouseFetcher::new()),
        Box::new(capitoltrades_fetcher::CapitolTradesFetcher::new()),
    ];

    let orchestrator = Orchestrator::new(&store, &provider, &NoopExternalLookup, senate_chain, house_chain);
    let report = orchestrator.run(since, until).await;

    tracing::info!(
        senate_trades = report.senate.trades_inserted,
        house_trades = report.house.trades_inserted,
        senate_fallback_chain = ?report.senate.attempted,
        house_fallback_chain = ?report.house.attempted,
        "etl run complete"
    );

    if !report.is_successful() {
        anyhow::bail!("run failed: not every chamber produced at least one trade after fallbacks");
    }
    Ok(())
}

/// L5-L6: score every canonical trade, detect convergence, rank
/// politicians, generate signals, and enhance them.
async fn run_score(args: &[String]) -> anyhow::Result<()> {
    let store = Store::connect(&format!("sqlite:{}?mode=rwc", db_path(args))).await?;
    let trades = store.trade_reader().canonical_trades().await?;
    tracing::info!(trade_count = trades.len(), "scoring canonical trades");

    let sqs_by_hash = scoring_engine::score_batch(&trades);
    let sqs_writer = store.sqs_writer();
    for record in sqs_by_hash.values() {
        sqs_writer.upsert(record).await?;
    }

    let corpus_counts = scoring_engine::corpus_trade_counts(&trades);
    let convergence_events = scoring_engine::detect_convergence(&trades, &corpus_counts);
    let convergence_writer = store.convergence_writer();
    for event in &convergence_events {
        convergence_writer.upsert(event).await?;
    }

    let rankings = scoring_engine::rank_politicians(&trades, &sqs_by_hash);
    tracing::info!(politician_count = rankings.len(), "politician rankings computed");

    let converged_hashes: std::collections::HashSet<&str> =
        convergence_events.iter().flat_map(|e| e.trade_hashes.iter().map(String::as_str)).collect();

    let signal_config = signal_engine::SignalConfig::default();
    let alpha_writer = store.alpha_signal_writer();
    let mut signals = Vec::with_capacity(trades.len());
    for trade in &trades {
        let Some(sqs) = sqs_by_hash.get(&trade.data_hash) else { continue };
        let convergence_bonus = if converged_hashes.contains(trade.data_hash.as_str()) { 1.0 } else { 0.0 };
        if let Some(signal) = signal_engine::generate(trade, sqs, convergence_bonus, &signal_config) {
            alpha_writer.upsert(&signal).await?;
            signals.push(signal);
        }
    }

    let enhanced_writer = store.enhanced_signal_writer();
    let today = chrono::Utc::now().date_naive();
    let signals_by_hash: std::collections::HashMap<&str, &disclosure_core::AlphaSignal> =
        signals.iter().map(|s| (s.data_hash.as_str(), s)).collect();
    let inputs: Vec<signal_engine::EnhancementInput> = trades
        .iter()
        .filter_map(|trade| {
            let signal = signals_by_hash.get(trade.data_hash.as_str())?;
            let sqs = sqs_by_hash.get(&trade.data_hash)?;
            Some(signal_engine::EnhancementInput {
                trade,
                signal,
                sqs,
                options_sentiment: 0.5,
                has_convergence: converged_hashes.contains(trade.data_hash.as_str()),
                has_burst_convergence: false,
                vix_at_filing: 15.0,
                as_of: today,
                contract_award: signal_engine::enhancer::ContractAwardTier::None,
                guardrail_triggered: false,
            })
        })
        .collect();

    let enhanced = signal_engine::enhance_batch(&inputs);
    for enhanced_signal in &enhanced {
        enhanced_writer.upsert(enhanced_signal).await?;
    }

    tracing::info!(
        sqs_count = sqs_by_hash.len(),
        convergence_count = convergence_events.len(),
        signal_count = signals.len(),
        enhanced_count = enhanced.len(),
        "scoring complete"
    );
    Ok(())
}

/// L5 (event-study): CAR + guardrails over every canonical trade with a
/// resolved ticker, against the SPY benchmark.
async fn run_backtest(args: &[String]) -> anyhow::Result<()> {
    let store = Store::connect(&format!("sqlite:{}?mode=rwc", db_path(args))).await?;
    let trades = store.trade_reader().canonical_trades().await?;

    let api_key = std::env::var("POLYGON_API_KEY").unwrap_or_default();
    let polygon = polygon_client::PolygonClient::new(api_key);
    let now = chrono::Utc::now();
    let lookback_start = now - chrono::Duration::days(500);

    let benchmark_bars = polygon.get_aggregates("SPY", 1, "day", lookback_start, now).await?;
    let benchmark_series = to_price_series(&benchmark_bars);

    let mut results = Vec::new();
    for trade in trades.iter().filter(|t| t.ticker.is_some()) {
        let ticker = trade.ticker.as_deref().expect("filtered above");
        let bars = match polygon.get_aggregates(ticker, 1, "day", lookback_start, now).await {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!(ticker, error = %e, "price fetch failed, skipping");
                continue;
            }
        };
        let ticker_series = to_price_series(&bars);

        match engine::run_event_study(ticker, trade.filing_date, &ticker_series, &benchmark_series, &NoFactorData) {
            Ok(result) => results.push(result),
            Err(BacktestError::InsufficientHistory(n)) => {
                tracing::info!(ticker, n, "excluded: insufficient_history");
            }
            Err(BacktestError::PriceGap(reason)) => {
                tracing::info!(ticker, reason, "excluded: price_gap");
            }
            Err(BacktestError::GuardrailTriggered(reason)) => {
                tracing::warn!(ticker, reason, "guardrail triggered during estimation");
            }
        }
    }

    let violations = engine::evaluate_corpus_guardrails(&results);
    tracing::info!(
        result_count = results.len(),
        violation_count = violations.len(),
        violations = ?violations.iter().map(|v| v.reason()).collect::<Vec<_>>(),
        "backtest complete"
    );
    Ok(())
}

fn to_price_series(bars: &[analysis_core::Bar]) -> PriceSeries {
    let price_bars = bars
        .iter()
        .filter_map(|bar| {
            let date = bar.timestamp.date_naive();
            let close = rust_decimal::Decimal::try_from(bar.close).ok()?;
            Some(PriceBar { date, close })
        })
        .collect();
    PriceSeries::new(price_bars)
}

/// No factor-return data source is wired up yet; every lookup misses, so
/// `run_event_study` falls back to market-adjusted CAR only.
struct NoFactorData;

impl FactorDataProvider for NoFactorData {
    fn factor_returns(&self, _date: NaiveDate) -> Option<FactorObservation> {
        None
    }
}
