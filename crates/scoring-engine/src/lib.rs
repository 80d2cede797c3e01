//! L5: the scoring subsystem (spec §4.6). Pure functions over `&[Trade]` /
//! `&Trade` — no I/O, no Store access. Callers (the CLI's `score` stage) own
//! reading canonical trades and persisting the results via
//! `disclosure-store`'s `SqsWriter` / `ConvergenceWriter`.

pub mod convergence;
pub mod pis;
pub mod sqs;

pub use convergence::detect as detect_convergence;
pub use pis::rank as rank_politicians;
pub use sqs::score_trade;

use disclosure_core::{SqsRecord, Trade};
use std::collections::HashMap;

/// Score every trade in a batch (spec §4.6: per-trade, pure function of the
/// trade and the politician's history). Trades are grouped by
/// (politician, ticker, direction) so `score_trade` can see each trade's
/// same-direction history without an N^2 scan.
pub fn score_batch(trades: &[Trade]) -> HashMap<String, SqsRecord> {
    let mut by_group: HashMap<(String, Option<String>, disclosure_core::TransactionType), Vec<&Trade>> =
        HashMap::new();
    for trade in trades {
        by_group
            .entry((trade.politician_name.clone(), trade.ticker.clone(), trade.transaction_type))
            .or_default()
            .push(trade);
    }

    let mut out = HashMap::with_capacity(trades.len());
    for group in by_group.values() {
        for trade in group {
            let history: Vec<&Trade> = group.iter().filter(|t| t.data_hash != trade.data_hash).copied().collect();
            out.insert(trade.data_hash.clone(), sqs::score_trade(trade, &history));
        }
    }
    out
}

/// Corpus-wide trade counts per canonical politician name, used by the
/// convergence detector's high-frequency discount (spec §4.6).
pub fn corpus_trade_counts(trades: &[Trade]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for trade in trades {
        *counts.entry(trade.politician_name.clone()).or_insert(0usize) += 1;
    }
    counts
}
