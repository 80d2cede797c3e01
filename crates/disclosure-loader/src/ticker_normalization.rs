//! Ticker normalization (spec §4.4 step 3): a four-layer chain-of-
//! responsibility — static dictionary, suffix/qualifier pattern stripping,
//! an external-lookup fallback, and finally "mark unresolved" — generalizing
//! the teacher's single-layer lookup pattern in `polygon_client`.

use std::collections::HashMap;

/// One link in the resolution chain. Each layer either resolves the raw
/// asset description to a ticker or defers to the next layer.
pub trait TickerResolver: Send + Sync {
    fn resolve(&self, raw: &str) -> Option<String>;
}

/// Layer 1: exact-match static dictionary of common company-name spellings
/// that don't already carry their own ticker in the raw text.
pub struct StaticDictionaryResolver {
    table: HashMap<&'static str, &'static str>,
}

impl Default for StaticDictionaryResolver {
    fn default() -> Self {
        let mut table = HashMap::new();
        table.insert("APPLE INC", "AAPL");
        table.insert("APPLE INC.", "AAPL");
        table.insert("MICROSOFT CORP", "MSFT");
        table.insert("MICROSOFT CORPORATION", "MSFT");
        table.insert("AMAZON.COM INC", "AMZN");
        table.insert("ALPHABET INC", "GOOGL");
        table.insert("NVIDIA CORP", "NVDA");
        table.insert("META PLATFORMS INC", "META");
        table.insert("TESLA INC", "TSLA");
        Self { table }
    }
}

impl TickerResolver for StaticDictionaryResolver {
    fn resolve(&self, raw: &str) -> Option<String> {
        self.table.get(raw.trim().to_uppercase().as_str()).map(|s| s.to_string())
    }
}

/// Layer 2: if the raw text already contains something ticker-shaped
/// (all-caps, 1-5 letters) alongside common qualifier suffixes disclosure
/// forms append ("- common stock", "(Class A)", "Inc", "Corp"), strip the
/// qualifier and keep the candidate ticker.
pub struct SuffixPatternResolver;

const STRIPPED_SUFFIXES: &[&str] = &[
    "- COMMON STOCK",
    "- CLASS A",
    "- CLASS B",
    "(CLASS A)",
    "(CLASS B)",
    "COMMON STOCK",
];

impl TickerResolver for SuffixPatternResolver {
    fn resolve(&self, raw: &str) -> Option<String> {
        let mut candidate = raw.trim().to_uppercase();
        for suffix in STRIPPED_SUFFIXES {
            if let Some(stripped) = candidate.strip_suffix(suffix) {
                candidate = stripped.trim().to_string();
            }
        }
        let looks_like_ticker =
            (1..=5).contains(&candidate.len()) && candidate.chars().all(|c| c.is_ascii_uppercase());
        looks_like_ticker.then_some(candidate)
    }
}

/// Layer 3: external-lookup fallback (a ticker-search API in production).
/// Modeled as a trait object so tests and callers without network access can
/// supply a stub; the default no-op always defers to layer 4.
pub trait ExternalTickerLookup: Send + Sync {
    fn lookup(&self, raw: &str) -> Option<String>;
}

pub struct NoopExternalLookup;

impl ExternalTickerLookup for NoopExternalLookup {
    fn lookup(&self, _raw: &str) -> Option<String> {
        None
    }
}

struct ExternalLookupResolver<'a> {
    lookup: &'a dyn ExternalTickerLookup,
}

impl<'a> TickerResolver for ExternalLookupResolver<'a> {
    fn resolve(&self, raw: &str) -> Option<String> {
        self.lookup.lookup(raw)
    }
}

/// Runs all four layers in order. Layer 4 ("mark unresolved") is implicit:
/// if nothing resolves, the caller sets `ticker = None` (spec §4.4 step 3).
pub struct TickerResolverChain<'a> {
    layers: Vec<Box<dyn TickerResolver + 'a>>,
}

impl<'a> TickerResolverChain<'a> {
    pub fn new(external: &'a dyn ExternalTickerLookup) -> Self {
        Self {
            layers: vec![
                Box::new(StaticDictionaryResolver::default()),
                Box::new(SuffixPatternResolver),
                Box::new(ExternalLookupResolver { lookup: external }),
            ],
        }
    }

    /// Returns `None` when no layer resolves the input — the unresolved
    /// case, not an error (spec §4.4 step 3).
    pub fn resolve(&self, raw: &str) -> Option<String> {
        if raw.trim().is_empty() {
            return None;
        }
        self.layers.iter().find_map(|layer| layer.resolve(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_via_static_dictionary() {
        let chain = TickerResolverChain::new(&NoopExternalLookup);
        assert_eq!(chain.resolve("Apple Inc"), Some("AAPL".to_string()));
    }

    #[test]
    fn strips_qualifier_suffix_from_ticker_shaped_text() {
        let chain = TickerResolverChain::new(&NoopExternalLookup);
        assert_eq!(chain.resolve("NVDA - Common Stock"), Some("NVDA".to_string()));
    }

    #[test]
    fn falls_back_to_external_lookup() {
        struct Stub;
        impl ExternalTickerLookup for Stub {
            fn lookup(&self, raw: &str) -> Option<String> {
                (raw == "Some Obscure Fund").then(|| "OBSC".to_string())
            }
        }
        let chain = TickerResolverChain::new(&Stub);
        assert_eq!(chain.resolve("Some Obscure Fund"), Some("OBSC".to_string()));
    }

    #[test]
    fn unresolved_input_returns_none() {
        let chain = TickerResolverChain::new(&NoopExternalLookup);
        assert_eq!(chain.resolve("Totally Unknown Municipal Bond Series 2019"), None);
    }
}
