//! Curated lookup tables that spec.md references but does not define the
//! contents of (notable politicians, committee sector oversight, name alias
//! table). Small enough to embed as `const`/`static` data, following the
//! teacher's `DEFAULT_SYMBOLS` pattern in `data-loader::main`.

/// Politicians whose trades carry extra media/market scrutiny. Presence here
/// contributes the convergence "notable participant" bonus (spec §4.6).
pub const NOTABLE_POLITICIANS: &[&str] = &[
    "Dan Crenshaw",
    "Josh Gottheimer",
    "Tommy Tuberville",
    "Ro Khanna",
    "Marjorie Taylor Greene",
    "Michael McCaul",
];

/// (surface name, canonical name) pairs for common aliasing, nicknames, and
/// suffix variation. The last-name + fuzzy-first-name matcher in
/// `disclosure-loader` falls back to this table first (spec §9: the alias
/// table is trusted ground truth, similarity is only a tie-breaker).
pub const NAME_ALIASES: &[(&str, &str)] = &[
    ("Don Beyer", "Donald Sternoff Beyer Jr."),
    ("Donald Sternoff Jr. Beyer", "Donald Sternoff Beyer Jr."),
    ("Donald S. Beyer Jr.", "Donald Sternoff Beyer Jr."),
    ("Bob Casey", "Robert P. Casey Jr."),
    ("Robert Casey", "Robert P. Casey Jr."),
    ("Greg Pence", "Gregory J. Pence"),
    ("Mike Crapo", "Michael D. Crapo"),
];

/// Minimum Jaro-Winkler-style similarity for fuzzy first-name matching once
/// the last name already matches (spec §4.4, §9: named constant, not inline).
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.75;

/// Sector tag for a ticker, used by both Information Edge scoring (committee
/// oversight lookup) and PIS diversification. Values are coarse GICS-like
/// sector labels, not a full classification service.
pub fn sector_for_ticker(ticker: &str) -> &'static str {
    match ticker {
        "AAPL" | "MSFT" | "GOOGL" | "GOOG" | "NVDA" | "META" | "AVGO" | "ORCL" | "CRM" | "AMD"
        | "ADBE" | "INTC" | "CSCO" | "QCOM" | "CRWD" | "PANW" | "NET" | "DDOG" | "SNOW" => {
            "Technology"
        }
        "JNJ" | "UNH" | "PFE" | "ABBV" | "MRK" | "LLY" | "TMO" | "ABT" | "AMGN" | "GILD" => {
            "Healthcare"
        }
        "JPM" | "BAC" | "GS" | "V" | "MA" | "WFC" | "MS" | "AXP" | "SCHW" | "BLK" | "C" => {
            "Financials"
        }
        "XOM" | "CVX" | "COP" | "SLB" | "EOG" | "MPC" | "PSX" | "VLO" | "OXY" => "Energy",
        "LMT" | "RTX" | "NOC" | "GD" | "BA" | "LHX" | "HII" => "Defense",
        "AMZN" | "TSLA" | "HD" | "NKE" | "SBUX" | "MCD" | "LOW" | "TJX" => {
            "Consumer Discretionary"
        }
        "CAT" | "HON" | "UPS" | "GE" | "DE" | "UNP" | "ETN" => "Industrials",
        "NEE" | "DUK" | "SO" | "AEP" | "D" | "SRE" | "EXC" => "Utilities",
        "NFLX" | "DIS" | "CMCSA" | "T" | "VZ" | "TMUS" => "Communications",
        _ => "Diversified",
    }
}

/// Coarse market-cap tier for a ticker, used by SQS market-impact scoring
/// (spec §4.6: "inverse-size bias"). Like `sector_for_ticker`, a small static
/// table rather than a live market-data lookup, since spec.md names the
/// behavior without naming a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapTier {
    Mega,
    Large,
    SmallOrUnknown,
}

pub fn cap_tier_for_ticker(ticker: Option<&str>) -> CapTier {
    const MEGA_CAP: &[&str] = &[
        "AAPL", "MSFT", "GOOGL", "GOOG", "AMZN", "NVDA", "META", "TSLA", "BRK.B", "AVGO", "JPM",
    ];
    const LARGE_CAP: &[&str] = &[
        "ORCL", "CRM", "AMD", "ADBE", "INTC", "CSCO", "QCOM", "JNJ", "UNH", "PFE", "ABBV", "MRK",
        "V", "MA", "WFC", "GS", "MS", "XOM", "CVX", "LMT", "RTX", "HD", "NKE", "DIS", "VZ",
    ];
    match ticker {
        Some(t) if MEGA_CAP.contains(&t) => CapTier::Mega,
        Some(t) if LARGE_CAP.contains(&t) => CapTier::Large,
        _ => CapTier::SmallOrUnknown,
    }
}

/// Committee oversight role for Information Edge scoring. Returns `None` when
/// no oversight relationship is known for the given (politician, sector) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitteeRole {
    Chair,
    RankingMember,
    Member,
}

/// Sparse (politician, sector) -> committee role table. A real deployment
/// would refresh this from congress.gov committee rosters; the core only
/// needs the lookup contract.
pub fn committee_role_for(politician: &str, sector: &str) -> Option<CommitteeRole> {
    match (politician, sector) {
        ("Nancy Pelosi", "Technology") => Some(CommitteeRole::Member),
        ("Tommy Tuberville", "Defense") => Some(CommitteeRole::Member),
        ("Michael McCaul", "Defense") => Some(CommitteeRole::Chair),
        ("Josh Gottheimer", "Financials") => Some(CommitteeRole::Member),
        _ => None,
    }
}
