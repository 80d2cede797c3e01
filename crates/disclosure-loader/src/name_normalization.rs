//! Name normalization (spec §4.4 step 2, §9): the curated alias table is
//! trusted ground truth; string similarity is only a tie-breaker once the
//! last name already matches, never the primary signal.

use disclosure_core::reference::{NAME_ALIASES, NAME_SIMILARITY_THRESHOLD};

/// Resolve a surface name to its canonical form. Checks the alias table
/// first; falls back to last-name + fuzzy-first-name matching against the
/// alias table's canonical names; returns the trimmed surface name
/// unchanged (routine, not an error — spec §7 `NameUnresolvable` is logged,
/// not fatal) when nothing matches closely enough.
pub fn canonicalize(surface_name: &str) -> String {
    let trimmed = surface_name.trim();

    for (alias, canonical) in NAME_ALIASES {
        if alias.eq_ignore_ascii_case(trimmed) {
            return canonical.to_string();
        }
    }

    let Some(surface_last) = last_name(trimmed) else {
        return trimmed.to_string();
    };
    let Some(surface_first) = first_name(trimmed) else {
        return trimmed.to_string();
    };

    let mut best: Option<(&str, f64)> = None;
    for (_, canonical) in NAME_ALIASES {
        let (Some(cand_last), Some(cand_first)) = (last_name(canonical), first_name(canonical)) else {
            continue;
        };
        if !cand_last.eq_ignore_ascii_case(surface_last) {
            continue;
        }
        let score = jaro_winkler(&surface_first.to_lowercase(), &cand_first.to_lowercase());
        if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
            best = Some((canonical, score));
        }
    }

    match best {
        Some((canonical, score)) if score >= NAME_SIMILARITY_THRESHOLD => canonical.to_string(),
        _ => trimmed.to_string(),
    }
}

fn last_name(name: &str) -> Option<&str> {
    name.split_whitespace().last()
}

fn first_name(name: &str) -> Option<&str> {
    name.split_whitespace().next()
}

/// Jaro-Winkler string similarity in `[0, 1]`. Hand-rolled: no fuzzy-string
/// crate appears anywhere in the teacher or the rest of the pack, so this
/// follows the teacher's "small, well-tested pure function" idiom (e.g.
/// `backtest_engine::statistical::percentile_sorted`) rather than pulling in
/// a new dependency for one call site.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let jaro = jaro_similarity(a, b);
    if jaro < 0.7 {
        return jaro;
    }

    let prefix_len = a
        .chars()
        .zip(b.chars())
        .take(4)
        .take_while(|(ca, cb)| ca == cb)
        .count() as f64;

    jaro + prefix_len * 0.1 * (1.0 - jaro)
}

fn jaro_similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (a_len, b_len) = (a_chars.len(), b_chars.len());

    if a_len == 0 && b_len == 0 {
        return 1.0;
    }
    if a_len == 0 || b_len == 0 {
        return 0.0;
    }

    let match_distance = (a_len.max(b_len) / 2).saturating_sub(1);
    let mut a_matches = vec![false; a_len];
    let mut b_matches = vec![false; b_len];
    let mut matches = 0usize;

    for i in 0..a_len {
        let start = i.saturating_sub(match_distance);
        let end = (i + match_distance + 1).min(b_len);
        for j in start..end {
            if b_matches[j] || a_chars[i] != b_chars[j] {
                continue;
            }
            a_matches[i] = true;
            b_matches[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut b_index = 0usize;
    for i in 0..a_len {
        if !a_matches[i] {
            continue;
        }
        while !b_matches[b_index] {
            b_index += 1;
        }
        if a_chars[i] != b_chars[b_index] {
            transpositions += 1;
        }
        b_index += 1;
    }

    let m = matches as f64;
    (m / a_len as f64 + m / b_len as f64 + (m - (transpositions / 2) as f64) / m) / 3.0
}
