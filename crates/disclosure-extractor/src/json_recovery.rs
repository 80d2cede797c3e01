//! JSON recovery ladder (spec §4.3 S1 PARSE): direct parse, then fenced-block
//! extraction, then regex capture of the outermost balanced braces, then
//! trailing-comma normalization. Each rung is tried in order; the first one
//! that parses wins.

use regex::Regex;
use serde_json::Value;

pub fn recover(raw: &str) -> Result<Value, String> {
    let attempts: [fn(&str) -> Option<Value>; 4] =
        [try_direct, try_fenced_block, try_outermost_braces, try_trailing_comma_fix];

    for attempt in attempts {
        if let Some(value) = attempt(raw) {
            return Ok(value);
        }
    }
    Err(format!("no recovery rung parsed response: {}", truncate(raw)))
}

fn try_direct(raw: &str) -> Option<Value> {
    serde_json::from_str(raw.trim()).ok()
}

fn try_fenced_block(raw: &str) -> Option<Value> {
    let re = Regex::new(r"```(?:json)?\s*([\s\S]*?)```").ok()?;
    let captured = re.captures(raw)?.get(1)?.as_str();
    serde_json::from_str(captured.trim()).ok()
}

/// Finds the first `{` and its matching `}` by brace-depth counting, then
/// parses the span between them. Handles commentary before/after the payload
/// that the fenced-block rung didn't catch.
fn try_outermost_braces(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();
    let mut depth = 0i32;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return serde_json::from_str(&raw[start..end]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn try_trailing_comma_fix(raw: &str) -> Option<Value> {
    let re = Regex::new(r",(\s*[\]}])").ok()?;
    let fixed = re.replace_all(raw, "$1");
    serde_json::from_str(fixed.trim()).ok().or_else(|| try_outermost_braces(&fixed))
}

fn truncate(raw: &str) -> String {
    if raw.len() > 120 {
        format!("{}…", &raw[..120])
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json_directly() {
        let value = recover(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn recovers_fenced_block() {
        let raw = "Here is the data:\n```json\n{\"a\": 2}\n```\nLet me know if you need more.";
        let value = recover(raw).unwrap();
        assert_eq!(value["a"], 2);
    }

    #[test]
    fn recovers_outermost_braces_amid_commentary() {
        let raw = "Sure thing! {\"a\": 3, \"nested\": {\"b\": 4}} Hope that helps.";
        let value = recover(raw).unwrap();
        assert_eq!(value["a"], 3);
        assert_eq!(value["nested"]["b"], 4);
    }

    #[test]
    fn fixes_trailing_commas() {
        let raw = r#"{"a": 1, "b": [1, 2, 3,],}"#;
        let value = recover(raw).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn fails_on_unparseable_garbage() {
        assert!(recover("not json at all").is_err());
    }
}
