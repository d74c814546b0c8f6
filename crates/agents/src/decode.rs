//! Best-effort coercion of LLM output text into JSON.
//!
//! Models wrap JSON in code fences, lead with prose, quote with apostrophes,
//! and leave trailing commas. This module isolates all of that repair in one
//! place and returns a tagged success or failure — callers never see
//! silently mutated text.

use serde_json::Value;

/// Extract and parse the JSON payload embedded in a block of model output.
///
/// Strategy, in order: prefer a fenced ```json block, else slice from the
/// first opening bracket to the last matching closing bracket, then parse —
/// strictly first, then with quote normalization and trailing-comma removal.
pub fn extract_json(content: &str) -> Result<Value, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("content is empty".into());
    }

    let candidate = fenced_block(trimmed).unwrap_or(trimmed);
    let candidate = bracket_slice(candidate).unwrap_or(candidate);

    parse_lenient(candidate)
}

/// The inner text of the first ``` fenced block, if any.
fn fenced_block(s: &str) -> Option<&str> {
    let start = s.find("```")?;
    let rest = &s[start + 3..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let inner = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(inner.trim())
}

/// Slice from the first `[`/`{` to the last matching `]`/`}`.
fn bracket_slice(s: &str) -> Option<&str> {
    let start = s.find(['[', '{'])?;
    let close = if s.as_bytes()[start] == b'[' { ']' } else { '}' };
    let end = s.rfind(close)?;
    (end > start).then(|| &s[start..=end])
}

fn parse_lenient(s: &str) -> Result<Value, String> {
    let strict_err = match serde_json::from_str(s) {
        Ok(value) => return Ok(value),
        Err(e) => e.to_string(),
    };
    // Repairs applied progressively: trailing commas alone first, quote
    // normalization only as a last resort (it rewrites every quote).
    if let Ok(value) = serde_json::from_str(&strip_trailing_commas(s)) {
        return Ok(value);
    }
    let repaired = strip_trailing_commas(&normalize_quotes(s));
    serde_json::from_str(&repaired).map_err(|_| strict_err)
}

/// Rewrite single-quoted JSON into double-quoted JSON.
///
/// Escaped double quotes are parked behind a placeholder so the remaining
/// double quotes (which must have been inside single-quoted strings) can be
/// escaped before the single quotes become delimiters.
fn normalize_quotes(s: &str) -> String {
    const PLACEHOLDER: char = '\u{1}';
    s.replace("\\\"", &PLACEHOLDER.to_string())
        .replace('"', "\\\"")
        .replace('\'', "\"")
        .replace(PLACEHOLDER, "\\\"")
}

/// Remove commas that directly precede a closing bracket, outside strings.
fn strip_trailing_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in s.chars() {
        match c {
            '"' if !escaped => in_string = !in_string,
            '}' | ']' if !in_string => {
                while out.ends_with(|t: char| t.is_whitespace()) {
                    out.pop();
                }
                if out.ends_with(',') {
                    out.pop();
                }
            }
            _ => {}
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}
