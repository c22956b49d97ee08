//! Structured-payload extraction from free-form LLM output.
//!
//! Models asked for JSON rarely return bare JSON: they wrap it in result
//! tags, markdown fences, or prose. [`extract_json_payload`] recovers the
//! payload with a tiered strategy, first match wins:
//!
//! 1. content inside `<r>...</r>` tags
//! 2. content inside `<result>...</result>` tags
//! 3. a fenced ```json code block
//! 4. the first balanced `{...}` object found by delimiter scanning
//!
//! Pure text processing, no I/O. A sibling [`extract_reasoning`] recovers
//! the optional `<reasoning>` block for internal-thought logging; it is
//! never required for correctness.

use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to recover a structured payload from generated text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Empty LLM response")]
    Empty,

    #[error("No valid JSON object found in LLM response (length={length}): {preview}")]
    NoPayload { length: usize, preview: String },
}

/// Extract the first JSON object from a free-form LLM reply.
pub fn extract_json_payload(text: &str) -> Result<Map<String, Value>, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    // Tier 1 + 2: result tags
    for tag in ["r", "result"] {
        if let Some(inner) = tag_content(text, tag)
            && let Some(payload) = try_parse_object(inner)
        {
            return Ok(payload);
        }
    }

    // Tier 3: fenced code block
    if let Some(inner) = fenced_block(text)
        && let Some(payload) = try_parse_object(inner)
    {
        return Ok(payload);
    }

    // Tier 4: bare braces
    if let Some(payload) = balanced_object(text) {
        return Ok(payload);
    }

    Err(ExtractionError::NoPayload {
        length: text.len(),
        preview: crate::util::truncate_str(text, 300).to_string(),
    })
}

/// Extract the `<reasoning>` block, if present. Best-effort only.
pub fn extract_reasoning(text: &str) -> Option<String> {
    tag_content(text, "reasoning").map(|s| s.trim().to_string())
}

/// Find the content of the first `<tag>...</tag>` pair, case-insensitive,
/// tolerating whitespace before the closing `>` of each tag.
///
/// ASCII lowercasing keeps byte offsets aligned with the original text.
fn tag_content<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let lower = text.to_ascii_lowercase();
    let open_prefix = format!("<{tag}");
    let close_prefix = format!("</{tag}");

    let open_at = find_tag(&lower, &open_prefix)?;
    let content_start = lower[open_at..].find('>')? + open_at + 1;

    let close_rel = find_tag(&lower[content_start..], &close_prefix)?;
    let content_end = content_start + close_rel;

    Some(&text[content_start..content_end])
}

/// Locate `prefix` followed (after optional whitespace) by `>`. Rejects
/// matches like `<result_summary` for prefix `<result`.
fn find_tag(haystack: &str, prefix: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(prefix) {
        let at = from + rel;
        let rest = &haystack[at + prefix.len()..];
        if rest.trim_start().starts_with('>') {
            return Some(at);
        }
        from = at + prefix.len();
    }
    None
}

/// Content of the first ``` / ```json fenced block.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // Skip an optional language tag up to the first newline
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

fn try_parse_object(text: &str) -> Option<Map<String, Value>> {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Find the first syntactically balanced `{...}` object in arbitrary text.
///
/// Tries the widest span (first `{` to last `}`) first, then falls back to
/// a delimiter scan that tracks nesting depth and ignores braces inside
/// string literals (including escaped quotes).
fn balanced_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;

    if let Some(end) = text.rfind('}')
        && end > start
        && let Some(payload) = try_parse_object(&text[start..=end])
    {
        return Some(payload);
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return try_parse_object(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"kind": "normal", "nested": {"quality": "good"}}"#;

    fn assert_recovers(text: &str) {
        let payload = extract_json_payload(text).unwrap();
        assert_eq!(payload["kind"], "normal");
        assert_eq!(payload["nested"]["quality"], "good");
    }

    #[test]
    fn tier1_r_tags() {
        assert_recovers(&format!("thinking...\n<r>\n{PAYLOAD}\n</r>\ndone"));
    }

    #[test]
    fn tier2_result_tags() {
        assert_recovers(&format!("<result>{PAYLOAD}</result>"));
    }

    #[test]
    fn tier3_fenced_block() {
        assert_recovers(&format!("Here you go:\n```json\n{PAYLOAD}\n```\n"));
        assert_recovers(&format!("```\n{PAYLOAD}\n```"));
    }

    #[test]
    fn tier4_bare_braces() {
        assert_recovers(&format!("Sure, the analysis is {PAYLOAD} as requested."));
    }

    #[test]
    fn tags_are_case_insensitive_and_tolerate_whitespace() {
        assert_recovers(&format!("<R >{PAYLOAD}</R>"));
        assert_recovers(&format!("<Result>{PAYLOAD}</result >"));
    }

    #[test]
    fn earlier_tier_wins() {
        // The <r> tags hold the real payload; the fence holds a decoy
        let text = format!("<r>{PAYLOAD}</r>\n```json\n{{\"kind\": \"decoy\"}}\n```");
        let payload = extract_json_payload(&text).unwrap();
        assert_eq!(payload["kind"], "normal");
    }

    #[test]
    fn invalid_tag_content_falls_through() {
        // Broken JSON inside <r> must not block the fence tier
        let text = format!("<r>not json</r>\n```json\n{PAYLOAD}\n```");
        assert_recovers(&text);
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"note: {"msg": "set {} and } carefully", "kind": "normal", "nested": {"quality": "good"}} end"#;
        assert_recovers(text);
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let text = r#"{"kind": "normal", "msg": "she said \"hi\" {", "nested": {"quality": "good"}}"#;
        assert_recovers(text);
    }

    #[test]
    fn minimal_balanced_scan_when_trailing_garbage_braces() {
        // Widest span is invalid because of the stray closing brace
        let text = format!("{PAYLOAD} trailing }}");
        assert_recovers(&text);
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(
            extract_json_payload("   \n"),
            Err(ExtractionError::Empty)
        ));
    }

    #[test]
    fn prose_without_json_fails() {
        let err = extract_json_payload("no structured data here").unwrap_err();
        assert!(matches!(err, ExtractionError::NoPayload { .. }));
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(extract_json_payload("[1, 2, 3]").is_err());
        assert!(extract_json_payload("\"just a string\"").is_err());
    }

    #[test]
    fn reasoning_block_recovered() {
        let text = "<reasoning>\nThe candidate dodged the question.\n</reasoning>\n<r>{}</r>";
        assert_eq!(
            extract_reasoning(text).as_deref(),
            Some("The candidate dodged the question.")
        );
        assert_eq!(extract_reasoning("no block"), None);
    }

    #[test]
    fn similar_tag_names_do_not_match() {
        // <result_summary> must not satisfy the <result> tier
        let text = format!("<result_summary>{PAYLOAD}</result_summary>");
        // Falls through to the bare-braces tier, which still recovers it
        assert_recovers(&text);
        assert_eq!(tag_content(&text, "result"), None);
    }
}
