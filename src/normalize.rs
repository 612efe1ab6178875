//! Model-output decoding: strict JSON parse, then a lenient repair pass.
//!
//! Both stages sit behind [`parse_model_output`]; callers get a tagged
//! result and decide how to surface the failure.

use serde_json::Value;

/// Why both decode stages rejected the model output. Carries the raw text
/// so callers can log the offending reply.
#[derive(Debug)]
pub struct ParseFailure {
    pub reason: String,
    pub raw: String,
}

/// Decode a model reply expected to contain a single JSON document,
/// optionally wrapped in a markdown code fence.
pub fn parse_model_output(raw: &str) -> Result<Value, ParseFailure> {
    let cleaned = strip_code_fence(raw);
    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(strict_err) => {
            let repaired = repair_json(cleaned);
            serde_json::from_str(&repaired).map_err(|_| ParseFailure {
                reason: strict_err.to_string(),
                raw: raw.to_string(),
            })
        }
    }
}

/// Strip a surrounding markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        t = rest.trim_start();
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest.trim_end();
    }
    t
}

/// Best-effort repair of near-JSON text: trims to the outermost bracket
/// span, escapes bare newlines inside strings, closes unterminated
/// strings/objects/arrays, and drops trailing commas.
pub fn repair_json(text: &str) -> String {
    let start = match text.find(|c| c == '{' || c == '[') {
        Some(idx) => idx,
        None => return text.trim().to_string(),
    };

    let mut out = String::with_capacity(text.len() - start);
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text[start..].chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            } else if c == '\n' {
                out.push_str("\\n");
                continue;
            }
            out.push(c);
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' => {
                stack.push('}');
                out.push(c);
            }
            '[' => {
                stack.push(']');
                out.push(c);
            }
            '}' | ']' => {
                // a mismatched closer is dropped
                if stack.last() == Some(&c) {
                    stack.pop();
                    out.push(c);
                    if stack.is_empty() {
                        break; // ignore prose after the document
                    }
                }
            }
            _ => out.push(c),
        }
    }

    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }
    while out.ends_with(|c: char| c.is_whitespace() || c == ',') {
        out.pop();
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }

    remove_trailing_commas(&out)
}

fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            i += 1;
            continue;
        }
        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }
        if c == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_fence_with_language_tag() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "```\n[1, 2, 3]\n```";
        assert_eq!(strip_code_fence(raw), "[1, 2, 3]");
    }

    #[test]
    fn unfenced_text_passes_through() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn strict_parse_handles_clean_output() {
        let value = parse_model_output("```json\n{\"a\": [1, 2]}\n```").unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
    }

    #[test]
    fn repair_removes_trailing_commas() {
        let value = parse_model_output("{\"a\": 1, \"b\": [1, 2,],}").unwrap();
        assert_eq!(value, json!({"a": 1, "b": [1, 2]}));
    }

    #[test]
    fn repair_closes_truncated_output() {
        let value = parse_model_output("{\"a\": [1, 2").unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
    }

    #[test]
    fn repair_closes_unterminated_string() {
        let value = parse_model_output("{\"a\": \"abc").unwrap();
        assert_eq!(value, json!({"a": "abc"}));
    }

    #[test]
    fn repair_discards_prose_around_the_document() {
        let raw = "Here is your quiz: [{\"id\": 1}] hope it helps!";
        let value = parse_model_output(raw).unwrap();
        assert_eq!(value, json!([{"id": 1}]));
    }

    #[test]
    fn repair_escapes_bare_newlines_in_strings() {
        let value = parse_model_output("{\"a\": \"line one\nline two\"}").unwrap();
        assert_eq!(value, json!({"a": "line one\nline two"}));
    }

    #[test]
    fn unrepairable_output_reports_failure_with_raw_text() {
        let raw = "the model refused to answer";
        let failure = parse_model_output(raw).unwrap_err();
        assert_eq!(failure.raw, raw);
        assert!(!failure.reason.is_empty());
    }
}
