//! Locates the structured object inside a judge's free-form reply.

use serde_json::Value;

/// Returns the first balanced `{...}` span in `raw`.
///
/// Braces inside JSON string literals (including escaped quotes) do not
/// count toward nesting.
pub fn first_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses the first balanced object span. Fails when no span exists or it
/// is not a valid JSON object.
pub fn extract_object(raw: &str) -> Result<Value, String> {
    let span = first_object_span(raw).ok_or_else(|| "no JSON object in reply".to_string())?;
    let value: Value = serde_json::from_str(span).map_err(|e| format!("invalid JSON object: {e}"))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("reply is not a JSON object".to_string())
    }
}
