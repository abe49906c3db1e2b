//! Helpers for reading structured model replies.

/// Strips a surrounding markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. `json`) up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parses a reply as a JSON object, after fence stripping.
///
/// Returns `None` for anything that is not a JSON object.
pub fn parse_json_object(reply: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    let cleaned = strip_code_fence(reply);
    if !cleaned.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(cleaned).ok()? {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reply_is_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn json_fence_is_removed() {
        let reply = "```json\n{\"passportCountry\": \"FRA\"}\n```";
        assert_eq!(strip_code_fence(reply), "{\"passportCountry\": \"FRA\"}");
    }

    #[test]
    fn bare_fence_is_removed() {
        let reply = "```\n{}\n```";
        assert_eq!(strip_code_fence(reply), "{}");
    }

    #[test]
    fn parse_json_object_rejects_prose() {
        assert!(parse_json_object("The passport is French.").is_none());
        assert!(parse_json_object("[1, 2]").is_none());
        assert!(parse_json_object("{broken").is_none());
    }

    #[test]
    fn parse_json_object_reads_fenced_object() {
        let map = parse_json_object("```JSON\n{\"passportCountry\": \"usa\"}\n```").unwrap();
        assert_eq!(map["passportCountry"], "usa");
    }
}
