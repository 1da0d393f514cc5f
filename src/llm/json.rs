/// Extract a JSON object from a reply that may be wrapped in code fences
/// or surrounded by prose.
pub fn extract_json(response: &str) -> String {
    let response = response.trim();

    // ```json ... ``` or ``` ... ```
    if let Some(rest) = response.strip_prefix("```") {
        let rest = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
        let inner = rest.strip_suffix("```").unwrap_or(rest).trim();
        if inner.starts_with('{') {
            return inner.to_string();
        }
        return object_span(inner).unwrap_or(inner).to_string();
    }

    if response.starts_with('{') {
        return response.to_string();
    }

    object_span(response).unwrap_or(response).to_string()
}

/// Outermost `{ ... }` span of `text`.
fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
