//! Text helpers shared by the API client and the CLI profile config.

/// Longest body kept in log lines and `ApiError::Status` messages.
pub const COMPACT_TEXT_CHARS: usize = 180;

/// Trimmed value, or `None` when absent or blank.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether a base URL names an HTTP scheme. Surrounding whitespace is ignored.
pub fn is_http_url(value: &str) -> bool {
    let value = value.trim_start();
    value.starts_with("http://") || value.starts_with("https://")
}

/// Trims a response body and cuts it to [`COMPACT_TEXT_CHARS`] characters.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(COMPACT_TEXT_CHARS).collect()
}
