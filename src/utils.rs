//! Utility functions for common operations.

use regex::Regex;
use std::sync::LazyLock;

/// First run of four digits, used for publication years.
static YEAR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{4}").unwrap());

/// Checks whether text starts with a Latin letter.
///
/// This is the language switch used for conjunctions, "et al" markers,
/// the site order for a query and the library folder of a note.
pub fn is_latin(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Returns the first four-digit number in `text`, or an empty string.
pub fn find_year(text: &str) -> String {
    YEAR_REGEX
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Collapses runs of whitespace (including newlines) into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decodes `%XX` escapes, leaving the input as is if it is not valid UTF-8.
pub fn percent_decode(text: &str) -> String {
    percent_encoding::percent_decode_str(text)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| text.to_string())
}

/// Checks if an HTTP response is successful, and if not, returns its
/// status code and body for the error message.
pub async fn check_response_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, String> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(format!("HTTP {}: {}", status, text));
    }
    Ok(response)
}
