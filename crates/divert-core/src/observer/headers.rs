//! Reduce a raw response header list to the fields the observer cares about.

use serde::{Deserialize, Serialize};

use crate::events::HttpHeader;

/// Normalized subset of response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderBundle {
    /// `Content-Type` value, empty if absent.
    pub content_type: String,
    /// `Content-Disposition` value, empty if absent.
    pub content_disposition: String,
    /// `Content-Length` in bytes from the leading digits, 0 if absent or there are none.
    pub content_length: u64,
}

/// Extract content-type, content-disposition and content-length.
///
/// Names match case-insensitively and the last occurrence of a header wins.
pub fn extract_headers(headers: &[HttpHeader]) -> HeaderBundle {
    let mut bundle = HeaderBundle::default();

    for header in headers {
        let name = header.name.trim();
        let value = header.value.trim();
        if name.eq_ignore_ascii_case("content-type") {
            bundle.content_type = value.to_string();
        } else if name.eq_ignore_ascii_case("content-disposition") {
            bundle.content_disposition = value.to_string();
        } else if name.eq_ignore_ascii_case("content-length") {
            bundle.content_length = leading_number(value);
        }
    }

    bundle
}

/// Integer value of the leading ASCII digits of `value` (`"123abc"` is 123).
fn leading_number(value: &str) -> u64 {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().unwrap_or(0)
}
