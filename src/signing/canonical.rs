use crate::types::ObjectLocator;
use chrono::{DateTime, FixedOffset, TimeZone};

/// RFC 1123 with a numeric zone offset, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`
pub const AMZ_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// The only header folded into the signature
pub const AMZ_DATE_HEADER: &str = "x-amz-date";

/// Extension to content type table. Anything not listed signs with an
/// empty content type.
const CONTENT_TYPES: &[(&str, &str)] = &[
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("pdf", "application/pdf"),
];

/// Content type for a file name, looked up by extension (case-insensitive)
///
/// Unknown or missing extensions return an empty string rather than an error.
pub fn content_type_for(file_name: &str) -> &'static str {
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return "";
    };

    CONTENT_TYPES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, content_type)| *content_type)
        .unwrap_or("")
}

/// Format a timestamp the way it is sent in `x-amz-date`
pub fn format_amz_date<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.format(AMZ_DATE_FORMAT).to_string()
}

/// Signing input for a header delegation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    pub method: String,
    pub content_type: String,
    pub timestamp: String,
    pub signed_headers: Vec<(String, String)>,
    pub resource_path: String,
}

impl CanonicalRequest {
    /// Build the canonical GET request for a locator
    pub fn build(
        locator: &ObjectLocator,
        content_type: &str,
        timestamp: &DateTime<FixedOffset>,
    ) -> Self {
        let timestamp = format_amz_date(timestamp);

        Self {
            method: "GET".to_string(),
            content_type: content_type.to_string(),
            signed_headers: vec![(AMZ_DATE_HEADER.to_string(), timestamp.clone())],
            timestamp,
            resource_path: locator.resource_path(),
        }
    }

    /// Names of the signed headers, in signing order
    pub fn signed_header_names(&self) -> Vec<&str> {
        self.signed_headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Render the exact byte sequence that is signed
    ///
    /// Format (newline separated, no trailing newline):
    /// Method + '\n' +
    /// <empty query field> + '\n' +
    /// ContentType + '\n' +
    /// <empty extra headers field> + '\n' +
    /// name:value for each signed header + '\n' +
    /// ResourcePath
    pub fn to_signing_string(&self) -> String {
        let headers = self
            .signed_headers
            .iter()
            .map(|(name, value)| format!("{}:{}", name, value))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n\n{}\n\n{}\n{}",
            self.method, self.content_type, headers, self.resource_path
        )
    }
}
