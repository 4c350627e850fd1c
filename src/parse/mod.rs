use std::sync::OnceLock;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use serde_json::{Map, Value};

use crate::core::{ReportId, ValidatedReport};

pub const REQUIRED_FIELDS: [&str; 7] = [
    "report_id",
    "timestamp",
    "system",
    "processor",
    "memory",
    "graphics",
    "storage_controllers",
];

const OBJECT_FIELDS: [&str; 3] = ["system", "processor", "memory"];
const LIST_FIELDS: [&str; 2] = ["graphics", "storage_controllers"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportErrorKind {
    Parse,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("No JSON found in issue body")]
    NoJson,
    #[error("Invalid JSON in issue body: {0}")]
    InvalidJson(String),
    #[error("Report must be a JSON object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Field '{field}' must be {expected}")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
    },
    #[error("Invalid or missing report_id")]
    InvalidReportId,
}

impl ReportError {
    pub fn kind(&self) -> ReportErrorKind {
        match self {
            ReportError::NoJson | ReportError::InvalidJson(_) => ReportErrorKind::Parse,
            _ => ReportErrorKind::Validation,
        }
    }
}

/// Extracts, parses and validates the report embedded in `body`.
pub fn parse_report(body: &str) -> Result<ValidatedReport, ReportError> {
    let json_text = extract_json_text(body).ok_or(ReportError::NoJson)?;
    let value: Value = serde_json::from_str(&json_text)
        .map_err(|e| ReportError::InvalidJson(e.to_string()))?;
    validate(value)
}

/// Candidate JSON text from free-form issue text. First match wins:
/// a ```json fence, then the widest `{...}` span, then a base64 fence.
pub fn extract_json_text(body: &str) -> Option<String> {
    // Lazy: the capture ends at the first `}` that is followed by the
    // closing fence.
    if let Some(c) = fenced_json_re().captures(body) {
        return Some(c[1].to_string());
    }
    if let Some(c) = bare_object_re().captures(body) {
        return Some(c[1].to_string());
    }
    let c = fenced_text_re().captures(body)?;
    decode_base64_text(&c[1])
}

fn decode_base64_text(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let bytes = STANDARD.decode(compact.as_bytes()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(text)
}

/// Shape checks in a fixed order: presence of every required field, container
/// kinds, and the report id last.
pub fn validate(value: Value) -> Result<ValidatedReport, ReportError> {
    let Value::Object(document) = value else {
        return Err(ReportError::NotAnObject);
    };

    for key in REQUIRED_FIELDS {
        if !document.contains_key(key) {
            return Err(ReportError::MissingField(key));
        }
    }
    for field in OBJECT_FIELDS {
        if !document.get(field).is_some_and(Value::is_object) {
            return Err(ReportError::WrongKind {
                field,
                expected: "an object",
            });
        }
    }
    for field in LIST_FIELDS {
        if !document.get(field).is_some_and(Value::is_array) {
            return Err(ReportError::WrongKind {
                field,
                expected: "a list",
            });
        }
    }

    let id = report_id_text(&document)
        .and_then(|s| ReportId::parse(&s))
        .ok_or(ReportError::InvalidReportId)?;

    Ok(ValidatedReport { id, document })
}

fn report_id_text(document: &Map<String, Value>) -> Option<String> {
    match document.get("report_id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex"))
}

fn bare_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)(\{.*\})").expect("valid regex"))
}

fn fenced_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:text)?\s*([A-Za-z0-9+/=\s]+?)\s*```").expect("valid regex")
    })
}
