//! Placeholder marker tokens.
//!
//! A marker is `{{` + a lowercase snake-case identifier + `}}`, e.g. `{{parent_email}}`. The
//! builder never interprets markers; the downstream document-generation step substitutes real
//! values at send/print time.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{BuilderError, BuilderResult};

pub const STUDENT_NAME: &str = "student_name";
pub const STUDENT_DOB: &str = "student_dob";
pub const STUDENT_AGE: &str = "student_age";
pub const DIVISION: &str = "division";
pub const PARENT_NAME: &str = "parent_name";
pub const PARENT_EMAIL: &str = "parent_email";
pub const PARENT_PHONE: &str = "parent_phone";
pub const EMERGENCY_CONTACT: &str = "emergency_contact";
pub const MONTHLY_TUITION: &str = "monthly_tuition";
pub const CONTRACT_DATE: &str = "contract_date";
pub const PARENT_SIGNATURE: &str = "parent_signature";
pub const SIGNATURE_DATE: &str = "signature_date";
pub const STUDIO_SIGNATURE: &str = "studio_signature";

/// Every marker the generator and the catalog defaults emit.
pub const KNOWN_MARKERS: &[&str] = &[
    STUDENT_NAME,
    STUDENT_DOB,
    STUDENT_AGE,
    DIVISION,
    PARENT_NAME,
    PARENT_EMAIL,
    PARENT_PHONE,
    EMERGENCY_CONTACT,
    MONTHLY_TUITION,
    CONTRACT_DATE,
    PARENT_SIGNATURE,
    SIGNATURE_DATE,
    STUDIO_SIGNATURE,
];

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([a-z][a-z0-9]*(?:_[a-z0-9]+)*)\}\}").unwrap())
}

/// Anything that opens with `{{` and closes with `}}`, well-formed or not.
fn candidate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{[^{}]*\}\}").unwrap())
}

/// Render a marker token for `name`.
pub fn marker(name: &str) -> String {
    debug_assert!(is_valid_marker_name(name), "invalid marker name {name}");
    format!("{{{{{}}}}}", name)
}

/// Lowercase snake-case, starting with a letter, no leading/trailing/double underscores.
pub fn is_valid_marker_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    if name.ends_with('_') || name.contains("__") {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Marker names used in `html`, unique, in order of first appearance.
pub fn extract_markers(html: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();
    for cap in marker_re().captures_iter(html) {
        let name = cap[1].to_string();
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    names
}

/// Reject brace tokens that look like markers but do not follow the marker syntax
/// (`{{ Student Name }}`, `{{parentEmail}}`).
pub fn validate_markers(html: &str) -> BuilderResult<()> {
    for m in candidate_re().find_iter(html) {
        let token = m.as_str();
        if !is_valid_marker_name(&token[2..token.len() - 2]) {
            return Err(BuilderError::InvalidMarker {
                token: token.to_string(),
            });
        }
    }
    Ok(())
}
