//! Conversion between the builder models and flat HTML.
//!
//! [`generate`] projects a form or a document tree into markup; [`recover`] reads a form back
//! out of markup produced by [`generate`]. The two share the labels and titles below, which is
//! why they live in one module and are versioned together through [`FORMAT_VERSION`].

pub mod generate;
pub mod recover;

pub use generate::{render_form, render_tree, RenderOptions};
pub use recover::{recover, RecoveredFields, Recovery, RecoverySource, RecoveryWarning};

/// Bumped whenever the generated markup changes in a way recovery must know about.
pub const FORMAT_VERSION: u32 = 1;

/// `<!-- studio-form:v1 -->`
pub(crate) const STAMP_PREFIX: &str = "<!-- studio-form:v";
pub(crate) const DATA_ISLAND_ID: &str = "studio-form-data";

pub const STUDENT_INFO_TITLE: &str = "Student Information";
pub const TUITION_TITLE: &str = "Tuition & Fees";
pub const PAYMENT_TERMS_TITLE: &str = "Payment Terms";
pub const TERMINATION_TITLE: &str = "Termination Policy";
pub const SIGNATURES_TITLE: &str = "Signatures";

/// Titles of the sections generated from fixed form fields, in emission order.
pub const FIXED_SECTION_TITLES: &[&str] = &[
    STUDENT_INFO_TITLE,
    TUITION_TITLE,
    PAYMENT_TERMS_TITLE,
    TERMINATION_TITLE,
    SIGNATURES_TITLE,
];

pub(crate) const LABEL_ADDRESS: &str = "Studio Address";
pub(crate) const LABEL_PHONE: &str = "Studio Phone";
pub(crate) const LABEL_EMAIL: &str = "Studio Email";
pub(crate) const LABEL_SEASON: &str = "Season";
pub(crate) const LABEL_RECREATIONAL: &str = "Recreational Division";
pub(crate) const LABEL_COMPETITIVE: &str = "Competitive Division";
pub(crate) const LABEL_ELITE: &str = "Elite Division";
pub(crate) const LABEL_REGISTRATION: &str = "Registration Fee";
pub(crate) const LABEL_MONTHLY_TUITION: &str = "Monthly Tuition";
pub(crate) const LABEL_DUE_DATE: &str = "Payment Due Date";
pub(crate) const LABEL_INVOICE_DATE: &str = "Invoice Date";
pub(crate) const LABEL_LATE_FEE: &str = "Late Fee";
pub(crate) const LABEL_GRACE_PERIOD: &str = "Late Fee Grace Period";
pub(crate) const LABEL_TERMINATION: &str = "Termination Notice";

pub(crate) const CONTENT_OPEN: &str = "<div class=\"section-content\">";

/// True when `title` names one of the fixed sections (case-insensitive substring match).
pub fn is_fixed_section_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    FIXED_SECTION_TITLES
        .iter()
        .any(|fixed| lower.contains(&fixed.to_lowercase()))
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub(crate) fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// `1` -> `1st`, `22` -> `22nd`, `13` -> `13th`
pub(crate) fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
