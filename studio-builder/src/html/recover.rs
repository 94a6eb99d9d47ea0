//! HTML back to a form.
//!
//! Two tiers. A version-stamped document carrying a data island is decoded exactly; anything
//! else goes through label-anchored regex heuristics over the markup [`super::generate`] emits.
//! [`recover`] never returns an error: problems become [`RecoveryWarning`]s, and an internal
//! failure degrades to the built-in policy sections with every field absent.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::*;
use crate::error::{BuilderError, BuilderResult};
use crate::form::{default_sections, FormModel, Money, Section, SectionKind};
use crate::ids::IdGenerator;

/// Documents larger than this are not scanned.
pub const MAX_DOCUMENT_BYTES: usize = 8 * 1024 * 1024;

const LABEL_COMPANY_NAME: &str = "Company Name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySource {
    /// Decoded from the embedded JSON data island.
    DataIsland,
    /// Extracted from the markup.
    Markup,
    /// Nothing could be read; fields are absent and sections are the defaults.
    Fallback,
}

impl fmt::Display for RecoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecoverySource::DataIsland => "data-island",
            RecoverySource::Markup => "markup",
            RecoverySource::Fallback => "fallback",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryWarning {
    /// No `<!-- studio-form:vN -->` stamp.
    Unversioned,
    /// Stamped by a newer generator; the data island is not trusted.
    UnsupportedVersion { found: u32 },
    InvalidDataIsland { reason: String },
    /// A fixed field whose label or value could not be found.
    ExtractionMiss { field: String },
    /// No dynamic section was recovered and the built-in policies were put in their place.
    DefaultSectionsSubstituted { unrecognized_headings: usize },
    Failed { reason: String },
}

impl fmt::Display for RecoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryWarning::Unversioned => write!(f, "document has no version stamp"),
            RecoveryWarning::UnsupportedVersion { found } => write!(
                f,
                "document format v{} is newer than supported v{}",
                found, FORMAT_VERSION
            ),
            RecoveryWarning::InvalidDataIsland { reason } => {
                write!(f, "data island ignored: {}", reason)
            }
            RecoveryWarning::ExtractionMiss { field } => {
                write!(f, "could not extract '{}'", field)
            }
            RecoveryWarning::DefaultSectionsSubstituted {
                unrecognized_headings,
            } => write!(
                f,
                "no sections recovered, default policies substituted ({} unrecognized headings)",
                unrecognized_headings
            ),
            RecoveryWarning::Failed { reason } => write!(f, "recovery failed: {}", reason),
        }
    }
}

/// Fixed form fields as far as they could be read. `None` means not found.
///
/// Text read from markup has its whitespace collapsed and trimmed, as a browser would display
/// it. Runs of spaces inside a company name or season only survive through the data island.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveredFields {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_phone: Option<String>,
    pub company_email: Option<String>,
    pub season: Option<String>,
    pub recreational_fee: Option<Money>,
    pub competitive_fee: Option<Money>,
    pub elite_fee: Option<Money>,
    pub registration_fee: Option<Money>,
    pub payment_due_day: Option<u8>,
    pub invoice_day: Option<u8>,
    pub late_fee: Option<Money>,
    pub late_fee_grace_days: Option<u32>,
    pub termination_notice_days: Option<u32>,
}

impl From<&FormModel> for RecoveredFields {
    fn from(form: &FormModel) -> Self {
        Self {
            company_name: Some(form.company_name.clone()),
            company_address: Some(form.company_address.clone()),
            company_phone: Some(form.company_phone.clone()),
            company_email: Some(form.company_email.clone()),
            season: Some(form.season.clone()),
            recreational_fee: Some(form.recreational_fee),
            competitive_fee: Some(form.competitive_fee),
            elite_fee: Some(form.elite_fee),
            registration_fee: Some(form.registration_fee),
            payment_due_day: Some(form.payment_due_day),
            invoice_day: Some(form.invoice_day),
            late_fee: Some(form.late_fee),
            late_fee_grace_days: Some(form.late_fee_grace_days),
            termination_notice_days: Some(form.termination_notice_days),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recovery {
    pub fields: RecoveredFields,
    /// Never empty. Orders are dense and ids unique.
    pub sections: Vec<Section>,
    pub source: RecoverySource,
    pub warnings: Vec<RecoveryWarning>,
}

impl Recovery {
    /// True when the sections shown to the user are not the ones in the document.
    pub fn is_degraded(&self) -> bool {
        self.source == RecoverySource::Fallback
            || self
                .warnings
                .iter()
                .any(|w| matches!(w, RecoveryWarning::DefaultSectionsSubstituted { .. }))
    }
}

impl FormModel {
    /// Build a form from a recovery, taking every absent field from `defaults`.
    pub fn hydrate(recovery: Recovery, defaults: &FormModel) -> FormModel {
        let f = recovery.fields;
        let mut form = FormModel {
            company_name: f.company_name.unwrap_or_else(|| defaults.company_name.clone()),
            company_address: f
                .company_address
                .unwrap_or_else(|| defaults.company_address.clone()),
            company_phone: f.company_phone.unwrap_or_else(|| defaults.company_phone.clone()),
            company_email: f.company_email.unwrap_or_else(|| defaults.company_email.clone()),
            season: f.season.unwrap_or_else(|| defaults.season.clone()),
            recreational_fee: f.recreational_fee.unwrap_or(defaults.recreational_fee),
            competitive_fee: f.competitive_fee.unwrap_or(defaults.competitive_fee),
            elite_fee: f.elite_fee.unwrap_or(defaults.elite_fee),
            registration_fee: f.registration_fee.unwrap_or(defaults.registration_fee),
            payment_due_day: f.payment_due_day.unwrap_or(defaults.payment_due_day),
            invoice_day: f.invoice_day.unwrap_or(defaults.invoice_day),
            late_fee: f.late_fee.unwrap_or(defaults.late_fee),
            late_fee_grace_days: f.late_fee_grace_days.unwrap_or(defaults.late_fee_grace_days),
            termination_notice_days: f
                .termination_notice_days
                .unwrap_or(defaults.termination_notice_days),
            sections: Vec::new(),
        };
        form.set_sections(recovery.sections);
        form
    }
}

/// Recover a form from `html`. Fresh section ids come from `ids`.
pub fn recover(html: &str, ids: &mut IdGenerator) -> Recovery {
    match try_recover(html, ids) {
        Ok(recovery) => recovery,
        Err(err) => {
            warn!(error = %err, "recovery failed, falling back to default sections");
            Recovery {
                fields: RecoveredFields::default(),
                sections: default_sections(ids),
                source: RecoverySource::Fallback,
                warnings: vec![
                    RecoveryWarning::Failed {
                        reason: err.to_string(),
                    },
                    RecoveryWarning::DefaultSectionsSubstituted {
                        unrecognized_headings: 0,
                    },
                ],
            }
        }
    }
}

fn try_recover(html: &str, ids: &mut IdGenerator) -> BuilderResult<Recovery> {
    if html.len() > MAX_DOCUMENT_BYTES {
        return Err(BuilderError::DocumentTooLarge {
            size: html.len(),
            limit: MAX_DOCUMENT_BYTES,
        });
    }

    let mut warnings = Vec::new();
    let supported = match stamp_version(html) {
        None => {
            warnings.push(RecoveryWarning::Unversioned);
            false
        }
        Some(found) if found > FORMAT_VERSION => {
            warnings.push(RecoveryWarning::UnsupportedVersion { found });
            false
        }
        Some(_) => true,
    };

    if supported {
        if let Some(json) = data_island(html) {
            match serde_json::from_str::<FormModel>(json) {
                Ok(form) => {
                    debug!(sections = form.sections.len(), "recovered form from data island");
                    let recovery = Recovery {
                        fields: RecoveredFields::from(&form),
                        sections: normalize_sections(form.sections, ids),
                        source: RecoverySource::DataIsland,
                        warnings,
                    };
                    return Ok(with_fallback(recovery, 0, ids));
                }
                Err(err) => warnings.push(RecoveryWarning::InvalidDataIsland {
                    reason: BuilderError::from(err).to_string(),
                }),
            }
        }
    }

    let fields = extract_fields(html, &mut warnings);
    let (sections, unrecognized) = extract_sections(html, ids);
    debug!(
        sections = sections.len(),
        unrecognized, "recovered form from markup"
    );
    let recovery = Recovery {
        fields,
        sections,
        source: RecoverySource::Markup,
        warnings,
    };
    Ok(with_fallback(recovery, unrecognized, ids))
}

fn with_fallback(mut recovery: Recovery, unrecognized_headings: usize, ids: &mut IdGenerator) -> Recovery {
    if recovery.sections.is_empty() {
        warn!(
            unrecognized_headings,
            "no sections recovered, substituting default policies"
        );
        recovery.sections = default_sections(ids);
        recovery
            .warnings
            .push(RecoveryWarning::DefaultSectionsSubstituted {
                unrecognized_headings,
            });
    }
    recovery
}

/// Sort by `order`, renumber, and re-id blank or repeated ids.
fn normalize_sections(mut sections: Vec<Section>, ids: &mut IdGenerator) -> Vec<Section> {
    sections.sort_by_key(|s| s.order);
    let mut taken: HashSet<String> = sections.iter().map(|s| s.id.clone()).collect();
    let mut seen = HashSet::new();
    for (order, section) in sections.iter_mut().enumerate() {
        if section.id.trim().is_empty() || !seen.insert(section.id.clone()) {
            section.id = ids.next_id(&taken);
            taken.insert(section.id.clone());
            seen.insert(section.id.clone());
        }
        section.order = order;
    }
    sections
}

// ─── Patterns ────────────────────────────────────────────────────────────────

fn stamp_version(html: &str) -> Option<u32> {
    static STAMP_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = STAMP_REGEX.get_or_init(|| Regex::new(r"<!--\s*studio-form:v(\d+)\s*-->").unwrap());
    re.captures(html)
        .map(|c| c[1].parse::<u32>().unwrap_or(u32::MAX))
}

fn data_island(html: &str) -> Option<&str> {
    static ISLAND_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ISLAND_REGEX.get_or_init(|| {
        Regex::new(&format!(
            r#"(?is)<script\b[^>]*\bid="{}"[^>]*>(.*?)</script>"#,
            DATA_ISLAND_ID
        ))
        .unwrap()
    });
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

/// Tags stripped, entities decoded, whitespace collapsed.
fn clean_text(fragment: &str) -> String {
    let stripped = tag_regex().replace_all(fragment, " ");
    unescape_html(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── Fixed fields ────────────────────────────────────────────────────────────

/// Bold-label values in document order. The first occurrence of a label wins, so fixed sections
/// shadow anything similar in user content further down.
struct Labels(HashMap<String, String>);

impl Labels {
    fn scan(html: &str) -> Self {
        static LABEL_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = LABEL_REGEX.get_or_init(|| {
            Regex::new(r"(?is)<strong>\s*([^<]*?)\s*:\s*</strong>(.*?)</p>").unwrap()
        });
        let mut map = HashMap::new();
        for c in re.captures_iter(html) {
            map.entry(clean_text(&c[1])).or_insert_with(|| clean_text(&c[2]));
        }
        Labels(map)
    }

    fn optional(&self, label: &str) -> Option<String> {
        self.0.get(label).cloned()
    }

    fn text(&self, label: &str) -> BuilderResult<String> {
        self.0
            .get(label)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| miss(label))
    }

    fn money(&self, label: &str) -> BuilderResult<Money> {
        static MONEY_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = MONEY_REGEX.get_or_init(|| Regex::new(r"\$?\d[\d,]*(?:\.\d{1,2})?").unwrap());
        let value = self.text(label)?;
        let amount = re.find(&value).ok_or_else(|| miss(label))?;
        amount.as_str().parse().map_err(|_| miss(label))
    }

    fn day_of_month(&self, label: &str) -> BuilderResult<u8> {
        static ORDINAL_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = ORDINAL_REGEX
            .get_or_init(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());
        let value = self.text(label)?;
        re.captures(&value)
            .and_then(|c| c[1].parse::<u8>().ok())
            .filter(|d| (1..=31).contains(d))
            .ok_or_else(|| miss(label))
    }

    fn day_count(&self, label: &str) -> BuilderResult<u32> {
        static DAYS_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = DAYS_REGEX.get_or_init(|| Regex::new(r"(?i)\b(\d+)\s*days?\b").unwrap());
        let value = self.text(label)?;
        re.captures(&value)
            .and_then(|c| c[1].parse::<u32>().ok())
            .ok_or_else(|| miss(label))
    }
}

fn miss(field: &str) -> BuilderError {
    BuilderError::ExtractionMiss {
        field: field.to_string(),
    }
}

/// Keep a successful extraction, turn a miss into a warning.
fn keep<T>(result: BuilderResult<T>, warnings: &mut Vec<RecoveryWarning>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let field = match err {
                BuilderError::ExtractionMiss { field } => field,
                other => other.to_string(),
            };
            debug!(%field, "field not recovered");
            warnings.push(RecoveryWarning::ExtractionMiss { field });
            None
        }
    }
}

fn company_name(html: &str) -> BuilderResult<String> {
    static H1_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = H1_REGEX.get_or_init(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1>").unwrap());
    re.captures(html)
        .map(|c| clean_text(&c[1]))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| miss(LABEL_COMPANY_NAME))
}

fn extract_fields(html: &str, warnings: &mut Vec<RecoveryWarning>) -> RecoveredFields {
    let labels = Labels::scan(html);
    RecoveredFields {
        company_name: keep(company_name(html), warnings),
        // Contact lines are omitted from the output when empty, so their absence is not a miss.
        company_address: labels.optional(LABEL_ADDRESS),
        company_phone: labels.optional(LABEL_PHONE),
        company_email: labels.optional(LABEL_EMAIL),
        season: keep(labels.text(LABEL_SEASON), warnings),
        recreational_fee: keep(labels.money(LABEL_RECREATIONAL), warnings),
        competitive_fee: keep(labels.money(LABEL_COMPETITIVE), warnings),
        elite_fee: keep(labels.money(LABEL_ELITE), warnings),
        registration_fee: keep(labels.money(LABEL_REGISTRATION), warnings),
        payment_due_day: keep(labels.day_of_month(LABEL_DUE_DATE), warnings),
        invoice_day: keep(labels.day_of_month(LABEL_INVOICE_DATE), warnings),
        late_fee: keep(labels.money(LABEL_LATE_FEE), warnings),
        late_fee_grace_days: keep(labels.day_count(LABEL_GRACE_PERIOD), warnings),
        termination_notice_days: keep(labels.day_count(LABEL_TERMINATION), warnings),
    }
}

// ─── Sections ────────────────────────────────────────────────────────────────

/// Dynamic sections in document order, plus the number of headings that looked like sections
/// but could not be turned into one.
fn extract_sections(html: &str, ids: &mut IdGenerator) -> (Vec<Section>, usize) {
    static H2_REGEX: OnceLock<Regex> = OnceLock::new();
    static MINOR_HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
    let h2 = H2_REGEX.get_or_init(|| Regex::new(r"(?is)<h2\b[^>]*>(.*?)</h2>").unwrap());
    let minor = MINOR_HEADING_REGEX
        .get_or_init(|| Regex::new(r"(?is)<h([3-6])\b[^>]*>(.*?)</h[3-6]>").unwrap());

    let headings: Vec<_> = h2.captures_iter(html).collect();
    let mut sections = Vec::new();
    let mut taken = HashSet::new();
    let mut unrecognized = 0;
    let mut previous_end = 0;

    for (i, caps) in headings.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let opening = &html[previous_end..whole.start()];
        previous_end = whole.end();
        let title = clean_text(&caps[1]);
        if title.is_empty() {
            unrecognized += 1;
            continue;
        }
        if is_fixed_section_title(&title) {
            continue;
        }
        let end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        let content = unwrap_content(&html[whole.end()..end]);

        let id = ids.next_id(&taken);
        taken.insert(id.clone());
        let order = sections.len();
        sections.push(Section {
            id,
            kind: declared_kind(opening).unwrap_or_else(|| SectionKind::infer(&title)),
            title,
            content,
            order,
        });
    }

    unrecognized += minor
        .captures_iter(html)
        .filter(|c| {
            let title = clean_text(&c[2]);
            !title.is_empty() && !is_fixed_section_title(&title)
        })
        .count();

    (sections, unrecognized)
}

/// Kind written on the `<section>` tag that directly encloses a heading.
fn declared_kind(before_heading: &str) -> Option<SectionKind> {
    static SECTION_KIND_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = SECTION_KIND_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)<section\b[^>]*\bdata-section-kind="([a-z-]+)"[^>]*>\s*$"#).unwrap()
    });
    re.captures(before_heading)
        .and_then(|c| SectionKind::from_wire(&c[1]))
}

/// Section body with the generator's content wrapper removed.
fn unwrap_content(raw: &str) -> String {
    static DIV_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    static TRAILING_CLOSERS_REGEX: OnceLock<Regex> = OnceLock::new();

    let raw = raw.find("<script").map_or(raw, |at| &raw[..at]);
    let body = raw.trim_start();

    if let Some(inner) = body.strip_prefix(CONTENT_OPEN) {
        let divs = DIV_TAG_REGEX
            .get_or_init(|| Regex::new(r"(?i)<div\b[^>]*>|</div\s*>").unwrap());
        let mut depth = 1usize;
        for tag in divs.find_iter(inner) {
            if tag.as_str().starts_with("</") {
                depth -= 1;
                if depth == 0 {
                    return inner[..tag.start()].trim().to_string();
                }
            } else {
                depth += 1;
            }
        }
        return inner.trim().to_string();
    }

    let closers = TRAILING_CLOSERS_REGEX.get_or_init(|| {
        Regex::new(r"(?i)(?:\s*</(?:section|div|article|main|body|html)\s*>)+\s*$").unwrap()
    });
    closers.replace(body, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::generate::{render_form, RenderOptions};
    use pretty_assertions::assert_eq;

    fn studio_form() -> FormModel {
        let mut ids = IdGenerator::counter("section");
        let mut form = FormModel::with_default_sections(&mut ids);
        form.company_name = "Pointe & Flex Dance".to_string();
        form.company_phone = "(555) 010-2233".to_string();
        form.recreational_fee = Money::from_cents(9250);
        form.elite_fee = Money::from_dollars(1200);
        form.payment_due_day = 3;
        form.invoice_day = 22;
        form.late_fee_grace_days = 1;
        form.termination_notice_days = 45;
        form.add_section(
            &mut ids,
            "Program Overview",
            "<div class=\"note\"><p>Classes run weekly.</p></div>",
            SectionKind::Paragraph,
            0,
        );
        form
    }

    #[test]
    fn test_markup_tier_recovers_fixed_fields_and_sections() {
        let form = studio_form();
        let html = render_form(&form, &RenderOptions { embed_form_data: false });
        let recovery = recover(&html, &mut IdGenerator::counter("section"));

        assert_eq!(recovery.source, RecoverySource::Markup);
        assert_eq!(recovery.warnings, vec![]);
        assert!(!recovery.is_degraded());

        let back = FormModel::hydrate(recovery, &FormModel::default());
        let strip = |f: &FormModel| FormModel {
            sections: Vec::new(),
            ..f.clone()
        };
        assert_eq!(strip(&back), strip(&form));

        let summary = |f: &FormModel| -> Vec<(String, String, SectionKind, usize)> {
            f.sections
                .iter()
                .map(|s| (s.title.clone(), s.content.clone(), s.kind, s.order))
                .collect()
        };
        assert_eq!(summary(&back), summary(&form));
    }

    #[test]
    fn test_island_tier_is_exact() {
        let form = studio_form();
        let html = render_form(&form, &RenderOptions::default());
        let recovery = recover(&html, &mut IdGenerator::counter("section"));
        assert_eq!(recovery.source, RecoverySource::DataIsland);
        assert_eq!(FormModel::hydrate(recovery, &FormModel::default()), form);
    }

    #[test]
    fn test_no_sections_falls_back_with_warning() {
        let html = "<h1>Studio</h1><h2>Payment Terms</h2><p>Pay on time.</p><h3>Refunds</h3>";
        let recovery = recover(html, &mut IdGenerator::counter("section"));

        assert!(recovery.is_degraded());
        assert_eq!(recovery.sections.len(), 3);
        assert_eq!(recovery.fields.company_name.as_deref(), Some("Studio"));
        assert!(recovery.warnings.contains(&RecoveryWarning::Unversioned));
        assert!(recovery
            .warnings
            .contains(&RecoveryWarning::DefaultSectionsSubstituted {
                unrecognized_headings: 1
            }));
        assert!(recovery.warnings.contains(&RecoveryWarning::ExtractionMiss {
            field: LABEL_LATE_FEE.to_string()
        }));
    }

    #[test]
    fn test_newer_stamp_skips_island() {
        let form = studio_form();
        let html = render_form(&form, &RenderOptions::default())
            .replacen("studio-form:v1", "studio-form:v9", 1);
        let recovery = recover(&html, &mut IdGenerator::counter("section"));
        assert_eq!(recovery.source, RecoverySource::Markup);
        assert_eq!(
            recovery.warnings,
            vec![RecoveryWarning::UnsupportedVersion { found: 9 }]
        );
    }

    #[test]
    fn test_broken_island_falls_through_to_markup() {
        let html = "<!-- studio-form:v1 -->\
                    <h2 class=\"section-title\">Dress Code</h2><div class=\"section-content\"><p>Black.</p></div>\
                    <script type=\"application/json\" id=\"studio-form-data\">{not json</script>";
        let recovery = recover(html, &mut IdGenerator::counter("section"));
        assert_eq!(recovery.source, RecoverySource::Markup);
        assert!(matches!(
            recovery.warnings.first(),
            Some(RecoveryWarning::InvalidDataIsland { .. })
        ));
        assert_eq!(recovery.sections.len(), 1);
        assert_eq!(recovery.sections[0].content, "<p>Black.</p>");
        assert_eq!(recovery.sections[0].kind, SectionKind::Custom);
    }

    #[test]
    fn test_unwrapped_sections_lose_trailing_closers() {
        let html = "<section><h2>Refund Policy</h2><p>No refunds.</p></section></body>";
        let recovery = recover(html, &mut IdGenerator::counter("section"));
        assert_eq!(recovery.sections[0].title, "Refund Policy");
        assert_eq!(recovery.sections[0].content, "<p>No refunds.</p>");
        assert_eq!(recovery.sections[0].kind, SectionKind::Policy);
    }

    #[test]
    fn test_oversized_document_degrades() {
        let html = "a".repeat(MAX_DOCUMENT_BYTES + 1);
        let recovery = recover(&html, &mut IdGenerator::counter("section"));
        assert_eq!(recovery.source, RecoverySource::Fallback);
        let too_large = BuilderError::DocumentTooLarge {
            size: MAX_DOCUMENT_BYTES + 1,
            limit: MAX_DOCUMENT_BYTES,
        };
        assert_eq!(
            recovery.warnings[0],
            RecoveryWarning::Failed {
                reason: too_large.to_string()
            }
        );
        assert_eq!(recovery.fields, RecoveredFields::default());
        assert_eq!(recovery.sections.len(), 3);
        assert!(recovery.is_degraded());
    }

    #[test]
    fn test_island_ids_are_normalised() {
        let mut form = studio_form();
        let dup = form.sections[0].id.clone();
        form.sections[1].id = dup.clone();
        let html = render_form(&form, &RenderOptions::default());
        let recovery = recover(&html, &mut IdGenerator::counter("section"));
        let ids: HashSet<_> = recovery.sections.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), recovery.sections.len());
        assert_eq!(recovery.sections[0].id, dup);
    }

    #[test]
    fn test_markup_tier_reads_declared_section_kind() {
        let mut ids = IdGenerator::counter("section");
        let mut form = FormModel::default();
        form.add_section(&mut ids, "Allergies", "<p>List them.</p>", SectionKind::Medical, 0);
        form.add_section(&mut ids, "Carpools", "<p>Ask the desk.</p>", SectionKind::Emergency, 1);
        let html = render_form(&form, &RenderOptions { embed_form_data: false });

        let recovery = recover(&html, &mut IdGenerator::counter("section"));
        let kinds: Vec<_> = recovery.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SectionKind::Medical, SectionKind::Emergency]);
    }

    #[test]
    fn test_undeclared_kind_is_inferred_from_title() {
        let html = "<section class=\"contract-section\" data-section-kind=\"terms\">\
                    <h2>Costumes</h2><p>Order by October.</p></section>\
                    <section><h2>Medical Release</h2><p>Call us.</p></section>";
        let recovery = recover(html, &mut IdGenerator::counter("section"));
        let kinds: Vec<_> = recovery.sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SectionKind::Terms, SectionKind::Medical]);
    }

    #[test]
    fn test_markup_tier_collapses_whitespace_in_text_fields() {
        let mut form = studio_form();
        form.company_name = "Pointe  and  Flex".to_string();
        form.season = " 2025-2026 ".to_string();

        let markup = render_form(&form, &RenderOptions { embed_form_data: false });
        let recovery = recover(&markup, &mut IdGenerator::counter("section"));
        assert_eq!(recovery.fields.company_name.as_deref(), Some("Pointe and Flex"));
        assert_eq!(recovery.fields.season.as_deref(), Some("2025-2026"));

        let island = render_form(&form, &RenderOptions::default());
        let recovery = recover(&island, &mut IdGenerator::counter("section"));
        assert_eq!(recovery.fields.company_name.as_deref(), Some("Pointe  and  Flex"));
    }
}
