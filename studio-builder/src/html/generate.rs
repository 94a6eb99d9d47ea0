//! Form and tree to HTML.
//!
//! Output is a pure function of the input: no timestamps, no random values, maps emitted in
//! key order. Calling a renderer twice on the same value yields byte-identical strings.

use serde_json::Value;

use super::*;
use crate::catalog;
use crate::config::BuilderConfig;
use crate::element::{Element, ElementKind};
use crate::form::{FormModel, Money};
use crate::markers::{self, marker};
use crate::style::{merge_styles, style_to_css};
use crate::tree::DocumentTree;

/// Base document styles for generated contracts.
const CONTRACT_BASE_STYLES: &str = ".contract-document{font-family:Georgia,serif;color:#18181b;max-width:800px;margin:0 auto;padding:32px;line-height:1.6;}\
.contract-title{text-align:center;font-size:28px;margin:0 0 8px;}\
.contract-contact,.contract-season{text-align:center;margin:2px 0;color:#52525b;}\
.contract-section{margin-top:24px;}\
.section-title{font-size:18px;border-bottom:1px solid #d4d4d8;padding-bottom:4px;}\
.section-content table{border-collapse:collapse;width:100%;}\
.section-content th,.section-content td{border:1px solid #d4d4d8;padding:6px 10px;text-align:left;}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append the JSON data island holding the serialised form.
    pub embed_form_data: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            embed_form_data: true,
        }
    }
}

impl From<&BuilderConfig> for RenderOptions {
    fn from(config: &BuilderConfig) -> Self {
        Self {
            embed_form_data: config.embed_form_data,
        }
    }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// Render a contract form.
///
/// Emission order: version stamp, stylesheet, organisation header (name, contact, season),
/// Student Information, Tuition & Fees, Payment Terms, Termination Policy, the dynamic sections
/// in `order` sequence, Signatures, then the optional data island.
pub fn render_form(form: &FormModel, options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}{} -->\n", STAMP_PREFIX, FORMAT_VERSION));
    out.push_str(&format!("<style>{}</style>\n", CONTRACT_BASE_STYLES));
    out.push_str("<div class=\"contract-document\">\n");

    render_header(form, &mut out);

    render_fixed_section(
        &mut out,
        STUDENT_INFO_TITLE,
        &[
            labeled("Student Name", &marker(markers::STUDENT_NAME)),
            labeled("Date of Birth", &marker(markers::STUDENT_DOB)),
            labeled("Age", &marker(markers::STUDENT_AGE)),
            labeled("Division", &marker(markers::DIVISION)),
            labeled("Parent/Guardian", &marker(markers::PARENT_NAME)),
            labeled("Parent Email", &marker(markers::PARENT_EMAIL)),
            labeled("Parent Phone", &marker(markers::PARENT_PHONE)),
            labeled("Emergency Contact", &marker(markers::EMERGENCY_CONTACT)),
        ],
    );

    render_fixed_section(
        &mut out,
        TUITION_TITLE,
        &[
            labeled(LABEL_RECREATIONAL, &per_month(form.recreational_fee)),
            labeled(LABEL_COMPETITIVE, &per_month(form.competitive_fee)),
            labeled(LABEL_ELITE, &per_month(form.elite_fee)),
            labeled(
                LABEL_REGISTRATION,
                &format!("{} (non-refundable, due at enrollment)", form.registration_fee),
            ),
            labeled(LABEL_MONTHLY_TUITION, &marker(markers::MONTHLY_TUITION)),
        ],
    );

    render_fixed_section(
        &mut out,
        PAYMENT_TERMS_TITLE,
        &[
            labeled(
                LABEL_DUE_DATE,
                &format!(
                    "Tuition is due on the {} of each month.",
                    ordinal(form.payment_due_day)
                ),
            ),
            labeled(
                LABEL_INVOICE_DATE,
                &format!(
                    "Invoices are sent on the {} of each month.",
                    ordinal(form.invoice_day)
                ),
            ),
            labeled(LABEL_LATE_FEE, &form.late_fee.to_string()),
            labeled(
                LABEL_GRACE_PERIOD,
                &format!("{} after the due date", days(form.late_fee_grace_days)),
            ),
        ],
    );

    render_fixed_section(
        &mut out,
        TERMINATION_TITLE,
        &[labeled(
            LABEL_TERMINATION,
            &format!(
                "{} written notice is required to withdraw from classes.",
                days(form.termination_notice_days)
            ),
        )],
    );

    let mut sections: Vec<_> = form.sections.iter().collect();
    sections.sort_by_key(|s| s.order);
    for section in sections {
        out.push_str(&format!(
            "<section class=\"contract-section\" data-section-kind=\"{}\">\n",
            section.kind.as_str()
        ));
        push_heading_and_content(&mut out, &section.title, &section.content);
        out.push_str("</section>\n");
    }

    render_fixed_section(
        &mut out,
        SIGNATURES_TITLE,
        &[
            labeled("Parent/Guardian Signature", &marker(markers::PARENT_SIGNATURE)),
            labeled("Date", &marker(markers::SIGNATURE_DATE)),
            labeled("Studio Representative", &marker(markers::STUDIO_SIGNATURE)),
            labeled("Contract Date", &marker(markers::CONTRACT_DATE)),
        ],
    );

    out.push_str("</div>\n");

    if options.embed_form_data {
        render_data_island(form, &mut out);
    }
    out
}

fn render_header(form: &FormModel, out: &mut String) {
    out.push_str("<header class=\"contract-header\">\n");
    out.push_str(&format!(
        "<h1 class=\"contract-title\">{}</h1>\n",
        escape_html(&form.company_name)
    ));
    for (label, value) in [
        (LABEL_ADDRESS, &form.company_address),
        (LABEL_PHONE, &form.company_phone),
        (LABEL_EMAIL, &form.company_email),
    ] {
        if !value.trim().is_empty() {
            out.push_str(&format!(
                "<p class=\"contract-contact\">{}</p>\n",
                strong_label(label, &escape_html(value))
            ));
        }
    }
    out.push_str(&format!(
        "<p class=\"contract-season\">{}</p>\n",
        strong_label(LABEL_SEASON, &escape_html(&form.season))
    ));
    out.push_str("</header>\n");
}

fn render_fixed_section(out: &mut String, title: &str, lines: &[String]) {
    out.push_str(&format!(
        "<section class=\"contract-section\" data-section=\"{}\">\n",
        slug(title)
    ));
    push_heading_and_content(out, title, &lines.join("\n"));
    out.push_str("</section>\n");
}

/// The heading/content pair recovery keys on: title as literal text, content right after.
fn push_heading_and_content(out: &mut String, title: &str, content: &str) {
    out.push_str(&format!(
        "<h2 class=\"section-title\">{}</h2>\n",
        escape_html(title)
    ));
    out.push_str(CONTENT_OPEN);
    out.push('\n');
    out.push_str(content.trim());
    out.push_str("\n</div>\n");
}

fn render_data_island(form: &FormModel, out: &mut String) {
    // Serialising a plain data struct cannot fail; skip the island rather than abort if it did.
    let Ok(json) = serde_json::to_string(form) else {
        tracing::warn!("form could not be serialised, data island omitted");
        return;
    };
    out.push_str(&format!(
        "<script type=\"application/json\" id=\"{}\">{}</script>\n",
        DATA_ISLAND_ID,
        json_for_script(&json)
    ));
}

/// Escape the characters that could end the script element or read as markup. `<`, `>` and
/// `&` only occur inside JSON strings, where `\uXXXX` escapes are equivalent.
fn json_for_script(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn labeled(label: &str, value: &str) -> String {
    format!("<p>{}</p>", strong_label(label, value))
}

fn strong_label(label: &str, value: &str) -> String {
    format!("<strong>{}:</strong> {}", escape_html(label), value)
}

fn per_month(amount: Money) -> String {
    format!("{} per month", amount)
}

fn days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

fn slug(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ─── Tree ────────────────────────────────────────────────────────────────────

/// Render a document tree, elements in list order, containers recursively.
pub fn render_tree(tree: &DocumentTree) -> String {
    let mut out = String::from("<div class=\"builder-document\">\n");
    for el in tree.elements() {
        element_to_html(el, &mut out);
    }
    out.push_str("</div>\n");
    out
}

fn element_to_html(el: &Element, out: &mut String) {
    let entry = catalog::entry(el.kind);
    let css = style_to_css(&merge_styles(&(entry.default_styles)(), &el.styles));
    let style = if css.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", escape_html(&css))
    };
    let content = el.content.as_deref().unwrap_or("");

    match el.kind {
        ElementKind::Header => {
            let level = el
                .settings
                .get("level")
                .and_then(Value::as_u64)
                .filter(|l| (1..=6).contains(l))
                .unwrap_or(1);
            out.push_str(&format!(
                "<h{0} class=\"el-header\"{1}>{2}</h{0}>\n",
                level,
                style,
                escape_html(content)
            ));
        }
        ElementKind::Text => {
            out.push_str(&format!("<div class=\"el-text\"{}>{}</div>\n", style, content));
        }
        ElementKind::Divider => {
            out.push_str(&format!("<hr class=\"el-divider\"{} />\n", style));
        }
        ElementKind::StudentInfo | ElementKind::ParentInfo | ElementKind::TuitionTable => {
            let source = el
                .kind
                .data_source()
                .and_then(|s| serde_json::to_value(s).ok())
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            out.push_str(&format!(
                "<section class=\"el-data\" data-source=\"{}\"{}>\n{}\n</section>\n",
                source, style, content
            ));
        }
        ElementKind::CustomPolicy => {
            let title = el.setting_str("title").unwrap_or("Policy");
            out.push_str(&format!("<section class=\"el-policy\"{}>\n", style));
            push_heading_and_content(out, title, content);
            out.push_str("</section>\n");
        }
        ElementKind::SignatureBlock => {
            out.push_str(&format!(
                "<div class=\"el-signature\"{}>{}</div>\n",
                style, content
            ));
        }
        ElementKind::Image => match el.setting_str("src").filter(|s| !s.is_empty()) {
            Some(src) => out.push_str(&format!(
                "<img class=\"el-image\" src=\"{}\" alt=\"{}\"{} />\n",
                escape_html(src),
                escape_html(el.setting_str("alt").unwrap_or("")),
                style
            )),
            None => out.push_str(&format!(
                "<div class=\"el-image el-placeholder\"{}>Image</div>\n",
                style
            )),
        },
        ElementKind::Table => {
            if el.content.is_some() {
                out.push_str(&format!("<div class=\"el-table\"{}>{}</div>\n", style, content));
            } else {
                render_settings_table(el, &style, out);
            }
        }
        ElementKind::Chart => {
            out.push_str(&format!(
                "<div class=\"el-chart\" data-chart-type=\"{}\" data-key=\"{}\"{}></div>\n",
                escape_html(el.setting_str("chartType").unwrap_or("bar")),
                escape_html(el.setting_str("dataKey").unwrap_or("")),
                style
            ));
        }
        ElementKind::Container => {
            out.push_str(&format!("<div class=\"el-container\"{}>\n", style));
            for child in el.children() {
                element_to_html(child, out);
            }
            out.push_str("</div>\n");
        }
    }
}

/// Build a table from the `columns` and `rows` settings.
fn render_settings_table(el: &Element, style: &str, out: &mut String) {
    let cell = |v: &Value| -> String {
        match v {
            Value::String(s) => escape_html(s),
            Value::Null => String::new(),
            other => escape_html(&other.to_string()),
        }
    };

    out.push_str(&format!("<table class=\"el-table\"{}>", style));
    if let Some(columns) = el.settings.get("columns").and_then(Value::as_array) {
        out.push_str("<thead><tr>");
        for c in columns {
            out.push_str(&format!("<th>{}</th>", cell(c)));
        }
        out.push_str("</tr></thead>");
    }
    out.push_str("<tbody>");
    if let Some(rows) = el.settings.get("rows").and_then(Value::as_array) {
        for row in rows {
            out.push_str("<tr>");
            for v in row.as_array().map(Vec::as_slice).unwrap_or(&[]) {
                out.push_str(&format!("<td>{}</td>", cell(v)));
            }
            out.push_str("</tr>");
        }
    }
    out.push_str("</tbody></table>\n");
}
