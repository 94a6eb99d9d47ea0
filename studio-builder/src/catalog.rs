//! Static registry of element kinds and their defaults.

use serde::Serialize;
use serde_json::json;

use crate::element::{ElementKind, Settings};
use crate::error::{BuilderError, BuilderResult};
use crate::markers::{self, marker};
use crate::style::{styles, Styles};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Layout,
    Content,
    Data,
    Signature,
}

/// Immutable description of one element kind.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub kind: ElementKind,
    pub label: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub default_content: fn() -> Option<String>,
    pub default_styles: fn() -> Styles,
    pub default_settings: fn() -> Settings,
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        kind: ElementKind::Header,
        label: "Header",
        category: Category::Layout,
        description: "Document or section heading",
        default_content: header_content,
        default_styles: header_styles,
        default_settings: Settings::new,
    },
    CatalogEntry {
        kind: ElementKind::Text,
        label: "Text Block",
        category: Category::Content,
        description: "Free-form rich text paragraph",
        default_content: text_content,
        default_styles: text_styles,
        default_settings: Settings::new,
    },
    CatalogEntry {
        kind: ElementKind::Divider,
        label: "Divider",
        category: Category::Layout,
        description: "Horizontal rule between blocks",
        default_content: no_content,
        default_styles: divider_styles,
        default_settings: Settings::new,
    },
    CatalogEntry {
        kind: ElementKind::StudentInfo,
        label: "Student Information",
        category: Category::Data,
        description: "Student name, date of birth and division",
        default_content: student_content,
        default_styles: section_styles,
        default_settings: student_settings,
    },
    CatalogEntry {
        kind: ElementKind::ParentInfo,
        label: "Parent Information",
        category: Category::Data,
        description: "Parent or guardian contact details",
        default_content: parent_content,
        default_styles: section_styles,
        default_settings: parent_settings,
    },
    CatalogEntry {
        kind: ElementKind::TuitionTable,
        label: "Tuition Table",
        category: Category::Data,
        description: "Monthly tuition and fee breakdown",
        default_content: tuition_content,
        default_styles: section_styles,
        default_settings: tuition_settings,
    },
    CatalogEntry {
        kind: ElementKind::CustomPolicy,
        label: "Policy Section",
        category: Category::Content,
        description: "Titled policy paragraph",
        default_content: policy_content,
        default_styles: section_styles,
        default_settings: policy_settings,
    },
    CatalogEntry {
        kind: ElementKind::SignatureBlock,
        label: "Signature Block",
        category: Category::Signature,
        description: "Parent and studio signature lines",
        default_content: signature_content,
        default_styles: signature_styles,
        default_settings: Settings::new,
    },
    CatalogEntry {
        kind: ElementKind::Image,
        label: "Image",
        category: Category::Content,
        description: "Logo or picture",
        default_content: no_content,
        default_styles: image_styles,
        default_settings: image_settings,
    },
    CatalogEntry {
        kind: ElementKind::Table,
        label: "Table",
        category: Category::Data,
        description: "Simple grid of cells",
        default_content: no_content,
        default_styles: table_styles,
        default_settings: table_settings,
    },
    CatalogEntry {
        kind: ElementKind::Chart,
        label: "Chart",
        category: Category::Data,
        description: "Chart placeholder filled in by the report service",
        default_content: no_content,
        default_styles: chart_styles,
        default_settings: chart_settings,
    },
    CatalogEntry {
        kind: ElementKind::Container,
        label: "Container",
        category: Category::Layout,
        description: "Groups other elements",
        default_content: no_content,
        default_styles: container_styles,
        default_settings: Settings::new,
    },
];

/// Entry for `kind`. Every kind has exactly one entry.
pub fn entry(kind: ElementKind) -> &'static CatalogEntry {
    CATALOG
        .iter()
        .find(|e| e.kind == kind)
        .unwrap_or_else(|| unreachable!("catalog is missing an entry for {kind}"))
}

/// Look up an entry by wire name (`"tuition-table"`).
pub fn lookup(name: &str) -> BuilderResult<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|e| e.kind.as_str() == name)
        .ok_or_else(|| BuilderError::UnknownKind {
            kind: name.to_string(),
        })
}

/// Entries in `category`, in catalog order.
pub fn by_category(category: Category) -> impl Iterator<Item = &'static CatalogEntry> {
    CATALOG.iter().filter(move |e| e.category == category)
}

// ─── Factories ───────────────────────────────────────────────────────────────

fn no_content() -> Option<String> {
    None
}

fn header_content() -> Option<String> {
    Some("Enrollment Agreement".to_string())
}

fn text_content() -> Option<String> {
    Some("<p>Enter your text here.</p>".to_string())
}

fn student_content() -> Option<String> {
    Some(format!(
        "<p><strong>Student Name:</strong> {}</p>\
         <p><strong>Date of Birth:</strong> {}</p>\
         <p><strong>Division:</strong> {}</p>",
        marker(markers::STUDENT_NAME),
        marker(markers::STUDENT_DOB),
        marker(markers::DIVISION),
    ))
}

fn parent_content() -> Option<String> {
    Some(format!(
        "<p><strong>Parent/Guardian:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Phone:</strong> {}</p>\
         <p><strong>Emergency Contact:</strong> {}</p>",
        marker(markers::PARENT_NAME),
        marker(markers::PARENT_EMAIL),
        marker(markers::PARENT_PHONE),
        marker(markers::EMERGENCY_CONTACT),
    ))
}

fn tuition_content() -> Option<String> {
    Some(format!(
        "<table><tr><th>Division</th><th>Monthly Tuition</th></tr>\
         <tr><td>{}</td><td>{}</td></tr></table>",
        marker(markers::DIVISION),
        marker(markers::MONTHLY_TUITION),
    ))
}

fn policy_content() -> Option<String> {
    Some("<p>Describe the policy here.</p>".to_string())
}

fn signature_content() -> Option<String> {
    Some(format!(
        "<p><strong>Parent/Guardian Signature:</strong> {}</p>\
         <p><strong>Date:</strong> {}</p>\
         <p><strong>Studio Representative:</strong> {}</p>",
        marker(markers::PARENT_SIGNATURE),
        marker(markers::SIGNATURE_DATE),
        marker(markers::STUDIO_SIGNATURE),
    ))
}

fn header_styles() -> Styles {
    styles([
        ("fontSize", "24px"),
        ("fontWeight", "bold"),
        ("textAlign", "center"),
        ("marginBottom", "16px"),
    ])
}

fn text_styles() -> Styles {
    styles([("fontSize", "14px"), ("lineHeight", "1.6")])
}

fn divider_styles() -> Styles {
    styles([
        ("borderTop", "1px solid #d4d4d8"),
        ("marginTop", "16px"),
        ("marginBottom", "16px"),
    ])
}

fn section_styles() -> Styles {
    styles([("marginBottom", "16px"), ("padding", "8px")])
}

fn signature_styles() -> Styles {
    styles([("marginTop", "32px")])
}

fn image_styles() -> Styles {
    styles([("maxWidth", "100%")])
}

fn table_styles() -> Styles {
    styles([("width", "100%"), ("borderCollapse", "collapse")])
}

fn chart_styles() -> Styles {
    styles([("width", "100%"), ("minHeight", "240px")])
}

fn container_styles() -> Styles {
    styles([("padding", "12px"), ("border", "1px dashed #a1a1aa")])
}

fn student_settings() -> Settings {
    Settings::from([("dataSource".to_string(), json!("student"))])
}

fn parent_settings() -> Settings {
    Settings::from([("dataSource".to_string(), json!("parent"))])
}

fn tuition_settings() -> Settings {
    Settings::from([("dataSource".to_string(), json!("tuition"))])
}

fn policy_settings() -> Settings {
    Settings::from([("title".to_string(), json!("Policy"))])
}

fn image_settings() -> Settings {
    Settings::from([
        ("src".to_string(), json!("")),
        ("alt".to_string(), json!("")),
    ])
}

fn table_settings() -> Settings {
    Settings::from([
        ("columns".to_string(), json!(["Column 1", "Column 2"])),
        ("rows".to_string(), json!([["", ""]])),
    ])
}

fn chart_settings() -> Settings {
    Settings::from([
        ("chartType".to_string(), json!("bar")),
        ("dataKey".to_string(), json!("enrollment")),
    ])
}
