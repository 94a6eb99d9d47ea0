use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{BuilderError, BuilderResult};
use crate::style::{parse_style_string, Styles};

/// Kind-specific options of an element, e.g. `title` for a policy section or `src` for an image.
pub type Settings = BTreeMap<String, serde_json::Value>;

/// The closed set of element kinds a document can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Header,
    Text,
    Divider,
    StudentInfo,
    ParentInfo,
    TuitionTable,
    #[serde(rename = "custom-policy")]
    CustomPolicy,
    #[serde(rename = "signature")]
    SignatureBlock,
    Image,
    Table,
    Chart,
    Container,
}

/// Which record a data-bound section pulls its markers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Student,
    Parent,
    Tuition,
}

impl ElementKind {
    pub const ALL: [ElementKind; 12] = [
        ElementKind::Header,
        ElementKind::Text,
        ElementKind::Divider,
        ElementKind::StudentInfo,
        ElementKind::ParentInfo,
        ElementKind::TuitionTable,
        ElementKind::CustomPolicy,
        ElementKind::SignatureBlock,
        ElementKind::Image,
        ElementKind::Table,
        ElementKind::Chart,
        ElementKind::Container,
    ];

    /// Wire name, as used in payloads and drag identifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Header => "header",
            ElementKind::Text => "text",
            ElementKind::Divider => "divider",
            ElementKind::StudentInfo => "student-info",
            ElementKind::ParentInfo => "parent-info",
            ElementKind::TuitionTable => "tuition-table",
            ElementKind::CustomPolicy => "custom-policy",
            ElementKind::SignatureBlock => "signature",
            ElementKind::Image => "image",
            ElementKind::Table => "table",
            ElementKind::Chart => "chart",
            ElementKind::Container => "container",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(self, ElementKind::Container)
    }

    pub fn data_source(self) -> Option<DataSource> {
        match self {
            ElementKind::StudentInfo => Some(DataSource::Student),
            ElementKind::ParentInfo => Some(DataSource::Parent),
            ElementKind::TuitionTable => Some(DataSource::Tuition),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| BuilderError::UnknownKind {
                kind: s.to_string(),
            })
    }
}

/// A node of the document tree.
///
/// `children` is `Some` exactly when `kind` is [`ElementKind::Container`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: Styles,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Element>>,
}

impl Element {
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Child list of a container, empty for every other kind.
    pub fn children(&self) -> &[Element] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// String-valued setting, if present.
    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(|v| v.as_str())
    }

    /// Depth-first visit of this element and all of its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Number of container levels this element spans: 0 for a leaf, 1 for an empty container,
    /// 1 + the deepest child otherwise.
    pub fn nesting_height(&self) -> usize {
        if !self.is_container() {
            return 0;
        }
        1 + self
            .children()
            .iter()
            .map(Element::nesting_height)
            .max()
            .unwrap_or(0)
    }

    /// True when `id` names this element or one of its descendants.
    pub fn contains_id(&self, id: &str) -> bool {
        self.id == id || self.children().iter().any(|c| c.contains_id(id))
    }
}

/// Partial update applied by `update`: `content` replaces, `styles` and `settings` merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl ElementPatch {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn styles(styles: Styles) -> Self {
        Self {
            styles: Some(styles),
            ..Self::default()
        }
    }

    /// Style update typed into the style panel as `"key:value; key2:value2"`.
    pub fn style_string(s: &str) -> BuilderResult<Self> {
        Ok(Self::styles(parse_style_string(s)?))
    }

    pub fn settings(settings: Settings) -> Self {
        Self {
            settings: Some(settings),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.styles.is_none() && self.settings.is_none()
    }

    /// Apply to `element`. Returns true if anything changed.
    pub fn apply_to(&self, element: &mut Element) -> bool {
        let before = element.clone();
        if let Some(content) = &self.content {
            element.content = Some(content.clone());
        }
        if let Some(styles) = &self.styles {
            for (k, v) in styles {
                element.styles.insert(k.clone(), v.clone());
            }
        }
        if let Some(settings) = &self.settings {
            for (k, v) in settings {
                element.settings.insert(k.clone(), v.clone());
            }
        }
        *element != before
    }
}
