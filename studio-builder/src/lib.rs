//! # Studio Document Builder
//!
//! Engine behind the drag-and-drop contract editor of a dance-studio administration app.
//!
//! ## Features
//! - A recursive tree of typed, styleable elements with all-or-nothing mutations
//! - Drag gesture routing from the catalog palette, the root list and container lists
//! - A structured contract form with dense section ordering
//! - Deterministic HTML generation with `{{marker}}` placeholders
//! - Best-effort recovery of the form from generated HTML, versioned and with warnings
//!
//! ## Example: building a tree
//! ```ignore
//! use studio_builder::{BuilderConfig, BuilderEngine, ListRef};
//!
//! let mut engine = BuilderEngine::new(&BuilderConfig::default());
//! let header = engine.insert("header", &ListRef::Root, 0)?;
//! engine.insert("tuition-table", &ListRef::Root, 1)?;
//! engine.duplicate(&header)?;
//! ```
//!
//! ## Example: contract round trip
//! ```ignore
//! use studio_builder::{html, FormModel, IdGenerator, RenderOptions};
//!
//! let mut ids = IdGenerator::counter("section");
//! let form = FormModel::with_default_sections(&mut ids);
//! let page = html::render_form(&form, &RenderOptions::default());
//! let recovery = html::recover(&page, &mut ids);
//! let back = FormModel::hydrate(recovery, &FormModel::default());
//! ```

pub mod catalog;
pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod form;
pub mod html;
pub mod ids;
pub mod markers;
pub mod router;
pub mod session;
pub mod style;
pub mod tree;
pub mod validator;

// --- Core types ---
pub use config::{BuilderConfig, IdStrategy};
pub use element::{DataSource, Element, ElementKind, ElementPatch, Settings};
pub use engine::{BuilderEngine, BuilderOp, Outcome, Selection};
pub use error::{BuilderError, BuilderResult};
pub use ids::IdGenerator;
pub use style::Styles;
pub use tree::{DocumentTree, ListRef, Location};

// --- Form and HTML ---
pub use form::{FormModel, Money, Section, SectionKind, SectionPatch};
pub use html::{Recovery, RecoverySource, RecoveryWarning, RenderOptions};

// --- Editor surface ---
pub use router::{route, DragGesture, DropZone, RawDrag};
pub use session::{EditorSession, LoadRecord, LoadReport, SavePayload};

/// Render a contract form with the given configuration.
pub fn render_contract(form: &FormModel, config: &BuilderConfig) -> String {
    html::render_form(form, &RenderOptions::from(config))
}

/// Recover a contract form from HTML, filling absent fields from [`FormModel::default`].
pub fn recover_contract(html: &str, config: &BuilderConfig) -> (FormModel, Recovery) {
    let mut ids = IdGenerator::new(config.id_strategy, config.section_id_prefix.clone());
    let recovery = html::recover(html, &mut ids);
    let form = FormModel::hydrate(recovery.clone(), &FormModel::default());
    (form, recovery)
}
