//! One editing session: the element tree, the contract form, the selection and both id sources.
//!
//! The session is where the external data contracts meet the builder. It hydrates from a
//! [`LoadRecord`] and produces a [`SavePayload`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::element::Element;
use crate::engine::{BuilderEngine, BuilderOp, Outcome, Selection};
use crate::error::BuilderResult;
use crate::form::{FormModel, SectionKind, SectionPatch};
use crate::html::{self, RecoverySource, RecoveryWarning, RenderOptions};
use crate::ids::IdGenerator;
use crate::router::{self, DragGesture, RawDrag};
use crate::tree::DocumentTree;
use crate::validator::{validate_form, validate_tree};

/// Persisted contract as handed back by storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub html_content: String,
    /// Element tree saved alongside the HTML, when the record has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Element>>,
}

/// What the editor hands to storage on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub elements: Vec<Element>,
    pub html: String,
    #[serde(rename = "formData")]
    pub form_data: FormModel,
}

impl SavePayload {
    pub fn to_json(&self) -> BuilderResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// How the form of a loaded session was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source: RecoverySource,
    pub warnings: Vec<RecoveryWarning>,
    pub degraded: bool,
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    config: BuilderConfig,
    engine: BuilderEngine,
    form: FormModel,
    section_ids: IdGenerator,
    selection: Selection,
    load_report: Option<LoadReport>,
}

impl EditorSession {
    /// Empty tree and a default form with the built-in policy sections.
    pub fn new(config: BuilderConfig) -> BuilderResult<Self> {
        config.validate()?;
        let mut section_ids = IdGenerator::new(config.id_strategy, config.section_id_prefix.clone());
        let form = FormModel::with_default_sections(&mut section_ids);
        Ok(Self {
            engine: BuilderEngine::new(&config),
            form,
            section_ids,
            selection: Selection::new(),
            load_report: None,
            config,
        })
    }

    /// Resume a saved contract. The form is recovered from the HTML; absent fields take the
    /// form defaults. A saved element tree is validated before it is adopted.
    pub fn from_record(record: &LoadRecord, config: BuilderConfig) -> BuilderResult<Self> {
        config.validate()?;
        let mut section_ids = IdGenerator::new(config.id_strategy, config.section_id_prefix.clone());
        let recovery = html::recover(&record.html_content, &mut section_ids);
        let report = LoadReport {
            source: recovery.source,
            warnings: recovery.warnings.clone(),
            degraded: recovery.is_degraded(),
        };
        if report.degraded {
            warn!(
                source = %report.source,
                warnings = report.warnings.len(),
                "loaded contract with substituted sections"
            );
        }

        let engine = match &record.elements {
            Some(elements) => {
                BuilderEngine::with_tree(DocumentTree::from_elements(elements.clone()), &config)?
            }
            None => BuilderEngine::new(&config),
        };
        let form = FormModel::hydrate(recovery, &FormModel::default());
        info!(
            source = %report.source,
            sections = form.sections.len(),
            elements = engine.tree().total_len(),
            "session loaded"
        );

        Ok(Self {
            engine,
            form,
            section_ids,
            selection: Selection::new(),
            load_report: Some(report),
            config,
        })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn tree(&self) -> &DocumentTree {
        self.engine.tree()
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// `None` for sessions that did not start from a record.
    pub fn load_report(&self) -> Option<&LoadReport> {
        self.load_report.as_ref()
    }

    /// Select an element for the style panel. Unknown ids leave the selection as it is.
    pub fn select(&mut self, id: &str) -> bool {
        if self.engine.tree().contains(id) {
            self.selection.select(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ─── Tree ────────────────────────────────────────────────────────────────

    pub fn apply(&mut self, op: BuilderOp) -> BuilderResult<Outcome> {
        self.engine.apply(op, &mut self.selection)
    }

    /// Route a finished drag and apply it. Cancelled drags and drops on the catalog are no-ops.
    pub fn handle_drag(&mut self, raw: RawDrag) -> BuilderResult<Outcome> {
        let gesture = DragGesture::try_from(raw)?;
        match router::route(&gesture) {
            Some(op) => self.apply(op),
            None => {
                debug!(source = %gesture.source, "drag ignored");
                Ok(Outcome::Unchanged)
            }
        }
    }

    // ─── Form ────────────────────────────────────────────────────────────────

    /// Replace the fixed fields of the form, keeping the current sections.
    pub fn set_fields(&mut self, fields: FormModel) {
        let sections = std::mem::take(&mut self.form.sections);
        self.form = FormModel { sections, ..fields };
    }

    pub fn add_section(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        kind: SectionKind,
        index: usize,
    ) -> String {
        self.form
            .add_section(&mut self.section_ids, title, content, kind, index)
    }

    pub fn remove_section(&mut self, id: &str) -> Outcome {
        self.form.remove_section(id)
    }

    pub fn move_section(&mut self, from: usize, to: usize) -> Outcome {
        self.form.move_section(from, to)
    }

    pub fn duplicate_section(&mut self, id: &str) -> BuilderResult<String> {
        self.form.duplicate_section(&mut self.section_ids, id)
    }

    pub fn update_section(&mut self, id: &str, patch: &SectionPatch) -> Outcome {
        self.form.update_section(id, patch)
    }

    // ─── Output ──────────────────────────────────────────────────────────────

    pub fn render_contract(&self) -> String {
        html::render_form(&self.form, &RenderOptions::from(&self.config))
    }

    pub fn render_tree(&self) -> String {
        html::render_tree(self.engine.tree())
    }

    /// Validate both models and build the payload for storage.
    pub fn save(&self) -> BuilderResult<SavePayload> {
        validate_tree(self.engine.tree(), self.config.max_nesting_depth)?;
        validate_form(&self.form)?;
        Ok(SavePayload {
            elements: self.engine.tree().elements().to_vec(),
            html: self.render_contract(),
            form_data: self.form.clone(),
        })
    }
}
