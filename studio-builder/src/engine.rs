//! Mutation surface over the [`DocumentTree`].
//!
//! Every operation is all-or-nothing: a rejected operation returns an error and leaves the tree
//! exactly as it was. Lookups of absent ids in `update` and `delete` are not errors; they report
//! [`Outcome::Unchanged`].

use std::collections::HashSet;
use tracing::debug;

use crate::catalog;
use crate::config::BuilderConfig;
use crate::element::{Element, ElementKind, ElementPatch};
use crate::error::{BuilderError, BuilderResult};
use crate::ids::IdGenerator;
use crate::tree::{DocumentTree, ListRef};
use crate::validator::validate_tree;

/// What an operation did to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new element was added under this id.
    Created(String),
    Changed,
    Unchanged,
}

impl Outcome {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }

    pub fn created_id(&self) -> Option<&str> {
        match self {
            Outcome::Created(id) => Some(id),
            _ => None,
        }
    }
}

/// The element highlighted in the editor for the style panel.
///
/// Session UI state; it lives beside the tree and is handed to the operations that can
/// invalidate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }
}

/// One engine operation as a value, produced by the drag router or by UI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderOp {
    Insert {
        kind: String,
        destination: ListRef,
        index: usize,
    },
    Reorder {
        list: ListRef,
        from: usize,
        to: usize,
    },
    Move {
        from_list: ListRef,
        from_index: usize,
        to_list: ListRef,
        to_index: usize,
    },
    Duplicate {
        id: String,
    },
    Delete {
        id: String,
    },
    Update {
        id: String,
        patch: ElementPatch,
    },
}

#[derive(Debug, Clone)]
pub struct BuilderEngine {
    tree: DocumentTree,
    ids: IdGenerator,
    max_nesting_depth: usize,
}

impl BuilderEngine {
    pub fn new(config: &BuilderConfig) -> Self {
        Self {
            tree: DocumentTree::new(),
            ids: IdGenerator::new(config.id_strategy, config.id_prefix.clone()),
            max_nesting_depth: config.max_nesting_depth,
        }
    }

    /// Resume editing an existing tree. The tree is validated first.
    pub fn with_tree(tree: DocumentTree, config: &BuilderConfig) -> BuilderResult<Self> {
        validate_tree(&tree, config.max_nesting_depth)?;
        let mut engine = Self::new(config);
        engine.tree = tree;
        Ok(engine)
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn into_tree(self) -> DocumentTree {
        self.tree
    }

    pub fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    pub fn apply(&mut self, op: BuilderOp, selection: &mut Selection) -> BuilderResult<Outcome> {
        match op {
            BuilderOp::Insert {
                kind,
                destination,
                index,
            } => self
                .insert(&kind, &destination, index)
                .map(Outcome::Created),
            BuilderOp::Reorder { list, from, to } => self.reorder(&list, from, to),
            BuilderOp::Move {
                from_list,
                from_index,
                to_list,
                to_index,
            } => self.move_between(&from_list, from_index, &to_list, to_index),
            BuilderOp::Duplicate { id } => self.duplicate(&id).map(Outcome::Created),
            BuilderOp::Delete { id } => Ok(self.delete(&id, selection)),
            BuilderOp::Update { id, patch } => Ok(self.update(&id, &patch)),
        }
    }

    /// Insert a new element of catalog kind `kind` (wire name) at `index` of `destination`.
    /// Returns the new element's id.
    pub fn insert(
        &mut self,
        kind: &str,
        destination: &ListRef,
        index: usize,
    ) -> BuilderResult<String> {
        let entry = catalog::lookup(kind)?;
        self.insert_kind(entry.kind, destination, index)
    }

    pub fn insert_kind(
        &mut self,
        kind: ElementKind,
        destination: &ListRef,
        index: usize,
    ) -> BuilderResult<String> {
        let entry = catalog::entry(kind);
        let height = usize::from(kind.is_container());
        self.check_placement(kind.as_str(), height, destination)?;

        let id = self.ids.next_id(&self.tree.ids());
        let element = Element {
            id: id.clone(),
            kind,
            content: (entry.default_content)(),
            styles: (entry.default_styles)(),
            settings: (entry.default_settings)(),
            children: kind.is_container().then(Vec::new),
        };

        let list = self.list_mut_or_invalid(destination)?;
        let at = index.min(list.len());
        list.insert(at, element);
        debug!(%id, %kind, list = %destination, index = at, "inserted element");
        Ok(id)
    }

    /// Move the element at `from` to `to` within the same list.
    pub fn reorder(&mut self, list: &ListRef, from: usize, to: usize) -> BuilderResult<Outcome> {
        let items = self.list_mut_or_invalid(list)?;
        if from >= items.len() || to >= items.len() || from == to {
            return Ok(Outcome::Unchanged);
        }
        let el = items.remove(from);
        items.insert(to, el);
        debug!(%list, from, to, "reordered");
        Ok(Outcome::Changed)
    }

    /// Move the element at `from_index` of `from_list` into `to_list` at `to_index`.
    pub fn move_between(
        &mut self,
        from_list: &ListRef,
        from_index: usize,
        to_list: &ListRef,
        to_index: usize,
    ) -> BuilderResult<Outcome> {
        if from_list == to_list {
            return self.reorder(from_list, from_index, to_index);
        }

        let source = self
            .tree
            .list(from_list)
            .ok_or_else(|| invalid_target(from_list, "source list does not exist"))?;
        let Some(moving) = source.get(from_index) else {
            return Ok(Outcome::Unchanged);
        };
        if let ListRef::Container(target) = to_list {
            if moving.contains_id(target) {
                return Err(BuilderError::NestingNotSupported {
                    id: moving.id.clone(),
                    max_depth: self.max_nesting_depth,
                });
            }
        }
        let moving_id = moving.id.clone();
        self.check_placement(&moving_id, moving.nesting_height(), to_list)?;

        // Both lists were checked above; neither lookup can fail from here on.
        let el = self.list_mut_or_invalid(from_list)?.remove(from_index);
        let dest = self.list_mut_or_invalid(to_list)?;
        let at = to_index.min(dest.len());
        dest.insert(at, el);
        debug!(id = %moving_id, from = %from_list, to = %to_list, index = at, "moved element");
        Ok(Outcome::Changed)
    }

    /// Deep-copy the element with `id` (fresh ids throughout) and place the copy right after it.
    /// Returns the copy's id.
    pub fn duplicate(&mut self, id: &str) -> BuilderResult<String> {
        let loc = self.tree.locate(id).ok_or_else(|| BuilderError::NotFound {
            id: id.to_string(),
        })?;
        let original = self
            .tree
            .find(id)
            .cloned()
            .ok_or_else(|| BuilderError::NotFound { id: id.to_string() })?;

        let mut taken = self.tree.ids();
        let copy = self.with_fresh_ids(original, &mut taken);
        let copy_id = copy.id.clone();

        let list = self.list_mut_or_invalid(&loc.list)?;
        list.insert(loc.index + 1, copy);
        debug!(%id, copy = %copy_id, "duplicated element");
        Ok(copy_id)
    }

    /// Remove the element with `id` and its subtree. Clears `selection` if it pointed into the
    /// removed subtree.
    pub fn delete(&mut self, id: &str, selection: &mut Selection) -> Outcome {
        let Some((removed, _)) = self.tree.remove(id) else {
            return Outcome::Unchanged;
        };
        if let Some(selected) = selection.selected() {
            if removed.contains_id(selected) {
                selection.clear();
            }
        }
        debug!(%id, kind = %removed.kind, "deleted element");
        Outcome::Changed
    }

    pub fn update(&mut self, id: &str, patch: &ElementPatch) -> Outcome {
        if patch.is_empty() {
            return Outcome::Unchanged;
        }
        let Some(el) = self.tree.find_mut(id) else {
            return Outcome::Unchanged;
        };
        if patch.apply_to(el) {
            debug!(%id, "updated element");
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }

    fn with_fresh_ids(&mut self, mut el: Element, taken: &mut HashSet<String>) -> Element {
        el.id = self.ids.next_id(taken);
        taken.insert(el.id.clone());
        if let Some(children) = el.children.take() {
            el.children = Some(
                children
                    .into_iter()
                    .map(|c| self.with_fresh_ids(c, taken))
                    .collect(),
            );
        }
        el
    }

    /// An element spanning `height` container levels may go into `destination`.
    fn check_placement(&self, what: &str, height: usize, destination: &ListRef) -> BuilderResult<()> {
        if let ListRef::Container(target) = destination {
            match self.tree.find(target) {
                None => return Err(invalid_target(destination, "no such element")),
                Some(el) if !el.is_container() => {
                    return Err(invalid_target(
                        destination,
                        &format!("'{}' elements cannot hold children", el.kind),
                    ))
                }
                Some(_) => {}
            }
        }
        let depth = self
            .tree
            .list_depth(destination)
            .ok_or_else(|| invalid_target(destination, "no such list"))?;
        if depth + height > self.max_nesting_depth {
            return Err(BuilderError::NestingNotSupported {
                id: what.to_string(),
                max_depth: self.max_nesting_depth,
            });
        }
        Ok(())
    }

    fn list_mut_or_invalid(&mut self, list: &ListRef) -> BuilderResult<&mut Vec<Element>> {
        self.tree
            .list_mut(list)
            .ok_or_else(|| invalid_target(list, "no such container"))
    }
}

fn invalid_target(list: &ListRef, reason: &str) -> BuilderError {
    BuilderError::InvalidTarget {
        target: list.to_string(),
        reason: reason.to_string(),
    }
}
