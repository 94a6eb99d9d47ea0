use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::element::Element;

/// Identifies one ordered list of the tree: the root list or a container's children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListRef {
    Root,
    Container(String),
}

impl ListRef {
    pub fn container(id: impl Into<String>) -> Self {
        ListRef::Container(id.into())
    }
}

impl fmt::Display for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListRef::Root => f.write_str("root"),
            ListRef::Container(id) => write!(f, "container:{}", id),
        }
    }
}

/// Where an element sits: its list, its index in that list, and how many containers enclose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub list: ListRef,
    pub index: usize,
    pub depth: usize,
}

/// The ordered, recursively nestable document being built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentTree {
    elements: Vec<Element>,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing element list. Run [`crate::validator::validate_tree`] on lists that come
    /// from outside the engine.
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Length of the root list.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements at every level.
    pub fn total_len(&self) -> usize {
        let mut n = 0;
        self.walk(|_| n += 1);
        n
    }

    /// Depth-first, document-order visit of every element.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a Element)) {
        for el in &self.elements {
            el.walk(&mut visit);
        }
    }

    /// Every id currently in the tree.
    pub fn ids(&self) -> HashSet<String> {
        let mut ids = HashSet::new();
        self.walk(|el| {
            ids.insert(el.id.clone());
        });
        ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        find_in(&self.elements, id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        find_in_mut(&mut self.elements, id)
    }

    pub fn locate(&self, id: &str) -> Option<Location> {
        locate_in(&self.elements, id, ListRef::Root, 0)
    }

    /// The list named by `list`, or `None` if it names a missing element or a non-container.
    pub fn list(&self, list: &ListRef) -> Option<&[Element]> {
        match list {
            ListRef::Root => Some(&self.elements),
            ListRef::Container(id) => self.find(id).and_then(|el| el.children.as_deref()),
        }
    }

    pub fn list_mut(&mut self, list: &ListRef) -> Option<&mut Vec<Element>> {
        match list {
            ListRef::Root => Some(&mut self.elements),
            ListRef::Container(id) => self.find_mut(id).and_then(|el| el.children.as_mut()),
        }
    }

    /// Container depth of the elements held by `list`: 0 for the root list.
    pub fn list_depth(&self, list: &ListRef) -> Option<usize> {
        match list {
            ListRef::Root => Some(0),
            ListRef::Container(id) => {
                let loc = self.locate(id)?;
                self.find(id)
                    .filter(|el| el.is_container())
                    .map(|_| loc.depth + 1)
            }
        }
    }

    /// Remove the element (and its subtree) with `id`.
    pub fn remove(&mut self, id: &str) -> Option<(Element, Location)> {
        let loc = self.locate(id)?;
        let list = self.list_mut(&loc.list)?;
        let el = list.remove(loc.index);
        Some((el, loc))
    }
}

fn find_in<'a>(list: &'a [Element], id: &str) -> Option<&'a Element> {
    for el in list {
        if el.id == id {
            return Some(el);
        }
        if let Some(found) = find_in(el.children(), id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(list: &'a mut [Element], id: &str) -> Option<&'a mut Element> {
    for el in list.iter_mut() {
        if el.id == id {
            return Some(el);
        }
        if let Some(children) = el.children.as_mut() {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn locate_in(list: &[Element], id: &str, list_ref: ListRef, depth: usize) -> Option<Location> {
    for (index, el) in list.iter().enumerate() {
        if el.id == id {
            return Some(Location {
                list: list_ref,
                index,
                depth,
            });
        }
        if el.is_container() {
            if let Some(loc) = locate_in(
                el.children(),
                id,
                ListRef::Container(el.id.clone()),
                depth + 1,
            ) {
                return Some(loc);
            }
        }
    }
    None
}
