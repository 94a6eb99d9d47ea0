//! Classifies a finished drag gesture into an engine operation.
//!
//! The editor has three kinds of drop zone: the catalog palette, the root list and each
//! container's child list. Which operation a drag means depends only on where it started and
//! where it ended.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::BuilderOp;
use crate::error::BuilderError;
use crate::tree::ListRef;

const CATALOG_ZONE: &str = "catalog";
const ROOT_ZONE: &str = "root";
const CONTAINER_ZONE_PREFIX: &str = "container:";
/// Catalog items may be dragged as `catalog-<kind>`.
const CATALOG_ITEM_PREFIX: &str = "catalog-";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropZone {
    Catalog,
    List(ListRef),
}

impl DropZone {
    pub fn list(&self) -> Option<&ListRef> {
        match self {
            DropZone::Catalog => None,
            DropZone::List(list) => Some(list),
        }
    }
}

impl FromStr for DropZone {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CATALOG_ZONE => Ok(DropZone::Catalog),
            ROOT_ZONE => Ok(DropZone::List(ListRef::Root)),
            _ => match s.strip_prefix(CONTAINER_ZONE_PREFIX) {
                Some(id) if !id.trim().is_empty() => Ok(DropZone::List(ListRef::container(id))),
                _ => Err(BuilderError::InvalidListId {
                    value: s.to_string(),
                }),
            },
        }
    }
}

impl fmt::Display for DropZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropZone::Catalog => f.write_str(CATALOG_ZONE),
            DropZone::List(list) => fmt::Display::fmt(list, f),
        }
    }
}

/// A drag as reported by the editor, already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragGesture {
    pub source: DropZone,
    pub source_index: usize,
    /// `None` when the drag was cancelled or dropped outside every zone.
    pub destination: Option<DropZone>,
    pub destination_index: usize,
    /// Element id, or the catalog kind for drags out of the palette.
    pub dragged_id: String,
}

/// Wire form of a drag, with list ids as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDrag {
    pub source_list_id: String,
    pub source_index: usize,
    #[serde(default)]
    pub destination_list_id: Option<String>,
    #[serde(default)]
    pub destination_index: usize,
    pub dragged_id: String,
}

impl TryFrom<RawDrag> for DragGesture {
    type Error = BuilderError;

    fn try_from(raw: RawDrag) -> Result<Self, Self::Error> {
        Ok(DragGesture {
            source: raw.source_list_id.parse()?,
            source_index: raw.source_index,
            destination: raw
                .destination_list_id
                .as_deref()
                .map(str::parse)
                .transpose()?,
            destination_index: raw.destination_index,
            dragged_id: raw.dragged_id,
        })
    }
}

/// The operation a gesture stands for, or `None` when it must not touch the tree.
pub fn route(gesture: &DragGesture) -> Option<BuilderOp> {
    let destination = match &gesture.destination {
        None | Some(DropZone::Catalog) => return None,
        Some(DropZone::List(list)) => list.clone(),
    };

    let op = match &gesture.source {
        DropZone::Catalog => BuilderOp::Insert {
            kind: catalog_kind(&gesture.dragged_id).to_string(),
            destination,
            index: gesture.destination_index,
        },
        DropZone::List(source) if *source == destination => BuilderOp::Reorder {
            list: destination,
            from: gesture.source_index,
            to: gesture.destination_index,
        },
        DropZone::List(source) => BuilderOp::Move {
            from_list: source.clone(),
            from_index: gesture.source_index,
            to_list: destination,
            to_index: gesture.destination_index,
        },
    };
    tracing::trace!(?op, "routed drag gesture");
    Some(op)
}

fn catalog_kind(dragged_id: &str) -> &str {
    dragged_id
        .strip_prefix(CATALOG_ITEM_PREFIX)
        .unwrap_or(dragged_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gesture(source: &str, src: usize, destination: Option<&str>, dst: usize, id: &str) -> DragGesture {
        DragGesture::try_from(RawDrag {
            source_list_id: source.to_string(),
            source_index: src,
            destination_list_id: destination.map(str::to_string),
            destination_index: dst,
            dragged_id: id.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_parses_zone_ids() {
        assert_eq!("catalog".parse::<DropZone>().unwrap(), DropZone::Catalog);
        assert_eq!(
            "root".parse::<DropZone>().unwrap(),
            DropZone::List(ListRef::Root)
        );
        assert_eq!(
            "container:element-4".parse::<DropZone>().unwrap(),
            DropZone::List(ListRef::container("element-4"))
        );
        for bad in ["", "Root", "container:", "canvas"] {
            assert_eq!(
                bad.parse::<DropZone>().unwrap_err(),
                BuilderError::InvalidListId {
                    value: bad.to_string()
                }
            );
        }
    }

    #[test]
    fn test_catalog_drops_insert() {
        assert_eq!(
            route(&gesture("catalog", 3, Some("root"), 2, "catalog-header")),
            Some(BuilderOp::Insert {
                kind: "header".to_string(),
                destination: ListRef::Root,
                index: 2
            })
        );
        assert_eq!(
            route(&gesture("catalog", 0, Some("container:c1"), 0, "divider")),
            Some(BuilderOp::Insert {
                kind: "divider".to_string(),
                destination: ListRef::container("c1"),
                index: 0
            })
        );
    }

    #[test]
    fn test_same_list_reorders() {
        assert_eq!(
            route(&gesture("root", 0, Some("root"), 1, "e1")),
            Some(BuilderOp::Reorder {
                list: ListRef::Root,
                from: 0,
                to: 1
            })
        );
        assert_eq!(
            route(&gesture("container:c1", 1, Some("container:c1"), 0, "e2")),
            Some(BuilderOp::Reorder {
                list: ListRef::container("c1"),
                from: 1,
                to: 0
            })
        );
    }

    #[test]
    fn test_cross_list_moves() {
        for (from, to) in [
            ("root", "container:c1"),
            ("container:c1", "root"),
            ("container:c1", "container:c2"),
        ] {
            let op = route(&gesture(from, 0, Some(to), 0, "e1"));
            assert!(matches!(op, Some(BuilderOp::Move { .. })), "{from} -> {to}");
        }
    }

    #[test]
    fn test_cancelled_and_catalog_drops_do_nothing() {
        assert_eq!(route(&gesture("root", 0, None, 0, "e1")), None);
        assert_eq!(route(&gesture("catalog", 0, None, 0, "header")), None);
        assert_eq!(route(&gesture("root", 0, Some("catalog"), 0, "e1")), None);
    }

    #[test]
    fn test_bad_destination_fails_to_parse() {
        let raw = RawDrag {
            source_list_id: "root".to_string(),
            source_index: 0,
            destination_list_id: Some("sidebar".to_string()),
            destination_index: 0,
            dragged_id: "e1".to_string(),
        };
        assert!(matches!(
            DragGesture::try_from(raw),
            Err(BuilderError::InvalidListId { .. })
        ));
    }
}
