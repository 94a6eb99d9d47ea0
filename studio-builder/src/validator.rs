use std::collections::HashSet;

use crate::element::Element;
use crate::error::{BuilderError, BuilderResult};
use crate::form::FormModel;
use crate::markers::validate_markers;
use crate::tree::DocumentTree;

/// Validate a tree that did not come from the engine (a saved payload, a test fixture).
///
/// Checks id uniqueness, that only containers carry children, nesting depth, and marker syntax
/// in element content.
pub fn validate_tree(tree: &DocumentTree, max_nesting_depth: usize) -> BuilderResult<()> {
    validate_id_uniqueness(tree.elements())?;
    for el in tree.elements() {
        validate_element_recursive(el, 0, max_nesting_depth)?;
    }
    Ok(())
}

/// Validate a form model: days of the month in range, unique section ids, dense `order`, and
/// marker syntax in section content.
pub fn validate_form(form: &FormModel) -> BuilderResult<()> {
    validate_day_of_month("paymentDueDay", form.payment_due_day)?;
    validate_day_of_month("invoiceDay", form.invoice_day)?;

    let mut seen = HashSet::new();
    for (position, section) in form.sections.iter().enumerate() {
        if !seen.insert(section.id.as_str()) {
            return Err(BuilderError::DuplicateId {
                id: section.id.clone(),
            });
        }
        if section.order != position {
            return Err(BuilderError::SectionOrder {
                id: section.id.clone(),
                expected: position,
                found: section.order,
            });
        }
        validate_markers(&section.content)?;
    }
    Ok(())
}

fn validate_day_of_month(field: &str, day: u8) -> BuilderResult<()> {
    if !(1..=31).contains(&day) {
        return Err(BuilderError::DayOutOfRange {
            field: field.to_string(),
            day,
        });
    }
    Ok(())
}

/// Validate ID uniqueness across the whole element tree
pub fn validate_id_uniqueness(elements: &[Element]) -> BuilderResult<()> {
    let mut seen = HashSet::new();
    for el in elements {
        collect_ids(el, &mut seen)?;
    }
    Ok(())
}

fn collect_ids<'a>(el: &'a Element, seen: &mut HashSet<&'a str>) -> BuilderResult<()> {
    if !seen.insert(el.id.as_str()) {
        return Err(BuilderError::DuplicateId { id: el.id.clone() });
    }
    for child in el.children() {
        collect_ids(child, seen)?;
    }
    Ok(())
}

fn validate_element_recursive(el: &Element, depth: usize, max_depth: usize) -> BuilderResult<()> {
    // A container opens one more level than the list it sits in.
    let levels = depth + usize::from(el.is_container());
    if levels > max_depth {
        return Err(BuilderError::NestingDepthExceeded {
            id: el.id.clone(),
            depth: levels,
            max_depth,
        });
    }

    if el.id.trim().is_empty() {
        return Err(BuilderError::InvalidTarget {
            target: el.kind.to_string(),
            reason: "element id must not be empty".to_string(),
        });
    }

    match (&el.children, el.is_container()) {
        (Some(_), false) => {
            return Err(BuilderError::ChildrenOnLeaf {
                id: el.id.clone(),
                kind: el.kind.to_string(),
            })
        }
        (None, true) => {
            return Err(BuilderError::InvalidTarget {
                target: el.id.clone(),
                reason: "container is missing its children list".to_string(),
            })
        }
        _ => {}
    }

    if let Some(content) = &el.content {
        validate_markers(content)?;
    }

    for child in el.children() {
        validate_element_recursive(child, depth + 1, max_depth)?;
    }
    Ok(())
}
