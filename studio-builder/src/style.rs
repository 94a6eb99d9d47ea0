use std::collections::BTreeMap;

use crate::error::{BuilderError, BuilderResult};

/// CSS-like style properties of an element, keyed by camelCase property name.
///
/// A sorted map keeps serialisation and CSS output stable regardless of insertion order.
pub type Styles = BTreeMap<String, String>;

/// Build a style map from `(property, value)` pairs.
pub fn styles<const N: usize>(pairs: [(&str, &str); N]) -> Styles {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Shallow-merge `overlay` on top of `base`. Keys in `overlay` win.
pub fn merge_styles(base: &Styles, overlay: &Styles) -> Styles {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Parse a `"key:val; key2:val2"` style string into a style map.
///
/// Keys may be camelCase (`backgroundColor`) or kebab-case (`background-color`); both are
/// stored as camelCase.
pub fn parse_style_string(s: &str) -> BuilderResult<Styles> {
    let mut out = Styles::new();
    for entry in s.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let colon = entry.find(':').ok_or_else(|| BuilderError::InvalidStyle {
            property: entry.to_string(),
            reason: "expected 'property:value' format".to_string(),
        })?;
        let key = entry[..colon].trim();
        let val = entry[colon + 1..].trim();
        validate_property(key, val)?;
        out.insert(camel_case(key), val.to_string());
    }
    Ok(out)
}

fn validate_property(key: &str, val: &str) -> BuilderResult<()> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return Err(BuilderError::InvalidStyle {
            property: key.to_string(),
            reason: "property names may only contain ASCII letters and '-'".to_string(),
        });
    }
    if val.is_empty() {
        return Err(BuilderError::InvalidStyle {
            property: key.to_string(),
            reason: "value must not be empty".to_string(),
        });
    }
    if val.contains(['"', '<', '>', '{', '}']) {
        return Err(BuilderError::InvalidStyle {
            property: key.to_string(),
            reason: format!("value '{}' contains a forbidden character", val),
        });
    }
    Ok(())
}

/// Serialise styles as an inline CSS declaration list (`font-size:24px;margin:0;`).
pub fn style_to_css(styles: &Styles) -> String {
    let mut css = String::new();
    for (key, value) in styles {
        // Values that could escape the declaration are dropped rather than emitted.
        if value.contains([';', '"', '<', '>']) {
            continue;
        }
        css.push_str(&kebab_case(key));
        css.push(':');
        css.push_str(value.trim());
        css.push(';');
    }
    css
}

/// `backgroundColor` -> `background-color`
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `background-color` -> `backgroundColor`
pub fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '-' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
