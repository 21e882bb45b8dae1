//! Element name string helpers
//!
//! Raw subelement names look like `Face3`. Mapped names are referenced with a
//! leading [`ELEMENT_MAP_PREFIX`], and addressing code may append a `.NNNN`
//! index qualifier or prepend `link.` path segments.

use crate::constants::{ELEMENT_MAP_PREFIX, INDEX_QUALIFIER_SEPARATOR};

/// Return the text after the mapped name marker, if `name` carries one
pub fn is_mapped_element(name: &str) -> Option<&str> {
    name.strip_prefix(ELEMENT_MAP_PREFIX)
}

/// Qualify a stored mapped name with the marker
pub fn to_mapped_element(mapped: &str) -> String {
    format!("{}{}", ELEMENT_MAP_PREFIX, mapped)
}

/// Strip the trailing index qualifier from a path whose last segment is a
/// mapped element name
///
/// `link.;F1.0007` becomes `link.;F1`; `link.box` is returned unchanged.
pub fn new_element_name(name: &str) -> &str {
    let Some(dot) = name.rfind(INDEX_QUALIFIER_SEPARATOR) else {
        return name;
    };
    if dot == 0 {
        return name;
    }
    if !is_index_qualifier(&name[dot + 1..]) {
        return name;
    }
    let segment_start = name[..dot]
        .rfind(INDEX_QUALIFIER_SEPARATOR)
        .map_or(0, |pos| pos + 1);
    if is_mapped_element(&name[segment_start..]).is_some() {
        &name[..dot]
    } else {
        name
    }
}

/// Drop a trailing `.NNNN` index qualifier
pub(crate) fn strip_index_qualifier(name: &str) -> &str {
    match name.rsplit_once(INDEX_QUALIFIER_SEPARATOR) {
        Some((head, index)) if is_index_qualifier(index) => head,
        _ => name,
    }
}

fn is_index_qualifier(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Type tag used to keep hashed names of different element kinds apart
pub(crate) fn element_type_tag(element: &str) -> Option<char> {
    element.chars().next()
}

/// Split a raw element name into its type and index (`Face3` -> `("Face", 3)`)
///
/// A name without digits has index 0. Returns `None` when the digits do not
/// form a valid index.
pub fn split_element_name(name: &str) -> Option<(&str, usize)> {
    match name.find(|c: char| c.is_ascii_digit()) {
        Some(pos) => {
            let index = name[pos..].parse().ok()?;
            Some((&name[..pos], index))
        }
        None => Some((name, 0)),
    }
}
