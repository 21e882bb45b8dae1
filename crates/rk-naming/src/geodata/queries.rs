//! Element name lookups and bulk table access

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::element_map::{ElementMap, ElementMapError, ElementMapResult};
use crate::element_name::{is_mapped_element, strip_index_qualifier, to_mapped_element};
use crate::hasher::StringIdRef;

use super::GeoData;

impl GeoData {
    /// Resolve a marker-qualified mapped name (`;#F1`) to its original name
    ///
    /// A trailing `.NNNN` index qualifier is ignored unless the full name is
    /// itself registered. Names without the marker, or not found in the map,
    /// are returned unchanged. On a hit the entry's string ids are appended
    /// to `string_ids` if given.
    pub fn resolve_forward<'a>(
        &'a self,
        name: &'a str,
        string_ids: Option<&mut Vec<StringIdRef>>,
    ) -> &'a str {
        let Some(map) = self.element_map.as_deref() else {
            return name;
        };
        let Some(mapped) = is_mapped_element(name) else {
            return name;
        };
        let found = map
            .lookup_by_mapped(mapped)
            .or_else(|| map.lookup_by_mapped(strip_index_qualifier(mapped)));
        match found {
            Some((original, ids)) => {
                if let Some(acc) = string_ids {
                    acc.extend_from_slice(ids);
                }
                original
            }
            None => name,
        }
    }

    /// Resolve an original name to its earliest registered mapped name,
    /// qualified with the marker
    ///
    /// Unmapped names are returned unchanged, so
    /// `resolve_forward(resolve_reverse(x)) == x` for any `x`.
    pub fn resolve_reverse<'a>(
        &self,
        element: &'a str,
        string_ids: Option<&mut Vec<StringIdRef>>,
    ) -> Cow<'a, str> {
        let found = self
            .element_map
            .as_deref()
            .and_then(|m| m.first_by_original(element));
        match found {
            Some((mapped, ids)) => {
                if let Some(acc) = string_ids {
                    acc.extend_from_slice(ids);
                }
                Cow::Owned(to_mapped_element(mapped))
            }
            None => Cow::Borrowed(element),
        }
    }

    /// All mapped names of `element` with their string ids, earliest first
    ///
    /// With `need_unmapped`, an element without mapped names yields itself
    /// with no ids.
    pub fn element_mapped_names(
        &self,
        element: &str,
        need_unmapped: bool,
    ) -> Vec<(String, Vec<StringIdRef>)> {
        let names: Vec<(String, Vec<StringIdRef>)> = self
            .element_map
            .as_deref()
            .map(|m| {
                m.lookup_all_by_original(element)
                    .into_iter()
                    .map(|(mapped, ids)| (mapped.to_string(), ids.to_vec()))
                    .collect()
            })
            .unwrap_or_default();

        if names.is_empty() && need_unmapped {
            return vec![(element.to_string(), Vec::new())];
        }
        names
    }

    /// `(mapped, original)` pairs whose mapped name starts with `prefix`
    ///
    /// The prefix may carry the mapped name marker. An empty prefix matches
    /// nothing.
    pub fn element_names_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        let prefix = is_mapped_element(prefix).unwrap_or(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }
        let Some(map) = self.element_map.as_deref() else {
            return Vec::new();
        };
        map.prefix_range(prefix)
            .into_iter()
            .map(|(mapped, original)| (mapped.to_string(), original.to_string()))
            .collect()
    }

    /// Export the element map as a plain mapped -> original table
    pub fn element_map_table(&self) -> BTreeMap<String, String> {
        self.element_map
            .as_deref()
            .map(|m| {
                m.iter()
                    .map(|(mapped, e)| (mapped.to_string(), e.original.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replace the element map with a plain mapped -> original table
    ///
    /// Names are taken verbatim and never hashed. The whole table is checked
    /// before anything is replaced, so an invalid row leaves the current map
    /// untouched.
    pub fn set_element_map_table(
        &mut self,
        table: &BTreeMap<String, String>,
    ) -> ElementMapResult<()> {
        let mut map = ElementMap::new();
        for (mapped, original) in table {
            let name = is_mapped_element(mapped).unwrap_or(mapped);
            if name.is_empty() {
                return Err(ElementMapError::InvalidArgument(format!(
                    "empty mapped name for '{}'",
                    original
                )));
            }
            map.insert(name, original, Vec::new(), false)?;
        }
        tracing::debug!(count = map.len(), "imported element map table");
        self.element_map = (!map.is_empty()).then(|| Arc::new(map));
        Ok(())
    }
}
