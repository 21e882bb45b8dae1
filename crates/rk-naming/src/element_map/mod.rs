//! Element Map
//!
//! Bidirectional store between unique mapped names and (possibly repeated)
//! original subelement names. Each entry carries the string ids consumed when
//! its mapped name was built.
//!
//! Two indices are kept in step on every insert and erase:
//! - mapped name -> entry, sorted so prefix queries are range scans
//! - original name -> mapped names, in insertion order

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use thiserror::Error;

use crate::hasher::StringIdRef;

/// Error type for element naming operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementMapError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid element name: {0}")]
    InvalidName(String),

    #[error("Duplicate element mapping '{name}->{attempted}/{existing}'")]
    DuplicateMapping {
        /// The colliding mapped name
        name: String,
        /// Original name already registered under `name`
        existing: String,
        /// Original name that was rejected
        attempted: String,
    },

    #[error("Missing hasher for string ids of '{key}'")]
    MissingHasher { key: String },

    #[error("Invalid string id {id} in '{key}'")]
    UnresolvableId { key: String, id: String },
}

/// Result type for element naming operations
pub type ElementMapResult<T> = Result<T, ElementMapError>;

/// Payload stored under one mapped name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Raw subelement name, e.g. `Face3`
    pub original: String,
    /// Hashed components of the mapped name, in composition order
    pub string_ids: Vec<StringIdRef>,
}

/// Bidirectional mapped name <-> original name store
#[derive(Debug, Clone, Default)]
pub struct ElementMap {
    by_mapped: BTreeMap<String, MappingEntry>,
    by_original: HashMap<String, Vec<String>>,
}

impl PartialEq for ElementMap {
    fn eq(&self, other: &Self) -> bool {
        // The original-name index is derived from this one
        self.by_mapped == other.by_mapped
    }
}

impl Eq for ElementMap {}

impl ElementMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.by_mapped.len()
    }

    /// Check if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.by_mapped.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.by_mapped.clear();
        self.by_original.clear();
    }

    /// Reserve room for `additional` distinct original names
    pub fn reserve(&mut self, additional: usize) {
        self.by_original.reserve(additional);
    }

    /// Insert a mapping and return the mapped name as stored
    ///
    /// Re-inserting an existing mapped name for the same original is a no-op
    /// that keeps the first entry. A mapped name already bound to a different
    /// original is rejected unless `overwrite` is set, in which case the old
    /// entry is evicted first.
    pub fn insert(
        &mut self,
        mapped: &str,
        original: &str,
        string_ids: Vec<StringIdRef>,
        overwrite: bool,
    ) -> ElementMapResult<String> {
        if mapped.is_empty() {
            return Err(ElementMapError::InvalidArgument(format!(
                "empty mapped name for '{}'",
                original
            )));
        }
        if original.is_empty() {
            return Err(ElementMapError::InvalidArgument(format!(
                "empty original name for '{}'",
                mapped
            )));
        }

        if let Some(existing) = self.by_mapped.get(mapped) {
            if existing.original == original {
                return Ok(mapped.to_string());
            }
            if !overwrite {
                return Err(ElementMapError::DuplicateMapping {
                    name: mapped.to_string(),
                    existing: existing.original.clone(),
                    attempted: original.to_string(),
                });
            }
            self.remove(mapped);
        }

        self.by_mapped.insert(
            mapped.to_string(),
            MappingEntry {
                original: original.to_string(),
                string_ids,
            },
        );
        self.by_original
            .entry(original.to_string())
            .or_default()
            .push(mapped.to_string());
        Ok(mapped.to_string())
    }

    /// Remove a single entry by mapped name
    pub fn remove(&mut self, mapped: &str) -> Option<MappingEntry> {
        let entry = self.by_mapped.remove(mapped)?;
        if let Some(aliases) = self.by_original.get_mut(&entry.original) {
            aliases.retain(|m| m != mapped);
            if aliases.is_empty() {
                self.by_original.remove(&entry.original);
            }
        }
        Some(entry)
    }

    /// Remove every entry whose original name is `original`
    ///
    /// Returns the number of entries removed.
    pub fn erase_by_original(&mut self, original: &str) -> usize {
        let Some(aliases) = self.by_original.remove(original) else {
            return 0;
        };
        for mapped in &aliases {
            self.by_mapped.remove(mapped);
        }
        aliases.len()
    }

    /// Get the entry stored under a mapped name
    pub fn get(&self, mapped: &str) -> Option<&MappingEntry> {
        self.by_mapped.get(mapped)
    }

    /// Check if a mapped name is registered
    pub fn contains_mapped(&self, mapped: &str) -> bool {
        self.by_mapped.contains_key(mapped)
    }

    /// Check if any mapped name refers to `original`
    pub fn contains_original(&self, original: &str) -> bool {
        self.by_original.contains_key(original)
    }

    /// Look up the original name and string ids of a mapped name
    pub fn lookup_by_mapped(&self, mapped: &str) -> Option<(&str, &[StringIdRef])> {
        self.by_mapped
            .get(mapped)
            .map(|e| (e.original.as_str(), e.string_ids.as_slice()))
    }

    /// All mapped names of an original name, earliest registration first
    pub fn lookup_all_by_original(&self, original: &str) -> Vec<(&str, &[StringIdRef])> {
        self.aliases(original)
            .filter_map(|mapped| {
                self.by_mapped
                    .get_key_value(mapped)
                    .map(|(k, e)| (k.as_str(), e.string_ids.as_slice()))
            })
            .collect()
    }

    /// The earliest registered mapped name of an original name
    pub fn first_by_original(&self, original: &str) -> Option<(&str, &[StringIdRef])> {
        self.aliases(original).find_map(|mapped| {
            self.by_mapped
                .get_key_value(mapped)
                .map(|(k, e)| (k.as_str(), e.string_ids.as_slice()))
        })
    }

    fn aliases(&self, original: &str) -> impl Iterator<Item = &String> {
        self.by_original.get(original).into_iter().flatten()
    }

    /// All `(mapped, original)` pairs whose mapped name starts with `prefix`,
    /// in ascending mapped name order
    pub fn prefix_range(&self, prefix: &str) -> Vec<(&str, &str)> {
        self.by_mapped
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(mapped, _)| mapped.starts_with(prefix))
            .map(|(mapped, e)| (mapped.as_str(), e.original.as_str()))
            .collect()
    }

    /// Iterate over all entries in ascending mapped name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.by_mapped.iter().map(|(k, e)| (k.as_str(), e))
    }
}
