//! String Hasher
//!
//! A shared dictionary that converts arbitrary name fragments into compact
//! numeric ids and back. Hashing is content-addressed: the same string always
//! yields the same id, so element names built from hashed fragments stay
//! comparable across every geometry object sharing the hasher.

mod options;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub use options::HasherOptions;

/// Shared handle to a string hasher
pub type StringHasherRef = Arc<StringHasher>;

#[derive(Debug)]
struct StringIdData {
    value: u64,
    text: String,
}

/// Reference-counted handle to one entry of a [`StringHasher`]
///
/// Handles compare by their numeric value.
#[derive(Clone)]
pub struct StringIdRef(Arc<StringIdData>);

impl StringIdRef {
    /// Numeric id of the entry
    pub fn value(&self) -> u64 {
        self.0.value
    }

    /// The string this id was created from
    pub fn text(&self) -> &str {
        &self.0.text
    }

    /// Number of live handles to this entry, the hasher's own included
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for StringIdRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.value == other.0.value
    }
}

impl Eq for StringIdRef {}

impl std::hash::Hash for StringIdRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.value.hash(state);
    }
}

impl fmt::Debug for StringIdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringIdRef({}, {:?})", self.0.value, self.0.text)
    }
}

impl fmt::Display for StringIdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.value)
    }
}

#[derive(Debug, Default)]
struct HasherTable {
    /// Text to id index
    ids: HashMap<String, u64>,
    /// Id to handle, ordered for stable export
    entries: BTreeMap<u64, StringIdRef>,
    /// Last id handed out (ids start at 1)
    last_id: u64,
}

impl HasherTable {
    fn insert(&mut self, value: u64, text: &str) -> StringIdRef {
        let sid = StringIdRef(Arc::new(StringIdData {
            value,
            text: text.to_string(),
        }));
        self.ids.insert(text.to_string(), value);
        self.entries.insert(value, sid.clone());
        self.last_id = self.last_id.max(value);
        sid
    }
}

/// Content-addressed string to id dictionary
///
/// Meant to be created once per document or session and shared by reference
/// ([`StringHasherRef`]) with every geometry object that needs it.
#[derive(Debug, Default)]
pub struct StringHasher {
    options: HasherOptions,
    table: Mutex<HasherTable>,
}

impl StringHasher {
    /// Create an empty hasher with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty hasher with the given options
    pub fn with_options(options: HasherOptions) -> Self {
        Self {
            options,
            table: Mutex::new(HasherTable::default()),
        }
    }

    /// Wrap this hasher for sharing
    pub fn into_shared(self) -> StringHasherRef {
        Arc::new(self)
    }

    /// Configured length threshold
    pub fn threshold(&self) -> i32 {
        self.options.threshold
    }

    /// Check if `text` is long enough to be replaced by a hashed id
    pub fn is_hashable(&self, text: &str) -> bool {
        usize::try_from(self.options.threshold).map_or(true, |min| text.len() >= min)
    }

    /// Get the id for a string, creating it if this string was never seen
    pub fn get_id(&self, text: &str) -> StringIdRef {
        let mut table = self.table.lock();
        if let Some(value) = table.ids.get(text)
            && let Some(sid) = table.entries.get(value)
        {
            return sid.clone();
        }
        let value = table.last_id + 1;
        table.insert(value, text)
    }

    /// Look up an existing id by its numeric value
    pub fn get_id_by_value(&self, value: u64) -> Option<StringIdRef> {
        self.table.lock().entries.get(&value).cloned()
    }

    /// Number of strings in the table
    pub fn len(&self) -> usize {
        self.table.lock().entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.table.lock().entries.is_empty()
    }

    /// Remove every entry and restart numbering at 1
    pub fn clear(&self) {
        *self.table.lock() = HasherTable::default();
    }

    /// Drop entries no longer referenced outside the hasher
    ///
    /// Returns the number of entries removed. Numbering is not reset, so
    /// dropped ids are never reissued for a different string.
    pub fn purge_unused(&self) -> usize {
        let mut table = self.table.lock();
        let unused: Vec<(u64, String)> = table
            .entries
            .iter()
            .filter(|(_, sid)| sid.ref_count() == 1)
            .map(|(value, sid)| (*value, sid.text().to_string()))
            .collect();
        for (value, text) in &unused {
            table.entries.remove(value);
            table.ids.remove(text);
        }
        unused.len()
    }

    /// Export the table for persistence
    pub fn to_data(&self) -> StringHasherData {
        let table = self.table.lock();
        StringHasherData {
            threshold: self.options.threshold,
            entries: table
                .entries
                .iter()
                .map(|(value, sid)| (*value, sid.text().to_string()))
                .collect(),
        }
    }

    /// Rebuild a hasher from persisted data, keeping the stored ids
    pub fn from_data(data: &StringHasherData) -> Self {
        let mut table = HasherTable::default();
        for (value, text) in &data.entries {
            if *value == 0 || table.ids.contains_key(text) || table.entries.contains_key(value) {
                tracing::warn!(value, text = %text, "skipping conflicting string id");
                continue;
            }
            table.insert(*value, text);
        }
        Self {
            options: HasherOptions::with_threshold(data.threshold),
            table: Mutex::new(table),
        }
    }
}

/// Persisted form of a [`StringHasher`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringHasherData {
    pub threshold: i32,
    /// `(id, text)` pairs in ascending id order
    pub entries: Vec<(u64, String)>,
}
