//! Element map persistence
//!
//! One [`ElementMapRecord`] per geometry object: a count header and one
//! [`ElementRecord`] per entry holding the mapped name (`key`), the original
//! name (`value`) and, when present, the dot separated string ids (`sid`).
//! Records are stored as RON, like the project file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::SID_SEPARATOR;
use crate::element_map::ElementMapError;
use crate::geodata::GeoData;
use crate::hasher::StringIdRef;

/// Persisted element map of one geometry object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMapRecord {
    /// Element map format version (see [`GeoData::element_map_version`])
    #[serde(default)]
    pub version: String,
    /// Number of elements, omitted for an empty map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementRecord>,
}

/// One persisted element map entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Mapped name
    pub key: String,
    /// Original name
    pub value: String,
    /// String ids in composition order, e.g. `3.17`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl ElementMapRecord {
    /// Check if the record holds no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PersistError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Deserialize from bytes
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, PersistError> {
        let content =
            std::str::from_utf8(data).map_err(|e| PersistError::Deserialize(e.to_string()))?;
        ron::from_str(content).map_err(|e| PersistError::Deserialize(e.to_string()))
    }

    /// Save to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| PersistError::Io(e.to_string()))
    }

    /// Load from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content =
            std::fs::read(path.as_ref()).map_err(|e| PersistError::Io(e.to_string()))?;
        Self::load_from_bytes(&content)
    }
}

/// Outcome of [`GeoData::restore`]
///
/// Restoring never fails as a whole; problems with single records are
/// collected here and the rest of the map is still loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    /// Number of records registered
    pub restored: usize,
    /// The record was written with a different element map version
    pub version_mismatch: bool,
    /// Problems encountered, in record order
    pub issues: Vec<ElementMapError>,
}

impl RestoreReport {
    /// Check if every record was restored with all its string ids
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl GeoData {
    /// Write the element map into a record
    pub fn save(&self) -> ElementMapRecord {
        let elements: Vec<ElementRecord> = self
            .element_map()
            .map(|map| {
                map.iter()
                    .map(|(mapped, entry)| ElementRecord {
                        key: mapped.to_string(),
                        value: entry.original.clone(),
                        sid: join_string_ids(&entry.string_ids),
                    })
                    .collect()
            })
            .unwrap_or_default();

        ElementMapRecord {
            version: self.element_map_version(),
            count: (!elements.is_empty()).then_some(elements.len()),
            elements,
        }
    }

    /// Replace the element map with the contents of a record
    ///
    /// The existing map is dropped first. Stored mapped names are
    /// authoritative and are never hashed again; string ids are resolved
    /// through the current hasher.
    pub fn restore(&mut self, record: &ElementMapRecord) -> RestoreReport {
        self.reset_element_map();
        let mut report = RestoreReport::default();

        let version = self.element_map_version();
        if !record.version.is_empty() && record.version != version {
            tracing::warn!(
                saved = %record.version,
                current = %version,
                "element map version differs from the current hasher"
            );
            report.version_mismatch = true;
        }

        if let Some(count) = record.count
            && count != record.elements.len()
        {
            tracing::warn!(
                count,
                found = record.elements.len(),
                "element map count does not match its records"
            );
        }
        if !record.elements.is_empty() {
            self.element_map_mut().reserve(record.elements.len());
        }

        for element in &record.elements {
            let string_ids = self.resolve_string_ids(element, &mut report.issues);
            match self.register(&element.value, &element.key, string_ids, false, false) {
                Ok(_) => report.restored += 1,
                Err(e) => {
                    tracing::error!("failed to restore element '{}': {}", element.key, e);
                    report.issues.push(e);
                }
            }
        }

        if self.element_map_size() == 0 {
            self.reset_element_map();
        }

        tracing::debug!(
            restored = report.restored,
            issues = report.issues.len(),
            "restored element map"
        );
        report
    }

    fn resolve_string_ids(
        &self,
        element: &ElementRecord,
        issues: &mut Vec<ElementMapError>,
    ) -> Vec<StringIdRef> {
        let Some(sid) = element.sid.as_deref().filter(|s| !s.is_empty()) else {
            return Vec::new();
        };
        let Some(hasher) = self.hasher() else {
            tracing::error!("missing hasher for element '{}'", element.key);
            issues.push(ElementMapError::MissingHasher {
                key: element.key.clone(),
            });
            return Vec::new();
        };

        let mut string_ids = Vec::new();
        for token in sid.split(SID_SEPARATOR) {
            match token.parse::<u64>().ok().and_then(|v| hasher.get_id_by_value(v)) {
                Some(id) => string_ids.push(id),
                None => {
                    tracing::error!("invalid string id {} in '{}'", token, element.key);
                    issues.push(ElementMapError::UnresolvableId {
                        key: element.key.clone(),
                        id: token.to_string(),
                    });
                }
            }
        }
        string_ids
    }
}

fn join_string_ids(string_ids: &[StringIdRef]) -> Option<String> {
    let (first, rest) = string_ids.split_first()?;
    let mut joined = first.value().to_string();
    for sid in rest {
        joined.push(SID_SEPARATOR);
        joined.push_str(&sid.value().to_string());
    }
    Some(joined)
}

/// Persistence errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
