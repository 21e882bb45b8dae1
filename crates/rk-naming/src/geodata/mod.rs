//! Geometry data host
//!
//! [`GeoData`] is the base that geometry objects embed to carry a transform
//! and a persistent element naming map. Geometry algorithms produce raw
//! subelement names (`Face3`); this host turns them into stable mapped names
//! and resolves them back.
//!
//! The element map is shared copy-on-write: cloning a `GeoData` shares the map
//! until either side writes to it, at which point the writer takes a private copy.

mod compose;
mod queries;
mod transforms;

use std::sync::Arc;

use glam::DMat4;

use crate::constants::{ELEMENT_MAP_ENTRY_MEM_SIZE, ELEMENT_MAP_FORMAT_VERSION};
use crate::element_map::ElementMap;
use crate::hasher::StringHasherRef;

pub use transforms::Placement;

/// Geometry data with transform and element naming map
#[derive(Debug, Clone)]
pub struct GeoData {
    /// Placement of the geometry
    transform: DMat4,
    /// Element naming map (None until the first write)
    element_map: Option<Arc<ElementMap>>,
    /// Shared string hasher used to compact mapped names
    hasher: Option<StringHasherRef>,
}

impl Default for GeoData {
    fn default() -> Self {
        Self {
            transform: DMat4::IDENTITY,
            element_map: None,
            hasher: None,
        }
    }
}

impl GeoData {
    /// Create geometry data without a hasher
    pub fn new() -> Self {
        Self::default()
    }

    /// Create geometry data that hashes names with `hasher`
    pub fn with_hasher(hasher: StringHasherRef) -> Self {
        Self {
            hasher: Some(hasher),
            ..Self::default()
        }
    }

    // ============== Hasher ==============

    /// Get the string hasher, if any
    pub fn hasher(&self) -> Option<&StringHasherRef> {
        self.hasher.as_ref()
    }

    /// Replace the string hasher
    pub fn set_hasher(&mut self, hasher: Option<StringHasherRef>) {
        self.hasher = hasher;
    }

    /// Check if both objects use the same hasher instance (or both have none)
    pub fn has_same_hasher(&self, other: &GeoData) -> bool {
        match (&self.hasher, &other.hasher) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    // ============== Element Map ==============

    /// Get the element map, if one was created
    pub fn element_map(&self) -> Option<&ElementMap> {
        self.element_map.as_deref()
    }

    /// Number of entries in the element map
    pub fn element_map_size(&self) -> usize {
        self.element_map.as_ref().map_or(0, |m| m.len())
    }

    /// Drop the element map entirely
    pub fn reset_element_map(&mut self) {
        self.element_map = None;
    }

    /// Check if two objects currently share one element map instance
    pub fn shares_element_map_with(&self, other: &GeoData) -> bool {
        match (&self.element_map, &other.element_map) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Version tag of the element map format
    ///
    /// The hasher threshold is part of the tag since it changes which names
    /// get hashed.
    pub fn element_map_version(&self) -> String {
        match &self.hasher {
            Some(hasher) => format!("{}.{}", ELEMENT_MAP_FORMAT_VERSION, hasher.threshold().max(0)),
            None => ELEMENT_MAP_FORMAT_VERSION.to_string(),
        }
    }

    /// Approximate memory used by the element map
    pub fn mem_size(&self) -> usize {
        self.element_map_size() * ELEMENT_MAP_ENTRY_MEM_SIZE
    }

    /// Mutable access to the element map, creating or unsharing it first
    pub(crate) fn element_map_mut(&mut self) -> &mut ElementMap {
        Arc::make_mut(self.element_map.get_or_insert_with(Default::default))
    }
}
