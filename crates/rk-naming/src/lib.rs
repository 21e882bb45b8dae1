//! Persistent Element Naming
//!
//! This crate provides:
//! - A shared string hasher that turns name fragments into compact ids
//! - A bidirectional map between stable mapped names and raw subelement names
//! - A geometry data host that composes, hashes, queries and merges element names
//! - Persistence of the element map as plain records

pub mod constants;
pub mod element_map;
pub mod element_name;
pub mod geodata;
pub mod hasher;
pub mod persist;

// Re-exports for convenience
pub use element_map::{ElementMap, ElementMapError, ElementMapResult, MappingEntry};
pub use element_name::{is_mapped_element, new_element_name, split_element_name};
pub use geodata::{GeoData, Placement};
pub use hasher::{HasherOptions, StringHasher, StringHasherData, StringHasherRef, StringIdRef};
pub use persist::{ElementMapRecord, ElementRecord, PersistError, RestoreReport};
