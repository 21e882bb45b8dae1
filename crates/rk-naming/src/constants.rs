//! Global constants for rk-naming

/// Marker that distinguishes a mapped element name from a raw one
pub const ELEMENT_MAP_PREFIX: &str = ";";

/// Separator between a name and its trailing index qualifier
pub const INDEX_QUALIFIER_SEPARATOR: char = '.';

/// Separator between string ids in a persisted `sid` attribute
pub const SID_SEPARATOR: char = '.';

/// Leading character of a hashed name token (`#F12`)
pub const HASHED_NAME_PREFIX: char = '#';

/// Element map format version
pub const ELEMENT_MAP_FORMAT_VERSION: u32 = 2;

/// Approximate memory cost of one element map entry
pub const ELEMENT_MAP_ENTRY_MEM_SIZE: usize = 10;
