//! Options for the string hasher

/// Options for constructing a [`StringHasher`](super::StringHasher)
#[derive(Debug, Clone, Default)]
pub struct HasherOptions {
    /// Names shorter than this many bytes are kept as-is instead of hashed.
    /// Non-positive values hash every name. Default: 0
    pub threshold: i32,
}

impl HasherOptions {
    /// Create options with the given threshold
    pub fn with_threshold(threshold: i32) -> Self {
        Self { threshold }
    }
}
