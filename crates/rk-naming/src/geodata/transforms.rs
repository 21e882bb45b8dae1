//! Transform and placement operations
//!
//! These only touch the transform; the element map is unaffected.

use glam::{DMat4, DQuat, DVec3};

use super::GeoData;

/// Rigid placement (rotation followed by translation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }
}

impl Placement {
    /// Create a placement from translation and rotation
    pub fn new(translation: DVec3, rotation: DQuat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Convert to a 4x4 matrix
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Extract translation and rotation from a matrix, ignoring scale
    pub fn from_matrix(matrix: &DMat4) -> Self {
        let (_, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
        }
    }
}

impl GeoData {
    /// Get the transform
    pub fn transform(&self) -> DMat4 {
        self.transform
    }

    /// Set the transform
    pub fn set_transform(&mut self, transform: DMat4) {
        self.transform = transform;
    }

    /// Apply an additional transform on top of the current one
    pub fn apply_transform(&mut self, transform: &DMat4) {
        self.transform = *transform * self.transform;
    }

    /// Move by `offset`
    pub fn apply_translation(&mut self, offset: DVec3) {
        self.transform = DMat4::from_translation(offset) * self.transform;
    }

    /// Rotate about the origin
    pub fn apply_rotation(&mut self, rotation: DQuat) {
        self.transform = DMat4::from_quat(rotation) * self.transform;
    }

    /// Replace the transform with a placement
    pub fn set_placement(&mut self, placement: &Placement) {
        self.transform = placement.to_matrix();
    }

    /// Get the transform as a placement
    pub fn placement(&self) -> Placement {
        Placement::from_matrix(&self.transform)
    }
}
