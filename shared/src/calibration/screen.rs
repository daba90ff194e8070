use serde::{Deserialize, Serialize};

use crate::math::vec3::Vec3;

/// Physical placement of one projection wall, given by three of its
/// corners in the shared tracking space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    pub lower_left: Vec3,
    pub lower_right: Vec3,
    pub upper_left: Vec3,
}

/// Orthonormal frame of a screen: right, up, and the normal facing the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub normal: Vec3,
}

impl ScreenGeometry {
    pub fn basis(&self) -> Option<ScreenBasis> {
        let right = (self.lower_right - self.lower_left).normalize()?;
        let up = (self.upper_left - self.lower_left).normalize()?;
        let normal = right.cross(up).normalize()?;
        Some(ScreenBasis { right, up, normal })
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        let Some(basis) = self.basis() else {
            return Err("corners must span a rectangle with non-zero width and height");
        };
        if basis.right.dot(basis.up).abs() > 1e-3 {
            return Err("horizontal and vertical edges must be perpendicular");
        }
        Ok(())
    }
}
