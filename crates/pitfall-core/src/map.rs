//! Map description format and static collider placements.
//!
//! A map is a rectangle of `length` × `width` meters tiled with square ground
//! plates of `default_size`, plus named areas that either replace a tile with
//! a plate of their own size or, for `"hole"` areas, leave a pit.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    HOLE_AREA_TYPE, MAX_CELLS_PER_AXIS, PLATE_CENTER_Y, PLATE_HALF_THICKNESS,
};
use crate::error::MapLoadError;

/// Map resource as stored on disk (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDescription {
    /// Extent along x (meters).
    pub length: f32,
    /// Extent along z (meters).
    pub width: f32,
    /// Edge of a default ground plate (meters).
    pub default_size: f32,
    #[serde(default)]
    pub areas: Vec<MapArea>,
}

/// A declared area overriding the default tiling at one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapArea {
    #[serde(default)]
    pub name: Option<String>,
    pub x: f32,
    pub z: f32,
    pub size: f32,
    #[serde(rename = "type")]
    pub kind: String,
}

impl MapArea {
    pub fn is_hole(&self) -> bool {
        self.kind == HOLE_AREA_TYPE
    }

    /// Exact match against a plate center. No snapping.
    pub fn covers(&self, x: f32, z: f32) -> bool {
        self.x == x && self.z == z
    }
}

impl MapDescription {
    /// Reject descriptions that would produce no sensible grid.
    ///
    /// A non-positive `default_size` would never terminate the tiling walk.
    /// Capping the cells per axis keeps every step large enough to advance
    /// an f32 coordinate at the map's outer edge.
    pub fn validate(&self, name: &str) -> Result<(), MapLoadError> {
        let invalid = |reason: String| MapLoadError::InvalidDimensions {
            name: name.to_string(),
            reason,
        };

        if !self.length.is_finite() || self.length < 0.0 {
            return Err(invalid(format!("length {} out of range", self.length)));
        }
        if !self.width.is_finite() || self.width < 0.0 {
            return Err(invalid(format!("width {} out of range", self.width)));
        }
        if !self.default_size.is_finite() || self.default_size <= 0.0 {
            return Err(invalid(format!(
                "default_size {} must be positive",
                self.default_size
            )));
        }
        for (axis, extent) in [("length", self.length), ("width", self.width)] {
            if extent / self.default_size > MAX_CELLS_PER_AXIS {
                return Err(invalid(format!(
                    "{axis} {extent} spans more than {MAX_CELLS_PER_AXIS} cells of {}",
                    self.default_size
                )));
            }
        }
        for (i, area) in self.areas.iter().enumerate() {
            if !area.x.is_finite() || !area.z.is_finite() {
                return Err(invalid(format!("area {i} has a non-finite position")));
            }
            if !area.size.is_finite() || area.size <= 0.0 {
                return Err(invalid(format!("area {i} has size {}", area.size)));
            }
        }
        Ok(())
    }
}

/// Placement of one immovable ground plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticColliderSpec {
    /// Plate center along x.
    pub x: f32,
    /// Plate center along z.
    pub z: f32,
    /// Edge length in the ground plane.
    pub size: f32,
}

impl StaticColliderSpec {
    pub fn new(x: f32, z: f32, size: f32) -> Self {
        Self { x, z, size }
    }

    /// World-space center of the plate box.
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.x, PLATE_CENTER_Y, self.z)
    }

    /// Half extents of the plate box.
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.size / 2.0, PLATE_HALF_THICKNESS, self.size / 2.0)
    }
}
