//! Cubemap face expansion.
//!
//! | Index | Face | Rotation applied to the base orientation |
//! |-------|------|------------------------------------------|
//! | 0     | +X   | +90° about Y                             |
//! | 1     | -X   | -90° about Y                             |
//! | 2     | +Y   | +90° about X                             |
//! | 3     | -Y   | -90° about X                             |
//! | 4     | +Z   | identity                                 |
//! | 5     | -Z   | 180° about Y                             |

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use strata_core::StrataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in index order.
    pub const ALL: [Self; 6] = [
        Self::PositiveX,
        Self::NegativeX,
        Self::PositiveY,
        Self::NegativeY,
        Self::PositiveZ,
        Self::NegativeZ,
    ];

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Fixed rotation of this face relative to the base camera.
    #[must_use]
    pub fn rotation(self) -> Quat {
        match self {
            Self::PositiveX => Quat::from_axis_angle(Vec3::Y, FRAC_PI_2),
            Self::NegativeX => Quat::from_axis_angle(Vec3::Y, -FRAC_PI_2),
            Self::PositiveY => Quat::from_axis_angle(Vec3::X, FRAC_PI_2),
            Self::NegativeY => Quat::from_axis_angle(Vec3::X, -FRAC_PI_2),
            Self::PositiveZ => Quat::IDENTITY,
            Self::NegativeZ => Quat::from_axis_angle(Vec3::Y, PI),
        }
    }

    /// Orientation of the face camera derived from `base`.
    #[must_use]
    pub fn orient(self, base: Quat) -> Quat {
        self.rotation() * base
    }
}

impl TryFrom<usize> for CubeFace {
    type Error = StrataError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(StrataError::InvalidCubeFace(index))
    }
}

/// Name of the camera derived for `face` of `base`.
#[must_use]
pub fn cube_face_camera_name(base: &str, face: CubeFace) -> String {
    format!("{base}_cubeside{}", face.index())
}
