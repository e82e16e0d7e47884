//! Cascaded shadow camera derivation.
//!
//! Three orthographic cascades (`near`, `medium`, `far`) are derived from
//! the default camera and the light direction. Cascade `i` covers a radius
//! of `(1 << i) * close_shadow + 20 * i`, so with the default close radius
//! of 5 the cascades span 5, 30 and 60 units.

use std::f32::consts::SQRT_2;

use glam::{Mat4, Quat, Vec3};

use super::{GraphicsCamera, Projection};

/// Cascade names, nearest first.
pub const CASCADE_NAMES: [&str; 3] = ["near", "medium", "far"];

/// Extra depth added to every cascade box so casters behind the view
/// still land in the shadow map.
const CASCADE_DEPTH_PADDING: f32 = 60.0;

/// Camera table name of cascade `index`.
#[must_use]
pub fn shadow_camera_name(index: usize) -> String {
    format!("shadows_{}", CASCADE_NAMES[index])
}

/// Orientation taking world up (+Z) onto the light direction.
#[must_use]
pub fn light_rotation(light_direction: Vec3) -> Quat {
    let Some(direction) = light_direction.try_normalize() else {
        return Quat::IDENTITY;
    };
    let up = Vec3::Z;
    let cosa = up.dot(direction);
    if cosa * cosa < 1.0 {
        let angle = -cosa.acos();
        let axis = up.cross(direction).normalize();
        Quat::from_axis_angle(axis, angle)
    } else {
        Quat::IDENTITY
    }
}

/// Radius covered by cascade `index`.
#[must_use]
pub fn cascade_radius(index: usize, close_shadow: f32) -> f32 {
    (1u32 << index) as f32 * close_shadow + index as f32 * 20.0
}

/// Derives the orthographic camera for cascade `index`.
#[must_use]
pub fn derive_cascade(
    default: &GraphicsCamera,
    light: Quat,
    index: usize,
    close_shadow: f32,
) -> GraphicsCamera {
    let radius = cascade_radius(index, close_shadow);

    let mut shadowbox = Vec3::ONE * (radius * SQRT_2);
    shadowbox.z += CASCADE_DEPTH_PADDING;

    let offset = default.orientation.conjugate() * Vec3::new(0.0, 0.0, -radius);

    GraphicsCamera {
        position: default.position + offset,
        orientation: light,
        projection: Projection::Orthographic {
            min: -shadowbox,
            max: shadowbox,
        },
        ..default.clone()
    }
}

/// Matrix taking default-camera view space into the cascade's shadow map
/// texture space.
#[must_use]
pub fn shadow_clip_matrix(cascade: &GraphicsCamera, default_view: Mat4) -> Mat4 {
    let bias = Mat4::from_translation(Vec3::new(0.5, 0.5, 0.0))
        * Mat4::from_scale(Vec3::new(0.5, 0.5, 1.0));
    bias * cascade.view_projection() * default_view.inverse()
}
