//! Camera Table & Derivation
//!
//! Passes refer to cameras by name. The [`CameraTable`] owns every camera
//! record for the current frame:
//!
//! | Name                          | Source                                          |
//! |-------------------------------|-------------------------------------------------|
//! | `default`                     | the scene view                                  |
//! | `skybox`                      | `default` with a 10000 unit view distance       |
//! | `dynamic_reflection`          | reflection sample point, 90° fov, 100 units     |
//! | `dynamic_reflection_skybox`   | `dynamic_reflection` with 10000 units           |
//! | `2d`                          | orthographic unit box                           |
//! | `shadows_near/medium/far`     | cascades derived from `default` (shadows only)  |
//! | `<base>_cubeside<i>`          | cube face `i` of `<base>`                       |
//!
//! Derived entries overwrite stale ones from the previous frame.

mod cube;
mod frustum;
mod shadow;

pub use cube::{CubeFace, cube_face_camera_name};
pub use frustum::{Aabb, Frustum};
pub use shadow::{
    CASCADE_NAMES, cascade_radius, derive_cascade, light_rotation, shadow_camera_name,
    shadow_clip_matrix,
};

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

pub const DEFAULT_CAMERA: &str = "default";
pub const SKYBOX_CAMERA: &str = "skybox";
pub const REFLECTION_CAMERA: &str = "dynamic_reflection";
pub const REFLECTION_SKYBOX_CAMERA: &str = "dynamic_reflection_skybox";
pub const ORTHO_2D_CAMERA: &str = "2d";

/// View distance of the sky cameras.
pub const SKYBOX_VIEW_DISTANCE: f32 = 10_000.0;
/// View distance of the dynamic reflection camera.
pub const REFLECTION_VIEW_DISTANCE: f32 = 100.0;
/// Near clip distance of perspective cameras.
pub const NEAR_CLIP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective,
    /// Orthographic box in view space.
    Orthographic { min: Vec3, max: Vec3 },
}

/// A named camera record.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsCamera {
    pub position: Vec3,
    /// World-to-view rotation.
    pub orientation: Quat,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub view_distance: f32,
    pub width: f32,
    pub height: f32,
    pub projection: Projection,
}

impl Default for GraphicsCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            fov: 45.0,
            view_distance: 1000.0,
            width: 1.0,
            height: 1.0,
            projection: Projection::Perspective,
        }
    }
}

impl GraphicsCamera {
    #[must_use]
    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, Projection::Orthographic { .. })
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation) * Mat4::from_translation(-self.position)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective => {
                let aspect = if self.height > 0.0 {
                    self.width / self.height
                } else {
                    1.0
                };
                Mat4::perspective_rh(self.fov.to_radians(), aspect, NEAR_CLIP, self.view_distance)
            }
            Projection::Orthographic { min, max } => {
                Mat4::orthographic_rh(min.x, max.x, min.y, max.y, min.z, max.z)
            }
        }
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Culling volume of this camera (frustum or orthographic box).
    #[must_use]
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(self.view_projection())
    }
}

/// View parameters supplied by the application each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneView {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub view_distance: f32,
    pub position: Vec3,
    pub orientation: Quat,
    /// Point the dynamic reflection cubemap is rendered around.
    pub reflection_sample: Vec3,
}

impl Default for SceneView {
    fn default() -> Self {
        Self {
            fov: 45.0,
            view_distance: 1000.0,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            reflection_sample: Vec3::ZERO,
        }
    }
}

/// Matrices shared by all shaders for the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMatrices {
    pub view: Mat4,
    /// One clip matrix per shadow cascade; identity when shadows are off.
    pub shadow_clip: [Mat4; 3],
}

impl Default for SceneMatrices {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            shadow_clip: [Mat4::IDENTITY; 3],
        }
    }
}

/// Owned table of named cameras.
#[derive(Debug, Default)]
pub struct CameraTable {
    cameras: FxHashMap<String, GraphicsCamera>,
}

impl CameraTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GraphicsCamera> {
        self.cameras.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, camera: GraphicsCamera) {
        self.cameras.insert(name.into(), camera);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cameras.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn clear(&mut self) {
        self.cameras.clear();
    }

    /// Builds the five base cameras for a `width` x `height` screen.
    pub fn setup_base(&mut self, view: &SceneView, width: u32, height: u32) {
        let default = GraphicsCamera {
            position: view.position,
            orientation: view.orientation,
            fov: view.fov,
            view_distance: view.view_distance,
            width: width as f32,
            height: height as f32,
            projection: Projection::Perspective,
        };

        let skybox = GraphicsCamera {
            view_distance: SKYBOX_VIEW_DISTANCE,
            ..default.clone()
        };

        let reflection = GraphicsCamera {
            position: view.reflection_sample,
            orientation: Quat::IDENTITY,
            fov: 90.0,
            view_distance: REFLECTION_VIEW_DISTANCE,
            width: 1.0,
            height: 1.0,
            projection: Projection::Perspective,
        };

        let reflection_skybox = GraphicsCamera {
            view_distance: SKYBOX_VIEW_DISTANCE,
            ..reflection.clone()
        };

        let ortho = GraphicsCamera {
            projection: Projection::Orthographic {
                min: Vec3::new(0.0, 1.0, -1.0),
                max: Vec3::new(1.0, 0.0, 1.0),
            },
            ..GraphicsCamera::default()
        };

        self.insert(DEFAULT_CAMERA, default);
        self.insert(SKYBOX_CAMERA, skybox);
        self.insert(REFLECTION_CAMERA, reflection);
        self.insert(REFLECTION_SKYBOX_CAMERA, reflection_skybox);
        self.insert(ORTHO_2D_CAMERA, ortho);
    }

    /// Derives the three shadow cascades from `default` and returns the
    /// matching scene matrices. Returns `None` if no default camera exists.
    pub fn setup_shadow_cascades(
        &mut self,
        light_direction: Vec3,
        close_shadow: f32,
    ) -> Option<SceneMatrices> {
        let default = self.get(DEFAULT_CAMERA)?.clone();
        let view = default.view_matrix();
        let light = light_rotation(light_direction);

        let mut matrices = SceneMatrices {
            view,
            ..SceneMatrices::default()
        };
        for (index, clip) in matrices.shadow_clip.iter_mut().enumerate() {
            let cascade = derive_cascade(&default, light, index, close_shadow);
            *clip = shadow_clip_matrix(&cascade, view);
            self.insert(shadow_camera_name(index), cascade);
        }
        Some(matrices)
    }

    /// Derives the camera for `face` of `base`, sized to the cube face
    /// resolution. Returns the derived name, or `None` if `base` is unknown.
    pub fn derive_cube_face(
        &mut self,
        base: &str,
        face: CubeFace,
        width: u32,
        height: u32,
    ) -> Option<String> {
        let base_camera = self.get(base)?;
        let camera = GraphicsCamera {
            orientation: face.orient(base_camera.orientation),
            fov: 90.0,
            width: width as f32,
            height: height as f32,
            ..base_camera.clone()
        };
        let name = cube_face_camera_name(base, face);
        self.insert(name.clone(), camera);
        Some(name)
    }
}
