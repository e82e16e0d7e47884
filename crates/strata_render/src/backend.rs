//! GPU Backend Interface
//!
//! The render graph never touches the GPU directly. Every allocation,
//! state change and draw goes through [`RenderBackend`], a narrow
//! synchronous trait implemented by the embedding engine.
//!
//! # Texture bindings
//!
//! Input textures are handed to the backend as an explicit
//! [`TextureBindings`] list (texture unit → texture) inside each draw
//! request. The backend binds them before drawing and unbinds them
//! afterwards; no "active texture unit" state survives between calls.

use std::path::{Path, PathBuf};

use glam::Vec3;
use smallvec::SmallVec;

use crate::camera::{CubeFace, GraphicsCamera, SceneMatrices};
use crate::capabilities::GpuCapabilities;
use crate::config::{BlendMode, DepthTest, PixelFormat};
use crate::cull::DrawableId;
use crate::outputs::RenderTarget;
use crate::shaders::ShaderDefines;

// ============================================================================
// Handles
// ============================================================================

/// Opaque texture handle issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque framebuffer object handle issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u32);

/// Opaque shader program handle issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

// ============================================================================
// Descriptors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2d,
    Rectangle,
    Cube,
}

/// Allocation request for an output texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub name: String,
    pub target: TextureTarget,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub mipmap: bool,
    pub nearest: bool,
    /// Sample count; 0 or 1 means single sampled.
    pub multisample: u32,
    /// Hardware depth comparison (shadow samplers).
    pub depth_comparison: bool,
}

/// Loading options for an environment cubemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeTextureOptions {
    pub mipmap: bool,
    pub anisotropy: u32,
    /// Largest allowed face size in pixels.
    pub max_size: u32,
    /// Faces are laid out as a vertical cross in one image.
    pub vertical_cross: bool,
}

/// Everything needed to compile one shader program.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub name: String,
    pub vertex: PathBuf,
    pub fragment: PathBuf,
    pub defines: ShaderDefines,
}

/// Per-frame values shared by all passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub contrast: f32,
    pub sun_direction: Vec3,
    pub fsaa: u32,
    pub using_shaders: bool,
}

/// Fixed-function state of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassState {
    pub blend: BlendMode,
    pub depth_test: DepthTest,
    pub clear_color: bool,
    pub clear_depth: bool,
    pub write_color: bool,
    pub write_alpha: bool,
    pub write_depth: bool,
}

impl PassState {
    #[must_use]
    pub fn clears(&self) -> bool {
        self.clear_color || self.clear_depth
    }
}

/// Texture unit → texture list; unbound units are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureBindings {
    units: SmallVec<[Option<TextureHandle>; 8]>,
}

impl TextureBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `texture` to `unit`, growing the list with empty units.
    pub fn bind(&mut self, unit: u32, texture: Option<TextureHandle>) {
        let unit = unit as usize;
        if self.units.len() <= unit {
            self.units.resize(unit + 1, None);
        }
        self.units[unit] = texture;
    }

    #[must_use]
    pub fn get(&self, unit: u32) -> Option<TextureHandle> {
        self.units.get(unit as usize).copied().flatten()
    }

    /// Number of units covered, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Option<TextureHandle>] {
        &self.units
    }
}

/// One geometry draw: a layer into a target.
#[derive(Debug, Clone, Copy)]
pub struct LayerDraw<'a> {
    pub pass_index: usize,
    pub layer: &'a str,
    pub target: &'a RenderTarget,
    /// Set when drawing into one face of a cubemap target.
    pub face: Option<CubeFace>,
    pub camera: &'a GraphicsCamera,
    pub shader: Option<ShaderHandle>,
    pub state: &'a PassState,
    pub bindings: &'a TextureBindings,
    pub dynamic: &'a [DrawableId],
    pub statics: &'a [DrawableId],
    /// Fixed-function car paint emulation for the `car_noblend` layer.
    pub car_paint_hack: bool,
}

/// One full-screen post-process draw.
#[derive(Debug, Clone, Copy)]
pub struct PostProcessDraw<'a> {
    pub pass_index: usize,
    pub target: &'a RenderTarget,
    pub camera: &'a GraphicsCamera,
    pub shader: ShaderHandle,
    pub state: &'a PassState,
    pub bindings: &'a TextureBindings,
}

// ============================================================================
// Backend trait
// ============================================================================

/// GPU collaborator consumed by the render graph.
pub trait RenderBackend {
    fn capabilities(&self) -> GpuCapabilities;

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle, String>;
    fn release_texture(&mut self, texture: TextureHandle);

    /// Creates one framebuffer with every texture attached as a separate
    /// render target, in order.
    fn create_framebuffer(&mut self, attachments: &[TextureHandle])
    -> Result<FramebufferHandle, String>;
    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle);

    fn load_cube_texture(
        &mut self,
        path: &Path,
        options: &CubeTextureOptions,
    ) -> Result<TextureHandle, String>;

    fn compile_shader(&mut self, source: &ShaderSource) -> Result<ShaderHandle, String>;
    fn release_shader(&mut self, shader: ShaderHandle);

    fn set_viewport(&mut self, width: u32, height: u32);
    fn set_frame_state(&mut self, state: &FrameState);
    fn set_scene_matrices(&mut self, matrices: &SceneMatrices);

    fn begin_frame(&mut self) {}
    fn end_frame(&mut self) {}

    /// Selects the cube face subsequent draws into `framebuffer` render to.
    fn attach_cube_face(&mut self, framebuffer: FramebufferHandle, face: CubeFace);

    fn draw_layer(&mut self, draw: &LayerDraw<'_>);
    fn draw_postprocess(&mut self, draw: &PostProcessDraw<'_>);
}
