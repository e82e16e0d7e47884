//! Shared test fixtures: a recording backend, an in-memory configuration
//! source and a scripted sky.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};

use strata::core::{FeatureFlags, ReportOnce, Result, StrataError};
use strata::render::backend::{
    CubeTextureOptions, FrameState, FramebufferHandle, LayerDraw, PostProcessDraw, RenderBackend,
    ShaderHandle, ShaderSource, TextureDesc, TextureHandle,
};
use strata::render::camera::{CubeFace, SceneMatrices};
use strata::render::capabilities::GpuCapabilities;
use strata::render::config::{ConfigSource, RenderGraphConfig};
use strata::render::cull::DrawableId;
use strata::render::outputs::{ExternalTextures, OutputGraph, OutputGraphBuilder};
use strata::render::sky::SkyModel;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Recording backend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedLayerDraw {
    pub pass_index: usize,
    pub layer: String,
    pub framebuffer: Option<FramebufferHandle>,
    pub face: Option<CubeFace>,
    pub camera_fov: f32,
    pub shader: Option<ShaderHandle>,
    pub clear_color: bool,
    pub clear_depth: bool,
    pub bindings: Vec<Option<TextureHandle>>,
    pub dynamic: Vec<DrawableId>,
    pub statics: Vec<DrawableId>,
    pub car_paint_hack: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPostProcess {
    pub pass_index: usize,
    pub framebuffer: Option<FramebufferHandle>,
    pub shader: ShaderHandle,
    pub bindings: Vec<Option<TextureHandle>>,
}

/// A [`RenderBackend`] that hands out sequential handles and records every
/// call it receives.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub caps: GpuCapabilities,
    next_id: u32,

    pub textures: FxHashMap<TextureHandle, TextureDesc>,
    pub textures_created: usize,
    pub framebuffers: FxHashMap<FramebufferHandle, Vec<TextureHandle>>,
    pub framebuffers_created: usize,
    pub shaders: FxHashMap<ShaderHandle, ShaderSource>,
    pub shaders_compiled: Vec<String>,
    pub failing_shaders: FxHashSet<String>,
    pub cube_textures: Vec<(PathBuf, CubeTextureOptions)>,
    pub missing_cube_textures: bool,

    pub viewport: (u32, u32),
    pub frame_state: Option<FrameState>,
    pub scene_matrices: Option<SceneMatrices>,
    pub frames_begun: usize,
    pub frames_ended: usize,
    pub attached_faces: Vec<(FramebufferHandle, CubeFace)>,
    pub layer_draws: Vec<RecordedLayerDraw>,
    pub postprocess_draws: Vec<RecordedPostProcess>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_capabilities(GpuCapabilities::default())
    }

    pub fn with_capabilities(caps: GpuCapabilities) -> Self {
        Self {
            caps,
            ..Self::default()
        }
    }

    pub fn failing_shader(mut self, name: &str) -> Self {
        self.failing_shaders.insert(name.to_string());
        self
    }

    fn next_handle(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Live texture handle created for output `name`.
    pub fn texture_named(&self, name: &str) -> Option<TextureHandle> {
        self.textures
            .iter()
            .find(|(_, desc)| desc.name == name)
            .map(|(handle, _)| *handle)
    }

    pub fn texture_desc(&self, name: &str) -> Option<&TextureDesc> {
        self.textures.values().find(|desc| desc.name == name)
    }

    pub fn draws_of_layer(&self, layer: &str) -> Vec<&RecordedLayerDraw> {
        self.layer_draws.iter().filter(|d| d.layer == layer).collect()
    }

    pub fn clear_draws(&mut self) {
        self.layer_draws.clear();
        self.postprocess_draws.clear();
        self.attached_faces.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn capabilities(&self) -> GpuCapabilities {
        self.caps
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> std::result::Result<TextureHandle, String> {
        let handle = TextureHandle(self.next_handle());
        self.textures.insert(handle, desc.clone());
        self.textures_created += 1;
        Ok(handle)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn create_framebuffer(
        &mut self,
        attachments: &[TextureHandle],
    ) -> std::result::Result<FramebufferHandle, String> {
        let handle = FramebufferHandle(self.next_handle());
        self.framebuffers.insert(handle, attachments.to_vec());
        self.framebuffers_created += 1;
        Ok(handle)
    }

    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffers.remove(&framebuffer);
    }

    fn load_cube_texture(
        &mut self,
        path: &Path,
        options: &CubeTextureOptions,
    ) -> std::result::Result<TextureHandle, String> {
        if self.missing_cube_textures {
            return Err("file not found".to_string());
        }
        self.cube_textures.push((path.to_path_buf(), *options));
        Ok(TextureHandle(self.next_handle()))
    }

    fn compile_shader(&mut self, source: &ShaderSource) -> std::result::Result<ShaderHandle, String> {
        if self.failing_shaders.contains(&source.name) {
            return Err("syntax error".to_string());
        }
        let handle = ShaderHandle(self.next_handle());
        self.shaders.insert(handle, source.clone());
        self.shaders_compiled.push(source.name.clone());
        Ok(handle)
    }

    fn release_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn set_frame_state(&mut self, state: &FrameState) {
        self.frame_state = Some(*state);
    }

    fn set_scene_matrices(&mut self, matrices: &SceneMatrices) {
        self.scene_matrices = Some(*matrices);
    }

    fn begin_frame(&mut self) {
        self.frames_begun += 1;
    }

    fn end_frame(&mut self) {
        self.frames_ended += 1;
    }

    fn attach_cube_face(&mut self, framebuffer: FramebufferHandle, face: CubeFace) {
        self.attached_faces.push((framebuffer, face));
    }

    fn draw_layer(&mut self, draw: &LayerDraw<'_>) {
        self.layer_draws.push(RecordedLayerDraw {
            pass_index: draw.pass_index,
            layer: draw.layer.to_string(),
            framebuffer: draw.target.framebuffer(),
            face: draw.face,
            camera_fov: draw.camera.fov,
            shader: draw.shader,
            clear_color: draw.state.clear_color,
            clear_depth: draw.state.clear_depth,
            bindings: draw.bindings.as_slice().to_vec(),
            dynamic: draw.dynamic.to_vec(),
            statics: draw.statics.to_vec(),
            car_paint_hack: draw.car_paint_hack,
        });
    }

    fn draw_postprocess(&mut self, draw: &PostProcessDraw<'_>) {
        self.postprocess_draws.push(RecordedPostProcess {
            pass_index: draw.pass_index,
            framebuffer: draw.target.framebuffer(),
            shader: draw.shader,
            bindings: draw.bindings.as_slice().to_vec(),
        });
    }
}

// ============================================================================
// In-memory configuration source
// ============================================================================

/// Serves configuration files by file name; unknown files fail to read.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigSource {
    files: FxHashMap<String, String>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file: &str, json: &str) -> Self {
        self.files.insert(file.to_string(), json.to_string());
        self
    }
}

impl ConfigSource for MemoryConfigSource {
    fn load(&self, path: &Path) -> Result<RenderGraphConfig> {
        let file = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        match self.files.get(file) {
            Some(json) => RenderGraphConfig::from_json_str(json),
            None => Err(StrataError::ConfigRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            }),
        }
    }
}

/// The minimal no-shader profile: scene straight to the framebuffer.
pub const NO_SHADERS_JSON: &str = r#"{
    "passes": [
        { "camera": "default", "draw": ["opaque", "car_noblend"], "clear_color": true, "clear_depth": true }
    ]
}"#;

// ============================================================================
// Sky
// ============================================================================

/// A sky with a fixed sun that records how it was driven.
#[derive(Debug)]
pub struct FixedSky {
    pub sun: Vec3,
    pub texture: TextureHandle,
    pub elapsed: f32,
    pub hours: f32,
    pub speed: f32,
}

impl FixedSky {
    pub fn new(sun: Vec3) -> Self {
        Self {
            sun,
            texture: TextureHandle(9000),
            elapsed: 0.0,
            hours: 12.0,
            speed: 1.0,
        }
    }
}

impl SkyModel for FixedSky {
    fn update(&mut self, dt: f32) {
        self.elapsed += dt * self.speed;
    }

    fn sun_direction(&self) -> Vec3 {
        self.sun
    }

    fn set_time(&mut self, hours: f32) {
        self.hours = hours;
    }

    fn set_time_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn texture(&self) -> TextureHandle {
        self.texture
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn parse_config(json: &str) -> RenderGraphConfig {
    RenderGraphConfig::from_json_str(json).expect("test configuration should decode")
}

/// Builds the output graph of `config` on an 800x600 screen.
pub fn build_outputs(
    config: &RenderGraphConfig,
    flags: &FeatureFlags,
    backend: &mut RecordingBackend,
    reporter: &mut ReportOnce,
) -> Result<OutputGraph> {
    let float_textures = backend.caps.float_textures();
    OutputGraphBuilder {
        config,
        flags,
        float_textures,
        screen_width: 800,
        screen_height: 600,
        fsaa: 4,
    }
    .build(backend, &ExternalTextures::default(), reporter)
}
