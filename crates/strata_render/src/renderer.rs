//! Renderer Facade
//!
//! [`Renderer`] is the single context object owning every table of the
//! active configuration: the loaded [`RenderGraphConfig`], the
//! [`FeatureFlags`], the [`ShaderTable`], the [`OutputGraph`], the
//! [`CameraTable`] and the per-frame [`CullCache`].
//!
//! # Lifecycle
//!
//! ```text
//! Renderer::new ─▶ init ─▶ ┌─ setup_scene ─▶ update_scene ─▶ draw_scene ─┐
//!                          └──────────────────── per frame ◀─────────────┘
//!                  change_display / reload_shaders ─▶ full rebuild
//! ```
//!
//! # Configuration cascade
//!
//! `init` resolves the requested profile through the capability fallback
//! rules, then enables shaders. Enabling shaders loads the configuration,
//! compiles every shader and builds the output graph; any failure on the
//! way (including a float texture output on hardware without float
//! textures) discards the partial state and disables shaders, loading the
//! no-shader profile. Failing to load that profile is fatal.

use glam::Vec3;
use strata_core::{FeatureFlags, ReportOnce, Result, StrataError, interner};

use crate::backend::{
    CubeTextureOptions, FrameState, RenderBackend, ShaderHandle, TextureHandle,
};
use crate::camera::{CameraTable, DEFAULT_CAMERA, SceneMatrices, SceneView};
use crate::capabilities::GpuCapabilities;
use crate::config::{ConfigSource, FileConfigSource, RenderGraphConfig};
use crate::cull::{CullCache, Culler, DynamicDrawList, DynamicDrawable, StaticScene};
use crate::executor::{FrameStats, PassExecutor};
use crate::fallback::{ConfigProfile, resolve_profile};
use crate::outputs::{ExternalTextures, OutputGraph, OutputGraphBuilder};
use crate::settings::{QualitySettings, ReflectionMode};
use crate::shaders::ShaderTable;
use crate::sky::{SKY_INPUT, SkyModel};

/// Input name of the static reflection cubemap.
pub const REFLECTION_CUBE_INPUT: &str = "reflection_cube";
/// Input name of the static ambient cubemap.
pub const AMBIENT_CUBE_INPUT: &str = "ambient_cube";

/// The render graph context.
pub struct Renderer<B: RenderBackend> {
    backend: B,
    source: Box<dyn ConfigSource>,
    sky: Option<Box<dyn SkyModel>>,

    settings: QualitySettings,
    capabilities: GpuCapabilities,
    profile: ConfigProfile,

    // ─── Tables of the active configuration ─────────────────────────────
    config: RenderGraphConfig,
    flags: FeatureFlags,
    shaders: ShaderTable,
    outputs: OutputGraph,
    cameras: CameraTable,
    cull: CullCache,
    dynamic: DynamicDrawList,
    reporter: ReportOnce,

    // ─── External textures ──────────────────────────────────────────────
    user_inputs: ExternalTextures,
    static_reflection: Option<TextureHandle>,
    static_ambient: Option<TextureHandle>,

    // ─── Frame state ────────────────────────────────────────────────────
    using_shaders: bool,
    shadows: bool,
    width: u32,
    height: u32,
    light_direction: Vec3,
    contrast: f32,
    close_shadow: f32,
    initialized: bool,
}

impl<B: RenderBackend> Renderer<B> {
    /// Creates an uninitialized renderer reading configurations from disk.
    pub fn new(backend: B, settings: QualitySettings) -> Self {
        let capabilities = backend.capabilities();
        Self {
            backend,
            source: Box::new(FileConfigSource),
            sky: None,
            close_shadow: settings.close_shadow,
            profile: ConfigProfile::from_file(&settings.render_config),
            settings,
            capabilities,
            config: RenderGraphConfig::default(),
            flags: FeatureFlags::new(),
            shaders: ShaderTable::new(),
            outputs: OutputGraph::default(),
            cameras: CameraTable::new(),
            cull: CullCache::new(),
            dynamic: DynamicDrawList::new(),
            reporter: ReportOnce::new(),
            user_inputs: ExternalTextures::default(),
            static_reflection: None,
            static_ambient: None,
            using_shaders: false,
            shadows: false,
            width: 1,
            height: 1,
            light_direction: Vec3::Z,
            contrast: 1.0,
            initialized: false,
        }
    }

    #[must_use]
    pub fn with_config_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Attaches the sky model used when dynamic sky is enabled.
    #[must_use]
    pub fn with_sky(mut self, sky: impl SkyModel + 'static) -> Self {
        self.sky = Some(Box::new(sky));
        self
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Resolves the profile for the hardware and enables the render graph.
    ///
    /// Only the loss of the no-shader configuration is an error.
    pub fn init(&mut self, width: u32, height: u32) -> Result<()> {
        interner::preload_flag_names();

        self.capabilities = self.backend.capabilities();
        log::info!("Maximum anisotropy: {}", self.capabilities.max_anisotropy);
        log::info!("Maximum color attachments: {}", self.capabilities.max_color_attachments);
        log::info!("Maximum draw buffers: {}", self.capabilities.max_draw_buffers);

        self.width = width.max(1);
        self.height = height.max(1);
        self.backend.set_viewport(self.width, self.height);
        self.initialized = true;

        let requested = ConfigProfile::from_file(&self.settings.render_config);
        let decision = resolve_profile(&requested, &self.capabilities);
        if let Some(notice) = decision.notice {
            log::warn!("{notice}");
        }
        self.profile = decision.profile;

        if !self.profile.uses_shaders() {
            return self.disable_shaders();
        }

        self.load_static_textures();
        self.enable_shaders()
    }

    /// Releases every GPU object owned by the renderer.
    pub fn deinit(&mut self) {
        self.shaders.release(&mut self.backend);
        self.outputs.release(&mut self.backend);
        for texture in [self.static_reflection.take(), self.static_ambient.take()]
            .into_iter()
            .flatten()
        {
            self.backend.release_texture(texture);
        }
        self.cameras.clear();
        self.cull.clear();
        self.initialized = false;
    }

    /// Stores the new resolution and rebuilds resolution dependent state.
    pub fn change_display(&mut self, width: u32, height: u32) -> Result<()> {
        let (width, height) = (width.max(1), height.max(1));
        let changed = (width, height) != (self.width, self.height);
        self.width = width;
        self.height = height;
        self.backend.set_viewport(width, height);

        if self.initialized && changed && self.using_shaders {
            self.enable_shaders()?;
        }
        Ok(())
    }

    /// Reloads the configuration and recompiles all shaders.
    ///
    /// Returns whether shaders are in use afterwards.
    pub fn reload_shaders(&mut self) -> Result<bool> {
        if !self.profile.uses_shaders() {
            let requested = ConfigProfile::from_file(&self.settings.render_config);
            self.profile = resolve_profile(&requested, &self.capabilities).profile;
            if !self.profile.uses_shaders() {
                self.disable_shaders()?;
                return Ok(false);
            }
        }
        self.enable_shaders()?;
        Ok(self.using_shaders)
    }

    fn enable_shaders(&mut self) -> Result<()> {
        self.reset_configuration();

        let path = self.profile.path(&self.settings.shader_root);
        log::info!("Render configuration: {}", path.display());
        match self.try_enable_shaders() {
            Ok(()) => {
                self.using_shaders = true;
                self.shadows = self.settings.shadows;
                log::info!("Successfully enabled shaders");
                Ok(())
            }
            Err(err) => {
                log::error!("{err}. Disabling shaders.");
                self.disable_shaders()
            }
        }
    }

    fn try_enable_shaders(&mut self) -> Result<()> {
        let path = self.profile.path(&self.settings.shader_root);
        self.config = self.source.load(&path)?;
        self.flags = self.settings.feature_flags();

        self.shaders = ShaderTable::load(
            &self.config,
            &self.settings,
            self.width,
            self.height,
            &mut self.backend,
        )?;

        let builder = OutputGraphBuilder {
            config: &self.config,
            flags: &self.flags,
            float_textures: self.capabilities.float_textures(),
            screen_width: self.width,
            screen_height: self.height,
            fsaa: self.settings.fsaa,
        };
        let seeds = self.input_seeds(true);
        match builder.build(&mut self.backend, &seeds, &mut self.reporter) {
            Ok(outputs) => {
                self.outputs = outputs;
                Ok(())
            }
            Err(err) => {
                self.shaders.release(&mut self.backend);
                Err(err)
            }
        }
    }

    /// Switches to the no-shader profile. Fatal if it cannot be loaded.
    fn disable_shaders(&mut self) -> Result<()> {
        self.reset_configuration();
        self.profile = ConfigProfile::NoShaders;
        self.using_shaders = false;
        self.shadows = false;

        let path = self.profile.path(&self.settings.shader_root);
        self.config = self.source.load(&path).map_err(|err| {
            log::error!("Unable to load fallback render configuration {}", path.display());
            StrataError::FallbackUnavailable {
                path: path.clone(),
                reason: err.to_string(),
            }
        })?;

        let settings = QualitySettings {
            shadows: false,
            dynamic_sky: false,
            ..self.settings.clone()
        };
        self.flags = settings.feature_flags();

        let seeds = self.input_seeds(false);
        self.outputs = OutputGraph::framebuffer_only(&seeds);
        Ok(())
    }

    /// Drops every table derived from the previous configuration.
    fn reset_configuration(&mut self) {
        self.shaders.release(&mut self.backend);
        self.outputs.release(&mut self.backend);
        self.config = RenderGraphConfig::default();
        self.flags.clear();
        self.cameras.clear();
        self.cull.clear();
        self.reporter.clear();
    }

    fn load_static_textures(&mut self) {
        let max_size = self.settings.texture_size;
        let anisotropy = self.settings.anisotropy;

        if self.settings.reflections == ReflectionMode::Static
            && self.static_reflection.is_none()
            && let Some(path) = self.settings.static_reflection_map.clone()
        {
            let options = CubeTextureOptions {
                mipmap: true,
                anisotropy,
                max_size,
                vertical_cross: true,
            };
            match self.backend.load_cube_texture(&path, &options) {
                Ok(texture) => self.static_reflection = Some(texture),
                Err(reason) => log::error!(
                    "Error loading static reflection map {}: {reason}",
                    path.display()
                ),
            }
        }

        if self.static_ambient.is_none()
            && let Some(path) = self.settings.static_ambient_map.clone()
        {
            let options = CubeTextureOptions {
                mipmap: false,
                anisotropy: 0,
                max_size,
                vertical_cross: true,
            };
            match self.backend.load_cube_texture(&path, &options) {
                Ok(texture) => self.static_ambient = Some(texture),
                Err(reason) => log::error!(
                    "Error loading static ambient map {}: {reason}",
                    path.display()
                ),
            }
        }
    }

    /// External textures offered to passes; outputs shadow these names.
    fn input_seeds(&self, with_sky: bool) -> ExternalTextures {
        let mut seeds = self.user_inputs.clone();
        if self.settings.reflections == ReflectionMode::Static
            && let Some(texture) = self.static_reflection
        {
            seeds.insert(REFLECTION_CUBE_INPUT.to_string(), texture);
        }
        if let Some(texture) = self.static_ambient {
            seeds.insert(AMBIENT_CUBE_INPUT.to_string(), texture);
        }
        if with_sky
            && self.settings.dynamic_sky
            && let Some(sky) = &self.sky
        {
            seeds.insert(SKY_INPUT.to_string(), sky.texture());
        }
        seeds
    }

    // ========================================================================
    // Per frame
    // ========================================================================

    /// Builds the base cameras and, with shadows on, the cascade cameras.
    pub fn setup_scene(&mut self, view: &SceneView) {
        self.cameras.setup_base(view, self.width, self.height);

        let matrices = if self.shadows {
            self.cameras
                .setup_shadow_cascades(self.light_direction, self.close_shadow)
        } else {
            None
        };
        let matrices = matrices.unwrap_or_else(|| SceneMatrices {
            view: self
                .cameras
                .get(DEFAULT_CAMERA)
                .map_or(glam::Mat4::IDENTITY, |camera| camera.view_matrix()),
            ..SceneMatrices::default()
        });
        self.backend.set_scene_matrices(&matrices);
    }

    /// Advances the sky and picks up its sun direction. The sky only runs
    /// while shaders are on and dynamic sky is enabled.
    pub fn update_scene(&mut self, dt: f32) {
        if !self.using_shaders || !self.settings.dynamic_sky {
            return;
        }
        if let Some(sky) = &mut self.sky {
            sky.update(dt);
            self.light_direction = sky.sun_direction();
        }
    }

    /// Culls and draws every active pass.
    pub fn draw_scene<S: StaticScene + ?Sized>(&mut self, scene: &S) -> FrameStats {
        self.dynamic.sort();

        self.backend.begin_frame();
        self.backend.set_frame_state(&FrameState {
            contrast: self.contrast,
            sun_direction: self.light_direction,
            fsaa: self.settings.fsaa,
            using_shaders: self.using_shaders,
        });

        Culler {
            config: &self.config,
            flags: &self.flags,
            outputs: &self.outputs,
        }
        .run(&mut self.cameras, scene, &mut self.cull, &mut self.reporter);

        let stats = PassExecutor {
            config: &self.config,
            flags: &self.flags,
            outputs: &self.outputs,
            cameras: &self.cameras,
            shaders: &self.shaders,
            cull: &self.cull,
            dynamic: &self.dynamic,
            using_shaders: self.using_shaders,
        }
        .execute(&mut self.backend, &mut self.reporter);

        self.backend.end_frame();
        log::trace!("Frame: {stats:?}");
        stats
    }

    pub fn add_dynamic_drawable(&mut self, layer: &str, drawable: DynamicDrawable) {
        self.dynamic.add(layer, drawable);
    }

    pub fn clear_dynamic_drawables(&mut self) {
        self.dynamic.clear();
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Registers an external texture passes can read by `name`. It stays
    /// registered across rebuilds.
    pub fn add_input_texture(&mut self, name: &str, texture: TextureHandle) {
        self.user_inputs.insert(name.to_string(), texture);
        if self.outputs.texture(name).is_none() {
            self.outputs.add_input(name, texture);
        }
    }

    pub fn set_sun_direction(&mut self, direction: Vec3) {
        self.light_direction = direction;
    }

    pub fn set_contrast(&mut self, contrast: f32) {
        self.contrast = contrast;
    }

    pub fn set_local_time(&mut self, hours: f32) {
        if let Some(sky) = &mut self.sky {
            sky.set_time(hours);
        }
    }

    pub fn set_local_time_speed(&mut self, speed: f32) {
        if let Some(sky) = &mut self.sky {
            sky.set_time_speed(speed);
        }
    }

    /// Sets the radius of the nearest shadow cascade.
    pub fn set_close_shadow(&mut self, radius: f32) {
        self.close_shadow = radius;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn shader(&self, name: &str) -> Option<ShaderHandle> {
        self.shaders.get(name)
    }

    #[must_use]
    pub fn using_shaders(&self) -> bool {
        self.using_shaders
    }

    #[must_use]
    pub fn shadows(&self) -> bool {
        self.shadows
    }

    #[must_use]
    pub fn max_anisotropy(&self) -> u32 {
        self.capabilities.max_anisotropy
    }

    #[must_use]
    pub fn antialiasing_supported(&self) -> bool {
        self.capabilities.antialiasing()
    }

    #[must_use]
    pub fn profile(&self) -> &ConfigProfile {
        &self.profile
    }

    #[must_use]
    pub fn config(&self) -> &RenderGraphConfig {
        &self.config
    }

    #[must_use]
    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    #[must_use]
    pub fn outputs(&self) -> &OutputGraph {
        &self.outputs
    }

    #[must_use]
    pub fn cameras(&self) -> &CameraTable {
        &self.cameras
    }

    #[must_use]
    pub fn cull_cache(&self) -> &CullCache {
        &self.cull
    }

    #[must_use]
    pub fn diagnostics(&self) -> &ReportOnce {
        &self.reporter
    }

    #[must_use]
    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    #[must_use]
    pub fn display_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
