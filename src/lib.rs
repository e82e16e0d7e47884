#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # Strata
//!
//! Umbrella crate of the Strata render graph.
//!
//! - [`core`]: flags, conditions, interning, diagnostics and errors
//! - [`render`]: configuration, outputs, cameras, culling and execution
//!
//! Most applications only need the [`prelude`].

pub use strata_core as core;
pub use strata_render as render;

pub use strata_core::{Condition, FeatureFlags, Result, StrataError};
pub use strata_render::Renderer;

pub mod prelude {
    pub use strata_core::{Condition, FeatureFlags, Result, StrataError};
    pub use strata_render::backend::{
        CubeTextureOptions, FrameState, FramebufferHandle, LayerDraw, PostProcessDraw,
        RenderBackend, ShaderHandle, ShaderSource, TextureDesc, TextureHandle,
    };
    pub use strata_render::camera::{CubeFace, GraphicsCamera, SceneMatrices, SceneView};
    pub use strata_render::capabilities::{GpuCapabilities, GpuFeatures};
    pub use strata_render::config::{ConfigSource, FileConfigSource, RenderGraphConfig};
    pub use strata_render::cull::{
        DrawableId, DynamicDrawable, StaticDrawList, StaticScene,
    };
    pub use strata_render::executor::FrameStats;
    pub use strata_render::fallback::ConfigProfile;
    pub use strata_render::settings::{
        AmbientOcclusion, QualitySettings, ReflectionMode, ShadowQuality,
    };
    pub use strata_render::sky::SkyModel;
    pub use strata_render::Renderer;
}
