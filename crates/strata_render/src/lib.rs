#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! # Strata Render
//!
//! A declarative, condition-gated multi-pass render graph.
//!
//! A JSON configuration declares shaders, render outputs and an ordered
//! list of passes. Quality settings turn into [`FeatureFlags`], which gate
//! every descriptor through its conditions. Each frame the [`Renderer`]
//! culls static geometry per camera and layer, then runs the active passes
//! in order against a [`RenderBackend`].
//!
//! [`FeatureFlags`]: strata_core::FeatureFlags

pub mod backend;
pub mod camera;
pub mod capabilities;
pub mod config;
pub mod cull;
pub mod executor;
pub mod fallback;
pub mod outputs;
pub mod renderer;
pub mod settings;
pub mod shaders;
pub mod sky;

pub use backend::{
    FramebufferHandle, LayerDraw, PostProcessDraw, RenderBackend, ShaderHandle, TextureHandle,
};
pub use camera::{CameraTable, CubeFace, GraphicsCamera, SceneView};
pub use capabilities::{GpuCapabilities, GpuFeatures};
pub use config::{ConfigSource, FileConfigSource, RenderGraphConfig};
pub use cull::{DrawableId, DynamicDrawable, StaticDrawList, StaticScene};
pub use executor::FrameStats;
pub use fallback::ConfigProfile;
pub use outputs::{OutputGraph, RenderTarget};
pub use renderer::Renderer;
pub use settings::{AmbientOcclusion, QualitySettings, ReflectionMode, ShadowQuality};
pub use shaders::ShaderDefines;
pub use sky::SkyModel;
