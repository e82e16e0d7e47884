//! Quality Settings & Feature Flag Derivation
//!
//! [`QualitySettings`] collects every user-facing quality knob the render
//! configuration can branch on. [`QualitySettings::feature_flags`] turns
//! them into the active [`FeatureFlags`] set that pass and output
//! conditions are evaluated against.
//!
//! # Flag table
//!
//! | Flag                     | Active when                                  |
//! |--------------------------|----------------------------------------------|
//! | `fsaa`                   | FSAA sample count > 1                        |
//! | `bloom`                  | bloom enabled                                |
//! | `normalmaps`             | normal mapping enabled                       |
//! | `ssao`                   | ambient occlusion low or high                |
//! | `ssao_low` / `ssao_high` | ambient occlusion tier                       |
//! | `reflection_disabled`    | reflection mode disabled                     |
//! | `reflection_dynamic`     | reflection mode dynamic                      |
//! | `shadows_near`           | shadows enabled                              |
//! | `shadows_medium`         | shadows enabled, distance tier > 0           |
//! | `shadows_far`            | shadows enabled, distance tier > 1           |
//! | `shadow_quality_low`     | shadows enabled, quality low                 |
//! | `shadow_quality_medium`  | shadows enabled, quality medium              |
//! | `shadow_quality_high`    | shadows enabled, quality high, vhigh or ultra|
//! | `shadow_quality_ultra`   | shadows enabled                              |
//! | `sky_dynamic`            | dynamic sky enabled                          |
//!
//! Quality tiers above high collapse onto the high behavior, while
//! `shadow_quality_ultra` is set whenever shadows are on at all and
//! `shadow_quality_vhigh` is never set. Render configurations depend on
//! this table as it is.

use std::path::PathBuf;

use strata_core::FeatureFlags;

/// File name of the full-shader render configuration.
pub const DEFAULT_RENDER_CONFIG: &str = "render.json";

/// Default radius of the nearest shadow cascade, in world units.
pub const DEFAULT_CLOSE_SHADOW: f32 = 5.0;

/// How reflections are sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReflectionMode {
    Disabled,
    /// A cubemap loaded from disk.
    #[default]
    Static,
    /// A cubemap rendered every frame around the reflection sample point.
    Dynamic,
}

/// Shadow filtering quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ShadowQuality {
    Low,
    #[default]
    Medium,
    High,
    VeryHigh,
    Ultra,
}

impl ShadowQuality {
    /// Preprocessor define selecting this tier in shaders.
    #[must_use]
    pub fn define(self) -> &'static str {
        match self {
            Self::Low => "_SHADOWSLOW_",
            Self::Medium => "_SHADOWSMEDIUM_",
            Self::High => "_SHADOWSHIGH_",
            Self::VeryHigh => "_SHADOWSVHIGH_",
            Self::Ultra => "_SHADOWSULTRA_",
        }
    }
}

/// Ambient occlusion tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbientOcclusion {
    #[default]
    Off,
    Low,
    High,
}

/// User quality settings consumed by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct QualitySettings {
    pub shadows: bool,
    /// Number of extra cascades: 0 = near only, 1 = near + medium, 2 = all three.
    pub shadow_distance: u8,
    pub shadow_quality: ShadowQuality,
    pub bloom: bool,
    pub normal_maps: bool,
    pub ambient_occlusion: AmbientOcclusion,
    pub reflections: ReflectionMode,
    pub dynamic_sky: bool,
    /// FSAA sample count; values <= 1 disable it.
    pub fsaa: u32,
    pub anisotropy: u32,
    /// Upper bound on loaded environment texture size, in pixels.
    pub texture_size: u32,
    /// Radius of the nearest shadow cascade.
    pub close_shadow: f32,
    pub static_reflection_map: Option<PathBuf>,
    pub static_ambient_map: Option<PathBuf>,
    /// Directory holding shaders and render configurations.
    pub shader_root: PathBuf,
    /// Requested render configuration file inside `shader_root`.
    pub render_config: String,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            shadows: false,
            shadow_distance: 0,
            shadow_quality: ShadowQuality::default(),
            bloom: false,
            normal_maps: false,
            ambient_occlusion: AmbientOcclusion::default(),
            reflections: ReflectionMode::default(),
            dynamic_sky: false,
            fsaa: 1,
            anisotropy: 0,
            texture_size: 2048,
            close_shadow: DEFAULT_CLOSE_SHADOW,
            static_reflection_map: None,
            static_ambient_map: None,
            shader_root: PathBuf::from("shaders"),
            render_config: DEFAULT_RENDER_CONFIG.to_string(),
        }
    }
}

impl QualitySettings {
    /// Builds the active flag set for these settings.
    #[must_use]
    pub fn feature_flags(&self) -> FeatureFlags {
        let mut flags = FeatureFlags::new();

        flags.insert_if("fsaa", self.fsaa > 1);
        flags.insert_if("bloom", self.bloom);
        flags.insert_if("normalmaps", self.normal_maps);

        flags.insert_if("ssao", self.ambient_occlusion != AmbientOcclusion::Off);
        flags.insert_if("ssao_low", self.ambient_occlusion == AmbientOcclusion::Low);
        flags.insert_if("ssao_high", self.ambient_occlusion == AmbientOcclusion::High);

        flags.insert_if("reflection_disabled", self.reflections == ReflectionMode::Disabled);
        flags.insert_if("reflection_dynamic", self.reflections == ReflectionMode::Dynamic);

        if self.shadows {
            flags.insert("shadows_near");
            flags.insert_if("shadows_medium", self.shadow_distance > 0);
            flags.insert_if("shadows_far", self.shadow_distance > 1);

            flags.insert_if("shadow_quality_low", self.shadow_quality == ShadowQuality::Low);
            flags.insert_if(
                "shadow_quality_medium",
                self.shadow_quality == ShadowQuality::Medium,
            );
            flags.insert_if("shadow_quality_high", self.shadow_quality >= ShadowQuality::High);
            flags.insert("shadow_quality_ultra");
        }

        flags.insert_if("sky_dynamic", self.dynamic_sky);

        flags
    }
}
