//! Capability Fallback
//!
//! Chooses the render configuration profile the hardware can run. The
//! checks are an ordered list of [`FallbackRule`]s evaluated top to bottom;
//! the first unmet requirement decides the profile.
//!
//! | Requirement          | Fallback profile |
//! |----------------------|------------------|
//! | multitexturing       | no shaders       |
//! | cube maps            | no shaders       |
//! | NPOT textures        | no shaders       |
//! | shading language     | no shaders       |
//! | framebuffer objects  | no FBOs          |
//!
//! Missing float texture support is only discovered while building
//! outputs; the renderer then falls back to the no-shader profile as well.

use std::path::{Path, PathBuf};

use crate::capabilities::{GpuCapabilities, GpuFeatures};
use crate::settings::DEFAULT_RENDER_CONFIG;

pub const NO_FBOS_CONFIG: &str = "nofbos.json";
pub const NO_SHADERS_CONFIG: &str = "noshaders.json";

/// A named render configuration tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProfile {
    /// Full shader pipeline from the named file.
    Shaders(String),
    NoFbos,
    NoShaders,
}

impl Default for ConfigProfile {
    fn default() -> Self {
        Self::Shaders(DEFAULT_RENDER_CONFIG.to_string())
    }
}

impl ConfigProfile {
    #[must_use]
    pub fn from_file(file: &str) -> Self {
        match file {
            NO_FBOS_CONFIG => Self::NoFbos,
            NO_SHADERS_CONFIG => Self::NoShaders,
            other => Self::Shaders(other.to_string()),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        match self {
            Self::Shaders(file) => file,
            Self::NoFbos => NO_FBOS_CONFIG,
            Self::NoShaders => NO_SHADERS_CONFIG,
        }
    }

    #[must_use]
    pub fn path(&self, shader_root: &Path) -> PathBuf {
        shader_root.join(self.file_name())
    }

    #[must_use]
    pub fn uses_shaders(&self) -> bool {
        !matches!(self, Self::NoShaders)
    }
}

/// A capability a profile depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Multitexture,
    CubeMaps,
    NpotTextures,
    ShadingLanguage,
    Framebuffers,
}

impl Requirement {
    #[must_use]
    pub fn met(self, caps: &GpuCapabilities) -> bool {
        match self {
            Self::Multitexture => caps.supports(GpuFeatures::MULTITEXTURE),
            Self::CubeMaps => caps.supports(GpuFeatures::CUBE_MAP),
            Self::NpotTextures => caps.supports(GpuFeatures::NPOT_TEXTURES),
            Self::ShadingLanguage => caps.supports(GpuFeatures::SHADING_LANGUAGE),
            Self::Framebuffers => caps.framebuffers_usable(),
        }
    }
}

/// Profile tiers a rule can fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    NoFbos,
    NoShaders,
}

impl From<Fallback> for ConfigProfile {
    fn from(fallback: Fallback) -> Self {
        match fallback {
            Fallback::NoFbos => Self::NoFbos,
            Fallback::NoShaders => Self::NoShaders,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackRule {
    pub requirement: Requirement,
    pub fallback: Fallback,
    pub notice: &'static str,
}

/// The fallback cascade, strictest first.
pub const FALLBACK_RULES: [FallbackRule; 5] = [
    FallbackRule {
        requirement: Requirement::Multitexture,
        fallback: Fallback::NoShaders,
        notice: "Your video card doesn't support multitexturing. Disabling shaders.",
    },
    FallbackRule {
        requirement: Requirement::CubeMaps,
        fallback: Fallback::NoShaders,
        notice: "Your video card doesn't support cube maps. Disabling shaders.",
    },
    FallbackRule {
        requirement: Requirement::NpotTextures,
        fallback: Fallback::NoShaders,
        notice: "Your video card doesn't support non-power-of-two textures. Disabling shaders.",
    },
    FallbackRule {
        requirement: Requirement::ShadingLanguage,
        fallback: Fallback::NoShaders,
        notice: "Your video card doesn't support the shading language. Disabling shaders.",
    },
    FallbackRule {
        requirement: Requirement::Framebuffers,
        fallback: Fallback::NoFbos,
        notice: "Your video card doesn't support framebuffer objects. Falling back to the no-FBO render configuration.",
    },
];

/// Outcome of [`resolve_profile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDecision {
    pub profile: ConfigProfile,
    /// Notice of the rule that fired, if any.
    pub notice: Option<&'static str>,
}

/// Evaluates [`FALLBACK_RULES`] against `caps` for the `requested` profile.
///
/// A rule whose fallback is the requested profile or a richer tier than
/// it does not apply (a no-FBO request is never "downgraded" to no-FBO).
#[must_use]
pub fn resolve_profile(requested: &ConfigProfile, caps: &GpuCapabilities) -> ProfileDecision {
    resolve_with_rules(requested, caps, &FALLBACK_RULES)
}

/// [`resolve_profile`] with an explicit rule list.
#[must_use]
pub fn resolve_with_rules(
    requested: &ConfigProfile,
    caps: &GpuCapabilities,
    rules: &[FallbackRule],
) -> ProfileDecision {
    if *requested == ConfigProfile::NoShaders {
        return ProfileDecision {
            profile: ConfigProfile::NoShaders,
            notice: None,
        };
    }

    for rule in rules {
        let applies = match rule.fallback {
            Fallback::NoShaders => true,
            Fallback::NoFbos => *requested != ConfigProfile::NoFbos,
        };
        if applies && !rule.requirement.met(caps) {
            return ProfileDecision {
                profile: rule.fallback.into(),
                notice: Some(rule.notice),
            };
        }
    }

    ProfileDecision {
        profile: requested.clone(),
        notice: None,
    }
}
