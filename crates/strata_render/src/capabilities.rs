//! Hardware capability probe results.

use bitflags::bitflags;

bitflags! {
    /// Optional GPU/driver features the render graph can use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GpuFeatures: u32 {
        const MULTITEXTURE       = 1 << 0;
        const CUBE_MAP           = 1 << 1;
        const NPOT_TEXTURES      = 1 << 2;
        const FLOAT_TEXTURES     = 1 << 3;
        const FRAMEBUFFER_OBJECT = 1 << 4;
        const SHADING_LANGUAGE   = 1 << 5;
        const MULTISAMPLE        = 1 << 6;
    }
}

/// Capabilities reported by the backend, queried once per (re)configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuCapabilities {
    pub features: GpuFeatures,
    /// Maximum simultaneous draw buffers (multiple render targets).
    pub max_draw_buffers: u32,
    pub max_color_attachments: u32,
    pub max_anisotropy: u32,
}

impl Default for GpuCapabilities {
    /// A fully capable device.
    fn default() -> Self {
        Self {
            features: GpuFeatures::all(),
            max_draw_buffers: 4,
            max_color_attachments: 4,
            max_anisotropy: 16,
        }
    }
}

impl GpuCapabilities {
    #[inline]
    #[must_use]
    pub fn supports(&self, features: GpuFeatures) -> bool {
        self.features.contains(features)
    }

    /// Framebuffer objects are usable only with at least one draw buffer
    /// and one color attachment.
    #[must_use]
    pub fn framebuffers_usable(&self) -> bool {
        self.supports(GpuFeatures::FRAMEBUFFER_OBJECT)
            && self.max_draw_buffers >= 1
            && self.max_color_attachments >= 1
    }

    #[inline]
    #[must_use]
    pub fn float_textures(&self) -> bool {
        self.supports(GpuFeatures::FLOAT_TEXTURES)
    }

    #[inline]
    #[must_use]
    pub fn antialiasing(&self) -> bool {
        self.supports(GpuFeatures::MULTISAMPLE)
    }

    /// Returns a copy without the given features.
    #[must_use]
    pub fn without(mut self, features: GpuFeatures) -> Self {
        self.features.remove(features);
        self
    }
}
