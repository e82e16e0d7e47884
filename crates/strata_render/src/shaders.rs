//! Shader Table & Preprocessor Defines
//!
//! Every shader descriptor of the active configuration is compiled when
//! the configuration is (re)loaded, with preprocessor defines generated
//! from the quality settings and screen resolution:
//!
//! | Define                          | Present when                          |
//! |---------------------------------|---------------------------------------|
//! | `SCREENRESX`, `SCREENRESY`      | always (valued with the resolution)   |
//! | `_REFLECTIONDISABLED_`          | reflection mode disabled              |
//! | `_REFLECTIONSTATIC_`            | reflection mode static                |
//! | `_REFLECTIONDYNAMIC_`           | reflection mode dynamic               |
//! | `_SHADOWS_`                     | shadows enabled                       |
//! | `_CSM2_` / `_CSM3_`             | shadow distance tier > 0 / > 1        |
//! | `_SHADOWSLOW_` .. `_SHADOWSULTRA_` | shadow quality tier                |
//! | `_NORMALMAPS_`                  | normal mapping enabled                |
//! | `_SSAO_LOW_` / `_SSAO_HIGH_`    | ambient occlusion tier                |
//!
//! The descriptor's own defines are applied last and may override these.

use rustc_hash::FxHashMap;
use strata_core::interner::{self, Symbol};
use strata_core::{Result, StrataError};

use crate::backend::{RenderBackend, ShaderHandle, ShaderSource};
use crate::config::{RenderGraphConfig, ShaderDescriptor};
use crate::settings::{AmbientOcclusion, QualitySettings, ReflectionMode};

// ============================================================================
// ShaderDefines
// ============================================================================

/// A set of preprocessor defines.
///
/// Stored as a `Vec<(Symbol, Symbol)>` sorted by key symbol so identical
/// sets compare and hash identically. A define without a value has the
/// empty string as its value.
#[derive(Debug, Clone, Default)]
pub struct ShaderDefines {
    defines: Vec<(Symbol, Symbol)>,
}

impl ShaderDefines {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: &str) {
        let key_sym = interner::intern(key);
        let value_sym = interner::intern(value);
        match self.defines.binary_search_by_key(&key_sym, |&(k, _)| k) {
            Ok(idx) => self.defines[idx].1 = value_sym,
            Err(idx) => self.defines.insert(idx, (key_sym, value_sym)),
        }
    }

    /// Sets a define with no value.
    pub fn define(&mut self, key: &str) {
        self.set(key, "");
    }

    /// Parses a `NAME` or `NAME=VALUE` token.
    pub fn set_token(&mut self, token: &str) {
        match token.split_once('=') {
            Some((key, value)) => self.set(key, value),
            None => self.define(token),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        interner::get(key).is_some_and(|key_sym| {
            self.defines
                .binary_search_by_key(&key_sym, |&(k, _)| k)
                .is_ok()
        })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'static str> {
        let key_sym = interner::get(key)?;
        self.defines
            .binary_search_by_key(&key_sym, |&(k, _)| k)
            .ok()
            .map(|idx| interner::resolve(self.defines[idx].1))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Iterates `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.defines
            .iter()
            .map(|&(k, v)| (interner::resolve(k), interner::resolve(v)))
    }
}

impl PartialEq for ShaderDefines {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for ShaderDefines {}

/// Builds the defines for `descriptor` under the given settings.
#[must_use]
pub fn generate_defines(
    settings: &QualitySettings,
    width: u32,
    height: u32,
    descriptor: &ShaderDescriptor,
) -> ShaderDefines {
    let mut defines = ShaderDefines::new();

    defines.set("SCREENRESX", &width.to_string());
    defines.set("SCREENRESY", &height.to_string());

    defines.define(match settings.reflections {
        ReflectionMode::Disabled => "_REFLECTIONDISABLED_",
        ReflectionMode::Static => "_REFLECTIONSTATIC_",
        ReflectionMode::Dynamic => "_REFLECTIONDYNAMIC_",
    });

    if settings.shadows {
        defines.define("_SHADOWS_");
        if settings.shadow_distance > 0 {
            defines.define("_CSM2_");
        }
        if settings.shadow_distance > 1 {
            defines.define("_CSM3_");
        }
        defines.define(settings.shadow_quality.define());
    }

    if settings.normal_maps {
        defines.define("_NORMALMAPS_");
    }

    match settings.ambient_occlusion {
        AmbientOcclusion::Off => {}
        AmbientOcclusion::Low => defines.define("_SSAO_LOW_"),
        AmbientOcclusion::High => defines.define("_SSAO_HIGH_"),
    }

    for token in &descriptor.defines {
        defines.set_token(token);
    }

    defines
}

// ============================================================================
// ShaderTable
// ============================================================================

/// Compiled shader programs of the active configuration, by name.
#[derive(Debug, Default)]
pub struct ShaderTable {
    shaders: FxHashMap<String, ShaderHandle>,
}

impl ShaderTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every shader of `config`.
    ///
    /// On the first failure all shaders compiled so far are released and
    /// the error is returned.
    pub fn load<B: RenderBackend + ?Sized>(
        config: &RenderGraphConfig,
        settings: &QualitySettings,
        width: u32,
        height: u32,
        backend: &mut B,
    ) -> Result<Self> {
        let mut table = Self::new();
        for descriptor in &config.shaders {
            let source = ShaderSource {
                name: descriptor.name.clone(),
                vertex: settings.shader_root.join(&descriptor.vertex),
                fragment: settings.shader_root.join(&descriptor.fragment),
                defines: generate_defines(settings, width, height, descriptor),
            };
            match backend.compile_shader(&source) {
                Ok(handle) => {
                    table.shaders.insert(descriptor.name.clone(), handle);
                }
                Err(reason) => {
                    log::error!("Failed to load shader {}: {reason}", descriptor.name);
                    table.release(backend);
                    return Err(StrataError::ShaderCompile {
                        name: descriptor.name.clone(),
                        reason,
                    });
                }
            }
        }
        Ok(table)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<ShaderHandle> {
        self.shaders.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Releases every program and empties the table.
    pub fn release<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        for (_, handle) in self.shaders.drain() {
            backend.release_shader(handle);
        }
    }
}
