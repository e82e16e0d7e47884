//! Render Configuration
//!
//! The declarative description of the render graph: shader descriptors,
//! output descriptors and the ordered pass list.
//!
//! Configuration files are JSON. Records are first deserialized into raw
//! string-typed forms, then decoded once into closed enumerations. A value
//! that names no known variant is a [`StrataError::UnknownValue`], never a
//! runtime branch on strings.
//!
//! ```json
//! {
//!   "shaders": [
//!     { "name": "full", "vertex": "full.vert", "fragment": "full.frag", "defines": "_CARPAINT_" }
//!   ],
//!   "outputs": [
//!     { "name": "reflection", "type": "cube", "format": "RGB8",
//!       "width": 256, "height": 256, "conditions": "reflection_dynamic" },
//!     { "name": "scene", "type": "rectangle", "format": "RGBA16",
//!       "width": { "screen": 1.0 }, "height": { "screen": 1.0 } }
//!   ],
//!   "passes": [
//!     { "camera": "default", "draw": ["car_noblend"], "output": "scene",
//!       "shader": "full", "inputs": { "0": "reflection" }, "clear_color": true }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::Deserialize;
use strata_core::{Condition, Result, StrataError};

/// Layer name routing a pass to the post-process path.
pub const POSTPROCESS_LAYER: &str = "postprocess";

/// Output name of the default framebuffer.
pub const FRAMEBUFFER: &str = "framebuffer";

// ============================================================================
// Enumerations
// ============================================================================

macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Name used in configuration files.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = StrataError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(StrataError::UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

config_enum! {
    /// Pixel format of an output texture.
    PixelFormat, "pixel format" {
        Depth => "depth",
        /// Depth texture with hardware depth comparison enabled.
        DepthShadow => "depthshadow",
        Luminance8 => "luminance8",
        Rgba8 => "RGBA8",
        Rgb8 => "RGB8",
        Rgba16 => "RGBA16",
        Rgb16 => "RGB16",
    }
}

impl PixelFormat {
    /// Half float formats need floating point texture support.
    #[must_use]
    pub fn requires_float(self) -> bool {
        matches!(self, Self::Rgba16 | Self::Rgb16)
    }

    #[must_use]
    pub fn is_depth(self) -> bool {
        matches!(self, Self::Depth | Self::DepthShadow)
    }

    #[must_use]
    pub fn depth_comparison(self) -> bool {
        self == Self::DepthShadow
    }
}

config_enum! {
    /// What an output descriptor resolves to.
    OutputKind, "output type" {
        /// Alias of the default framebuffer.
        Framebuffer => "framebuffer",
        Texture2d => "2d",
        Rectangle => "rectangle",
        Cube => "cube",
    }
}

config_enum! {
    TextureFilter, "texture filter" {
        Linear => "linear",
        Nearest => "nearest",
    }
}

config_enum! {
    BlendMode, "blend mode" {
        Disabled => "disabled",
        Add => "add",
        AlphaBlend => "alphablend",
        PremultipliedAlpha => "alphablend_premultiplied",
        AlphaTest => "alphatest",
    }
}

config_enum! {
    /// Depth comparison used by a pass.
    DepthTest, "depth test" {
        LessEqual => "lequal",
        Equal => "equal",
        GreaterEqual => "gequal",
        /// Depth testing off (comparison always passes).
        Disabled => "disabled",
    }
}

// ============================================================================
// Output sizes
// ============================================================================

/// Width or height of an output, absolute or relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    Pixels(u32),
    Screen { screen: f32 },
}

impl Default for SizeSpec {
    fn default() -> Self {
        Self::Screen { screen: 1.0 }
    }
}

impl SizeSpec {
    /// Resolves against the screen extent along the same axis.
    ///
    /// Never returns zero.
    #[must_use]
    pub fn resolve(self, screen: u32) -> u32 {
        let size = match self {
            Self::Pixels(px) => px,
            Self::Screen { screen: factor } => (screen as f32 * factor).round() as u32,
        };
        size.max(1)
    }
}

// ============================================================================
// Descriptors
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDescriptor {
    pub name: String,
    pub vertex: String,
    pub fragment: String,
    /// Extra preprocessor defines, `NAME` or `NAME=VALUE`.
    pub defines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputDescriptor {
    pub name: String,
    pub kind: OutputKind,
    pub format: PixelFormat,
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub mipmap: bool,
    /// Sample count; negative means "use the global FSAA setting".
    pub multisample: i32,
    pub filter: TextureFilter,
    pub conditions: Condition,
}

impl OutputDescriptor {
    /// Effective sample count for a global FSAA setting.
    #[must_use]
    pub fn effective_multisample(&self, fsaa: u32) -> u32 {
        u32::try_from(self.multisample).unwrap_or(fsaa)
    }
}

/// Texture units a pass may bind inputs to.
pub const MAX_TEXTURE_UNITS: u32 = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct PassDescriptor {
    pub camera: String,
    /// Non-empty; a trailing `"postprocess"` routes to the post-process path.
    pub draw: Vec<String>,
    /// One output name, or several separated by spaces for multiple render targets.
    pub output: String,
    pub shader: String,
    /// Texture unit to texture name, ascending by unit.
    pub inputs: Vec<(u32, String)>,
    pub blend: BlendMode,
    pub depth_test: DepthTest,
    pub clear_color: bool,
    pub clear_depth: bool,
    pub write_color: bool,
    pub write_alpha: bool,
    pub write_depth: bool,
    pub cull: bool,
    pub conditions: Condition,
}

impl PassDescriptor {
    #[must_use]
    pub fn is_postprocess(&self) -> bool {
        self.draw.last().is_some_and(|layer| layer == POSTPROCESS_LAYER)
    }

    /// The individual output names referenced by `output`.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.output.split_whitespace()
    }
}

/// A fully decoded render configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderGraphConfig {
    pub shaders: Vec<ShaderDescriptor>,
    pub outputs: Vec<OutputDescriptor>,
    pub passes: Vec<PassDescriptor>,
}

impl RenderGraphConfig {
    /// Parses and decodes a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(text)?;
        raw.decode()
    }

    /// Reads and decodes a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| StrataError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn shader(&self, name: &str) -> Option<&ShaderDescriptor> {
        self.shaders.iter().find(|s| s.name == name)
    }
}

/// Where render configurations come from.
pub trait ConfigSource {
    fn load(&self, path: &Path) -> Result<RenderGraphConfig>;
}

/// Loads configurations from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConfigSource;

impl ConfigSource for FileConfigSource {
    fn load(&self, path: &Path) -> Result<RenderGraphConfig> {
        RenderGraphConfig::load(path)
    }
}

// ============================================================================
// Raw (serialized) forms
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    shaders: Vec<RawShader>,
    #[serde(default)]
    outputs: Vec<RawOutput>,
    #[serde(default)]
    passes: Vec<RawPass>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawShader {
    name: String,
    vertex: String,
    fragment: String,
    #[serde(default)]
    defines: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutput {
    name: String,
    #[serde(rename = "type", default = "default_output_kind")]
    kind: String,
    #[serde(default = "default_format")]
    format: String,
    #[serde(default)]
    width: SizeSpec,
    #[serde(default)]
    height: SizeSpec,
    #[serde(default)]
    mipmap: bool,
    #[serde(default)]
    multisample: i32,
    #[serde(default = "default_filter")]
    filter: String,
    #[serde(default)]
    conditions: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPass {
    camera: String,
    draw: Vec<String>,
    #[serde(default = "default_output")]
    output: String,
    #[serde(default)]
    shader: String,
    #[serde(default)]
    inputs: BTreeMap<u32, String>,
    #[serde(default = "default_blend")]
    blendmode: String,
    #[serde(default = "default_depth_test")]
    depthtest: String,
    #[serde(default)]
    clear_color: bool,
    #[serde(default)]
    clear_depth: bool,
    #[serde(default = "default_true")]
    write_color: bool,
    #[serde(default = "default_true")]
    write_alpha: bool,
    #[serde(default = "default_true")]
    write_depth: bool,
    #[serde(default = "default_true")]
    cull: bool,
    #[serde(default)]
    conditions: String,
}

fn default_output_kind() -> String {
    OutputKind::Texture2d.as_str().to_string()
}

fn default_format() -> String {
    PixelFormat::Rgba8.as_str().to_string()
}

fn default_filter() -> String {
    TextureFilter::Linear.as_str().to_string()
}

fn default_output() -> String {
    FRAMEBUFFER.to_string()
}

fn default_blend() -> String {
    BlendMode::Disabled.as_str().to_string()
}

fn default_depth_test() -> String {
    DepthTest::LessEqual.as_str().to_string()
}

fn default_true() -> bool {
    true
}

impl RawConfig {
    fn decode(self) -> Result<RenderGraphConfig> {
        let mut seen = FxHashSet::default();
        let mut shaders = Vec::with_capacity(self.shaders.len());
        for raw in self.shaders {
            if !seen.insert(raw.name.clone()) {
                return Err(StrataError::DuplicateShader(raw.name));
            }
            shaders.push(ShaderDescriptor {
                defines: raw.defines.split_whitespace().map(str::to_string).collect(),
                name: raw.name,
                vertex: raw.vertex,
                fragment: raw.fragment,
            });
        }

        let outputs = self
            .outputs
            .into_iter()
            .map(RawOutput::decode)
            .collect::<Result<Vec<_>>>()?;

        let passes = self
            .passes
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.decode(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(RenderGraphConfig {
            shaders,
            outputs,
            passes,
        })
    }
}

impl RawOutput {
    fn decode(self) -> Result<OutputDescriptor> {
        Ok(OutputDescriptor {
            kind: self.kind.parse()?,
            format: self.format.parse()?,
            filter: self.filter.parse()?,
            width: self.width,
            height: self.height,
            mipmap: self.mipmap,
            multisample: self.multisample,
            conditions: Condition::parse(&self.conditions),
            name: self.name,
        })
    }
}

impl RawPass {
    fn decode(self, index: usize) -> Result<PassDescriptor> {
        if self.draw.is_empty() {
            return Err(StrataError::EmptyDrawList {
                index,
                camera: self.camera,
            });
        }
        if let Some((&unit, _)) = self.inputs.last_key_value()
            && unit >= MAX_TEXTURE_UNITS
        {
            return Err(StrataError::TextureUnitOutOfRange {
                index,
                unit,
                limit: MAX_TEXTURE_UNITS,
            });
        }
        Ok(PassDescriptor {
            blend: self.blendmode.parse()?,
            depth_test: self.depthtest.parse()?,
            conditions: Condition::parse(&self.conditions),
            inputs: self.inputs.into_iter().collect(),
            camera: self.camera,
            draw: self.draw,
            output: self.output,
            shader: self.shader,
            clear_color: self.clear_color,
            clear_depth: self.clear_depth,
            write_color: self.write_color,
            write_alpha: self.write_alpha,
            write_depth: self.write_depth,
            cull: self.cull,
        })
    }
}
