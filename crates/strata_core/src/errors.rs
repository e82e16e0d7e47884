//! Error Types
//!
//! This module defines the error type used throughout the render graph.
//!
//! # Overview
//!
//! [`StrataError`] covers the failures that abort a configuration step:
//! - Render configuration loading and decoding errors
//! - Invalid declarations (empty draw lists, duplicate shaders)
//! - Backend allocation and shader compilation failures
//! - Capability mismatches discovered while building outputs
//! - The fatal loss of the no-shader fallback configuration
//!
//! Per-frame misconfigurations (a pass naming an unknown camera, a layer
//! the scene does not know) are never errors: they are reported through
//! [`ReportOnce`](crate::report::ReportOnce) and the pass is skipped.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strata_core::errors::{StrataError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the Strata render graph.
#[derive(Error, Debug)]
pub enum StrataError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The render configuration file could not be read.
    #[error("Failed to read render configuration {path}: {source}")]
    ConfigRead {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The render configuration text is not valid JSON for the schema.
    #[error("Failed to parse render configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// An enumerated configuration value is not one of the known names.
    #[error("Unknown {kind} '{value}'")]
    UnknownValue {
        /// Which enumeration was being decoded (e.g. "pixel format")
        kind: &'static str,
        /// The offending text
        value: String,
    },

    /// A pass declares no draw layers.
    #[error("Pass #{index} (camera '{camera}') has an empty draw list")]
    EmptyDrawList {
        /// Position of the pass in the configuration
        index: usize,
        /// Camera name of the pass, for identification
        camera: String,
    },

    /// A pass binds an input to a texture unit past the supported range.
    #[error("Pass #{index} binds texture unit {unit}; units must be below {limit}")]
    TextureUnitOutOfRange {
        /// Position of the pass in the configuration
        index: usize,
        /// The declared unit
        unit: u32,
        /// Exclusive upper bound on units
        limit: u32,
    },

    /// Two shader descriptors share the same name.
    #[error("Duplicate shader name '{0}'")]
    DuplicateShader(String),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// A shader program failed to compile or link.
    #[error("Failed to load shader '{name}': {reason}")]
    ShaderCompile {
        /// Shader name from the configuration
        name: String,
        /// Backend diagnostic
        reason: String,
    },

    /// The backend refused to allocate a texture or framebuffer.
    #[error("Failed to allocate render target '{name}': {reason}")]
    TargetAllocation {
        /// Output name (or output list) being built
        name: String,
        /// Backend diagnostic
        reason: String,
    },

    // ========================================================================
    // Capability Errors
    // ========================================================================
    /// An output requires floating point textures the hardware lacks.
    #[error("Output '{output}' requires floating point textures, which are not supported")]
    FloatTexturesUnsupported {
        /// Output name
        output: String,
    },

    /// A cube face index outside `0..6` was requested.
    #[error("Invalid cube face index {0}")]
    InvalidCubeFace(usize),

    // ========================================================================
    // Fatal Errors
    // ========================================================================
    /// Even the no-shader fallback configuration could not be loaded.
    #[error("Unable to load fallback render configuration {path}: {reason}")]
    FallbackUnavailable {
        /// Path of the fallback configuration
        path: PathBuf,
        /// Why loading failed
        reason: String,
    },
}

/// Alias for `Result<T, StrataError>`.
pub type Result<T> = std::result::Result<T, StrataError>;
