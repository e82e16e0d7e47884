//! Output Graph
//!
//! Resolves the output descriptors of the active configuration into render
//! targets and input textures.
//!
//! # Build order
//!
//! 1. Each condition-satisfied output descriptor is visited in declaration
//!    order. A name that is already registered is reported and skipped, so
//!    the first declaration wins.
//! 2. `framebuffer` outputs alias the default framebuffer.
//! 3. Texture outputs resolve their size against the screen and allocate a
//!    2D, rectangle or cube texture. The texture is registered both as an
//!    output and as an input for later passes. A half float format on
//!    hardware without float textures aborts the whole build.
//! 4. Every condition-satisfied pass then gets a framebuffer for its
//!    `output` string. A string listing several outputs becomes one
//!    multiple-render-target framebuffer, shared by every pass using the
//!    identical string.
//!
//! The graph owns every texture and framebuffer it allocated until
//! [`OutputGraph::release`]. Input lookups hand out plain handles that stay
//! valid until the next rebuild.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use strata_core::{FeatureFlags, ReportOnce, ReportSite, Result, StrataError};

use crate::backend::{FramebufferHandle, RenderBackend, TextureDesc, TextureHandle, TextureTarget};
use crate::config::{FRAMEBUFFER, OutputDescriptor, OutputKind, RenderGraphConfig, TextureFilter};

/// A resolved render destination.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderTarget {
    /// The default framebuffer.
    Framebuffer,
    /// An owned framebuffer object.
    Offscreen(OffscreenTarget),
}

impl RenderTarget {
    #[must_use]
    pub fn is_cubemap(&self) -> bool {
        matches!(self, Self::Offscreen(target) if target.cubemap)
    }

    #[must_use]
    pub fn framebuffer(&self) -> Option<FramebufferHandle> {
        match self {
            Self::Framebuffer => None,
            Self::Offscreen(target) => Some(target.framebuffer),
        }
    }
}

/// A framebuffer object with one or more attached output textures.
#[derive(Debug, Clone, PartialEq)]
pub struct OffscreenTarget {
    pub framebuffer: FramebufferHandle,
    pub attachments: SmallVec<[TextureHandle; 4]>,
    /// Size of the first attachment (per face for cubemaps).
    pub width: u32,
    pub height: u32,
    pub cubemap: bool,
}

/// An allocated output texture.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTexture {
    pub handle: TextureHandle,
    pub desc: TextureDesc,
}

/// Diagnostic for a pass whose output list resolved to nothing.
///
/// Shared with the executor so the build-time and per-frame reports of the
/// same pass collapse into one.
#[must_use]
pub fn inactive_outputs_message(output: &str) -> String {
    format!("None of these outputs are active: {output}, this pass will not have an output")
}

/// Externally owned textures that passes may read by name.
pub type ExternalTextures = FxHashMap<String, TextureHandle>;

/// Render targets and input textures of the active configuration.
#[derive(Debug, Default)]
pub struct OutputGraph {
    textures: FxHashMap<String, OutputTexture>,
    targets: FxHashMap<String, RenderTarget>,
    inputs: FxHashMap<String, TextureHandle>,
}

impl OutputGraph {
    /// A graph with only the default framebuffer, used without shaders.
    #[must_use]
    pub fn framebuffer_only(externals: &ExternalTextures) -> Self {
        let mut graph = Self {
            inputs: externals.clone(),
            ..Self::default()
        };
        graph
            .targets
            .insert(FRAMEBUFFER.to_string(), RenderTarget::Framebuffer);
        graph
    }

    /// Target for a pass `output` string.
    #[must_use]
    pub fn target(&self, output: &str) -> Option<&RenderTarget> {
        self.targets.get(output)
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<&OutputTexture> {
        self.textures.get(name)
    }

    /// Bindable texture for `name`: an output texture or an external one.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<TextureHandle> {
        self.inputs.get(name).copied()
    }

    /// Registers an extra input texture until the next rebuild.
    pub fn add_input(&mut self, name: impl Into<String>, texture: TextureHandle) {
        self.inputs.insert(name.into(), texture);
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of framebuffer objects owned by the graph.
    #[must_use]
    pub fn framebuffer_count(&self) -> usize {
        self.targets
            .values()
            .filter(|target| matches!(target, RenderTarget::Offscreen(_)))
            .count()
    }

    /// Releases all owned GPU objects and empties the graph.
    pub fn release<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        for (_, target) in self.targets.drain() {
            if let RenderTarget::Offscreen(offscreen) = target {
                backend.release_framebuffer(offscreen.framebuffer);
            }
        }
        for (_, texture) in self.textures.drain() {
            backend.release_texture(texture.handle);
        }
        self.inputs.clear();
    }
}

/// Builds an [`OutputGraph`] for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct OutputGraphBuilder<'a> {
    pub config: &'a RenderGraphConfig,
    pub flags: &'a FeatureFlags,
    pub float_textures: bool,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Global FSAA sample count, used by outputs declaring a negative count.
    pub fsaa: u32,
}

impl OutputGraphBuilder<'_> {
    /// Builds the graph. On error every object allocated so far is released.
    pub fn build<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        externals: &ExternalTextures,
        reporter: &mut ReportOnce,
    ) -> Result<OutputGraph> {
        let mut graph = OutputGraph::default();
        for (name, texture) in externals {
            graph.inputs.insert(name.clone(), *texture);
        }

        if let Err(err) = self.build_into(&mut graph, backend, reporter) {
            graph.release(backend);
            return Err(err);
        }
        Ok(graph)
    }

    fn build_into<B: RenderBackend + ?Sized>(
        &self,
        graph: &mut OutputGraph,
        backend: &mut B,
        reporter: &mut ReportOnce,
    ) -> Result<()> {
        for (index, output) in self.config.outputs.iter().enumerate() {
            if !output.conditions.satisfied(self.flags) {
                continue;
            }

            if graph.targets.contains_key(&output.name) || graph.textures.contains_key(&output.name) {
                reporter.report(
                    ReportSite::output(index),
                    format!(
                        "Detected duplicate output name {}, only the first declaration will be used",
                        output.name
                    ),
                );
                continue;
            }

            if output.kind == OutputKind::Framebuffer {
                graph.targets.insert(output.name.clone(), RenderTarget::Framebuffer);
                log::info!("Initialized render output: {} (framebuffer alias)", output.name);
                continue;
            }

            let texture = self.create_texture(output, backend)?;
            graph.inputs.insert(output.name.clone(), texture.handle);
            graph.textures.insert(output.name.clone(), texture);
            log::info!("Initialized render output: {}", output.name);
        }

        graph
            .targets
            .insert(FRAMEBUFFER.to_string(), RenderTarget::Framebuffer);

        for (index, pass) in self.config.passes.iter().enumerate() {
            if !pass.conditions.satisfied(self.flags) || graph.targets.contains_key(&pass.output) {
                continue;
            }

            let attachments: Vec<&OutputTexture> = pass
                .output_names()
                .filter_map(|name| graph.textures.get(name))
                .collect();

            let Some(first) = attachments.first() else {
                reporter.report(ReportSite::pass(index), inactive_outputs_message(&pass.output));
                continue;
            };

            let handles: SmallVec<[TextureHandle; 4]> =
                attachments.iter().map(|texture| texture.handle).collect();
            let target = OffscreenTarget {
                framebuffer: backend.create_framebuffer(&handles).map_err(|reason| {
                    StrataError::TargetAllocation {
                        name: pass.output.clone(),
                        reason,
                    }
                })?,
                width: first.desc.width,
                height: first.desc.height,
                cubemap: first.desc.target == TextureTarget::Cube,
                attachments: handles,
            };
            log::info!("Initialized render output: {} (FBO)", pass.output);
            graph
                .targets
                .insert(pass.output.clone(), RenderTarget::Offscreen(target));
        }

        Ok(())
    }

    fn create_texture<B: RenderBackend + ?Sized>(
        &self,
        output: &OutputDescriptor,
        backend: &mut B,
    ) -> Result<OutputTexture> {
        if output.format.requires_float() && !self.float_textures {
            log::error!(
                "Your video card doesn't support floating point textures, required by output {}",
                output.name
            );
            return Err(StrataError::FloatTexturesUnsupported {
                output: output.name.clone(),
            });
        }

        let target = match output.kind {
            OutputKind::Cube => TextureTarget::Cube,
            OutputKind::Rectangle => TextureTarget::Rectangle,
            OutputKind::Texture2d | OutputKind::Framebuffer => TextureTarget::Texture2d,
        };

        let desc = TextureDesc {
            name: output.name.clone(),
            target,
            format: output.format,
            width: output.width.resolve(self.screen_width),
            height: output.height.resolve(self.screen_height),
            mipmap: output.mipmap,
            nearest: output.filter == TextureFilter::Nearest,
            multisample: output.effective_multisample(self.fsaa),
            depth_comparison: output.format.depth_comparison(),
        };

        let handle = backend
            .create_texture(&desc)
            .map_err(|reason| StrataError::TargetAllocation {
                name: output.name.clone(),
                reason,
            })?;
        Ok(OutputTexture { handle, desc })
    }
}
