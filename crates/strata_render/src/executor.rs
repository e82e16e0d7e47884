//! Pass Executor
//!
//! Runs the passes of the active configuration in declared order. Earlier
//! passes may write textures that later passes read; the order of the list
//! is the only synchronization.
//!
//! # Per pass
//!
//! ```text
//! condition check ──unsatisfied──▶ skipped (silently)
//!       │
//!       ├─ postprocess ──▶ inputs → camera → shader → target → one draw
//!       │
//!       └─ geometry ─────▶ inputs → shader → target → for each layer:
//!                              cubemap target: 6 face executions
//!                              otherwise:      1 execution
//! ```
//!
//! Clearing happens at most once per pass: after the first layer the
//! clear flags are forced off for the remaining layers.
//!
//! Missing cameras, shaders, targets or cull results are configuration
//! errors. They are reported through [`ReportOnce`] and only the affected
//! pass, layer or face is skipped.

use strata_core::{FeatureFlags, ReportOnce, ReportSite};

use crate::backend::{
    LayerDraw, PassState, PostProcessDraw, RenderBackend, ShaderHandle, TextureBindings,
};
use crate::camera::{CameraTable, CubeFace, cube_face_camera_name};
use crate::config::{PassDescriptor, RenderGraphConfig};
use crate::cull::{CullCache, DynamicDrawList};
use crate::outputs::{OutputGraph, RenderTarget, inactive_outputs_message};
use crate::shaders::ShaderTable;

/// Layer drawn with fixed-function car paint emulation when shaders are off.
pub const CAR_PAINT_LAYER: &str = "car_noblend";

/// Counters describing one executed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub passes_run: usize,
    pub passes_skipped: usize,
    /// Geometry draws handed to the backend.
    pub layer_draws: usize,
    /// Cube face executions (6 per layer of a cubemap pass).
    pub face_executions: usize,
    pub postprocess_draws: usize,
}

/// Executes one frame against prepared tables.
#[derive(Debug, Clone, Copy)]
pub struct PassExecutor<'a> {
    pub config: &'a RenderGraphConfig,
    pub flags: &'a FeatureFlags,
    pub outputs: &'a OutputGraph,
    pub cameras: &'a CameraTable,
    pub shaders: &'a ShaderTable,
    pub cull: &'a CullCache,
    pub dynamic: &'a DynamicDrawList,
    pub using_shaders: bool,
}

impl PassExecutor<'_> {
    pub fn execute<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        reporter: &mut ReportOnce,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        for (index, pass) in self.config.passes.iter().enumerate() {
            if !pass.conditions.satisfied(self.flags) {
                stats.passes_skipped += 1;
                continue;
            }

            log::trace!("Pass {index}: camera {}, output '{}'", pass.camera, pass.output);
            let ran = if pass.is_postprocess() {
                self.run_postprocess(index, pass, backend, reporter, &mut stats)
            } else {
                self.run_geometry(index, pass, backend, reporter, &mut stats)
            };

            if ran {
                stats.passes_run += 1;
            } else {
                stats.passes_skipped += 1;
            }
        }
        stats
    }

    /// Texture bindings of `pass`; names that resolve to nothing leave
    /// their unit empty.
    fn bind_inputs(&self, pass: &PassDescriptor) -> TextureBindings {
        let mut bindings = TextureBindings::new();
        for (unit, name) in &pass.inputs {
            bindings.bind(*unit, self.outputs.input(name));
        }
        bindings
    }

    fn run_postprocess<B: RenderBackend + ?Sized>(
        &self,
        index: usize,
        pass: &PassDescriptor,
        backend: &mut B,
        reporter: &mut ReportOnce,
        stats: &mut FrameStats,
    ) -> bool {
        let site = ReportSite::pass(index);
        let bindings = self.bind_inputs(pass);

        let Some(camera) = self.cameras.get(&pass.camera) else {
            reporter.report(site, format!("Camera not found: {}", pass.camera));
            return false;
        };
        let Some(shader) = self.shaders.get(&pass.shader) else {
            reporter.report(site, format!("Shader not found: {}", pass.shader));
            return false;
        };
        let Some(target) = self.outputs.target(&pass.output) else {
            reporter.report(site, inactive_outputs_message(&pass.output));
            return false;
        };

        let state = pass_state(pass);
        backend.draw_postprocess(&PostProcessDraw {
            pass_index: index,
            target,
            camera,
            shader,
            state: &state,
            bindings: &bindings,
        });
        stats.postprocess_draws += 1;
        true
    }

    fn run_geometry<B: RenderBackend + ?Sized>(
        &self,
        index: usize,
        pass: &PassDescriptor,
        backend: &mut B,
        reporter: &mut ReportOnce,
        stats: &mut FrameStats,
    ) -> bool {
        let site = ReportSite::pass(index);
        let bindings = self.bind_inputs(pass);

        let shader = if self.using_shaders {
            let Some(shader) = self.shaders.get(&pass.shader) else {
                reporter.report(site, format!("Shader not found: {}", pass.shader));
                return false;
            };
            Some(shader)
        } else {
            None
        };

        let Some(target) = self.outputs.target(&pass.output) else {
            reporter.report(site, inactive_outputs_message(&pass.output));
            return false;
        };

        let mut state = pass_state(pass);
        for (slot, layer) in pass.draw.iter().enumerate() {
            let job = LayerJob {
                pass_index: index,
                site: site.with_slot(slot),
                camera: &pass.camera,
                layer,
                target,
                shader,
                state: &state,
                bindings: &bindings,
            };

            match target {
                RenderTarget::Offscreen(offscreen) if offscreen.cubemap => {
                    for face in CubeFace::ALL {
                        backend.attach_cube_face(offscreen.framebuffer, face);
                        stats.face_executions += 1;
                        let camera_name = cube_face_camera_name(&pass.camera, face);
                        self.draw_layer(&job, &camera_name, Some(face), backend, reporter, stats);
                    }
                }
                _ => self.draw_layer(&job, &pass.camera, None, backend, reporter, stats),
            }

            state.clear_color = false;
            state.clear_depth = false;
        }
        true
    }

    /// One execution of a layer with a resolved camera name.
    fn draw_layer<B: RenderBackend + ?Sized>(
        &self,
        job: &LayerJob<'_>,
        camera_name: &str,
        face: Option<CubeFace>,
        backend: &mut B,
        reporter: &mut ReportOnce,
        stats: &mut FrameStats,
    ) {
        let Some(camera) = self.cameras.get(camera_name) else {
            reporter.report(job.site, format!("Camera not found: {}", job.camera));
            return;
        };
        let Some(statics) = self.cull.get(camera_name, job.layer) else {
            reporter.report(
                job.site,
                format!("Cull result not found for {};{}", job.camera, job.layer),
            );
            return;
        };
        let dynamic = self.dynamic.layer(job.layer);

        if dynamic.is_empty() && statics.is_empty() && !job.state.clears() {
            return;
        }

        backend.draw_layer(&LayerDraw {
            pass_index: job.pass_index,
            layer: job.layer,
            target: job.target,
            face,
            camera,
            shader: job.shader,
            state: job.state,
            bindings: job.bindings,
            dynamic,
            statics,
            car_paint_hack: !self.using_shaders && job.layer == CAR_PAINT_LAYER,
        });
        stats.layer_draws += 1;
    }
}

/// Everything about a layer draw that does not depend on the face.
struct LayerJob<'a> {
    pass_index: usize,
    site: ReportSite,
    /// Base camera name, used in diagnostics for every face.
    camera: &'a str,
    layer: &'a str,
    target: &'a RenderTarget,
    shader: Option<ShaderHandle>,
    state: &'a PassState,
    bindings: &'a TextureBindings,
}

fn pass_state(pass: &PassDescriptor) -> PassState {
    PassState {
        blend: pass.blend,
        depth_test: pass.depth_test,
        clear_color: pass.clear_color,
        clear_depth: pass.clear_depth,
        write_color: pass.write_color,
        write_alpha: pass.write_alpha,
        write_depth: pass.write_depth,
    }
}
