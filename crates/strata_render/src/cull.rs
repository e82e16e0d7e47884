//! Visibility Culling
//!
//! Static geometry lives in a [`StaticScene`] (the engine's spatial index)
//! and is culled once per frame per `(camera, layer)` pair. The resulting
//! [`CullCache`] is shared by every pass of the frame: two passes drawing
//! the same layer from the same camera see the same list, and the scene is
//! queried only once for it.
//!
//! Passes bound to a cubemap output cull each face separately, against the
//! derived `<camera>_cubeside<i>` cameras.
//!
//! Dynamic geometry is not culled. [`DynamicDrawList`] only orders it by
//! draw order, once per frame.

use rustc_hash::FxHashMap;
use strata_core::interner::{self, Symbol};
use strata_core::{FeatureFlags, ReportOnce, ReportSite};

use crate::camera::{Aabb, CameraTable, CubeFace, Frustum};
use crate::config::{PassDescriptor, RenderGraphConfig};
use crate::outputs::{OutputGraph, RenderTarget};

/// Opaque identifier of a drawable owned by the embedding engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(pub u32);

/// Volume a static layer is queried with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CullVolume {
    /// Matches every drawable; used by passes with culling off.
    Everything,
    Frustum(Frustum),
}

impl CullVolume {
    #[must_use]
    pub fn intersects(&self, aabb: &Aabb) -> bool {
        match self {
            Self::Everything => true,
            Self::Frustum(frustum) => frustum.intersects_aabb(aabb),
        }
    }
}

/// Spatial index of static drawables, grouped by layer.
pub trait StaticScene {
    /// Appends the drawables of `layer` intersecting `volume` to `out`.
    ///
    /// Returns `false` if the layer is unknown.
    fn query(&self, layer: &str, volume: &CullVolume, out: &mut Vec<DrawableId>) -> bool;
}

/// A linear [`StaticScene`] over per-layer bounding boxes.
#[derive(Debug, Default)]
pub struct StaticDrawList {
    layers: FxHashMap<String, Vec<(DrawableId, Aabb)>>,
}

impl StaticDrawList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `layer`, so queries on it succeed even while it is empty.
    pub fn add_layer(&mut self, layer: &str) {
        self.layers.entry(layer.to_string()).or_default();
    }

    pub fn add(&mut self, layer: &str, id: DrawableId, bounds: Aabb) {
        self.layers.entry(layer.to_string()).or_default().push((id, bounds));
    }

    /// Removes all drawables but keeps the declared layers.
    pub fn clear(&mut self) {
        for entries in self.layers.values_mut() {
            entries.clear();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StaticScene for StaticDrawList {
    fn query(&self, layer: &str, volume: &CullVolume, out: &mut Vec<DrawableId>) -> bool {
        let Some(entries) = self.layers.get(layer) else {
            return false;
        };
        out.extend(
            entries
                .iter()
                .filter(|(_, bounds)| volume.intersects(bounds))
                .map(|(id, _)| *id),
        );
        true
    }
}

// ─── Dynamic geometry ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicDrawable {
    pub id: DrawableId,
    pub draw_order: i32,
}

#[derive(Debug, Default)]
struct DynamicLayer {
    items: Vec<DynamicDrawable>,
    ordered: Vec<DrawableId>,
}

/// Per-frame dynamic drawables, by layer.
#[derive(Debug, Default)]
pub struct DynamicDrawList {
    layers: FxHashMap<String, DynamicLayer>,
}

impl DynamicDrawList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, layer: &str, drawable: DynamicDrawable) {
        self.layers
            .entry(layer.to_string())
            .or_default()
            .items
            .push(drawable);
    }

    pub fn clear(&mut self) {
        for layer in self.layers.values_mut() {
            layer.items.clear();
            layer.ordered.clear();
        }
    }

    /// Orders every layer by draw order, keeping insertion order for ties.
    pub fn sort(&mut self) {
        for layer in self.layers.values_mut() {
            layer.items.sort_by_key(|item| item.draw_order);
            layer.ordered.clear();
            layer.ordered.extend(layer.items.iter().map(|item| item.id));
        }
    }

    /// Drawables of `layer` as of the last [`sort`](Self::sort); empty for
    /// unknown layers.
    #[must_use]
    pub fn layer(&self, layer: &str) -> &[DrawableId] {
        self.layers
            .get(layer)
            .map_or(&[], |layer| layer.ordered.as_slice())
    }
}

// ─── Cull cache ─────────────────────────────────────────────────────────────

/// Cache key: camera and layer names, interned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CullKey {
    pub camera: Symbol,
    pub layer: Symbol,
}

impl CullKey {
    #[must_use]
    pub fn new(camera: &str, layer: &str) -> Self {
        Self {
            camera: interner::intern(camera),
            layer: interner::intern(layer),
        }
    }
}

/// Visible static drawables per `(camera, layer)` for one frame.
#[derive(Debug, Default)]
pub struct CullCache {
    entries: FxHashMap<CullKey, Vec<DrawableId>>,
    queries: usize,
}

impl CullCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, camera: &str, layer: &str) -> Option<&[DrawableId]> {
        let key = CullKey {
            camera: interner::get(camera)?,
            layer: interner::get(layer)?,
        };
        self.entries.get(&key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of scene queries issued while filling the cache.
    #[must_use]
    pub fn queries(&self) -> usize {
        self.queries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.queries = 0;
    }
}

/// Fills the [`CullCache`] for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Culler<'a> {
    pub config: &'a RenderGraphConfig,
    pub flags: &'a FeatureFlags,
    pub outputs: &'a OutputGraph,
}

impl Culler<'_> {
    /// Culls every active geometry pass. Cube face cameras are derived into
    /// `cameras` on the way.
    pub fn run<S: StaticScene + ?Sized>(
        &self,
        cameras: &mut CameraTable,
        scene: &S,
        cache: &mut CullCache,
        reporter: &mut ReportOnce,
    ) {
        cache.clear();
        for (index, pass) in self.config.passes.iter().enumerate() {
            if pass.is_postprocess() || !pass.conditions.satisfied(self.flags) {
                continue;
            }
            self.cull_pass(index, pass, cameras, scene, cache, reporter);
        }
    }

    fn cull_pass<S: StaticScene + ?Sized>(
        &self,
        index: usize,
        pass: &PassDescriptor,
        cameras: &mut CameraTable,
        scene: &S,
        cache: &mut CullCache,
        reporter: &mut ReportOnce,
    ) {
        // Passes without an output never draw; the executor reports them.
        let Some(target) = self.outputs.target(&pass.output) else {
            return;
        };
        let site = ReportSite::cull(index);

        for (slot, layer) in pass.draw.iter().enumerate() {
            let site = site.with_slot(slot);
            if let RenderTarget::Offscreen(offscreen) = target
                && offscreen.cubemap
            {
                for face in CubeFace::ALL {
                    let Some(face_camera) = cameras.derive_cube_face(
                        &pass.camera,
                        face,
                        offscreen.width,
                        offscreen.height,
                    ) else {
                        reporter.report(site, format!("Camera not found: {}", pass.camera));
                        return;
                    };
                    if !cull_layer(site, pass.cull, &face_camera, layer, cameras, scene, cache, reporter) {
                        return;
                    }
                }
            } else if !cull_layer(site, pass.cull, &pass.camera, layer, cameras, scene, cache, reporter) {
                return;
            }
        }
    }
}

/// Culls one `(camera, layer)` pair unless it is cached. Returns `false`
/// on a configuration error.
fn cull_layer<S: StaticScene + ?Sized>(
    site: ReportSite,
    cull: bool,
    camera: &str,
    layer: &str,
    cameras: &CameraTable,
    scene: &S,
    cache: &mut CullCache,
    reporter: &mut ReportOnce,
) -> bool {
    let key = CullKey::new(camera, layer);
    if cache.entries.contains_key(&key) {
        return true;
    }

    let volume = if cull {
        let Some(camera_data) = cameras.get(camera) else {
            reporter.report(site, format!("Camera not found: {camera}"));
            return false;
        };
        CullVolume::Frustum(camera_data.frustum())
    } else {
        CullVolume::Everything
    };

    let mut visible = Vec::new();
    cache.queries += 1;
    if !scene.query(layer, &volume, &mut visible) {
        reporter.report(site, format!("Drawable container not found: {layer}"));
        return false;
    }
    cache.entries.insert(key, visible);
    true
}
