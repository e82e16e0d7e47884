//! Culling Tests
//!
//! Tests for:
//! - Per (camera, layer) memoization across passes
//! - Frustum vs. no-cull volumes
//! - Cube targets culling six derived face cameras
//! - Diagnostics for unknown cameras and layers
//! - Dynamic draw list ordering

mod common;

use common::{RecordingBackend, build_outputs, init_logger, parse_config};
use glam::Vec3;

use strata::core::{FeatureFlags, ReportOnce, ReportSite};
use strata::render::camera::{Aabb, CameraTable, SceneView};
use strata::render::config::RenderGraphConfig;
use strata::render::cull::{
    CullCache, CullVolume, Culler, DrawableId, DynamicDrawList, DynamicDrawable, StaticDrawList,
    StaticScene,
};
use strata::render::outputs::OutputGraph;

fn unit_box(center: Vec3) -> Aabb {
    Aabb::from_center_half_extents(center, Vec3::splat(0.5))
}

/// One drawable in front of the default camera, one behind it.
fn scene() -> StaticDrawList {
    let mut scene = StaticDrawList::new();
    scene.add("opaque", DrawableId(1), unit_box(Vec3::new(0.0, 0.0, -10.0)));
    scene.add("opaque", DrawableId(2), unit_box(Vec3::new(0.0, 0.0, 10.0)));
    scene.add_layer("transparent");
    scene
}

struct Fixture {
    config: RenderGraphConfig,
    flags: FeatureFlags,
    outputs: OutputGraph,
    cameras: CameraTable,
    cache: CullCache,
    reporter: ReportOnce,
}

impl Fixture {
    fn new(json: &str, flags: &[&str]) -> Self {
        init_logger();
        let config = parse_config(json);
        let flags: FeatureFlags = flags.iter().copied().collect();
        let mut backend = RecordingBackend::new();
        let mut reporter = ReportOnce::new();
        let outputs = build_outputs(&config, &flags, &mut backend, &mut reporter).unwrap();

        let mut cameras = CameraTable::new();
        cameras.setup_base(&SceneView::default(), 800, 600);

        Self {
            config,
            flags,
            outputs,
            cameras,
            cache: CullCache::new(),
            reporter,
        }
    }

    fn run<S: StaticScene>(&mut self, scene: &S) {
        Culler {
            config: &self.config,
            flags: &self.flags,
            outputs: &self.outputs,
        }
        .run(&mut self.cameras, scene, &mut self.cache, &mut self.reporter);
    }
}

// ============================================================================
// Memoization
// ============================================================================

#[test]
fn same_camera_and_layer_culled_once() {
    let mut fixture = Fixture::new(
        r#"{
            "passes": [
                { "camera": "default", "draw": ["opaque"] },
                { "camera": "default", "draw": ["opaque", "transparent"] },
                { "camera": "default", "draw": ["opaque"], "blendmode": "add" }
            ]
        }"#,
        &[],
    );
    fixture.run(&scene());

    assert_eq!(fixture.cache.queries(), 2);
    assert_eq!(fixture.cache.len(), 2);
    assert_eq!(fixture.cache.get("default", "opaque"), Some(&[DrawableId(1)][..]));
    assert_eq!(fixture.cache.get("default", "transparent"), Some(&[][..]));
}

#[test]
fn first_computation_wins_for_shared_key() {
    // The second pass would see both drawables without culling, but the
    // list computed by the first pass is reused.
    let mut fixture = Fixture::new(
        r#"{
            "passes": [
                { "camera": "default", "draw": ["opaque"] },
                { "camera": "default", "draw": ["opaque"], "cull": false }
            ]
        }"#,
        &[],
    );
    fixture.run(&scene());

    assert_eq!(fixture.cache.queries(), 1);
    assert_eq!(fixture.cache.get("default", "opaque"), Some(&[DrawableId(1)][..]));
}

#[test]
fn cache_rebuilt_every_frame() {
    let mut fixture = Fixture::new(r#"{ "passes": [ { "camera": "default", "draw": ["opaque"] } ] }"#, &[]);
    fixture.run(&scene());
    fixture.run(&scene());
    assert_eq!(fixture.cache.queries(), 1);

    let mut moved = scene();
    moved.clear();
    moved.add("opaque", DrawableId(7), unit_box(Vec3::new(1.0, 0.0, -20.0)));
    fixture.run(&moved);
    assert_eq!(fixture.cache.get("default", "opaque"), Some(&[DrawableId(7)][..]));
}

// ============================================================================
// Volumes
// ============================================================================

#[test]
fn cull_disabled_keeps_everything() {
    let mut fixture = Fixture::new(
        r#"{ "passes": [ { "camera": "default", "draw": ["opaque"], "cull": false } ] }"#,
        &[],
    );
    fixture.run(&scene());

    let mut visible = fixture.cache.get("default", "opaque").unwrap().to_vec();
    visible.sort();
    assert_eq!(visible, vec![DrawableId(1), DrawableId(2)]);
}

#[test]
fn everything_volume_matches_any_box() {
    let far = unit_box(Vec3::splat(1.0e6));
    assert!(CullVolume::Everything.intersects(&far));
}

#[test]
fn skipped_passes_are_not_culled() {
    let mut fixture = Fixture::new(
        r#"{
            "passes": [
                { "camera": "default", "draw": ["opaque"], "conditions": "bloom" },
                { "camera": "2d", "draw": ["postprocess"], "shader": "blit" }
            ]
        }"#,
        &[],
    );
    fixture.run(&scene());
    assert!(fixture.cache.is_empty());
    assert_eq!(fixture.cache.queries(), 0);
}

// ============================================================================
// Cube Targets
// ============================================================================

#[test]
fn cube_target_culls_each_face() {
    let mut fixture = Fixture::new(
        r#"{
            "outputs": [ { "name": "reflection", "type": "cube", "width": 64, "height": 64 } ],
            "passes": [ { "camera": "dynamic_reflection", "draw": ["opaque"], "output": "reflection" } ]
        }"#,
        &[],
    );
    fixture.run(&scene());

    assert_eq!(fixture.cache.len(), 6);
    for face in 0..6 {
        let name = format!("dynamic_reflection_cubeside{face}");
        let camera = fixture.cameras.get(&name).unwrap();
        assert!((camera.width - 64.0).abs() < 1e-6);
        assert!(fixture.cache.get(&name, "opaque").is_some());
    }
    assert!(fixture.cache.get("dynamic_reflection", "opaque").is_none());
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn unknown_layer_reported_once() {
    let mut fixture = Fixture::new(
        r#"{ "passes": [ { "camera": "default", "draw": ["opaque", "terrain"] } ] }"#,
        &[],
    );
    for _ in 0..5 {
        fixture.run(&scene());
    }

    assert_eq!(fixture.reporter.emitted(), 1);
    assert_eq!(
        fixture.reporter.last_message(ReportSite::cull(0).with_slot(1)),
        Some("Drawable container not found: terrain")
    );
    assert!(fixture.cache.get("default", "terrain").is_none());
    assert!(fixture.cache.get("default", "opaque").is_some());
}

#[test]
fn unknown_camera_reported() {
    let mut fixture = Fixture::new(
        r#"{ "passes": [ { "camera": "mirror", "draw": ["opaque"] } ] }"#,
        &[],
    );
    fixture.run(&scene());
    fixture.run(&scene());

    assert_eq!(fixture.reporter.emitted(), 1);
    assert_eq!(
        fixture.reporter.last_message(ReportSite::cull(0)),
        Some("Camera not found: mirror")
    );
    assert!(fixture.cache.is_empty());
}

// ============================================================================
// Dynamic Draw List
// ============================================================================

#[test]
fn dynamic_list_sorted_by_draw_order() {
    let mut list = DynamicDrawList::new();
    for (id, order) in [(1, 5), (2, -1), (3, 5), (4, 0)] {
        list.add(
            "cars",
            DynamicDrawable {
                id: DrawableId(id),
                draw_order: order,
            },
        );
    }
    assert!(list.layer("cars").is_empty(), "not visible before sorting");

    list.sort();
    assert_eq!(
        list.layer("cars"),
        &[DrawableId(2), DrawableId(4), DrawableId(1), DrawableId(3)]
    );
    assert!(list.layer("unknown").is_empty());

    list.clear();
    assert!(list.layer("cars").is_empty());
}
