//! Output Graph Tests
//!
//! Tests for:
//! - Texture allocation per output descriptor (size, format, samples)
//! - Duplicate output names (first wins, reported once)
//! - Framebuffer aliasing
//! - Multiple render target framebuffers keyed by output string
//! - Float texture failure and cleanup
//! - Condition-gated outputs

mod common;

use common::{RecordingBackend, build_outputs, init_logger, parse_config};

use strata::core::{FeatureFlags, ReportOnce, ReportSite, StrataError};
use strata::render::backend::{TextureHandle, TextureTarget};
use strata::render::capabilities::{GpuCapabilities, GpuFeatures};
use strata::render::config::PixelFormat;
use strata::render::outputs::{ExternalTextures, OutputGraphBuilder, RenderTarget};

// ============================================================================
// Allocation
// ============================================================================

#[test]
fn textures_resolve_size_and_format() {
    init_logger();
    let config = parse_config(
        r#"{
            "outputs": [
                { "name": "half", "type": "rectangle", "format": "RGBA16",
                  "width": { "screen": 0.5 }, "height": { "screen": 0.5 }, "filter": "nearest" },
                { "name": "shadow", "format": "depthshadow", "width": 1024, "height": 1024 },
                { "name": "env", "type": "cube", "format": "RGB8", "width": 256, "height": 256, "mipmap": true }
            ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let mut reporter = ReportOnce::new();
    let graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut reporter).unwrap();

    assert_eq!(graph.texture_count(), 3);

    let half = backend.texture_desc("half").unwrap();
    assert_eq!((half.width, half.height), (400, 300));
    assert_eq!(half.target, TextureTarget::Rectangle);
    assert_eq!(half.format, PixelFormat::Rgba16);
    assert!(half.nearest);

    let shadow = backend.texture_desc("shadow").unwrap();
    assert_eq!((shadow.width, shadow.height), (1024, 1024));
    assert!(shadow.depth_comparison);

    let env = backend.texture_desc("env").unwrap();
    assert_eq!(env.target, TextureTarget::Cube);
    assert!(env.mipmap);

    // Every texture output is readable by later passes.
    for name in ["half", "shadow", "env"] {
        assert_eq!(graph.input(name), backend.texture_named(name));
    }
}

#[test]
fn multisample_count() {
    let config = parse_config(
        r#"{
            "outputs": [
                { "name": "global", "multisample": -1 },
                { "name": "explicit", "multisample": 2 },
                { "name": "single" }
            ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut ReportOnce::new()).unwrap();

    assert_eq!(backend.texture_desc("global").unwrap().multisample, 4);
    assert_eq!(backend.texture_desc("explicit").unwrap().multisample, 2);
    assert_eq!(backend.texture_desc("single").unwrap().multisample, 0);
}

#[test]
fn screen_relative_size_never_zero() {
    let config = parse_config(
        r#"{ "outputs": [ { "name": "tiny", "width": { "screen": 0.0001 }, "height": 0 } ] }"#,
    );
    let mut backend = RecordingBackend::new();
    build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut ReportOnce::new()).unwrap();

    let tiny = backend.texture_desc("tiny").unwrap();
    assert_eq!((tiny.width, tiny.height), (1, 1));
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn duplicate_output_first_wins_and_reported_once() {
    init_logger();
    let config = parse_config(
        r#"{
            "outputs": [
                { "name": "scene", "width": 64, "height": 64 },
                { "name": "scene", "width": 32, "height": 32 }
            ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let mut reporter = ReportOnce::new();

    let mut graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut reporter).unwrap();
    assert_eq!(graph.texture_count(), 1);
    assert_eq!(backend.textures_created, 1);
    assert_eq!(backend.texture_desc("scene").unwrap().width, 64);
    assert_eq!(reporter.emitted(), 1);
    assert!(
        reporter
            .last_message(ReportSite::output(1))
            .unwrap()
            .contains("duplicate output name scene")
    );

    // Rebuilding with the same sink does not repeat the message.
    graph.release(&mut backend);
    build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut reporter).unwrap();
    assert_eq!(reporter.emitted(), 1);
}

#[test]
fn framebuffer_alias() {
    let config = parse_config(
        r#"{
            "outputs": [ { "name": "screen", "type": "framebuffer" } ],
            "passes": [ { "camera": "default", "draw": ["opaque"], "output": "screen" } ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut ReportOnce::new()).unwrap();

    assert_eq!(graph.target("screen"), Some(&RenderTarget::Framebuffer));
    assert_eq!(graph.target("framebuffer"), Some(&RenderTarget::Framebuffer));
    assert_eq!(graph.texture_count(), 0);
    assert_eq!(graph.framebuffer_count(), 0);
    assert_eq!(backend.framebuffers_created, 0);
}

#[test]
fn external_inputs_seeded_and_shadowed_by_outputs() {
    let config = parse_config(r#"{ "outputs": [ { "name": "sky" } ] }"#);
    let mut externals = ExternalTextures::default();
    externals.insert("sky".to_string(), TextureHandle(500));
    externals.insert("noise".to_string(), TextureHandle(501));

    let mut backend = RecordingBackend::new();
    let flags = FeatureFlags::new();
    let graph = OutputGraphBuilder {
        config: &config,
        flags: &flags,
        float_textures: true,
        screen_width: 800,
        screen_height: 600,
        fsaa: 1,
    }
    .build(&mut backend, &externals, &mut ReportOnce::new())
    .unwrap();

    assert_eq!(graph.input("noise"), Some(TextureHandle(501)));
    assert_eq!(graph.input("sky"), backend.texture_named("sky"));
    assert_ne!(graph.input("sky"), Some(TextureHandle(500)));
}

// ============================================================================
// Pass Framebuffers
// ============================================================================

#[test]
fn multiple_render_targets_share_one_framebuffer() {
    let config = parse_config(
        r#"{
            "outputs": [ { "name": "albedo" }, { "name": "normals" }, { "name": "depth", "format": "depth" } ],
            "passes": [
                { "camera": "default", "draw": ["opaque"], "output": "albedo normals" },
                { "camera": "default", "draw": ["decals"], "output": "albedo normals" },
                { "camera": "default", "draw": ["opaque"], "output": "depth" }
            ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut ReportOnce::new()).unwrap();

    assert_eq!(graph.framebuffer_count(), 2);
    assert_eq!(backend.framebuffers_created, 2);

    let Some(RenderTarget::Offscreen(mrt)) = graph.target("albedo normals") else {
        panic!("expected an offscreen target");
    };
    let expected = vec![
        backend.texture_named("albedo").unwrap(),
        backend.texture_named("normals").unwrap(),
    ];
    assert_eq!(mrt.attachments.to_vec(), expected);
    assert_eq!(backend.framebuffers[&mrt.framebuffer], expected);
    assert!(!mrt.cubemap);
}

#[test]
fn unknown_names_in_output_list_are_ignored() {
    let config = parse_config(
        r#"{
            "outputs": [ { "name": "scene" } ],
            "passes": [ { "camera": "default", "draw": ["opaque"], "output": "scene bogus" } ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut ReportOnce::new()).unwrap();

    let Some(RenderTarget::Offscreen(target)) = graph.target("scene bogus") else {
        panic!("expected an offscreen target");
    };
    assert_eq!(target.attachments.len(), 1);
}

#[test]
fn cube_output_makes_cubemap_target() {
    let config = parse_config(
        r#"{
            "outputs": [ { "name": "reflection", "type": "cube", "width": 128, "height": 128 } ],
            "passes": [ { "camera": "dynamic_reflection", "draw": ["opaque"], "output": "reflection" } ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut ReportOnce::new()).unwrap();

    let target = graph.target("reflection").unwrap();
    assert!(target.is_cubemap());
}

#[test]
fn gated_output_leaves_pass_without_target() {
    init_logger();
    let config = parse_config(
        r#"{
            "outputs": [ { "name": "bloom_buffer", "conditions": "bloom" } ],
            "passes": [ { "camera": "2d", "draw": ["postprocess"], "output": "bloom_buffer", "shader": "blur" } ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let mut reporter = ReportOnce::new();
    let graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut reporter).unwrap();

    assert!(graph.texture("bloom_buffer").is_none());
    assert!(graph.target("bloom_buffer").is_none());
    assert_eq!(backend.textures_created, 0);
    assert!(
        reporter
            .last_message(ReportSite::pass(0))
            .unwrap()
            .starts_with("None of these outputs are active: bloom_buffer")
    );

    let flags: FeatureFlags = ["bloom"].into_iter().collect();
    let graph = build_outputs(&config, &flags, &mut backend, &mut ReportOnce::new()).unwrap();
    assert!(graph.target("bloom_buffer").is_some());
}

#[test]
fn gated_pass_gets_no_framebuffer() {
    let config = parse_config(
        r#"{
            "outputs": [ { "name": "scene" } ],
            "passes": [ { "camera": "default", "draw": ["opaque"], "output": "scene", "conditions": "fsaa" } ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let mut reporter = ReportOnce::new();
    let graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut reporter).unwrap();

    assert!(graph.target("scene").is_none());
    assert_eq!(backend.framebuffers_created, 0);
    assert_eq!(reporter.emitted(), 0);
}

// ============================================================================
// Failure
// ============================================================================

#[test]
fn float_output_without_float_textures_fails_clean() {
    init_logger();
    let config = parse_config(
        r#"{
            "outputs": [ { "name": "ldr" }, { "name": "hdr", "format": "RGBA16" } ],
            "passes": [ { "camera": "default", "draw": ["opaque"], "output": "hdr" } ]
        }"#,
    );
    let caps = GpuCapabilities::default().without(GpuFeatures::FLOAT_TEXTURES);
    let mut backend = RecordingBackend::with_capabilities(caps);

    let result = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut ReportOnce::new());
    assert!(matches!(
        result,
        Err(StrataError::FloatTexturesUnsupported { ref output }) if output == "hdr"
    ));
    assert_eq!(backend.textures_created, 1);
    assert!(backend.textures.is_empty(), "partial build must be released");
}

#[test]
fn release_frees_everything() {
    let config = parse_config(
        r#"{
            "outputs": [ { "name": "a" }, { "name": "b" } ],
            "passes": [
                { "camera": "default", "draw": ["opaque"], "output": "a" },
                { "camera": "default", "draw": ["opaque"], "output": "a b" }
            ]
        }"#,
    );
    let mut backend = RecordingBackend::new();
    let mut graph = build_outputs(&config, &FeatureFlags::new(), &mut backend, &mut ReportOnce::new()).unwrap();
    assert_eq!(backend.textures.len(), 2);
    assert_eq!(backend.framebuffers.len(), 2);

    graph.release(&mut backend);
    assert!(backend.textures.is_empty());
    assert!(backend.framebuffers.is_empty());
    assert_eq!(graph.target_count(), 0);
    assert!(graph.input("a").is_none());
}
