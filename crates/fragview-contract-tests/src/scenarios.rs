//! End-to-end scenarios: controller + headless backend + in-memory fetcher.

use fragview_core::{PlayerConfig, PlayerError};
use fragview_runtime::headless::{
    encode_png, encode_png_rgba, MemoryFetcher, RecordingBackend, StatusLog,
};
use fragview_runtime::{
    fetch_text_with_fallback, FrameOutcome, LoadOutcome, RenderPhase, SessionController,
    SurfaceSize, UniformValue,
};
use pollster::block_on;

const MANIFEST_JSON: &str = include_str!("../fixtures/manifest.json");
const SOLID_TINT_FRAG: &str = include_str!("../fixtures/solid_tint.frag");
const PASSTHROUGH_FRAG: &str = include_str!("../fixtures/passthrough.frag");
const ALL_UNIFORMS_FRAG: &str = include_str!("../fixtures/all_uniforms.frag");
const BROKEN_FRAG: &str = include_str!("../fixtures/broken.frag");

const SURFACE: SurfaceSize = SurfaceSize {
    width: 64,
    height: 48,
};

type Player = SessionController<RecordingBackend, MemoryFetcher, StatusLog>;

fn served() -> MemoryFetcher {
    MemoryFetcher::new()
        .with_text("/shaders/manifest.json", MANIFEST_JSON)
        .with_text("/shaders/solid_tint.frag", SOLID_TINT_FRAG)
        .with_text("/shaders/passthrough.frag", PASSTHROUGH_FRAG)
        .with_text("/shaders/all_uniforms.frag", ALL_UNIFORMS_FRAG)
        .with_text("/shaders/broken.frag", BROKEN_FRAG)
        .with_bytes("/test.png", encode_png(2, 2, [128, 128, 128, 255]))
}

fn player(fetcher: MemoryFetcher) -> (Player, StatusLog) {
    player_on(RecordingBackend::new(), fetcher)
}

fn player_on(backend: RecordingBackend, fetcher: MemoryFetcher) -> (Player, StatusLog) {
    let log = StatusLog::new();
    let p = SessionController::new(
        backend,
        fetcher,
        log.clone(),
        PlayerConfig::default(),
    )
    .expect("placeholder texture");
    (p, log)
}

#[test]
fn first_reachable_candidate_wins() {
    let fetcher = MemoryFetcher::new()
        .with_status("/shaders/a.frag", 500)
        .with_text("/a.frag", "from root")
        .with_text("./a.frag", "never reached");
    let candidates = PlayerConfig::default().shader_candidates_for("a.frag");
    let text = block_on(fetch_text_with_fallback(&fetcher, &candidates)).unwrap();
    assert_eq!(text, "from root");
    assert_eq!(fetcher.attempts(), ["/shaders/a.frag", "/a.frag"]);
}

#[test]
fn solid_tint_frame_sets_only_declared_uniforms() {
    let (p, log) = player(served());
    block_on(p.start()).expect("startup");
    assert_eq!(p.active_shader().as_deref(), Some("solid_tint.frag"));

    p.set_tint_hex("#ff0000");
    p.set_strength(0.5);
    assert_eq!(p.session().backend().draw_count(), 0);
    assert_eq!(p.frame(SURFACE, 0.0), FrameOutcome::Drawn);

    let session = p.session();
    let gpu = session.backend();
    assert_eq!(gpu.uniform_value("uTint"), Some(UniformValue::Vec3([1.0, 0.0, 0.0])));
    assert_eq!(gpu.uniform_value("uStrength"), Some(UniformValue::Float(0.5)));
    for skipped in ["uTexture", "uResolution", "uTime"] {
        assert_eq!(gpu.uniform_value(skipped), None, "{skipped} must be skipped");
    }
    assert_eq!(gpu.draw_count(), 1);
    assert!(log.errors().is_empty(), "{:?}", log.errors());
}

#[test]
fn manifest_unreachable_reports_and_stays_idle() {
    let (p, log) = player(MemoryFetcher::new());
    let err = block_on(p.start()).expect_err("no manifest anywhere");
    assert!(matches!(err, PlayerError::ResourceNotFound { .. }), "{err:?}");

    let errors = log.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("⚠ Player failed to start — no candidate location"));

    for _ in 0..5 {
        assert_eq!(p.frame(SURFACE, 0.0), FrameOutcome::Cleared);
    }
    assert_eq!(p.phase(), RenderPhase::Idle);
    assert_eq!(p.session().backend().draw_count(), 0);
}

#[test]
fn syntax_error_keeps_rendering_prior_shader() {
    let (p, log) = player(served());
    block_on(p.start()).expect("startup");
    let before = p.session().program().expect("active").program().clone();

    assert_eq!(block_on(p.select_shader("broken.frag")), LoadOutcome::Failed);
    let last = log.last().expect("status line");
    assert!(
        last.starts_with("⚠ Failed to use shader broken.frag — fragment shader compile error"),
        "{last}"
    );

    for _ in 0..3 {
        assert_eq!(p.frame(SURFACE, 0.1), FrameOutcome::Drawn);
    }
    let session = p.session();
    assert_eq!(session.program().unwrap().program(), &before);
    assert!(session.backend().is_program_live(&before));
    assert_eq!(session.backend().live_programs(), 1);
}

#[test]
fn all_five_uniforms_are_fed() {
    let (p, _log) = player(served());
    block_on(p.start()).expect("startup");
    assert_eq!(block_on(p.select_shader("all_uniforms.frag")), LoadOutcome::Applied);
    assert_eq!(
        p.session().program().unwrap().uniforms().resolved_count(),
        5
    );

    p.frame(SURFACE, 1.5);
    let session = p.session();
    let gpu = session.backend();
    assert_eq!(gpu.uniform_value("uTexture"), Some(UniformValue::Int(0)));
    assert_eq!(gpu.uniform_value("uResolution"), Some(UniformValue::Vec2([64.0, 48.0])));
    assert_eq!(gpu.uniform_value("uTime"), Some(UniformValue::Float(1.5)));
}

#[test]
fn two_uploads_leave_only_the_second_bound() {
    let (p, log) = player(served());
    block_on(p.start()).expect("startup");

    let red = encode_png(2, 2, [255, 0, 0, 255]);
    let blue = encode_png(3, 1, [0, 0, 255, 255]);
    assert_eq!(block_on(p.upload_image(red)), LoadOutcome::Applied);
    let first = p.session().texture().unwrap().texture().clone();
    assert_eq!(block_on(p.upload_image(blue)), LoadOutcome::Applied);
    assert_eq!(log.last().as_deref(), Some("3×1"));

    p.frame(SURFACE, 0.0);
    let session = p.session();
    let gpu = session.backend();
    let second = session.texture().unwrap().texture().clone();
    assert!(!gpu.is_texture_live(&first));
    assert_eq!(gpu.live_textures(), 1);
    assert_eq!(gpu.bound_texture(0), Some(second));
    assert_eq!(
        gpu.texture_pixels(&second),
        Some(&[0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255, 255][..])
    );
}

#[test]
fn shader_without_texture_sampler_still_draws() {
    let (p, log) = player(served());
    block_on(p.start()).expect("startup");
    // solid_tint.frag has no sampler; the texture is bound but no uniform is written for it.
    p.frame(SURFACE, 0.0);
    assert_eq!(p.session().backend().uniform_value("uTexture"), None);
    assert!(log.errors().is_empty());
}

#[test]
fn default_image_skips_a_candidate_that_is_not_an_image() {
    let fetcher = MemoryFetcher::new()
        .with_text("/shaders/manifest.json", MANIFEST_JSON)
        .with_text("/shaders/solid_tint.frag", SOLID_TINT_FRAG)
        .with_text("/test.png", "<!doctype html><title>404</title>")
        .with_bytes("/images/test.png", encode_png(5, 4, [10, 20, 30, 255]));
    let (p, log) = player(fetcher);
    block_on(p.start()).expect("startup");

    assert_eq!(p.session().texture().unwrap().size(), (5, 4));
    assert_eq!(log.last().as_deref(), Some("5×4"));
    assert!(log.errors().is_empty(), "{:?}", log.errors());
}

#[test]
fn upload_failing_on_the_gpu_keeps_prior_texture_bound() {
    // Placeholder and default image get textures; the upload does not.
    let (p, log) = player_on(RecordingBackend::new().fail_textures_after(2), served());
    block_on(p.start()).expect("startup");
    let prior = *p.session().texture().unwrap().texture();

    let red = encode_png(4, 4, [255, 0, 0, 255]);
    assert_eq!(block_on(p.upload_image(red)), LoadOutcome::Failed);
    assert_eq!(
        log.last().as_deref(),
        Some("⚠ Failed to load uploaded image — backend object creation failed: texture allocation refused")
    );

    assert_eq!(p.frame(SURFACE, 0.0), FrameOutcome::Drawn);
    let session = p.session();
    assert_eq!(session.texture().unwrap().size(), (2, 2));
    assert!(session.backend().is_texture_live(&prior));
    assert_eq!(session.backend().bound_texture(0), Some(prior));
}

#[test]
fn uploaded_rows_reach_the_gpu_bottom_first() {
    let (p, _log) = player(served());
    block_on(p.start()).expect("startup");

    // 1×2: red on top, blue below.
    let png = encode_png_rgba(1, 2, vec![255, 0, 0, 255, 0, 0, 255, 255]);
    assert_eq!(block_on(p.upload_image(png)), LoadOutcome::Applied);

    let session = p.session();
    let texture = session.texture().unwrap().texture();
    assert_eq!(
        session.backend().texture_pixels(texture),
        Some(&[0, 0, 255, 255, 255, 0, 0, 255][..])
    );
}

#[test]
fn shader_list_is_published_before_the_initial_build() {
    // The preferred shader is listed but cannot be fetched.
    let fetcher = MemoryFetcher::new().with_text("/shaders/manifest.json", MANIFEST_JSON);
    let (p, log) = player(fetcher);
    assert!(block_on(p.start()).is_err());

    let lists = log.shader_lists();
    assert_eq!(lists.len(), 1);
    let (names, selected) = &lists[0];
    assert_eq!(names.len(), 4);
    assert_eq!(names[0], "passthrough.frag");
    assert_eq!(selected, "solid_tint.frag");
    assert_eq!(p.phase(), RenderPhase::Idle);
}
