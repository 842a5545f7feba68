//! Startup and user-driven reloads.
//!
//! Every async entry point takes `&self` so a host can keep one controller behind an `Rc`
//! and run several loads at once. `RefCell` borrows are never held across an `.await`;
//! state is only touched between awaits.

use std::cell::{Ref, RefCell, RefMut};

use fragview_core::{Controls, Manifest, PlayerConfig, PlayerError};

use crate::gpu::{GpuBackend, SurfaceSize};
use crate::loader::{
    decode_image, fetch_manifest, fetch_text_with_fallback, DecodedImage, Fetcher, ImageSource,
};
use crate::render_loop::{FrameOutcome, RenderLoop, RenderPhase, RenderState};
use crate::session::{RenderSession, RequestKind, RequestToken};
use crate::status::{format_dimensions, StatusSink};

pub const LOADING: &str = "Loading…";
pub const START_FAILED: &str = "Player failed to start";
pub const DEFAULT_IMAGE_MISSING: &str = "Default test image not found";
pub const UPLOAD_FAILED: &str = "Failed to load uploaded image";

fn shader_failed(name: &str) -> String {
    format!("Failed to use shader {name}")
}

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The load failed and was reported; the previous resource stays active.
    Failed,
    /// A newer request for the same resource was issued meanwhile; the result was dropped.
    Stale,
}

pub struct SessionController<B: GpuBackend, F: Fetcher, S: StatusSink> {
    config: PlayerConfig,
    fetcher: F,
    session: RefCell<RenderSession<B>>,
    status: RefCell<S>,
    manifest: RefCell<Option<Manifest>>,
    selected: RefCell<Option<String>>,
    controls: RefCell<Controls>,
    render_loop: RefCell<RenderLoop>,
}

impl<B: GpuBackend, F: Fetcher, S: StatusSink> std::fmt::Debug for SessionController<B, F, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &self.session)
            .field("manifest", &self.manifest)
            .field("selected", &self.selected)
            .field("controls", &self.controls)
            .field("render_loop", &self.render_loop)
            .finish_non_exhaustive()
    }
}

impl<B: GpuBackend, F: Fetcher, S: StatusSink> SessionController<B, F, S> {
    /// Fails only if the placeholder texture cannot be created.
    pub fn new(backend: B, fetcher: F, status: S, config: PlayerConfig) -> Result<Self, PlayerError> {
        let session = RenderSession::new(backend, &config)?;
        let controls = Controls::new(config.defaults.clone());
        Ok(Self {
            config,
            fetcher,
            session: RefCell::new(session),
            status: RefCell::new(status),
            manifest: RefCell::new(None),
            selected: RefCell::new(None),
            controls: RefCell::new(controls),
            render_loop: RefCell::new(RenderLoop::new()),
        })
    }

    /// Manifest, initial shader, then the default image.
    ///
    /// A missing default image is reported and startup still succeeds. Any earlier failure is
    /// reported as a startup failure and returned; the render loop stays Idle.
    pub async fn start(&self) -> Result<(), PlayerError> {
        self.status.borrow_mut().info(LOADING);
        if let Err(e) = self.start_shader().await {
            tracing::warn!(error = %e, "startup failed");
            self.status.borrow_mut().error(START_FAILED, &e);
            return Err(e);
        }
        self.load_default_image().await;
        Ok(())
    }

    async fn start_shader(&self) -> Result<(), PlayerError> {
        let manifest = fetch_manifest(&self.fetcher, &self.config.manifest_candidates).await?;
        let initial = manifest
            .initial_selection(&self.config.preferred_shader)
            .to_string();
        tracing::info!(count = manifest.len(), initial = %initial, "manifest loaded");
        self.status
            .borrow_mut()
            .shader_list(manifest.fragments(), &initial);
        *self.manifest.borrow_mut() = Some(manifest);

        let token = self.begin_shader(&initial);
        let source = self.fetch_shader_source(&initial).await?;
        if !self.session.borrow().is_current(token) {
            tracing::warn!(shader = %initial, "initial shader superseded before it loaded");
            return Ok(());
        }
        self.session.borrow_mut().install_program(&source, &initial)
    }

    async fn load_default_image(&self) {
        let token = self.session.borrow_mut().issue(RequestKind::Image);
        let source = ImageSource::Locations(self.config.default_image_candidates.clone());
        let result = decode_image(&self.fetcher, source).await;
        self.finish_image(token, DEFAULT_IMAGE_MISSING, result);
    }

    /// Fetch `name` and make it the active program. On failure the prior program stays.
    pub async fn select_shader(&self, name: &str) -> LoadOutcome {
        let token = self.begin_shader(name);
        let result = self.fetch_shader_source(name).await;
        self.finish_shader(token, name, result)
    }

    /// Select the manifest entry `step` places away from the current selection.
    ///
    /// Returns `None` before a manifest is loaded.
    pub async fn cycle_shader(&self, step: isize) -> Option<LoadOutcome> {
        let next = {
            let manifest = self.manifest.borrow();
            let manifest = manifest.as_ref()?;
            let current = self.selected.borrow().clone().unwrap_or_default();
            manifest.cycle(&current, step).to_string()
        };
        Some(self.select_shader(&next).await)
    }

    /// Decode an uploaded file and make it the source texture. On failure the prior
    /// texture stays.
    pub async fn upload_image(&self, bytes: Vec<u8>) -> LoadOutcome {
        let token = self.session.borrow_mut().issue(RequestKind::Image);
        let result = decode_image(&self.fetcher, ImageSource::Blob(bytes)).await;
        self.finish_image(token, UPLOAD_FAILED, result)
    }

    /// Surface a host-side failure (e.g. reading a dropped file) on the status sink.
    pub fn report(&self, context: &str, err: &PlayerError) {
        tracing::warn!(error = %err, "{context}");
        self.status.borrow_mut().error(context, err);
    }

    fn begin_shader(&self, name: &str) -> RequestToken {
        *self.selected.borrow_mut() = Some(name.to_string());
        self.session.borrow_mut().issue(RequestKind::Shader)
    }

    async fn fetch_shader_source(&self, name: &str) -> Result<String, PlayerError> {
        let candidates = self.config.shader_candidates_for(name);
        fetch_text_with_fallback(&self.fetcher, &candidates).await
    }

    fn finish_shader(
        &self,
        token: RequestToken,
        name: &str,
        result: Result<String, PlayerError>,
    ) -> LoadOutcome {
        if !self.session.borrow().is_current(token) {
            tracing::warn!(shader = name, seq = token.seq(), "dropping stale shader load");
            return LoadOutcome::Stale;
        }
        let installed =
            result.and_then(|source| self.session.borrow_mut().install_program(&source, name));
        match installed {
            Ok(()) => LoadOutcome::Applied,
            Err(e) => {
                tracing::warn!(shader = name, error = %e, "shader rejected");
                self.status.borrow_mut().error(&shader_failed(name), &e);
                LoadOutcome::Failed
            }
        }
    }

    fn finish_image(
        &self,
        token: RequestToken,
        context: &str,
        result: Result<DecodedImage, PlayerError>,
    ) -> LoadOutcome {
        if !self.session.borrow().is_current(token) {
            tracing::warn!(seq = token.seq(), "dropping stale image load");
            return LoadOutcome::Stale;
        }
        let installed = result.and_then(|image| self.session.borrow_mut().install_image(&image));
        match installed {
            Ok((w, h)) => {
                self.status.borrow_mut().info(&format_dimensions(w, h));
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "{context}");
                self.status.borrow_mut().error(context, &e);
                LoadOutcome::Failed
            }
        }
    }

    /// Render one frame with the current controls.
    pub fn frame(&self, surface: SurfaceSize, time: f32) -> FrameOutcome {
        let state = {
            let controls = self.controls.borrow();
            RenderState {
                tint: controls.tint(),
                strength: controls.strength(),
                surface,
                time,
            }
        };
        let mut session = self.session.borrow_mut();
        let outcome = self.render_loop.borrow_mut().tick(&mut session, &state);
        outcome
    }

    pub fn phase(&self) -> RenderPhase {
        self.session.borrow().phase()
    }

    pub fn set_tint_hex(&self, hex: &str) {
        self.controls.borrow_mut().set_tint_hex(hex);
    }

    pub fn set_strength(&self, strength: f32) {
        self.controls.borrow_mut().set_strength(strength);
    }

    /// Adds `delta` to the strength, clamped to `[0, 1]`.
    pub fn nudge_strength(&self, delta: f32) {
        let mut controls = self.controls.borrow_mut();
        let next = (controls.strength() + delta).clamp(0.0, 1.0);
        controls.set_strength(next);
    }

    pub fn reset_controls(&self) {
        self.controls.borrow_mut().reset();
    }

    pub fn controls(&self) -> Ref<'_, Controls> {
        self.controls.borrow()
    }

    pub fn controls_mut(&self) -> RefMut<'_, Controls> {
        self.controls.borrow_mut()
    }

    /// Manifest entries in order; empty before the manifest loads.
    pub fn shader_choices(&self) -> Vec<String> {
        self.manifest
            .borrow()
            .as_ref()
            .map(|m| m.fragments().to_vec())
            .unwrap_or_default()
    }

    /// The most recently requested shader, whether or not it built.
    pub fn selected_shader(&self) -> Option<String> {
        self.selected.borrow().clone()
    }

    /// The shader currently rendering.
    pub fn active_shader(&self) -> Option<String> {
        self.session
            .borrow()
            .program()
            .map(|p| p.origin().to_string())
    }

    pub fn session(&self) -> Ref<'_, RenderSession<B>> {
        self.session.borrow()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Free every GPU resource the session holds.
    pub fn shutdown(&self) {
        self.session.borrow_mut().release_all();
        let render_loop = self.render_loop.borrow();
        tracing::info!(
            frames = render_loop.frames(),
            draws = render_loop.draws(),
            "session closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::UniformValue;
    use crate::headless::{encode_png, MemoryFetcher, RecordingBackend, StatusLog};
    use pollster::block_on;

    const TINT: &str = "#version 300 es\nprecision mediump float;\nuniform vec3 uTint;\nuniform float uStrength;\nout vec4 o;\nvoid main() { o = vec4(uTint * uStrength, 1.0); }\n";
    const PLAIN: &str = "#version 300 es\nprecision mediump float;\nout vec4 o;\nvoid main() { o = vec4(1.0); }\n";
    const BROKEN: &str = "#version 300 es\nvoid main() { o = vec4(; \n";

    type Controller = SessionController<RecordingBackend, MemoryFetcher, StatusLog>;

    fn fetcher() -> MemoryFetcher {
        MemoryFetcher::new()
            .with_text(
                "/shaders/manifest.json",
                r#"{"fragments":["plain.frag","solid_tint.frag","broken.frag"]}"#,
            )
            .with_text("/shaders/solid_tint.frag", TINT)
            .with_text("/shaders/plain.frag", PLAIN)
            .with_text("/shaders/broken.frag", BROKEN)
    }

    fn controller(fetcher: MemoryFetcher) -> (Controller, StatusLog) {
        let log = StatusLog::new();
        let c = SessionController::new(
            RecordingBackend::new(),
            fetcher,
            log.clone(),
            PlayerConfig::default(),
        )
        .unwrap();
        (c, log)
    }

    #[test]
    fn startup_prefers_solid_tint_and_reports_missing_image() {
        let (c, log) = controller(fetcher());
        block_on(c.start()).unwrap();
        assert_eq!(c.active_shader().as_deref(), Some("solid_tint.frag"));
        assert_eq!(c.shader_choices().len(), 3);
        assert_eq!(c.phase(), RenderPhase::Active);

        let entries = log.entries();
        assert_eq!(entries[0].text(), LOADING);
        let errors = log.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("⚠ Default test image not found — "), "{}", errors[0]);
    }

    #[test]
    fn startup_loads_default_image() {
        let png = encode_png(4, 3, [255, 255, 255, 255]);
        let (c, log) = controller(fetcher().with_bytes("/images/test.png", png));
        block_on(c.start()).unwrap();
        assert!(log.errors().is_empty());
        assert_eq!(log.last().as_deref(), Some("4×3"));
        assert_eq!(c.session().texture().unwrap().size(), (4, 3));
    }

    #[test]
    fn missing_manifest_fails_startup_and_stays_idle() {
        let (c, log) = controller(MemoryFetcher::new());
        let err = block_on(c.start()).unwrap_err();
        assert!(matches!(err, PlayerError::ResourceNotFound { .. }));
        assert!(log.errors()[0].starts_with("⚠ Player failed to start — "));
        for _ in 0..2 {
            assert_eq!(c.frame(SurfaceSize::new(8, 8), 0.0), FrameOutcome::Cleared);
        }
        assert_eq!(c.phase(), RenderPhase::Idle);
    }

    #[test]
    fn broken_selection_keeps_prior_program() {
        let (c, log) = controller(fetcher());
        block_on(c.start()).unwrap();
        assert_eq!(block_on(c.select_shader("broken.frag")), LoadOutcome::Failed);
        assert_eq!(c.active_shader().as_deref(), Some("solid_tint.frag"));
        assert_eq!(c.selected_shader().as_deref(), Some("broken.frag"));
        let last = log.last().unwrap();
        assert!(last.starts_with("⚠ Failed to use shader broken.frag — fragment shader compile error"), "{last}");
        assert_eq!(c.frame(SurfaceSize::new(8, 8), 0.0), FrameOutcome::Drawn);
    }

    #[test]
    fn stale_shader_result_is_dropped() {
        let (c, log) = controller(fetcher());
        block_on(c.start()).unwrap();

        let slow = c.begin_shader("plain.frag");
        let fast = c.begin_shader("solid_tint.frag");
        assert_eq!(
            c.finish_shader(fast, "solid_tint.frag", Ok(TINT.to_string())),
            LoadOutcome::Applied
        );
        let before = log.entries().len();
        assert_eq!(
            c.finish_shader(slow, "plain.frag", Ok(PLAIN.to_string())),
            LoadOutcome::Stale
        );
        assert_eq!(c.active_shader().as_deref(), Some("solid_tint.frag"));
        assert_eq!(log.entries().len(), before);
    }

    #[test]
    fn stale_image_result_is_dropped() {
        let (c, _log) = controller(fetcher());
        let first = c.session.borrow_mut().issue(RequestKind::Image);
        let second = c.session.borrow_mut().issue(RequestKind::Image);
        let img = |v| DecodedImage::new(1, 1, vec![v, v, v, 255]);
        assert_eq!(c.finish_image(second, UPLOAD_FAILED, Ok(img(2))), LoadOutcome::Applied);
        assert_eq!(c.finish_image(first, UPLOAD_FAILED, Ok(img(1))), LoadOutcome::Stale);
        let session = c.session();
        let tex = session.texture().unwrap().texture();
        assert_eq!(session.backend().texture_pixels(tex), Some(&[2, 2, 2, 255][..]));
    }

    #[test]
    fn bad_upload_is_reported_and_keeps_texture() {
        let (c, log) = controller(fetcher());
        block_on(c.start()).unwrap();
        assert_eq!(block_on(c.upload_image(b"nope".to_vec())), LoadOutcome::Failed);
        assert!(log.last().unwrap().starts_with("⚠ Failed to load uploaded image — "));
        assert_eq!(c.session().backend().live_textures(), 1);
    }

    #[test]
    fn frame_uses_current_controls() {
        let (c, _log) = controller(fetcher());
        block_on(c.start()).unwrap();
        c.set_tint_hex("#ff0000");
        c.set_strength(0.5);
        c.frame(SurfaceSize::new(2, 2), 1.0);
        let session = c.session();
        assert_eq!(
            session.backend().uniform_value("uTint"),
            Some(UniformValue::Vec3([1.0, 0.0, 0.0]))
        );
        assert_eq!(session.backend().uniform_value("uStrength"), Some(UniformValue::Float(0.5)));
    }

    #[test]
    fn nudge_clamps_and_reset_restores_defaults() {
        let (c, _log) = controller(fetcher());
        c.nudge_strength(-0.05);
        assert_eq!(c.controls().strength(), 0.0);
        for _ in 0..30 {
            c.nudge_strength(0.05);
        }
        assert_eq!(c.controls().strength(), 1.0);
        c.set_tint_hex("#00ff00");
        c.reset_controls();
        assert_eq!(c.controls().strength(), 0.0);
        assert_eq!(c.controls().tint_hex(), "#ffffff");
    }

    #[test]
    fn cycle_moves_through_manifest() {
        let (c, _log) = controller(fetcher());
        assert_eq!(block_on(c.cycle_shader(1)), None);
        block_on(c.start()).unwrap();
        assert_eq!(block_on(c.cycle_shader(-1)), Some(LoadOutcome::Applied));
        assert_eq!(c.active_shader().as_deref(), Some("plain.frag"));
    }

    #[test]
    fn shutdown_releases_gpu_objects() {
        let (c, _log) = controller(fetcher());
        block_on(c.start()).unwrap();
        c.shutdown();
        assert_eq!(c.session().backend().live_programs(), 0);
        assert_eq!(c.session().backend().live_textures(), 0);
    }
}
