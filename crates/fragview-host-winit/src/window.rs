//! Window + GL context creation.

use std::ffi::CString;
use std::num::NonZeroU32;

use fragview_core::PlayerError;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContextSurfaceAccessor,
    PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::{GlConfig, GlDisplay, GlSurface};
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasRawWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

pub struct GlWindow {
    pub window: Window,
    pub surface: Surface<WindowSurface>,
    pub context: PossiblyCurrentContext,
    pub gl: glow::Context,
}

impl std::fmt::Debug for GlWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlWindow")
            .field("window", &self.window.id())
            .finish_non_exhaustive()
    }
}

pub fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

fn unavailable(what: &str, e: impl std::fmt::Display) -> PlayerError {
    PlayerError::ContextUnavailable(format!("{what}: {e}"))
}

/// Opens a window with a current GLES 3.0 context, falling back to desktop GL 4.3.
///
/// Shaders are GLSL ES 3.00, so the fallback relies on 4.3's ES3 compatibility. Platforms with
/// neither (macOS stops at GL 4.1 without GLES) fail to compile the vertex stage and stay
/// Idle with the compile error on the status line.
///
/// Every failure is [`PlayerError::ContextUnavailable`].
pub fn make_gl(
    event_loop: &EventLoop<()>,
    title: &str,
    width: u32,
    height: u32,
) -> Result<GlWindow, PlayerError> {
    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_depth_size(0)
        .with_stencil_size(0);

    let display_builder = DisplayBuilder::new().with_window_builder(Some(
        WindowBuilder::new()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height)),
    ));

    let (window, gl_config) = display_builder
        .build(event_loop, template, |configs| {
            // glutin only calls the picker with a non-empty set.
            configs
                .reduce(|a, b| if a.num_samples() > b.num_samples() { a } else { b })
                .expect("at least one GL config")
        })
        .map_err(|e| unavailable("no usable GL config", e))?;

    let window = window.ok_or_else(|| unavailable("window", "not created"))?;
    let raw_window_handle = window.raw_window_handle();
    let gl_display = gl_config.display();

    let gles = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
        .build(Some(raw_window_handle));
    let fallback = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 3))))
        .build(Some(raw_window_handle));

    let not_current = unsafe {
        match gl_display.create_context(&gl_config, &gles) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(error = %e, "GLES 3.0 context unavailable, trying desktop GL 4.3");
                gl_display
                    .create_context(&gl_config, &fallback)
                    .map_err(|e| unavailable("create_context", e))?
            }
        }
    };

    let size = window.inner_size();
    let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        non_zero(size.width),
        non_zero(size.height),
    );
    let surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
        .map_err(|e| unavailable("create_window_surface", e))?;
    let context = not_current
        .make_current(&surface)
        .map_err(|e| unavailable("make_current", e))?;

    let gl = unsafe {
        glow::Context::from_loader_function(|s| match CString::new(s) {
            Ok(name) => gl_display.get_proc_address(&name) as *const _,
            Err(_) => std::ptr::null(),
        })
    };

    Ok(GlWindow {
        window,
        surface,
        context,
        gl,
    })
}
