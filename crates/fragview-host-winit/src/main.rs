use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use glutin::prelude::GlSurface;
use winit::event::{ElementState, Event, KeyboardInput, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

use fragview_core::PlayerError;
use fragview_host_winit::window::{make_gl, non_zero};
use fragview_host_winit::status::APP_NAME;
use fragview_host_winit::{initialise_tracing, keys, Cli, FsFetcher, TitleStatus};
use fragview_runtime::controller::UPLOAD_FAILED;
use fragview_runtime::{Fetcher, GpuBackend, SessionController, StatusSink, SurfaceSize};
use fragview_runtime_glow::GlowBackend;

fn upload_file<B: GpuBackend, F: Fetcher, S: StatusSink>(
    controller: &SessionController<B, F, S>,
    path: &Path,
) {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::info!(path = %path.display(), "uploading image");
            pollster::block_on(controller.upload_image(bytes));
        }
        Err(source) => controller.report(
            UPLOAD_FAILED,
            &PlayerError::Io {
                path: path.to_path_buf(),
                source,
            },
        ),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialise_tracing();

    let config = cli.player_config().context("loading player config")?;
    tracing::debug!(?config, root = %cli.root.display(), "resolved config");

    let event_loop = EventLoop::new();
    let gl_window = make_gl(&event_loop, APP_NAME, cli.width, cli.height)
        .context("opening a GL window")?;
    let window = Rc::new(gl_window.window);
    let surface = gl_window.surface;
    let context = gl_window.context;

    let backend = GlowBackend::new(gl_window.gl, config.geometry)?;
    let controller = SessionController::new(
        backend,
        FsFetcher::new(&cli.root),
        TitleStatus::new(window.clone()),
        config,
    )?;

    if let Err(e) = pollster::block_on(controller.start()) {
        // Already on the status line; the loop renders Idle.
        tracing::debug!(error = %e, "continuing without a shader");
    }
    if let Some(path) = &cli.image {
        upload_file(&controller, path);
    }

    let started = Instant::now();
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                WindowEvent::Resized(size) => {
                    surface.resize(&context, non_zero(size.width), non_zero(size.height));
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    if let Some(action) = keys::action_for(key) {
                        keys::apply(&controller, action);
                    }
                }
                WindowEvent::DroppedFile(path) => upload_file(&controller, &path),
                _ => {}
            },
            Event::MainEventsCleared => {
                window.request_redraw();
            }
            Event::RedrawRequested(_) => {
                let size = window.inner_size();
                controller.frame(
                    SurfaceSize::new(size.width, size.height),
                    started.elapsed().as_secs_f32(),
                );
                if let Err(e) = surface.swap_buffers(&context) {
                    tracing::error!(error = %e, "swap_buffers failed");
                }
            }
            Event::LoopDestroyed => controller.shutdown(),
            _ => {}
        }
    });
}
