#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

//! Backend-agnostic fragment-shader preview pipeline.
//!
//! Hosts supply a [`GpuBackend`], a [`Fetcher`] and a [`StatusSink`], build a
//! [`SessionController`], call [`SessionController::start`] once and then
//! [`SessionController::frame`] on every display tick.

pub mod controller;
pub mod gpu;
pub mod loader;
pub mod program;
pub mod render_loop;
pub mod session;
pub mod status;
pub mod texture;

#[cfg(any(test, feature = "headless"))]
pub mod headless;

pub use controller::{LoadOutcome, SessionController};
pub use gpu::{GpuBackend, SurfaceSize, UniformValue};
pub use loader::{
    decode_image, decode_image_bytes, fetch_bytes_with_fallback, fetch_manifest,
    fetch_text_with_fallback, DecodedImage, Fetcher, ImageSource,
};
pub use program::{
    ProgramBuilder, ShaderProgram, UniformHandles, UniformSlot, POSITION_ATTRIB,
    SOURCE_TEXTURE_UNIT, VERTEX_SOURCE,
};
pub use render_loop::{render_frame, FrameOutcome, RenderLoop, RenderPhase, RenderState};
pub use session::{RenderSession, RequestKind, RequestToken, RequestTokens};
pub use status::{format_dimensions, format_error, StatusSink};
pub use texture::{flip_rows, SourceTexture, TextureKind, PLACEHOLDER_PIXEL};

pub use fragview_core;
pub use fragview_core::{Controls, Geometry, PlayerConfig, PlayerError, Rgb};
