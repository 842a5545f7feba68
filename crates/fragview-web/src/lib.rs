//! Browser entry point.
//!
//! Everything that touches the DOM is compiled for `wasm32` only; the element ids and the
//! pure control helpers below build everywhere so they can be unit tested.

use fragview_core::{parse_strength, Controls};

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod status;

/// DOM element ids. Only the canvas is required.
pub mod ids {
    pub const CANVAS: &str = "c";
    pub const SHADER_SELECT: &str = "shaderSelect";
    pub const FILE_INPUT: &str = "fileInput";
    pub const IMAGE_INFO: &str = "imgInfo";
    pub const STRENGTH: &str = "strength";
    pub const STRENGTH_VALUE: &str = "strengthVal";
    pub const TINT: &str = "tint";
    pub const TINT_VALUE: &str = "tintVal";
    pub const RESET: &str = "reset";
}

/// Applies whatever initial values the page's inputs carry.
///
/// Missing inputs and unparsable strengths leave the configured defaults in place.
pub fn seed_controls(controls: &mut Controls, strength: Option<&str>, tint: Option<&str>) {
    if let Some(s) = strength.and_then(parse_strength) {
        controls.set_strength(s);
    }
    if let Some(hex) = tint.filter(|t| !t.trim().is_empty()) {
        controls.set_tint_hex(hex.trim());
    }
}
