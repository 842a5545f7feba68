//! The contract between the pipeline and a concrete graphics API.

use fragview_core::PlayerError;

/// A value written into a resolved uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Sampler texture unit.
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

/// Drawing-surface size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales a CSS/logical size by the device pixel ratio (never below 1).
    pub fn from_logical(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() {
            device_pixel_ratio.max(1.0)
        } else {
            1.0
        };
        Self {
            width: (width.max(0.0) * dpr).floor() as u32,
            height: (height.max(0.0) * dpr).floor() as u32,
        }
    }
}

/// The backend for the preview pipeline.
///
/// Implementations own their graphics context. Every method is called from the single
/// thread that drives the render loop.
pub trait GpuBackend {
    /// A linked shader program.
    type Program: Clone + std::fmt::Debug;

    /// A 2-D texture object.
    type Texture: Clone + std::fmt::Debug;

    /// A resolved uniform location inside a program.
    type UniformLocation: Clone + std::fmt::Debug;

    /// Compile both stages and link them.
    ///
    /// On failure every object created along the way must already be deleted; the error is
    /// [`PlayerError::ShaderCompile`] or [`PlayerError::ProgramLink`] with the info log.
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self::Program, PlayerError>;

    fn delete_program(&mut self, program: Self::Program);

    fn attrib_location(&mut self, program: &Self::Program, name: &str) -> Option<u32>;

    fn uniform_location(
        &mut self,
        program: &Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    /// Create a texture configured for linear filtering and edge clamping.
    fn create_texture(&mut self) -> Result<Self::Texture, PlayerError>;

    /// Replace the texture's storage with tightly packed RGBA8 rows, first row at the bottom.
    fn upload_texture(&mut self, texture: &Self::Texture, width: u32, height: u32, rgba: &[u8]);

    fn delete_texture(&mut self, texture: Self::Texture);

    /// Match the viewport to the drawing surface.
    fn resize_surface(&mut self, size: SurfaceSize);

    fn clear(&mut self, color: [f32; 4]);

    fn use_program(&mut self, program: &Self::Program);

    fn bind_texture(&mut self, unit: u32, texture: &Self::Texture);

    fn set_uniform(&mut self, location: &Self::UniformLocation, value: UniformValue);

    /// Draw the full-viewport geometry, feeding positions through attribute `position`.
    fn draw_fullscreen(&mut self, position: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_size_scales_by_dpr() {
        assert_eq!(
            SurfaceSize::from_logical(800.0, 600.0, 2.0),
            SurfaceSize::new(1600, 1200)
        );
        assert_eq!(
            SurfaceSize::from_logical(100.5, 50.5, 1.5),
            SurfaceSize::new(150, 75)
        );
    }

    #[test]
    fn dpr_below_one_is_clamped() {
        assert_eq!(
            SurfaceSize::from_logical(640.0, 480.0, 0.5),
            SurfaceSize::new(640, 480)
        );
        assert_eq!(
            SurfaceSize::from_logical(640.0, 480.0, f64::NAN),
            SurfaceSize::new(640, 480)
        );
    }
}
