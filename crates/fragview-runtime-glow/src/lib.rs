//! fragview GL backend (glow: WebGL2 in the browser, GLES 3.0 natively).
//
// Only GL object management lives here. Windowing, file IO and DOM wiring belong to the hosts.
#![allow(clippy::missing_safety_doc)]
#![deny(missing_debug_implementations)]

use glow::HasContext;

use fragview_core::{Geometry, PlayerError};
use fragview_runtime::{GpuBackend, SurfaceSize, UniformValue};

pub mod geometry;
pub mod program;

pub use geometry::FullscreenGeometry;
pub use program::compile_program;

/// [`GpuBackend`] over a `glow::Context` it owns.
pub struct GlowBackend {
    gl: glow::Context,
    geometry: FullscreenGeometry,
}

impl std::fmt::Debug for GlowBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowBackend")
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl GlowBackend {
    /// The context must be current on the calling thread for as long as the backend lives.
    pub fn new(gl: glow::Context, geometry: Geometry) -> Result<Self, PlayerError> {
        let geometry = unsafe {
            let version = gl.get_parameter_string(glow::VERSION);
            tracing::info!(gl_version = %version, ?geometry, "gl backend ready");
            FullscreenGeometry::new(&gl, geometry)?
        };
        Ok(Self { gl, geometry })
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

impl Drop for GlowBackend {
    fn drop(&mut self) {
        unsafe { self.geometry.destroy(&self.gl) };
    }
}

impl GpuBackend for GlowBackend {
    type Program = glow::Program;
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<glow::Program, PlayerError> {
        unsafe { compile_program(&self.gl, vertex_source, fragment_source) }
    }

    fn delete_program(&mut self, program: glow::Program) {
        unsafe { self.gl.delete_program(program) };
    }

    fn attrib_location(&mut self, program: &glow::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(*program, name) }
    }

    fn uniform_location(
        &mut self,
        program: &glow::Program,
        name: &str,
    ) -> Option<glow::UniformLocation> {
        unsafe { self.gl.get_uniform_location(*program, name) }
    }

    fn create_texture(&mut self) -> Result<glow::Texture, PlayerError> {
        let gl = &self.gl;
        unsafe {
            let tex = gl
                .create_texture()
                .map_err(|e| PlayerError::GlCreate(format!("create_texture: {e}")))?;
            gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);
            Ok(tex)
        }
    }

    fn upload_texture(&mut self, texture: &glow::Texture, width: u32, height: u32, rgba: &[u8]) {
        let gl = &self.gl;
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(rgba),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn delete_texture(&mut self, texture: glow::Texture) {
        unsafe { self.gl.delete_texture(texture) };
    }

    fn resize_surface(&mut self, size: SurfaceSize) {
        unsafe {
            self.gl
                .viewport(0, 0, size.width as i32, size.height as i32)
        };
    }

    fn clear(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn use_program(&mut self, program: &glow::Program) {
        unsafe { self.gl.use_program(Some(*program)) };
    }

    fn bind_texture(&mut self, unit: u32, texture: &glow::Texture) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
        }
    }

    fn set_uniform(&mut self, location: &glow::UniformLocation, value: UniformValue) {
        let gl = &self.gl;
        let loc = Some(location);
        unsafe {
            match value {
                UniformValue::Int(v) => gl.uniform_1_i32(loc, v),
                UniformValue::Float(v) => gl.uniform_1_f32(loc, v),
                UniformValue::Vec2([x, y]) => gl.uniform_2_f32(loc, x, y),
                UniformValue::Vec3([x, y, z]) => gl.uniform_3_f32(loc, x, y, z),
            }
        }
    }

    fn draw_fullscreen(&mut self, position: u32) {
        unsafe { self.geometry.draw(&self.gl, position) };
    }
}
