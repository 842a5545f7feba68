//! Full-viewport geometry: one oversized triangle or a two-triangle strip.

use fragview_core::{Geometry, PlayerError};
use glow::HasContext;

/// Covers clip space with a single triangle; the overhang is clipped.
pub const TRIANGLE_VERTICES: [f32; 6] = [-1.0, -1.0, 3.0, -1.0, -1.0, 3.0];

/// Triangle-strip quad.
pub const QUAD_VERTICES: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

/// Vertex positions (x, y pairs) for `geometry`.
pub fn vertices(geometry: Geometry) -> &'static [f32] {
    match geometry {
        Geometry::Triangle => &TRIANGLE_VERTICES,
        Geometry::Quad => &QUAD_VERTICES,
    }
}

pub fn draw_mode(geometry: Geometry) -> u32 {
    match geometry {
        Geometry::Triangle => glow::TRIANGLES,
        Geometry::Quad => glow::TRIANGLE_STRIP,
    }
}

#[derive(Debug)]
pub struct FullscreenGeometry {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    mode: u32,
    count: i32,
}

impl FullscreenGeometry {
    pub unsafe fn new(gl: &glow::Context, geometry: Geometry) -> Result<Self, PlayerError> {
        let verts = vertices(geometry);

        let vao = gl
            .create_vertex_array()
            .map_err(|e| PlayerError::GlCreate(format!("create_vertex_array: {e}")))?;
        let vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                gl.delete_vertex_array(vao);
                return Err(PlayerError::GlCreate(format!("create_buffer: {e}")));
            }
        };

        gl.bind_vertex_array(Some(vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(verts),
            glow::STATIC_DRAW,
        );
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.bind_vertex_array(None);

        Ok(Self {
            vao,
            vbo,
            mode: draw_mode(geometry),
            count: (verts.len() / 2) as i32,
        })
    }

    /// Draw with positions fed through attribute `position`.
    ///
    /// The attribute pointer is set on every draw since the location belongs to whichever
    /// program is current.
    pub unsafe fn draw(&self, gl: &glow::Context, position: u32) {
        gl.bind_vertex_array(Some(self.vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        gl.enable_vertex_attrib_array(position);
        gl.vertex_attrib_pointer_f32(position, 2, glow::FLOAT, false, 2 * 4, 0);
        gl.draw_arrays(self.mode, 0, self.count);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.bind_vertex_array(None);
    }

    pub unsafe fn destroy(&mut self, gl: &glow::Context) {
        gl.delete_vertex_array(self.vao);
        gl.delete_buffer(self.vbo);
    }
}
