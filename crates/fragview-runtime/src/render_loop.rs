//! Per-frame rendering.
//!
//! The host owns scheduling (`requestAnimationFrame`, redraw events); each call to
//! [`RenderLoop::tick`] renders exactly one frame and never fails.

use fragview_core::Rgb;

use crate::gpu::{GpuBackend, SurfaceSize, UniformValue};
use crate::program::{UniformSlot, SOURCE_TEXTURE_UNIT};
use crate::session::RenderSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// No program yet: clear only.
    Idle,
    /// A program is active: clear and draw.
    Active,
}

/// Values derived from the controls for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub tint: Rgb,
    pub strength: f32,
    pub surface: SurfaceSize,
    /// Seconds since the player started.
    pub time: f32,
}

impl RenderState {
    fn value_for(&self, slot: UniformSlot) -> UniformValue {
        match slot {
            UniformSlot::Texture => UniformValue::Int(SOURCE_TEXTURE_UNIT as i32),
            UniformSlot::Tint => UniformValue::Vec3(self.tint.0),
            UniformSlot::Strength => UniformValue::Float(self.strength),
            UniformSlot::Resolution => UniformValue::Vec2([
                self.surface.width as f32,
                self.surface.height as f32,
            ]),
            UniformSlot::Time => UniformValue::Float(self.time),
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Cleared,
    Drawn,
}

#[derive(Debug, Default, Clone)]
pub struct RenderLoop {
    frames: u64,
    draws: u64,
    went_active_at: Option<u64>,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one frame against whatever the session currently holds.
    pub fn tick<B: GpuBackend>(
        &mut self,
        session: &mut RenderSession<B>,
        state: &RenderState,
    ) -> FrameOutcome {
        self.frames += 1;
        let outcome = render_frame(session, state);
        if outcome == FrameOutcome::Drawn {
            self.draws += 1;
            if self.went_active_at.is_none() {
                self.went_active_at = Some(self.frames);
                tracing::info!(frame = self.frames, "render loop active");
            }
        }
        outcome
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn phase(&self) -> RenderPhase {
        if self.went_active_at.is_some() {
            RenderPhase::Active
        } else {
            RenderPhase::Idle
        }
    }
}

/// Resize, clear and, when a program is active, bind and draw once.
pub fn render_frame<B: GpuBackend>(
    session: &mut RenderSession<B>,
    state: &RenderState,
) -> FrameOutcome {
    let clear_color = session.clear_color();
    let (backend, program, texture) = session.parts();

    backend.resize_surface(state.surface);
    backend.clear(clear_color);

    let Some(program) = program else {
        return FrameOutcome::Cleared;
    };

    backend.use_program(program.program());
    if let Some(texture) = texture {
        backend.bind_texture(SOURCE_TEXTURE_UNIT, texture.texture());
    }
    for (slot, location) in program.uniforms().iter() {
        backend.set_uniform(location, state.value_for(slot));
    }
    backend.draw_fullscreen(program.position_attrib());
    FrameOutcome::Drawn
}
