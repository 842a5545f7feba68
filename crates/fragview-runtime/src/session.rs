//! The one place that owns GPU-side player state.
//!
//! Replacement is always build-then-publish: the new program or texture is fully created
//! before the old one is released, so a failed build leaves the session untouched.

use fragview_core::{PlayerConfig, PlayerError};

use crate::gpu::GpuBackend;
use crate::loader::DecodedImage;
use crate::program::{ProgramBuilder, ShaderProgram};
use crate::render_loop::RenderPhase;
use crate::texture::{SourceTexture, TextureKind};

/// Resources that can be reloaded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Shader,
    Image,
}

/// Captured when a load starts; checked when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: RequestKind,
    seq: u64,
}

impl RequestToken {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Monotonic per-resource request counters. Only the latest token for a kind is current.
#[derive(Debug, Default, Clone)]
pub struct RequestTokens {
    shader: u64,
    image: u64,
}

impl RequestTokens {
    pub fn issue(&mut self, kind: RequestKind) -> RequestToken {
        let counter = self.counter_mut(kind);
        *counter += 1;
        RequestToken {
            kind,
            seq: *counter,
        }
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        let latest = match token.kind {
            RequestKind::Shader => self.shader,
            RequestKind::Image => self.image,
        };
        token.seq == latest
    }

    fn counter_mut(&mut self, kind: RequestKind) -> &mut u64 {
        match kind {
            RequestKind::Shader => &mut self.shader,
            RequestKind::Image => &mut self.image,
        }
    }
}

pub struct RenderSession<B: GpuBackend> {
    backend: B,
    builder: ProgramBuilder,
    program: Option<ShaderProgram<B>>,
    texture: Option<SourceTexture<B>>,
    tokens: RequestTokens,
    clear_color: [f32; 4],
}

impl<B: GpuBackend> std::fmt::Debug for RenderSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("builder", &self.builder)
            .field("program", &self.program)
            .field("texture", &self.texture)
            .field("tokens", &self.tokens)
            .field("clear_color", &self.clear_color)
            .finish_non_exhaustive()
    }
}

impl<B: GpuBackend> RenderSession<B> {
    /// Takes ownership of `backend` and binds the placeholder texture.
    pub fn new(mut backend: B, config: &PlayerConfig) -> Result<Self, PlayerError> {
        let placeholder = SourceTexture::placeholder(&mut backend)?;
        Ok(Self {
            backend,
            builder: ProgramBuilder::new(config.version_check.clone()),
            program: None,
            texture: Some(placeholder),
            tokens: RequestTokens::default(),
            clear_color: config.clear_color,
        })
    }

    pub fn phase(&self) -> RenderPhase {
        if self.program.is_some() {
            RenderPhase::Active
        } else {
            RenderPhase::Idle
        }
    }

    /// Build a program from `fragment_source` and make it active.
    ///
    /// On failure the previously active program (if any) stays active.
    pub fn install_program(
        &mut self,
        fragment_source: &str,
        origin: &str,
    ) -> Result<(), PlayerError> {
        let program = self.builder.build(&mut self.backend, fragment_source, origin)?;
        if let Some(old) = self.program.replace(program) {
            tracing::info!(from = old.origin(), to = origin, "shader swapped");
            old.release(&mut self.backend);
        } else {
            tracing::info!(shader = origin, "first program active");
        }
        Ok(())
    }

    /// Upload `image` and make it the source texture. Returns its size.
    ///
    /// On failure the previous texture stays bound.
    pub fn install_image(&mut self, image: &DecodedImage) -> Result<(u32, u32), PlayerError> {
        let texture = SourceTexture::upload(&mut self.backend, image)?;
        let size = texture.size();
        if let Some(old) = self.texture.replace(texture) {
            old.release(&mut self.backend);
        }
        tracing::info!(width = size.0, height = size.1, "source image replaced");
        Ok(size)
    }

    pub fn issue(&mut self, kind: RequestKind) -> RequestToken {
        self.tokens.issue(kind)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.tokens.is_current(token)
    }

    pub fn program(&self) -> Option<&ShaderProgram<B>> {
        self.program.as_ref()
    }

    pub fn texture(&self) -> Option<&SourceTexture<B>> {
        self.texture.as_ref()
    }

    pub fn texture_kind(&self) -> Option<TextureKind> {
        self.texture.as_ref().map(SourceTexture::kind)
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Split borrow used by the render loop.
    pub(crate) fn parts(
        &mut self,
    ) -> (
        &mut B,
        Option<&ShaderProgram<B>>,
        Option<&SourceTexture<B>>,
    ) {
        (&mut self.backend, self.program.as_ref(), self.texture.as_ref())
    }

    /// Delete the active program and texture. The session renders Idle afterwards.
    pub fn release_all(&mut self) {
        if let Some(program) = self.program.take() {
            program.release(&mut self.backend);
        }
        if let Some(texture) = self.texture.take() {
            texture.release(&mut self.backend);
        }
    }
}
