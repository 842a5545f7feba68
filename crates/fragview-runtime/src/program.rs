//! Program builder: fixed vertex stage + swappable fragment stage.

use fragview_core::{PlayerError, VersionCheck};

use crate::gpu::{GpuBackend, UniformValue};

/// Fixed vertex stage shared by every fragment shader.
///
/// Positions arrive in normalized device coordinates; `vUV` maps them onto `[0, 1]`.
pub const VERTEX_SOURCE: &str = r#"#version 300 es
in vec2 aPos;
out vec2 vUV;
void main() {
  vUV = aPos * 0.5 + 0.5;
  gl_Position = vec4(aPos, 0.0, 1.0);
}
"#;

/// Name of the single position attribute in [`VERTEX_SOURCE`].
pub const POSITION_ATTRIB: &str = "aPos";

/// Texture unit the source image is bound to.
pub const SOURCE_TEXTURE_UNIT: u32 = 0;

/// The uniforms the pipeline knows how to feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    Texture,
    Tint,
    Strength,
    Resolution,
    /// Elapsed seconds.
    Time,
}

impl UniformSlot {
    pub const ALL: [UniformSlot; 5] = [
        UniformSlot::Texture,
        UniformSlot::Tint,
        UniformSlot::Strength,
        UniformSlot::Resolution,
        UniformSlot::Time,
    ];

    /// Accepted declaration names, in lookup order.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            UniformSlot::Texture => &["uTexture", "texture"],
            UniformSlot::Tint => &["uTint", "tint"],
            UniformSlot::Strength => &["uStrength", "strength"],
            UniformSlot::Resolution => &["uResolution", "resolution"],
            UniformSlot::Time => &["uTime", "time"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One optional handle per [`UniformSlot`].
#[derive(Debug, Clone)]
pub struct UniformHandles<L> {
    slots: [Option<L>; 5],
}

impl<L> UniformHandles<L> {
    pub fn get(&self, slot: UniformSlot) -> Option<&L> {
        self.slots[slot.index()].as_ref()
    }

    pub fn is_resolved(&self, slot: UniformSlot) -> bool {
        self.get(slot).is_some()
    }

    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Resolved slots with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (UniformSlot, &L)> {
        UniformSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|loc| (slot, loc)))
    }
}

impl<L> Default for UniformHandles<L> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None, None],
        }
    }
}

/// A linked program with its resolved bindings.
pub struct ShaderProgram<B: GpuBackend> {
    program: B::Program,
    position: u32,
    uniforms: UniformHandles<B::UniformLocation>,
    origin: String,
}

impl<B: GpuBackend> std::fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("position", &self.position)
            .field("uniforms", &self.uniforms)
            .field("origin", &self.origin)
            .finish()
    }
}

impl<B: GpuBackend> ShaderProgram<B> {
    pub fn program(&self) -> &B::Program {
        &self.program
    }

    pub fn position_attrib(&self) -> u32 {
        self.position
    }

    pub fn uniforms(&self) -> &UniformHandles<B::UniformLocation> {
        &self.uniforms
    }

    /// Human-friendly origin (usually the shader filename).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn release(self, backend: &mut B) {
        backend.delete_program(self.program);
    }
}

#[derive(Debug, Clone)]
pub struct ProgramBuilder {
    vertex_source: String,
    version_check: VersionCheck,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new(VersionCheck::default())
    }
}

impl ProgramBuilder {
    pub fn new(version_check: VersionCheck) -> Self {
        Self {
            vertex_source: VERTEX_SOURCE.to_string(),
            version_check,
        }
    }

    /// Compile, link and resolve bindings for `fragment_source`.
    ///
    /// Nothing is left allocated on the backend when this fails.
    pub fn build<B: GpuBackend>(
        &self,
        backend: &mut B,
        fragment_source: &str,
        origin: &str,
    ) -> Result<ShaderProgram<B>, PlayerError> {
        self.check_version(fragment_source)?;

        let program = backend.compile_program(&self.vertex_source, fragment_source)?;

        let position = backend
            .attrib_location(&program, POSITION_ATTRIB)
            .unwrap_or_else(|| {
                tracing::warn!(origin, "`{POSITION_ATTRIB}` not active, assuming location 0");
                0
            });

        let mut uniforms = UniformHandles::default();
        for slot in UniformSlot::ALL {
            uniforms.slots[slot.index()] = slot
                .names()
                .iter()
                .find_map(|name| backend.uniform_location(&program, name));
        }

        if let Some(sampler) = uniforms.get(UniformSlot::Texture) {
            backend.use_program(&program);
            backend.set_uniform(sampler, UniformValue::Int(SOURCE_TEXTURE_UNIT as i32));
        }

        tracing::debug!(
            origin,
            resolved = uniforms.resolved_count(),
            "program linked"
        );

        Ok(ShaderProgram {
            program,
            position,
            uniforms,
            origin: origin.to_string(),
        })
    }

    fn check_version(&self, fragment_source: &str) -> Result<(), PlayerError> {
        if !self.version_check.enabled {
            return Ok(());
        }
        let first = fragment_source
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("");
        if first.starts_with(self.version_check.marker.trim()) {
            Ok(())
        } else {
            Err(PlayerError::VersionMarker {
                expected: self.version_check.marker.clone(),
                found: first.to_string(),
            })
        }
    }
}
