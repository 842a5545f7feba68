//! The single source-image texture.

use fragview_core::PlayerError;

use crate::gpu::GpuBackend;
use crate::loader::DecodedImage;

/// Pixel shown until the first image arrives: opaque black.
pub const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Placeholder,
    Image,
}

/// A texture holding either the placeholder or a decoded image.
pub struct SourceTexture<B: GpuBackend> {
    texture: B::Texture,
    width: u32,
    height: u32,
    kind: TextureKind,
}

impl<B: GpuBackend> std::fmt::Debug for SourceTexture<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTexture")
            .field("texture", &self.texture)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("kind", &self.kind)
            .finish()
    }
}

impl<B: GpuBackend> SourceTexture<B> {
    /// A 1×1 [`PLACEHOLDER_PIXEL`] texture.
    pub fn placeholder(backend: &mut B) -> Result<Self, PlayerError> {
        let texture = backend.create_texture()?;
        backend.upload_texture(&texture, 1, 1, &PLACEHOLDER_PIXEL);
        Ok(Self {
            texture,
            width: 1,
            height: 1,
            kind: TextureKind::Placeholder,
        })
    }

    /// Upload `image` into a fresh texture, flipped so row 0 of the image is sampled at `v = 1`.
    ///
    /// The image is validated before any GPU object is created.
    pub fn upload(backend: &mut B, image: &DecodedImage) -> Result<Self, PlayerError> {
        image.validate()?;
        let flipped = flip_rows(image.rgba(), image.width(), image.height());
        let texture = backend.create_texture()?;
        backend.upload_texture(&texture, image.width(), image.height(), &flipped);
        Ok(Self {
            texture,
            width: image.width(),
            height: image.height(),
            kind: TextureKind::Image,
        })
    }

    pub fn texture(&self) -> &B::Texture {
        &self.texture
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn release(self, backend: &mut B) {
        backend.delete_texture(self.texture);
    }
}

/// Reverses the row order of a tightly packed RGBA8 buffer.
pub fn flip_rows(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    let stride = width as usize * 4;
    if stride == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(rgba.len());
    for row in rgba.chunks_exact(stride).take(height as usize).rev() {
        out.extend_from_slice(row);
    }
    out
}
