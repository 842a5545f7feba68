//! Resource loading: ordered candidate locations, first success wins.
//!
//! There is no retry beyond the candidate list and nothing is cached between calls.

use fragview_core::{FetchError, Manifest, PlayerError};

/// Fetches raw bytes from one location (URL, path, ...).
///
/// Hosts implement this over `fetch()` in the browser or the filesystem natively.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError>;
}

/// Tries `candidates` in order; the first one that loads and passes `accept` wins.
///
/// A rejected body counts as a failed candidate and the next one is tried.
async fn first_accepted<F, T>(
    fetcher: &F,
    candidates: &[String],
    accept: impl Fn(Vec<u8>) -> Result<T, FetchError>,
) -> Result<T, PlayerError>
where
    F: Fetcher + ?Sized,
{
    let mut last = FetchError::NoCandidates;
    for candidate in candidates {
        let loaded = fetcher.fetch(candidate).await.and_then(|bytes| {
            let len = bytes.len();
            accept(bytes).map(|value| (value, len))
        });
        match loaded {
            Ok((value, len)) => {
                tracing::debug!(location = %candidate, len, "loaded");
                return Ok(value);
            }
            Err(e) => {
                tracing::debug!(location = %candidate, error = %e, "candidate failed");
                last = e;
            }
        }
    }
    Err(PlayerError::ResourceNotFound {
        candidates: candidates.to_vec(),
        last,
    })
}

/// Returns the first candidate that loads, or `ResourceNotFound` with the last failure.
pub async fn fetch_bytes_with_fallback<F: Fetcher + ?Sized>(
    fetcher: &F,
    candidates: &[String],
) -> Result<Vec<u8>, PlayerError> {
    first_accepted(fetcher, candidates, Ok).await
}

/// Like [`fetch_bytes_with_fallback`] but requires a UTF-8 body.
///
/// A candidate whose body is not UTF-8 counts as failed and the next one is tried.
pub async fn fetch_text_with_fallback<F: Fetcher + ?Sized>(
    fetcher: &F,
    candidates: &[String],
) -> Result<String, PlayerError> {
    first_accepted(fetcher, candidates, |bytes| {
        String::from_utf8(bytes).map_err(|_| FetchError::Utf8)
    })
    .await
}

pub async fn fetch_manifest<F: Fetcher + ?Sized>(
    fetcher: &F,
    candidates: &[String],
) -> Result<Manifest, PlayerError> {
    let text = fetch_text_with_fallback(fetcher, candidates).await?;
    Manifest::from_json_str(&text)
}

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Candidate locations, tried in order.
    Locations(Vec<String>),
    /// An already-read file (upload, drag-and-drop).
    Blob(Vec<u8>),
}

/// Tightly packed RGBA8 pixels, row 0 at the top.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Non-empty and exactly `width * height * 4` bytes.
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.width == 0 || self.height == 0 {
            return Err(PlayerError::ImageDecode(format!(
                "image has no pixels ({}×{})",
                self.width, self.height
            )));
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba.len() != expected {
            return Err(PlayerError::ImageDecode(format!(
                "expected {expected} bytes for {}×{} rgba, got {}",
                self.width,
                self.height,
                self.rgba.len()
            )));
        }
        Ok(())
    }
}

/// Decodes an encoded image (png, jpeg, bmp, gif) into RGBA8.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DecodedImage, PlayerError> {
    let img = image::load_from_memory(bytes).map_err(|e| PlayerError::ImageDecode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let decoded = DecodedImage::new(width, height, rgba.into_raw());
    decoded.validate()?;
    Ok(decoded)
}

pub async fn decode_image<F: Fetcher + ?Sized>(
    fetcher: &F,
    source: ImageSource,
) -> Result<DecodedImage, PlayerError> {
    match source {
        // A body that is not a decodable image (an HTML error page served with 200, say)
        // falls through to the next candidate.
        ImageSource::Locations(candidates) => {
            first_accepted(fetcher, &candidates, |bytes| {
                decode_image_bytes(&bytes).map_err(|e| FetchError::Undecodable(e.to_string()))
            })
            .await
        }
        ImageSource::Blob(bytes) => decode_image_bytes(&bytes),
    }
}
