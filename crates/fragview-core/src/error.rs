use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which programmable stage a compile error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Player-level errors used across fragview crates.
///
/// Contract rule: this type lives in `fragview-core` and is re-exported by the runtimes.
#[derive(Debug, Error)]
pub enum PlayerError {
    // ---- Loading ----
    #[error("no candidate location could be loaded (tried {}): {last}", candidates.join(", "))]
    ResourceNotFound {
        candidates: Vec<String>,
        last: FetchError,
    },

    #[error("manifest is not valid json: {0}")]
    ManifestParse(#[source] serde_json::Error),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("image decode error: {0}")]
    ImageDecode(String),

    // ---- Program building ----
    #[error("{stage} shader compile error")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("program link error")]
    ProgramLink { log: String },

    #[error("fragment source must start with `{expected}` (found `{found}`)")]
    VersionMarker { expected: String, found: String },

    // ---- Backend ----
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("backend object creation failed: {0}")]
    GlCreate(String),

    // ---- Config ----
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config at {}: {msg}", path.display())]
    InvalidConfig { path: PathBuf, msg: String },
}

impl PlayerError {
    /// The GL info log attached to compile/link failures.
    pub fn diagnostic_log(&self) -> Option<&str> {
        match self {
            PlayerError::ShaderCompile { log, .. } | PlayerError::ProgramLink { log } => {
                Some(log.as_str())
            }
            _ => None,
        }
    }
}

/// A single failed attempt at one candidate location.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{status} {status_text}")]
    Status { status: u16, status_text: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Transport(String),

    #[error("body is not valid utf-8")]
    Utf8,

    #[error("body is not a decodable image: {0}")]
    Undecodable(String),

    #[error("no candidate locations given")]
    NoCandidates,
}
