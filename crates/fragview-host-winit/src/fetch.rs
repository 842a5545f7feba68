//! Filesystem [`Fetcher`]: web-style candidate paths resolved under a root directory.

use std::path::PathBuf;

use fragview_core::FetchError;
use fragview_runtime::Fetcher;

#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `/shaders/a.frag` and `./shaders/a.frag` both map to `<root>/shaders/a.frag`.
    pub fn resolve(&self, location: &str) -> PathBuf {
        let relative = location
            .strip_prefix("./")
            .or_else(|| location.strip_prefix('/'))
            .unwrap_or(location);
        self.root.join(relative)
    }
}

impl Fetcher for FsFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.resolve(location);
        tracing::trace!(path = %path.display(), "read");
        Ok(std::fs::read(path)?)
    }
}
