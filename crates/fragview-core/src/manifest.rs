//! Shader manifest: the ordered list of selectable fragment shaders.

use serde::Deserialize;

use crate::error::PlayerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    fragments: Vec<String>,
}

#[derive(Deserialize)]
struct JsonRoot {
    #[serde(default)]
    fragments: Option<Vec<String>>,
}

impl Manifest {
    /// Builds a manifest from an explicit list. Empty lists are rejected.
    pub fn new(fragments: Vec<String>) -> Result<Self, PlayerError> {
        if fragments.is_empty() {
            return Err(PlayerError::InvalidManifest(
                "manifest has no fragments[]".into(),
            ));
        }
        Ok(Self { fragments })
    }

    pub fn from_json_str(text: &str) -> Result<Self, PlayerError> {
        let root: JsonRoot = serde_json::from_str(text).map_err(PlayerError::ManifestParse)?;
        Self::new(root.fragments.unwrap_or_default())
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.iter().any(|f| f == name)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// `preferred` when listed, else the first entry.
    pub fn initial_selection<'a>(&'a self, preferred: &'a str) -> &'a str {
        if self.contains(preferred) {
            preferred
        } else {
            &self.fragments[0]
        }
    }

    /// Entry `step` places away from `current`, wrapping at both ends.
    ///
    /// Unknown `current` behaves as if the first entry were selected.
    pub fn cycle(&self, current: &str, step: isize) -> &str {
        let len = self.fragments.len() as isize;
        let at = self
            .fragments
            .iter()
            .position(|f| f == current)
            .unwrap_or(0) as isize;
        let idx = (at + step).rem_euclid(len) as usize;
        &self.fragments[idx]
    }
}
