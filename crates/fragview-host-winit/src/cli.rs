use std::path::PathBuf;

use clap::Parser;
use fragview_core::{PlayerConfig, PlayerError};

#[derive(Parser, Debug)]
#[command(name = "fragview", version, about = "Preview a fragment shader over an image")]
pub struct Cli {
    /// Directory that candidate paths (`/shaders/...`, `./test.png`) resolve against.
    #[arg(long, value_name = "DIR", default_value = ".", env = "FRAGVIEW_ROOT")]
    pub root: PathBuf,

    /// JSON player configuration; every field is optional.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Shader to select at startup, overriding the configured preference.
    #[arg(long, value_name = "NAME")]
    pub shader: Option<String>,

    /// Image to upload once the player has started.
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    #[arg(long, default_value_t = 960)]
    pub width: u32,

    #[arg(long, default_value_t = 540)]
    pub height: u32,
}

impl Cli {
    pub fn player_config(&self) -> Result<PlayerConfig, PlayerError> {
        let mut config = match &self.config {
            Some(path) => PlayerConfig::from_json_path(path)?,
            None => PlayerConfig::default(),
        };
        if let Some(shader) = &self.shader {
            config.preferred_shader = shader.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["fragview"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!((cli.width, cli.height), (960, 540));
        assert_eq!(cli.player_config().unwrap(), PlayerConfig::default());
    }

    #[test]
    fn shader_flag_overrides_preference() {
        let cli = Cli::try_parse_from(["fragview", "--shader", "wave.frag"]).unwrap();
        assert_eq!(cli.player_config().unwrap().preferred_shader, "wave.frag");
    }

    #[test]
    fn config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"geometry":"quad","preferred_shader":"a.frag"}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from(["fragview", "--config", &path]).unwrap();
        let config = cli.player_config().unwrap();
        assert_eq!(config.geometry, fragview_core::Geometry::Quad);
        assert_eq!(config.preferred_shader, "a.frag");
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let cli = Cli::try_parse_from(["fragview", "--config", "/nonexistent/fragview.json"]).unwrap();
        assert!(matches!(cli.player_config(), Err(PlayerError::Io { .. })));
    }
}
