#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

//! fragview core vocabulary: errors, configuration, manifest and control values.
//!
//! No GPU handles and no I/O policy beyond reading a config file.

pub mod config;
pub mod controls;
pub mod error;
pub mod manifest;

pub use config::{load_typed_json, Geometry, PlayerConfig, VersionCheck};
pub use controls::{hex_to_rgb01, parse_hex_color, parse_strength, ControlDefaults, Controls, Rgb};
pub use error::{FetchError, PlayerError, ShaderStage};
pub use manifest::Manifest;
