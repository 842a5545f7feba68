//! Native host (policy layer): window, filesystem loading and keyboard controls.
//!
//! Kept out of `fragview-runtime` so the pipeline stays embeddable.

pub mod cli;
pub mod fetch;
pub mod keys;
pub mod status;
pub mod window;

pub use cli::Cli;
pub use fetch::FsFetcher;
pub use status::TitleStatus;

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set, `info` otherwise.
pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
