use std::rc::Rc;

use fragview_core::PlayerError;
use fragview_runtime::{format_error, StatusSink};
use winit::window::Window;

pub const APP_NAME: &str = "fragview";

pub fn title_for(status: &str) -> String {
    // Window titles are single-line; keep the first line of multi-line GL logs.
    let first = status.lines().next().unwrap_or("");
    format!("{APP_NAME} | {first}")
}

/// Mirrors the status line into the window title and the log.
#[derive(Debug)]
pub struct TitleStatus {
    window: Rc<Window>,
}

impl TitleStatus {
    pub fn new(window: Rc<Window>) -> Self {
        Self { window }
    }
}

impl StatusSink for TitleStatus {
    fn info(&mut self, text: &str) {
        tracing::info!("{text}");
        self.window.set_title(&title_for(text));
    }

    fn error(&mut self, context: &str, err: &PlayerError) {
        let line = format_error(context, err);
        tracing::error!("{line}");
        self.window.set_title(&title_for(&line));
    }
}
