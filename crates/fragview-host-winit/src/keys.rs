//! Keyboard controls.

use fragview_runtime::{Fetcher, GpuBackend, SessionController, StatusSink};
use winit::event::VirtualKeyCode;

/// Strength change per Up/Down press.
pub const STRENGTH_STEP: f32 = 0.05;

/// Colors cycled by `T`.
pub const TINT_PALETTE: [&str; 6] = [
    "#ffffff", "#ff0000", "#00ff00", "#0000ff", "#ffcc00", "#00ffff",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PrevShader,
    NextShader,
    StrengthUp,
    StrengthDown,
    CycleTint,
    Reset,
}

pub fn action_for(key: VirtualKeyCode) -> Option<Action> {
    Some(match key {
        VirtualKeyCode::Left => Action::PrevShader,
        VirtualKeyCode::Right => Action::NextShader,
        VirtualKeyCode::Up => Action::StrengthUp,
        VirtualKeyCode::Down => Action::StrengthDown,
        VirtualKeyCode::T => Action::CycleTint,
        VirtualKeyCode::R => Action::Reset,
        _ => return None,
    })
}

/// Palette entry after `current`; colors outside the palette restart at its first entry.
pub fn next_tint(current: &str) -> &'static str {
    let at = TINT_PALETTE
        .iter()
        .position(|c| c.eq_ignore_ascii_case(current));
    match at {
        Some(i) => TINT_PALETTE[(i + 1) % TINT_PALETTE.len()],
        None => TINT_PALETTE[0],
    }
}

/// Shader changes load synchronously; the filesystem fetcher never suspends.
pub fn apply<B: GpuBackend, F: Fetcher, S: StatusSink>(
    controller: &SessionController<B, F, S>,
    action: Action,
) {
    match action {
        Action::PrevShader => {
            pollster::block_on(controller.cycle_shader(-1));
        }
        Action::NextShader => {
            pollster::block_on(controller.cycle_shader(1));
        }
        Action::StrengthUp => controller.nudge_strength(STRENGTH_STEP),
        Action::StrengthDown => controller.nudge_strength(-STRENGTH_STEP),
        Action::CycleTint => {
            let next = next_tint(controller.controls().tint_hex());
            controller.set_tint_hex(next);
        }
        Action::Reset => controller.reset_controls(),
    }
    let controls = controller.controls();
    tracing::info!(
        shader = controller.selected_shader().as_deref().unwrap_or("-"),
        strength = %controls.strength_readout(),
        tint = %controls.tint_readout(),
        "{action:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragview_core::PlayerConfig;
    use fragview_runtime::headless::{MemoryFetcher, RecordingBackend, StatusLog};

    fn controller() -> SessionController<RecordingBackend, MemoryFetcher, StatusLog> {
        let fetcher = MemoryFetcher::new()
            .with_text("/shaders/manifest.json", r#"{"fragments":["a.frag","b.frag"]}"#)
            .with_text("/shaders/a.frag", "#version 300 es\nvoid main() {}\n")
            .with_text("/shaders/b.frag", "#version 300 es\nvoid main() {}\n");
        SessionController::new(
            RecordingBackend::new(),
            fetcher,
            StatusLog::new(),
            PlayerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn arrow_and_letter_keys_map() {
        assert_eq!(action_for(VirtualKeyCode::Left), Some(Action::PrevShader));
        assert_eq!(action_for(VirtualKeyCode::T), Some(Action::CycleTint));
        assert_eq!(action_for(VirtualKeyCode::Space), None);
    }

    #[test]
    fn tint_palette_wraps() {
        assert_eq!(next_tint("#FFFFFF"), "#ff0000");
        assert_eq!(next_tint("#00ffff"), "#ffffff");
        assert_eq!(next_tint("#123456"), "#ffffff");
    }

    #[test]
    fn actions_drive_controller() {
        let c = controller();
        pollster::block_on(c.start()).unwrap();
        assert_eq!(c.active_shader().as_deref(), Some("a.frag"));

        apply(&c, Action::NextShader);
        assert_eq!(c.active_shader().as_deref(), Some("b.frag"));
        apply(&c, Action::NextShader);
        assert_eq!(c.active_shader().as_deref(), Some("a.frag"));

        apply(&c, Action::StrengthUp);
        apply(&c, Action::StrengthUp);
        assert!((c.controls().strength() - 0.1).abs() < 1e-6);

        apply(&c, Action::CycleTint);
        assert_eq!(c.controls().tint_hex(), "#ff0000");

        apply(&c, Action::Reset);
        assert_eq!(c.controls().tint_hex(), "#ffffff");
        assert_eq!(c.controls().strength(), 0.0);
    }
}
