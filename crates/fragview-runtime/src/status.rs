//! Human-readable status reporting.

use fragview_core::PlayerError;

/// Where status and error text ends up (DOM element, window title, log, ...).
pub trait StatusSink {
    fn info(&mut self, text: &str);

    /// `context` names the operation that failed (e.g. "Failed to use shader wave.frag").
    fn error(&mut self, context: &str, err: &PlayerError);

    /// The manifest's shader list, published as soon as it is loaded and before the
    /// initial shader is built.
    fn shader_list(&mut self, _names: &[String], _selected: &str) {}
}

/// `⚠ {context} — {err}`, followed by the GL info log on the next line when there is one.
pub fn format_error(context: &str, err: &PlayerError) -> String {
    let mut line = format!("⚠ {context} — {err}");
    if let Some(log) = err.diagnostic_log().map(str::trim_end).filter(|l| !l.is_empty()) {
        line.push('\n');
        line.push_str(log);
    }
    line
}

/// `{w}×{h}`
pub fn format_dimensions(width: u32, height: u32) -> String {
    format!("{width}×{height}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragview_core::ShaderStage;

    #[test]
    fn error_text_has_context_and_log() {
        let err = PlayerError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "ERROR: 0:4: syntax error\n".into(),
        };
        let text = format_error("Failed to use shader broken.frag", &err);
        assert!(text.starts_with("⚠ Failed to use shader broken.frag — fragment shader compile error"));
        assert!(text.ends_with("\nERROR: 0:4: syntax error"), "{text}");
    }

    #[test]
    fn empty_log_adds_no_line() {
        let err = PlayerError::ProgramLink { log: "  \n".into() };
        assert_eq!(
            format_error("Failed to use shader x.frag", &err),
            "⚠ Failed to use shader x.frag — program link error"
        );
    }

    #[test]
    fn error_without_log() {
        let err = PlayerError::ImageDecode("truncated".into());
        assert_eq!(
            format_error("Failed to load uploaded image", &err),
            "⚠ Failed to load uploaded image — image decode error: truncated"
        );
    }

    #[test]
    fn dimensions_use_multiplication_sign() {
        assert_eq!(format_dimensions(640, 480), "640×480");
    }
}
