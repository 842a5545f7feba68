use fragview_core::PlayerError;
use fragview_runtime::{format_error, StatusSink};
use web_sys::{Element, HtmlOptionElement, HtmlSelectElement};

/// Writes the status line into `#imgInfo` and the shader list into `#shaderSelect`, when the
/// page has them.
#[derive(Debug, Clone)]
pub struct DomStatus {
    target: Option<Element>,
    select: Option<HtmlSelectElement>,
}

impl DomStatus {
    pub fn new(target: Option<Element>, select: Option<HtmlSelectElement>) -> Self {
        Self { target, select }
    }

    fn show(&self, text: &str) {
        if let Some(el) = &self.target {
            el.set_text_content(Some(text));
        }
    }
}

impl StatusSink for DomStatus {
    fn info(&mut self, text: &str) {
        tracing::info!("{text}");
        self.show(text);
    }

    fn error(&mut self, context: &str, err: &PlayerError) {
        let line = format_error(context, err);
        tracing::error!("{line}");
        self.show(&line);
    }

    fn shader_list(&mut self, names: &[String], selected: &str) {
        let Some(select) = &self.select else {
            return;
        };
        select.set_inner_html("");
        for name in names {
            let added = HtmlOptionElement::new_with_text_and_value(name, name)
                .and_then(|opt| select.append_child(&opt));
            if let Err(e) = added {
                tracing::warn!(error = ?e, shader = %name, "could not add shader option");
            }
        }
        select.set_value(selected);
    }
}
