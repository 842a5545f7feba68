use std::cell::RefCell;
use std::rc::Rc;

use fragview_core::{parse_strength, Controls, PlayerConfig, PlayerError};
use fragview_runtime::controller::{START_FAILED, UPLOAD_FAILED};
use fragview_runtime::{SessionController, StatusSink, SurfaceSize};
use fragview_runtime_glow::GlowBackend;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Event, EventTarget, HtmlCanvasElement, HtmlInputElement, HtmlSelectElement,
    WebGl2RenderingContext, Window,
};

use crate::fetch::{read_file, HttpFetcher};
use crate::status::DomStatus;
use crate::{console, ids, seed_controls};

type Controller = SessionController<GlowBackend, HttpFetcher, DomStatus>;

fn element<T: JsCast>(doc: &Document, id: &str) -> Option<T> {
    doc.get_element_by_id(id)?.dyn_into::<T>().ok()
}

fn listen(
    target: &EventTarget,
    event: &str,
    f: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(f);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn webgl2(canvas: &HtmlCanvasElement) -> Result<glow::Context, PlayerError> {
    let unavailable = |msg: String| PlayerError::ContextUnavailable(msg);
    let ctx = canvas
        .get_context("webgl2")
        .map_err(|e| unavailable(format!("{e:?}")))?
        .ok_or_else(|| unavailable("WebGL2 not supported".into()))?
        .dyn_into::<WebGl2RenderingContext>()
        .map_err(|_| unavailable("webgl2 context has an unexpected type".into()))?;
    Ok(glow::Context::from_webgl2_context(ctx))
}

fn update_readouts(doc: &Document, controls: &Controls) {
    if let Some(el) = doc.get_element_by_id(ids::STRENGTH_VALUE) {
        el.set_text_content(Some(&controls.strength_readout()));
    }
    if let Some(el) = doc.get_element_by_id(ids::TINT_VALUE) {
        el.set_text_content(Some(&controls.tint_readout()));
    }
}

fn wire_controls(doc: &Document, controller: &Rc<Controller>) -> Result<(), JsValue> {
    let strength = element::<HtmlInputElement>(doc, ids::STRENGTH);
    let tint = element::<HtmlInputElement>(doc, ids::TINT);

    seed_controls(
        &mut controller.controls_mut(),
        strength.as_ref().map(|i| i.value()).as_deref(),
        tint.as_ref().map(|i| i.value()).as_deref(),
    );
    update_readouts(doc, &controller.controls());

    if let Some(input) = &strength {
        let (c, doc, el) = (controller.clone(), doc.clone(), input.clone());
        listen(input, "input", move |_| {
            if let Some(v) = parse_strength(&el.value()) {
                c.set_strength(v);
            }
            update_readouts(&doc, &c.controls());
        })?;
    }

    if let Some(input) = &tint {
        let (c, doc, el) = (controller.clone(), doc.clone(), input.clone());
        listen(input, "input", move |_| {
            c.set_tint_hex(&el.value());
            update_readouts(&doc, &c.controls());
        })?;
    }

    if let Some(button) = doc.get_element_by_id(ids::RESET) {
        let (c, doc) = (controller.clone(), doc.clone());
        let (strength, tint) = (strength.clone(), tint.clone());
        listen(&button, "click", move |_| {
            c.reset_controls();
            let controls = c.controls();
            if let Some(i) = &strength {
                i.set_value(&controls.strength().to_string());
            }
            if let Some(i) = &tint {
                i.set_value(controls.tint_hex());
            }
            update_readouts(&doc, &controls);
        })?;
    }

    if let Some(select) = element::<HtmlSelectElement>(doc, ids::SHADER_SELECT) {
        let (c, el) = (controller.clone(), select.clone());
        listen(&select, "change", move |_| {
            let (c, name) = (c.clone(), el.value());
            spawn_local(async move {
                c.select_shader(&name).await;
            });
        })?;
    }

    if let Some(input) = element::<HtmlInputElement>(doc, ids::FILE_INPUT) {
        let (c, el) = (controller.clone(), input.clone());
        listen(&input, "change", move |_| {
            let Some(file) = el.files().and_then(|list| list.get(0)) else {
                return;
            };
            let c = c.clone();
            spawn_local(async move {
                match read_file(&file).await {
                    Ok(bytes) => {
                        c.upload_image(bytes).await;
                    }
                    Err(last) => c.report(
                        UPLOAD_FAILED,
                        &PlayerError::ResourceNotFound {
                            candidates: vec![file.name()],
                            last,
                        },
                    ),
                }
            });
        })?;
    }

    Ok(())
}

/// Resizes the canvas to its CSS size times the device pixel ratio, then renders, every
/// animation frame.
fn start_render_loop(
    window: &Window,
    canvas: HtmlCanvasElement,
    controller: Rc<Controller>,
) -> Result<(), JsValue> {
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let started = window.performance().map(|p| p.now()).unwrap_or(0.0);
    let win = window.clone();

    *g.borrow_mut() = Some(Closure::new(move |now: f64| {
        let size = SurfaceSize::from_logical(
            canvas.client_width() as f64,
            canvas.client_height() as f64,
            win.device_pixel_ratio(),
        );
        if canvas.width() != size.width || canvas.height() != size.height {
            canvas.set_width(size.width);
            canvas.set_height(size.height);
        }
        controller.frame(size, ((now - started) / 1000.0) as f32);

        if let Some(cb) = f.borrow().as_ref() {
            if let Err(e) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                tracing::error!(error = ?e, "request_animation_frame failed");
            }
        }
    }));

    if let Some(cb) = g.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console::init();

    let window = web_sys::window().ok_or("no window")?;
    let doc = window.document().ok_or("no document")?;
    let mut status = DomStatus::new(doc.get_element_by_id(ids::IMAGE_INFO), None);
    let mut fatal = |err: PlayerError| {
        status.error(START_FAILED, &err);
        JsValue::from_str(&err.to_string())
    };

    let canvas = element::<HtmlCanvasElement>(&doc, ids::CANVAS).ok_or_else(|| {
        fatal(PlayerError::ContextUnavailable(format!(
            "no <canvas id=\"{}\"> on the page",
            ids::CANVAS
        )))
    })?;
    let gl = webgl2(&canvas).map_err(&mut fatal)?;

    let config = PlayerConfig::default();
    let backend = GlowBackend::new(gl, config.geometry).map_err(&mut fatal)?;
    let sink = DomStatus::new(
        doc.get_element_by_id(ids::IMAGE_INFO),
        element::<HtmlSelectElement>(&doc, ids::SHADER_SELECT),
    );
    let controller = Rc::new(
        SessionController::new(backend, HttpFetcher, sink, config).map_err(&mut fatal)?,
    );

    wire_controls(&doc, &controller)?;
    start_render_loop(&window, canvas, controller.clone())?;

    // The shader list reaches `#shaderSelect` through the status sink once the manifest is in.
    spawn_local(async move {
        if let Err(e) = controller.start().await {
            // Already on the status line; the loop keeps clearing.
            tracing::debug!(error = %e, "continuing without a shader");
        }
    });
    Ok(())
}
