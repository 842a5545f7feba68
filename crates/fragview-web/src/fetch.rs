use fragview_core::FetchError;
use fragview_runtime::Fetcher;
use js_sys::Uint8Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{RequestCache, RequestInit, Response};

fn transport(e: JsValue) -> FetchError {
    FetchError::Transport(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// `fetch()` with `cache: "no-store"`; non-2xx responses are failures.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let window = web_sys::window().ok_or_else(|| FetchError::Transport("no window".into()))?;
        let init = RequestInit::new();
        init.set_cache(RequestCache::NoStore);

        let response = JsFuture::from(window.fetch_with_str_and_init(location, &init))
            .await
            .map_err(transport)?;
        let response: Response = response.dyn_into().map_err(transport)?;
        if !response.ok() {
            return Err(FetchError::Status {
                status: response.status(),
                status_text: response.status_text(),
            });
        }
        let buffer = JsFuture::from(response.array_buffer().map_err(transport)?)
            .await
            .map_err(transport)?;
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}

/// Reads a selected file's bytes.
pub async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, FetchError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(transport)?;
    Ok(Uint8Array::new(&buffer).to_vec())
}
