//! `fetch`-based rotation backend.

use quarterturn_core::{RotateBackend, RotateReply, RotateRequest, TransportError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, RequestCredentials, RequestInit, Response};

/// Posts each rotation as multipart form data to the configured endpoint.
///
/// Cookies are sent for same-origin endpoints. The response status and body
/// are returned as-is; classification happens in the commit pipeline.
pub struct FetchBackend {
    endpoint: String,
}

impl FetchBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    fn build_init(request: &RotateRequest) -> Result<RequestInit, TransportError> {
        let form = FormData::new().map_err(body_error)?;
        for (name, value) in request.form_fields() {
            form.append_with_str(name, &value).map_err(body_error)?;
        }

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_credentials(RequestCredentials::SameOrigin);
        init.set_body(&form);
        Ok(init)
    }
}

impl RotateBackend for FetchBackend {
    async fn rotate(&self, request: &RotateRequest) -> Result<RotateReply, TransportError> {
        let init = Self::build_init(request)?;
        let window =
            web_sys::window().ok_or_else(|| TransportError::Network("no window".to_string()))?;

        let value = JsFuture::from(window.fetch_with_str_and_init(&self.endpoint, &init))
            .await
            .map_err(|err| TransportError::Network(describe(&err)))?;
        let response: Response = value.dyn_into().map_err(body_error)?;

        // An unreadable body is an empty body
        let body = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|text| text.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };

        Ok(RotateReply::new(response.status(), body))
    }
}

fn body_error(err: impl Into<JsValue>) -> TransportError {
    TransportError::Body(describe(&err.into()))
}

/// Human-readable text for a thrown JS value.
fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}
