//! HTTP commentary backend
//!
//! POSTs the request as JSON, plus a ready-made prompt, to a configured
//! endpoint. The endpoint may answer with plain text or a JSON object
//! carrying a `text` field.

use serde::{Deserialize, Serialize};

use super::prompt::build_prompt;
use super::{CommentaryError, CommentaryRequest};

/// What goes over the wire
#[derive(Serialize)]
struct RequestBody<'a> {
    #[serde(flatten)]
    request: &'a CommentaryRequest,
    prompt: String,
}

/// JSON body for a request
pub fn request_body(request: &CommentaryRequest) -> Result<String, CommentaryError> {
    serde_json::to_string(&RequestBody {
        request,
        prompt: build_prompt(request),
    })
    .map_err(|e| CommentaryError::Backend(e.to_string()))
}

#[derive(Deserialize)]
struct TextBody {
    #[serde(alias = "roast", alias = "message")]
    text: String,
}

/// Pull the line out of a response body
///
/// A JSON object without a text field is treated as an error payload.
pub fn extract_text(body: &str) -> Result<String, CommentaryError> {
    if let Ok(parsed) = serde_json::from_str::<TextBody>(body) {
        return Ok(parsed.text);
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(_)) => Err(CommentaryError::Backend(format!(
            "unexpected response: {}",
            body.chars().take(80).collect::<String>()
        ))),
        _ => Ok(body.to_string()),
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::FetchBackend;

#[cfg(target_arch = "wasm32")]
mod web {
    use futures::future::{FutureExt, LocalBoxFuture};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::{extract_text, request_body};
    use crate::commentary::{CommentaryBackend, CommentaryError, CommentaryRequest};

    /// `fetch`-based backend
    #[derive(Debug, Clone)]
    pub struct FetchBackend {
        endpoint: String,
    }

    impl FetchBackend {
        pub fn new(endpoint: impl Into<String>) -> Self {
            Self {
                endpoint: endpoint.into(),
            }
        }
    }

    fn js_err(e: JsValue) -> CommentaryError {
        CommentaryError::Backend(format!("{:?}", e))
    }

    async fn post(endpoint: String, body: String) -> Result<String, CommentaryError> {
        let window = web_sys::window().ok_or_else(|| CommentaryError::Backend("no window".into()))?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));

        let request = Request::new_with_str_and_init(&endpoint, &opts).map_err(js_err)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        if !response.ok() {
            return Err(CommentaryError::Backend(format!("HTTP {}", response.status())));
        }

        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .unwrap_or_default();
        extract_text(&text)
    }

    impl CommentaryBackend for FetchBackend {
        fn generate(&self, request: &CommentaryRequest) -> LocalBoxFuture<'static, Result<String, CommentaryError>> {
            let endpoint = self.endpoint.clone();
            let body = request_body(request);
            async move { post(endpoint, body?).await }.boxed_local()
        }
    }
}
