//! Errors raised by the browser layer.

use quire_editor_core::EditorError;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BrowserError {
    /// No global `window` (not running on a page).
    #[error("no window available")]
    MissingWindow,

    /// The window has no document.
    #[error("no document available")]
    MissingDocument,

    /// A DOM call threw, or an expected element was missing.
    #[error("DOM error: {0}")]
    Dom(String),

    /// The media catalog request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error(transparent)]
    Core(#[from] EditorError),
}

impl From<JsValue> for BrowserError {
    fn from(value: JsValue) -> Self {
        BrowserError::Dom(
            value
                .as_string()
                .unwrap_or_else(|| format!("{:?}", value)),
        )
    }
}

impl From<reqwest::Error> for BrowserError {
    fn from(e: reqwest::Error) -> Self {
        BrowserError::Http(e.to_string())
    }
}
