//! Page enhancement entry points for JavaScript.

use quire_editor_browser::EditorSession;
use quire_editor_core::EditorConfig;
use wasm_bindgen::prelude::*;

use crate::types::{FieldCounts, JsEditorConfig};

/// Handle to the editors attached by `enhance`.
#[wasm_bindgen]
pub struct EditorHandle {
    session: Option<EditorSession>,
}

#[wasm_bindgen]
impl EditorHandle {
    /// Number of code and rich fields this handle manages.
    #[wasm_bindgen(js_name = fieldCounts)]
    pub fn field_counts(&self) -> FieldCounts {
        self.session
            .as_ref()
            .map(|s| FieldCounts {
                code_fields: s.code_fields().len(),
                rich_fields: s.rich_fields().len(),
            })
            .unwrap_or(FieldCounts {
                code_fields: 0,
                rich_fields: 0,
            })
    }

    /// Current backing values of the rich fields, in page order.
    #[wasm_bindgen(js_name = richValues)]
    pub fn rich_values(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| {
                s.rich_fields()
                    .iter()
                    .map(|f| f.surface().backing_value())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Detach every editor and show the plain textareas again.
    pub fn destroy(&mut self) {
        self.session = None;
    }

    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

/// Enhance the page's textareas.
///
/// `config` may omit any field; see `JsEditorConfig` for the defaults.
#[wasm_bindgen]
pub fn enhance(config: Option<JsEditorConfig>) -> Result<EditorHandle, JsError> {
    let config: EditorConfig = config.unwrap_or_default().into();
    let session = EditorSession::enhance(config)
        .map_err(|e| JsError::new(&format!("Failed to enhance fields: {}", e)))?;
    Ok(EditorHandle {
        session: Some(session),
    })
}

/// Parse configuration from an untyped object, for callers without the
/// generated typings.
#[wasm_bindgen(js_name = enhanceWith)]
pub fn enhance_with(config: JsValue) -> Result<EditorHandle, JsError> {
    let config: Option<JsEditorConfig> = if config.is_undefined() || config.is_null() {
        None
    } else {
        Some(
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?,
        )
    };
    enhance(config)
}
