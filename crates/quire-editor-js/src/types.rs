//! Types exposed to JavaScript via wasm-bindgen.

use quire_editor_core::EditorConfig;
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Options for `enhance`. Every field is optional; omitted ones keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct JsEditorConfig {
    /// Selector for code textareas. Default `textarea.code-editor`.
    #[tsify(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_selector: Option<String>,
    /// Selector for rich-text textareas. Default `textarea.rich-text-editor`.
    #[tsify(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich_selector: Option<String>,
    #[tsify(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_endpoint: Option<String>,
    #[tsify(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,
    #[tsify(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent_width: Option<usize>,
    #[tsify(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_delay_ms: Option<u32>,
    #[tsify(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_image_width: Option<f64>,
}

impl From<JsEditorConfig> for EditorConfig {
    fn from(js: JsEditorConfig) -> Self {
        let defaults = EditorConfig::default();
        EditorConfig {
            code_selector: js.code_selector.unwrap_or(defaults.code_selector),
            rich_selector: js.rich_selector.unwrap_or(defaults.rich_selector),
            media_endpoint: js.media_endpoint.unwrap_or(defaults.media_endpoint),
            upload_url: js.upload_url.unwrap_or(defaults.upload_url),
            indent_width: js.indent_width.unwrap_or(defaults.indent_width),
            close_delay_ms: js.close_delay_ms.unwrap_or(defaults.close_delay_ms),
            min_image_width: js.min_image_width.unwrap_or(defaults.min_image_width),
        }
    }
}

/// How many fields a handle manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct FieldCounts {
    pub code_fields: usize,
    pub rich_fields: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let js = JsEditorConfig {
            rich_selector: Some("textarea.body".into()),
            indent_width: Some(2),
            ..Default::default()
        };
        let config = EditorConfig::from(js);
        insta::assert_debug_snapshot!(config, @r#"
        EditorConfig {
            code_selector: "textarea.code-editor",
            rich_selector: "textarea.body",
            media_endpoint: "/admin/api/media",
            upload_url: "/admin/media",
            indent_width: 2,
            close_delay_ms: 200,
            min_image_width: 30.0,
        }
        "#);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(EditorConfig::from(JsEditorConfig::default()), EditorConfig::default());
    }
}
