//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::code_field::DEFAULT_INDENT_WIDTH;
use crate::error::EditorError;

/// Settings for enhancing a page's fields. Every field has a default, so a
/// partial object (or none at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// CSS selector for textareas enhanced as code fields.
    pub code_selector: String,
    /// CSS selector for textareas enhanced as rich fields.
    pub rich_selector: String,
    /// Media catalog endpoint.
    pub media_endpoint: String,
    /// Upload page linked from the media dialog.
    pub upload_url: String,
    /// Spaces inserted by Tab in code fields.
    pub indent_width: usize,
    /// Delay before a closed modal's content is cleared.
    pub close_delay_ms: u32,
    /// Smallest width, in pixels, an image can be resized to.
    pub min_image_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            code_selector: "textarea.code-editor".into(),
            rich_selector: "textarea.rich-text-editor".into(),
            media_endpoint: "/admin/api/media".into(),
            upload_url: "/admin/media".into(),
            indent_width: DEFAULT_INDENT_WIDTH,
            close_delay_ms: 200,
            min_image_width: 30.0,
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.indent_width == 0 {
            return Err(EditorError::Config("indent_width must be at least 1".into()));
        }
        if self.min_image_width.is_nan() || self.min_image_width <= 0.0 {
            return Err(EditorError::Config(format!(
                "min_image_width must be positive, got {}",
                self.min_image_width
            )));
        }
        if self.media_endpoint.trim().is_empty() {
            return Err(EditorError::Config("media_endpoint is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"indent_width": 2, "media_endpoint": "/api/media"}"#).unwrap();
        assert_eq!(config.indent_width, 2);
        assert_eq!(config.media_endpoint, "/api/media");
        assert_eq!(config.rich_selector, "textarea.rich-text-editor");
        assert_eq!(config.close_delay_ms, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_indent = EditorConfig {
            indent_width: 0,
            ..Default::default()
        };
        assert!(matches!(zero_indent.validate(), Err(EditorError::Config(_))));

        let bad_width = EditorConfig {
            min_image_width: f64::NAN,
            ..Default::default()
        };
        assert!(bad_width.validate().is_err());

        let no_endpoint = EditorConfig {
            media_endpoint: "  ".into(),
            ..Default::default()
        };
        assert!(no_endpoint.validate().is_err());
    }
}
