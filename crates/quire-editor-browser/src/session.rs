//! Page-level enhancement: find the fields, attach editors, share the
//! overlay and resize frame between them.

use std::rc::Rc;

use quire_editor_core::EditorConfig;
use web_sys::HtmlTextAreaElement;

use crate::catalog::HttpCatalog;
use crate::code_field::CodeFieldBinding;
use crate::dom::{self, ENHANCED_ATTR};
use crate::error::BrowserError;
use crate::modal::ModalOverlay;
use crate::resize::ImageResizer;
use crate::rich_field::{DialogHost, RichFieldBinding};

/// Every editor attached to the page. Dropping it restores the plain fields.
pub struct EditorSession {
    config: EditorConfig,
    overlay: Rc<ModalOverlay>,
    resizer: Option<Rc<ImageResizer>>,
    code_fields: Vec<CodeFieldBinding>,
    rich_fields: Vec<RichFieldBinding>,
}

impl EditorSession {
    /// Enhance every matching textarea on the page.
    ///
    /// Textareas that already carry an editor are left alone.
    pub fn enhance(config: EditorConfig) -> Result<Self, BrowserError> {
        config.validate()?;
        let document = dom::document()?;
        let fresh = |selector: &str| -> Result<Vec<HtmlTextAreaElement>, BrowserError> {
            Ok(dom::query_all::<HtmlTextAreaElement>(&document, selector)?
                .into_iter()
                .filter(|t| !t.has_attribute(ENHANCED_ATTR))
                .collect())
        };

        let code_fields: Vec<CodeFieldBinding> = fresh(&config.code_selector)?
            .into_iter()
            .map(|textarea| CodeFieldBinding::attach(textarea, config.indent_width))
            .collect();

        let overlay = ModalOverlay::new(config.close_delay_ms);
        let host = DialogHost {
            overlay: overlay.clone(),
            catalog: HttpCatalog::new(config.media_endpoint.clone()),
            upload_url: config.upload_url.clone(),
        };
        let rich_fields = fresh(&config.rich_selector)?
            .into_iter()
            .map(|textarea| RichFieldBinding::attach(textarea, host.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let resizer = if rich_fields.is_empty() {
            None
        } else {
            Some(ImageResizer::install(config.min_image_width)?)
        };

        tracing::info!(
            code = code_fields.len(),
            rich = rich_fields.len(),
            "fields enhanced"
        );
        Ok(Self {
            config,
            overlay,
            resizer,
            code_fields,
            rich_fields,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn overlay(&self) -> &Rc<ModalOverlay> {
        &self.overlay
    }

    pub fn resizer(&self) -> Option<&Rc<ImageResizer>> {
        self.resizer.as_ref()
    }

    pub fn code_fields(&self) -> &[CodeFieldBinding] {
        &self.code_fields
    }

    pub fn rich_fields(&self) -> &[RichFieldBinding] {
        &self.rich_fields
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        if let Some(resizer) = self.resizer.take() {
            resizer.teardown();
        }
        self.overlay.teardown();
        self.rich_fields.clear();
        self.code_fields.clear();
        tracing::debug!("editor session torn down");
    }
}
