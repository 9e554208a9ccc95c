//! Target canvas resolution and encoding.

use mirra_core::{FrameSource, MirraError, MirraResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement};

const IMAGE_MIME: &str = "image/jpeg";

/// Resolves the mirrored canvas beneath the host surface element.
///
/// The host renders into an encapsulated shadow subtree, so a plain document
/// query cannot see the canvas; resolution descends through the shadow root
/// (with a light-DOM fallback for embeddings that render without one). The
/// canvas reference is held only within a single tick; the host tears its
/// surface down and recreates it at will.
pub(crate) struct ShadowCanvasSource {
    document: Document,
    host_tag: String,
    canvas: Option<HtmlCanvasElement>,
}

impl ShadowCanvasSource {
    pub fn new(document: Document, host_tag: impl Into<String>) -> Self {
        Self {
            document,
            host_tag: host_tag.into(),
            canvas: None,
        }
    }

    fn lookup(&self) -> Result<Option<HtmlCanvasElement>, JsValue> {
        let Some(host) = self.document.query_selector(&self.host_tag)? else {
            return Ok(None);
        };
        let found = match host.shadow_root() {
            Some(root) => root.query_selector("canvas")?,
            None => host.query_selector("canvas")?,
        };
        Ok(found.and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok()))
    }
}

impl FrameSource for ShadowCanvasSource {
    fn acquire(&mut self) -> MirraResult<bool> {
        self.canvas = None;
        let canvas = match self
            .lookup()
            .map_err(|err| MirraError::dom(js_detail(&err)))?
        {
            Some(canvas) => canvas,
            None => return Ok(false),
        };
        // A zero-width buffer means the surface exists but has not painted yet.
        if canvas.width() == 0 {
            return Ok(false);
        }
        self.canvas = Some(canvas);
        Ok(true)
    }

    fn encode(&mut self, quality: f64) -> MirraResult<String> {
        let canvas = self
            .canvas
            .take()
            .ok_or_else(|| MirraError::dom("no surface acquired for this tick"))?;
        canvas
            .to_data_url_with_type_and_encoder_options(IMAGE_MIME, &JsValue::from_f64(quality))
            .map_err(|err| MirraError::encode(js_detail(&err)))
    }
}

/// Render a JS exception into an error detail string.
pub(crate) fn js_detail(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}
