//! Full-viewport overlay image presenter.
//!
//! One `<img>` element, created once and never removed. Sampled frames are
//! assigned to its `src`, which is the mutation the session recorder can
//! actually observe.

use std::cell::RefCell;
use std::rc::Rc;

use mirra_core::FramePresenter;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlImageElement, MutationObserver, MutationObserverInit};

// Covers the viewport, crops instead of letterboxing, never intercepts input,
// and stays hidden until the first successful sample.
const OVERLAY_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; \
     object-fit: cover; pointer-events: none; visibility: hidden;";

pub(crate) struct Overlay {
    image: HtmlImageElement,
}

impl Overlay {
    /// Create the overlay element and splice it into the document.
    ///
    /// Preferred position is immediately before the host surface element, so
    /// the mirrored image layers below interactive content. When the host (or
    /// even `<body>`) does not exist yet, insertion is deferred until the body
    /// shows up and the overlay is appended there instead.
    pub fn mount(document: &Document, host_tag: &str) -> Result<Self, JsValue> {
        let image: HtmlImageElement = document.create_element("img")?.unchecked_into();
        image.set_attribute("style", OVERLAY_STYLE)?;
        image.set_attribute("aria-hidden", "true")?;

        if let Some(host) = document.query_selector(host_tag)? {
            if let Some(parent) = host.parent_node() {
                parent.insert_before(&image, Some(&host))?;
                return Ok(Self { image });
            }
        }

        Self::append_once_body_exists(document, &image)?;
        Ok(Self { image })
    }

    fn append_once_body_exists(
        document: &Document,
        image: &HtmlImageElement,
    ) -> Result<(), JsValue> {
        if let Some(body) = document.body() {
            body.append_child(image)?;
            return Ok(());
        }

        // One-shot subscription: watch the document root until <body> exists,
        // append, disconnect.
        let observer_cell: Rc<RefCell<Option<MutationObserver>>> = Rc::new(RefCell::new(None));
        let observer_for_cb = observer_cell.clone();
        let doc = document.clone();
        let img = image.clone();
        let cb = Closure::wrap(Box::new(
            move |_records: js_sys::Array, _obs: MutationObserver| {
                let Some(body) = doc.body() else { return };
                if let Err(err) = body.append_child(&img) {
                    web_sys::console::warn_1(&err);
                }
                if let Some(observer) = observer_for_cb.borrow_mut().take() {
                    observer.disconnect();
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(cb.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        let root = document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?;
        observer.observe_with_options(&root, &init)?;
        *observer_cell.borrow_mut() = Some(observer);
        cb.forget();
        Ok(())
    }

    fn set_visibility(&self, value: &str) {
        if let Err(err) = self.image.style().set_property("visibility", value) {
            web_sys::console::warn_1(&err);
        }
    }

    #[cfg(all(test, target_arch = "wasm32"))]
    fn element(&self) -> &HtmlImageElement {
        &self.image
    }
}

impl FramePresenter for Overlay {
    fn show(&mut self) {
        self.set_visibility("visible");
    }

    fn hide(&mut self) {
        self.set_visibility("hidden");
    }

    fn set_image(&mut self, data_uri: &str) {
        self.image.set_src(data_uri);
    }
}
