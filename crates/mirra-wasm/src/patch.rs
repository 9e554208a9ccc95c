//! Canvas context readability patch.
//!
//! Accelerated contexts are allowed to discard their drawing buffer once a
//! frame is composited, which makes `toDataURL` read back blank pixels. Every
//! `webgl`/`webgl2` context request in the document therefore gets
//! `preserveDrawingBuffer: true` forced on; all other context kinds and all
//! other requested options pass through untouched.

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Document;

const PATCH_MARKER: &str = "__mirraPreservePatch";
const ORIGINAL_SLOT: &str = "__mirraGetContext";

/// Install the interception on `HTMLCanvasElement.prototype.getContext`.
///
/// Must land before any canvas in the document requests a 3D context. While
/// the document is still loading, installation defers to `DOMContentLoaded`;
/// otherwise it applies immediately. Idempotent either way.
pub(crate) fn install(document: &Document) -> Result<(), JsValue> {
    if document.ready_state() == "loading" {
        let cb = Closure::once(move |_event: web_sys::Event| {
            if let Err(err) = apply() {
                web_sys::console::warn_1(&err);
            }
        });
        document.add_event_listener_with_callback("DOMContentLoaded", cb.as_ref().unchecked_ref())?;
        cb.forget();
        return Ok(());
    }
    apply()
}

fn apply() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let ctor = js_sys::Reflect::get(&window, &"HTMLCanvasElement".into())?;
    let proto = js_sys::Reflect::get(&ctor, &"prototype".into())?;

    if js_sys::Reflect::get(&proto, &PATCH_MARKER.into())?.is_truthy() {
        return Ok(());
    }

    let original = js_sys::Reflect::get(&proto, &"getContext".into())?;
    if !original.is_function() {
        return Err(JsValue::from_str(
            "HTMLCanvasElement.prototype.getContext is not callable",
        ));
    }

    // The replacement must see the canvas as `this`, so it is a plain JS
    // function delegating to the original saved on the prototype.
    let wrapper = js_sys::Function::new_with_args(
        "kind, attrs",
        "if (kind === 'webgl' || kind === 'webgl2') {\
             attrs = attrs || {};\
             attrs.preserveDrawingBuffer = true;\
         }\
         return this.__mirraGetContext(kind, attrs);",
    );

    js_sys::Reflect::set(&proto, &ORIGINAL_SLOT.into(), &original)?;
    js_sys::Reflect::set(&proto, &"getContext".into(), &wrapper.into())?;
    js_sys::Reflect::set(&proto, &PATCH_MARKER.into(), &JsValue::TRUE)?;
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::HtmlCanvasElement;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    fn install_is_idempotent() {
        install(&document()).unwrap();
        install(&document()).unwrap();

        let window = web_sys::window().unwrap();
        let ctor = js_sys::Reflect::get(&window, &"HTMLCanvasElement".into()).unwrap();
        let proto = js_sys::Reflect::get(&ctor, &"prototype".into()).unwrap();
        assert!(js_sys::Reflect::get(&proto, &PATCH_MARKER.into())
            .unwrap()
            .is_truthy());
        // The saved original is still a function after a double install.
        assert!(js_sys::Reflect::get(&proto, &ORIGINAL_SLOT.into())
            .unwrap()
            .is_function());
    }

    #[wasm_bindgen_test]
    fn non_3d_contexts_pass_through() {
        install(&document()).unwrap();
        let canvas: HtmlCanvasElement = document()
            .create_element("canvas")
            .unwrap()
            .unchecked_into();
        canvas.set_width(4);
        canvas.set_height(4);
        let ctx = canvas.get_context("2d").unwrap();
        assert!(ctx.is_some());
    }
}
