//! Session recorder SDK boundary.
//!
//! Script injection and the command relay for the third-party recorder.
//! Everything here is fire-and-forget: mirroring keeps working (and failing
//! silently) whether or not the SDK ever finishes loading, and nothing in
//! this module reports recorder health back to the caller.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::Document;

const SCRIPT_URL: &str = "https://web-sdk.smartlook.com/recorder.js";
const GLOBAL_NAME: &str = "smartlook";

/// Commands relayed to the recorder global by string name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecorderCommand {
    Consent,
    Identify,
    Set,
    Event,
    Upgrade,
    Start,
    Stop,
    Pause,
    Resume,
}

impl RecorderCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            RecorderCommand::Consent => "consent",
            RecorderCommand::Identify => "identify",
            RecorderCommand::Set => "set",
            RecorderCommand::Event => "event",
            RecorderCommand::Upgrade => "upgrade",
            RecorderCommand::Start => "start",
            RecorderCommand::Stop => "stop",
            RecorderCommand::Pause => "pause",
            RecorderCommand::Resume => "resume",
        }
    }
}

/// Install the command-queue shim, inject the SDK script once, and issue the
/// project initialization command.
pub(crate) fn bootstrap(document: &Document, project_id: &str) -> Result<(), JsValue> {
    ensure_queue_global()?;
    inject_script(document)?;
    relay_raw("init", &js_sys::Array::of1(&JsValue::from_str(project_id)))
}

/// The pre-load shim: a global that queues calls until the real SDK replaces
/// it and drains the queue.
fn ensure_queue_global() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    if js_sys::Reflect::get(&window, &GLOBAL_NAME.into())?.is_function() {
        return Ok(());
    }
    let shim = js_sys::Function::new_no_args(
        "var s = window.smartlook;\
         (s.api = s.api || []).push(arguments);",
    );
    js_sys::Reflect::set(&shim, &"api".into(), &js_sys::Array::new())?;
    js_sys::Reflect::set(&window, &GLOBAL_NAME.into(), &shim.into())?;
    Ok(())
}

/// Add the recorder script tag exactly once. A matching script element already
/// in the document makes this a no-op.
fn inject_script(document: &Document) -> Result<(), JsValue> {
    let selector = format!("script[src='{SCRIPT_URL}']");
    if document.query_selector(&selector)?.is_some() {
        return Ok(());
    }

    let script: web_sys::HtmlScriptElement =
        document.create_element("script")?.unchecked_into();
    script.set_src(SCRIPT_URL);
    script.set_async(true);
    script.set_cross_origin(Some("anonymous"));

    let parent: web_sys::Node = match document.head() {
        Some(head) => head.into(),
        None => document
            .body()
            .ok_or_else(|| JsValue::from_str("document has neither head nor body"))?
            .into(),
    };
    parent.append_child(&script)?;
    Ok(())
}

/// Relay a command with its arguments to the recorder global.
///
/// A missing global is logged and dropped; relay failures never surface to
/// the caller.
pub(crate) fn relay(command: RecorderCommand, args: &js_sys::Array) {
    if let Err(err) = relay_raw(command.as_str(), args) {
        web_sys::console::warn_1(&err);
    }
}

fn relay_raw(command: &str, args: &js_sys::Array) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let global = js_sys::Reflect::get(&window, &GLOBAL_NAME.into())?;
    let func: js_sys::Function = global
        .dyn_into()
        .map_err(|_| JsValue::from_str("recorder global is not installed"))?;

    let call_args = js_sys::Array::new();
    call_args.push(&JsValue::from_str(command));
    for arg in args.iter() {
        call_args.push(&arg);
    }
    func.apply(&JsValue::NULL, &call_args)?;
    Ok(())
}
