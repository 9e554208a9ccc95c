//! # mirra-wasm
//!
//! WebAssembly module for the Mirra canvas mirroring bridge.
//! Wires the capture loop from `mirra-core` to the live DOM: overlay
//! presentation, shadow-DOM canvas resolution, frame scheduling, the context
//! readability patch, and the session recorder SDK boundary.

mod overlay;
mod patch;
mod raf;
mod recorder;
mod surface;

use std::cell::Cell;

use mirra_core::{ActivationFlag, BridgeConfig, Sampler};
use overlay::Overlay;
use raf::PerformanceClock;
use recorder::RecorderCommand;
use surface::ShadowCanvasSource;
use wasm_bindgen::prelude::*;

thread_local! {
    /// Shared mirroring switch for the main WASM thread. Exists before `init`
    /// so activation can be toggled in any order.
    static ACTIVE: ActivationFlag = ActivationFlag::new();

    static STARTED: Cell<bool> = const { Cell::new(false) };
}

/// Initialize the bridge and start the capture loop.
///
/// Omitted parameters fall back to 5 fps max, 2 fps min, 0.05 quality.
/// Idempotent: calling again while the bridge is running is a no-op. No
/// capture-loop health is ever reported back.
#[wasm_bindgen]
pub fn init(
    project_id: &str,
    target_fps_max: Option<f64>,
    target_fps_min: Option<f64>,
    quality: Option<f64>,
) -> Result<(), JsValue> {
    let mut config = BridgeConfig::new(project_id);
    if let Some(fps) = target_fps_max {
        config.capture.target_fps_max = fps;
    }
    if let Some(fps) = target_fps_min {
        config.capture.target_fps_min = fps;
    }
    if let Some(quality) = quality {
        config.capture.quality = quality;
    }
    start(config)
}

/// Initialize from a full JSON config, for embeddings that need a
/// non-default host tag.
///
/// Throws a JS error if the config fails to parse.
#[wasm_bindgen(js_name = initFromJson)]
pub fn init_from_json(config_json: &str) -> Result<(), JsValue> {
    let config: BridgeConfig = serde_json::from_str(config_json)
        .map_err(|e| JsValue::from_str(&format!("Config error: {}", e)))?;
    start(config)
}

fn start(config: BridgeConfig) -> Result<(), JsValue> {
    if STARTED.with(|s| s.get()) {
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // The patch must land before the host surface requests its context.
    patch::install(&document)?;
    recorder::bootstrap(&document, &config.project_id)?;

    let overlay = Overlay::mount(&document, &config.host_tag)?;
    let source = ShadowCanvasSource::new(document.clone(), config.host_tag.clone());
    let clock = PerformanceClock::new(&window)?;
    let flag = ACTIVE.with(|f| f.clone());

    let sampler = Sampler::new(
        config.capture,
        flag,
        Box::new(source),
        Box::new(overlay),
        Box::new(clock),
    );
    raf::start(window, document, sampler)?;

    STARTED.with(|s| s.set(true));
    Ok(())
}

/// Switch canvas mirroring on or off. Safe to call at any time, in any order
/// relative to `init`.
#[wasm_bindgen(js_name = setIsCanvasMirrorActive)]
pub fn set_is_canvas_mirror_active(active: bool) {
    ACTIVE.with(|f| f.set(active));
}

// ─── Recorder command relay ─────────────────────────────────────────

/// Forward a consent decision to the recorder.
#[wasm_bindgen]
pub fn consent(granted: bool) {
    recorder::relay(
        RecorderCommand::Consent,
        &js_sys::Array::of1(&JsValue::from_bool(granted)),
    );
}

/// Attach a user identity (and optional properties object) to the session.
#[wasm_bindgen]
pub fn identify(user_id: &str, properties: JsValue) {
    recorder::relay(
        RecorderCommand::Identify,
        &js_sys::Array::of2(&JsValue::from_str(user_id), &properties),
    );
}

/// Set a session property.
#[wasm_bindgen(js_name = setProperty)]
pub fn set_property(key: &str, value: JsValue) {
    recorder::relay(
        RecorderCommand::Set,
        &js_sys::Array::of2(&JsValue::from_str(key), &value),
    );
}

/// Track a custom event with an optional properties object.
#[wasm_bindgen]
pub fn event(name: &str, properties: JsValue) {
    recorder::relay(
        RecorderCommand::Event,
        &js_sys::Array::of2(&JsValue::from_str(name), &properties),
    );
}

/// Upgrade the current session to full fidelity recording.
#[wasm_bindgen]
pub fn upgrade() {
    recorder::relay(RecorderCommand::Upgrade, &js_sys::Array::new());
}

#[wasm_bindgen(js_name = startRecording)]
pub fn start_recording() {
    recorder::relay(RecorderCommand::Start, &js_sys::Array::new());
}

#[wasm_bindgen(js_name = stopRecording)]
pub fn stop_recording() {
    recorder::relay(RecorderCommand::Stop, &js_sys::Array::new());
}

#[wasm_bindgen(js_name = pauseRecording)]
pub fn pause_recording() {
    recorder::relay(RecorderCommand::Pause, &js_sys::Array::new());
}

#[wasm_bindgen(js_name = resumeRecording)]
pub fn resume_recording() {
    recorder::relay(RecorderCommand::Resume, &js_sys::Array::new());
}

/// Get the version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
