//! Display-frame scheduling for the sampler.

use std::cell::RefCell;
use std::rc::Rc;

use mirra_core::{SampleClock, Sampler};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Performance, Window};

/// `performance.now()` as the sampler's latency clock.
pub(crate) struct PerformanceClock(Performance);

impl PerformanceClock {
    pub fn new(window: &Window) -> Result<Self, JsValue> {
        window
            .performance()
            .map(Self)
            .ok_or_else(|| JsValue::from_str("performance API unavailable"))
    }
}

impl SampleClock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        self.0.now()
    }
}

/// Start the self-rescheduling `requestAnimationFrame` loop.
///
/// Every callback ticks the sampler with the frame timestamp and a fresh read
/// of `document.hidden`, then re-schedules itself unconditionally. There is no
/// stop operation: the closure keeps itself alive through the Rc cycle for the
/// lifetime of the page, and suppression happens inside the sampler.
pub(crate) fn start(window: Window, document: Document, mut sampler: Sampler) -> Result<(), JsValue> {
    let cell: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let cell_for_cb = cell.clone();
    let raf_window = window.clone();

    *cell.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        sampler.tick(now, document.hidden());

        if let Some(cb) = cell_for_cb.borrow().as_ref() {
            if raf_window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .is_err()
            {
                web_sys::console::warn_1(&"mirra: failed to schedule next frame".into());
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let cell_ref = cell.borrow();
    let cb = cell_ref.as_ref().expect("frame callback installed above");
    window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    Ok(())
}
