//! Adaptive frame-rate capture loop.
//!
//! The sampler decides once per display frame whether to take a new sample of
//! the target surface, serialize it, and hand it to the presenter. It throttles
//! itself between a configured min and max rate by measuring how long its own
//! resolve+encode pass took, trading capture frequency for responsiveness when
//! the scene gets expensive to serialize.

use crate::config::{frame_interval_ms, CaptureConfig};
use crate::error::MirraResult;
use crate::flag::ActivationFlag;

/// Wall-clock budget for one resolve+encode pass. Exceeding it drops the loop
/// into low-power mode until a pass comes in under budget again.
pub const LATENCY_BUDGET_MS: f64 = 50.0;

/// The capture target, re-resolved on every tick.
///
/// Implementations must not cache the underlying surface across ticks; the
/// host rendering surface can be torn down and recreated at any time.
pub trait FrameSource {
    /// Re-resolve the target. `Ok(false)` while the surface is absent or its
    /// drawable buffer has zero width (transient, retried next frame).
    fn acquire(&mut self) -> MirraResult<bool>;

    /// Serialize the most recently acquired surface to an image data URI.
    /// Only called after `acquire` returned `Ok(true)` on the same tick.
    fn encode(&mut self, quality: f64) -> MirraResult<String>;
}

/// The overlay that presents captured frames.
pub trait FramePresenter {
    fn show(&mut self);
    fn hide(&mut self);
    fn set_image(&mut self, data_uri: &str);
}

/// Monotonic millisecond clock used to measure per-sample latency.
pub trait SampleClock {
    fn now_ms(&self) -> f64;
}

/// Mutable loop state, owned exclusively by the sampler.
#[derive(Debug, Clone, Copy)]
struct LoopState {
    last_sample_at: f64,
    current_target_fps: f64,
    low_power: bool,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Document hidden or the activation flag is off; overlay hidden.
    Suppressed,
    /// Not enough time has elapsed since the last sample; nothing changed.
    Throttled,
    /// Target surface absent or zero-sized; overlay hidden, retried next frame.
    NotReady,
    /// A fresh frame was captured and presented.
    Sampled,
    /// Resolution or encoding threw; logged and skipped, loop continues.
    Failed,
}

/// Per-frame sampling engine.
///
/// Driven externally (one `tick` per display frame); there is no stop
/// operation. Suppression happens through the activation flag and document
/// visibility, never by halting the scheduling chain.
pub struct Sampler {
    config: CaptureConfig,
    state: LoopState,
    active: ActivationFlag,
    source: Box<dyn FrameSource>,
    presenter: Box<dyn FramePresenter>,
    clock: Box<dyn SampleClock>,
}

impl Sampler {
    pub fn new(
        config: CaptureConfig,
        active: ActivationFlag,
        source: Box<dyn FrameSource>,
        presenter: Box<dyn FramePresenter>,
        clock: Box<dyn SampleClock>,
    ) -> Self {
        let config = config.clamped();
        Self {
            state: LoopState {
                last_sample_at: 0.0,
                current_target_fps: config.target_fps_max,
                low_power: false,
            },
            config,
            active,
            source,
            presenter,
            clock,
        }
    }

    /// Run one frame of the capture loop.
    ///
    /// `now_ms` is the driver's high-resolution timestamp for this frame;
    /// `document_hidden` must be read fresh by the driver on every call.
    pub fn tick(&mut self, now_ms: f64, document_hidden: bool) -> TickOutcome {
        let interval = frame_interval_ms(self.state.current_target_fps);

        // Nothing is captured while the tab is hidden or mirroring is
        // switched off.
        if document_hidden || !self.active.get() {
            self.presenter.hide();
            return TickOutcome::Suppressed;
        }

        if now_ms - self.state.last_sample_at < interval {
            return TickOutcome::Throttled;
        }
        self.state.last_sample_at = now_ms;

        match self.source.acquire() {
            Ok(false) => {
                self.presenter.hide();
                return TickOutcome::NotReady;
            }
            Err(err) => {
                tracing::warn!("surface resolution failed, skipping tick: {}", err);
                self.presenter.hide();
                return TickOutcome::Failed;
            }
            Ok(true) => {}
        }

        self.presenter.show();
        match self.source.encode(self.config.quality) {
            Ok(data_uri) => self.presenter.set_image(&data_uri),
            Err(err) => {
                tracing::warn!("frame encoding failed, skipping tick: {}", err);
                self.presenter.hide();
                return TickOutcome::Failed;
            }
        }

        let elapsed = self.clock.now_ms() - now_ms;
        self.state.low_power = elapsed > LATENCY_BUDGET_MS;
        self.state.current_target_fps = if self.state.low_power {
            self.config.target_fps_min
        } else {
            self.config.target_fps_max
        };

        TickOutcome::Sampled
    }

    /// The rate the throttle gate is currently honoring. Always exactly
    /// `target_fps_min` or `target_fps_max`.
    pub fn current_target_fps(&self) -> f64 {
        self.state.current_target_fps
    }

    pub fn low_power(&self) -> bool {
        self.state.low_power
    }

    /// Timestamp of the last tick that passed the throttle gate.
    pub fn last_sample_at(&self) -> f64 {
        self.state.last_sample_at
    }
}
