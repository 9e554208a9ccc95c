//! End-to-end scenarios for the capture loop, driven through the public API
//! the way the browser module drives it: one tick per simulated display frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mirra_core::{
    ActivationFlag, CaptureConfig, FramePresenter, FrameSource, MirraError, MirraResult,
    SampleClock, Sampler, TickOutcome,
};

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Clone, Default)]
struct SharedClock(Rc<Cell<f64>>);

impl SampleClock for SharedClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

#[derive(Clone, Default)]
struct RecordingPresenter {
    visible: Rc<Cell<bool>>,
    images: Rc<RefCell<Vec<String>>>,
}

impl FramePresenter for RecordingPresenter {
    fn show(&mut self) {
        self.visible.set(true);
    }
    fn hide(&mut self) {
        self.visible.set(false);
    }
    fn set_image(&mut self, data_uri: &str) {
        self.images.borrow_mut().push(data_uri.to_string());
    }
}

#[derive(Clone)]
struct ScriptedSurface {
    width: Rc<Cell<u32>>,
    encode_cost_ms: Rc<Cell<f64>>,
    tainted: Rc<Cell<bool>>,
    frame_counter: Rc<Cell<u64>>,
    clock: SharedClock,
}

impl FrameSource for ScriptedSurface {
    fn acquire(&mut self) -> MirraResult<bool> {
        Ok(self.width.get() > 0)
    }

    fn encode(&mut self, quality: f64) -> MirraResult<String> {
        self.clock
            .0
            .set(self.clock.0.get() + self.encode_cost_ms.get());
        if self.tainted.get() {
            return Err(MirraError::encode("cross-origin pixel data"));
        }
        let n = self.frame_counter.get();
        self.frame_counter.set(n + 1);
        Ok(format!("data:image/jpeg;q={quality};frame={n}"))
    }
}

struct Page {
    sampler: Sampler,
    flag: ActivationFlag,
    clock: SharedClock,
    presenter: RecordingPresenter,
    surface: ScriptedSurface,
    now: f64,
}

impl Page {
    fn open(config: CaptureConfig) -> Self {
        let clock = SharedClock::default();
        let presenter = RecordingPresenter::default();
        let surface = ScriptedSurface {
            width: Rc::new(Cell::new(800)),
            encode_cost_ms: Rc::new(Cell::new(4.0)),
            tainted: Rc::new(Cell::new(false)),
            frame_counter: Rc::new(Cell::new(0)),
            clock: clock.clone(),
        };
        let flag = ActivationFlag::new();
        let sampler = Sampler::new(
            config,
            flag.clone(),
            Box::new(surface.clone()),
            Box::new(presenter.clone()),
            Box::new(clock.clone()),
        );
        Self {
            sampler,
            flag,
            clock,
            presenter,
            surface,
            now: 0.0,
        }
    }

    /// Run `frames` display frames at 60 Hz, tallying outcomes.
    fn run(&mut self, frames: usize, hidden: bool) -> Vec<TickOutcome> {
        let mut outcomes = Vec::with_capacity(frames);
        for _ in 0..frames {
            self.now += FRAME_MS;
            self.clock.0.set(self.now);
            outcomes.push(self.sampler.tick(self.now, hidden));
        }
        outcomes
    }

    fn sampled(outcomes: &[TickOutcome]) -> usize {
        outcomes
            .iter()
            .filter(|o| **o == TickOutcome::Sampled)
            .count()
    }
}

#[test]
fn test_full_session_produces_steady_sample_stream() {
    let mut page = Page::open(CaptureConfig::default());
    page.flag.set(true);

    // Two seconds of display frames at the 5 fps ceiling.
    let outcomes = page.run(120, false);
    let sampled = Page::sampled(&outcomes);
    assert!(
        (9..=10).contains(&sampled),
        "expected ~10 samples over 2s at 5 fps, got {sampled}"
    );
    assert!(page.presenter.visible.get());

    // Every presented frame carries the configured quality.
    let images = page.presenter.images.borrow();
    assert_eq!(images.len(), sampled);
    assert!(images.iter().all(|uri| uri.contains("q=0.05")));
}

#[test]
fn test_inactive_page_never_samples() {
    let mut page = Page::open(CaptureConfig::default());
    // Flag stays at its default (off).
    let outcomes = page.run(120, false);
    assert_eq!(Page::sampled(&outcomes), 0);
    assert!(outcomes.iter().all(|o| *o == TickOutcome::Suppressed));
    assert!(!page.presenter.visible.get());
}

#[test]
fn test_hidden_tab_suppresses_and_recovers() {
    let mut page = Page::open(CaptureConfig::default());
    page.flag.set(true);

    page.run(60, false);
    assert!(page.presenter.visible.get());

    page.run(60, true);
    assert!(!page.presenter.visible.get());

    let outcomes = page.run(60, false);
    assert!(Page::sampled(&outcomes) > 0);
    assert!(page.presenter.visible.get());
}

#[test]
fn test_expensive_scene_degrades_to_min_rate_and_recovers() {
    let mut page = Page::open(CaptureConfig::default());
    page.flag.set(true);

    // Cheap frames run at the ceiling.
    page.run(120, false);
    assert_eq!(page.sampler.current_target_fps(), 5.0);

    // An expensive scene blows the 50ms budget; rate drops to the floor.
    page.surface.encode_cost_ms.set(90.0);
    page.run(120, false);
    assert!(page.sampler.low_power());
    assert_eq!(page.sampler.current_target_fps(), 2.0);

    // Back under budget, the next sample restores the ceiling.
    page.surface.encode_cost_ms.set(4.0);
    page.run(60, false);
    assert!(!page.sampler.low_power());
    assert_eq!(page.sampler.current_target_fps(), 5.0);
}

#[test]
fn test_low_power_rate_halves_sample_count() {
    let mut page = Page::open(CaptureConfig::default());
    page.flag.set(true);
    page.surface.encode_cost_ms.set(90.0);

    // After the first over-budget sample the gate runs at 2 fps.
    let outcomes = page.run(240, false);
    let sampled = Page::sampled(&outcomes);
    assert!(
        (8..=10).contains(&sampled),
        "expected ~8 samples over 4s at 2 fps, got {sampled}"
    );
}

#[test]
fn test_tainted_canvas_never_terminates_the_loop() {
    let mut page = Page::open(CaptureConfig::default());
    page.flag.set(true);
    page.surface.tainted.set(true);

    let outcomes = page.run(240, false);
    assert_eq!(Page::sampled(&outcomes), 0);
    assert!(outcomes.contains(&TickOutcome::Failed));
    assert!(!page.presenter.visible.get());

    // The taint clears (e.g. the offending layer is gone); capture resumes.
    page.surface.tainted.set(false);
    let outcomes = page.run(60, false);
    assert!(Page::sampled(&outcomes) > 0);
    assert!(page.presenter.visible.get());
}

#[test]
fn test_surface_teardown_and_recreation() {
    let mut page = Page::open(CaptureConfig::default());
    page.flag.set(true);

    page.run(60, false);
    assert!(page.presenter.visible.get());

    // Host surface torn down mid-session.
    page.surface.width.set(0);
    let outcomes = page.run(60, false);
    assert!(outcomes.contains(&TickOutcome::NotReady));
    assert!(!page.presenter.visible.get());

    // Recreated with a fresh buffer.
    page.surface.width.set(1024);
    let outcomes = page.run(60, false);
    assert!(Page::sampled(&outcomes) > 0);
    assert!(page.presenter.visible.get());
}

#[test]
fn test_presented_frames_are_monotonic() {
    let mut page = Page::open(CaptureConfig::default());
    page.flag.set(true);
    page.run(240, false);

    let images = page.presenter.images.borrow();
    let frames: Vec<u64> = images
        .iter()
        .map(|uri| {
            uri.rsplit("frame=")
                .next()
                .and_then(|n| n.parse().ok())
                .expect("frame counter in test uri")
        })
        .collect();
    assert!(frames.windows(2).all(|w| w[1] == w[0] + 1));
}
