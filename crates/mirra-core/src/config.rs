use serde::{Deserialize, Serialize};

/// Frame-sampling parameters for the capture loop.
///
/// Set once at initialization; the running loop never mutates its config.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Sampling rate while the loop keeps up with its latency budget.
    pub target_fps_max: f64,
    /// Sampling rate while in low-power mode.
    pub target_fps_min: f64,
    /// JPEG encoder quality in [0, 1].
    pub quality: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_fps_max: 5.0,
            target_fps_min: 2.0,
            quality: 0.05,
        }
    }
}

impl CaptureConfig {
    /// Force the config into its valid domain: positive fps values with
    /// `target_fps_min <= target_fps_max`, quality clamped to [0, 1].
    pub fn clamped(mut self) -> Self {
        if !(self.target_fps_max > 0.0) {
            self.target_fps_max = Self::default().target_fps_max;
        }
        if !(self.target_fps_min > 0.0) {
            self.target_fps_min = Self::default().target_fps_min;
        }
        if self.target_fps_min > self.target_fps_max {
            self.target_fps_min = self.target_fps_max;
        }
        if !self.quality.is_finite() {
            self.quality = Self::default().quality;
        }
        self.quality = self.quality.clamp(0.0, 1.0);
        self
    }
}

/// Milliseconds between samples at the given rate.
pub fn frame_interval_ms(fps: f64) -> f64 {
    1000.0 / fps
}

/// Full initialization payload for the browser module.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// Project key passed through to the recorder SDK.
    pub project_id: String,
    /// Tag name of the custom element hosting the rendering surface.
    #[serde(default = "default_host_tag")]
    pub host_tag: String,
    #[serde(default)]
    pub capture: CaptureConfig,
}

fn default_host_tag() -> String {
    "flt-glass-pane".to_string()
}

impl BridgeConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            host_tag: default_host_tag(),
            capture: CaptureConfig::default(),
        }
    }
}
