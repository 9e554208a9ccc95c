//! # mirra-core
//!
//! Core capture-loop logic for the Mirra canvas mirroring bridge.
//! This crate contains the browser-independent pieces: configuration, the
//! shared activation flag, error types, and the adaptive frame-rate sampler,
//! expressed against traits at the environment seams so the loop is testable
//! without a DOM.

pub mod config;
pub mod error;
pub mod flag;
pub mod sampler;

pub use config::{frame_interval_ms, BridgeConfig, CaptureConfig};
pub use error::{MirraError, MirraResult};
pub use flag::ActivationFlag;
pub use sampler::{
    FramePresenter, FrameSource, SampleClock, Sampler, TickOutcome, LATENCY_BUDGET_MS,
};
