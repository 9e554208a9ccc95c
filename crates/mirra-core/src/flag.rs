use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared on/off switch for the capture loop.
///
/// The only external control surface into a running loop: the embedding layer
/// keeps one clone and flips it from anywhere, the sampler reads it fresh on
/// every tick. Starts inactive.
#[derive(Debug, Clone, Default)]
pub struct ActivationFlag(Arc<AtomicBool>);

impl ActivationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, active: bool) {
        self.0.store(active, Ordering::Relaxed);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_inactive() {
        assert!(!ActivationFlag::new().get());
    }

    #[test]
    fn test_set_visible_across_clones() {
        let flag = ActivationFlag::new();
        let writer = flag.clone();
        writer.set(true);
        assert!(flag.get());
        writer.set(false);
        assert!(!flag.get());
    }
}
