use std::sync::atomic::{AtomicBool, Ordering};

/// State of the internal sweep trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Running,
}

/// IDLE/RUNNING gate allowing at most one sweep at a time
#[derive(Debug, Default)]
pub struct SweepTrigger {
    running: AtomicBool,
}

impl SweepTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TriggerState {
        if self.running.load(Ordering::Acquire) {
            TriggerState::Running
        } else {
            TriggerState::Idle
        }
    }

    /// Move IDLE -> RUNNING. Returns `None` when a sweep is already running.
    ///
    /// The returned guard moves the trigger back to IDLE when dropped, which
    /// also covers early returns and panics inside the cycle.
    pub fn try_begin(&self) -> Option<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningGuard { trigger: self })
    }
}

pub struct RunningGuard<'a> {
    trigger: &'a SweepTrigger,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.trigger.running.store(false, Ordering::Release);
    }
}
