use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Advisory cancel flag shared by the caller and the batch coordinator.
///
/// Setting it never interrupts in-flight requests; jobs that have not started
/// yet report `Cancelled` and the end-of-batch summary is suppressed.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
