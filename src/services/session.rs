use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Liveness flag of a mounted view.
///
/// Controllers check it after every `.await`; once ended, late responses are
/// dropped without touching state or raising notifications.
#[derive(Debug, Clone)]
pub struct Session {
    active: Arc<AtomicBool>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn end(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
