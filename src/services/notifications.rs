use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// The banner slot. Holds at most one notification; ids only ever grow so a
/// late expiry for an older one can be told apart from the current one.
#[derive(Debug, Default)]
pub struct NotificationState {
    current: Option<Notification>,
    last_id: u64,
}

impl NotificationState {
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        self.last_id += 1;
        self.current = Some(Notification {
            id: self.last_id,
            message: message.into(),
            severity,
        });
        self.last_id
    }

    /// Clears the slot only if `id` is still the one shown.
    pub fn expire(&mut self, id: u64) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn dismiss(&mut self) -> Option<Notification> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}

struct Slot {
    state: NotificationState,
    hide_task: Option<AbortHandle>,
}

impl Slot {
    fn cancel_hide(&mut self) {
        if let Some(task) = self.hide_task.take() {
            task.abort();
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.cancel_hide();
    }
}

/// Shared handle to the single-slot banner with timed auto-hide.
#[derive(Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Slot>>,
    hide_after: Duration,
}

impl Notifier {
    pub fn new(hide_after: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                state: NotificationState::default(),
                hide_task: None,
            })),
            hide_after,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn show(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let mut slot = self.lock();
        slot.cancel_hide();

        let id = slot.state.show(message, severity);
        tracing::debug!("notification {} ({}) shown", id, severity.label());

        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                let deadline = Instant::now() + self.hide_after;
                let weak = Arc::downgrade(&self.slot);
                let task = rt.spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    expire(&weak, id);
                });
                slot.hide_task = Some(task.abort_handle());
            }
            Err(_) => {
                tracing::warn!("no async runtime, notification {} stays until dismissed", id);
            }
        }

        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Error)
    }

    pub fn dismiss(&self) -> Option<Notification> {
        let mut slot = self.lock();
        slot.cancel_hide();
        slot.state.dismiss()
    }

    pub fn current(&self) -> Option<Notification> {
        self.lock().state.current().cloned()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("current", &self.current())
            .field("hide_after", &self.hide_after)
            .finish()
    }
}

fn expire(slot: &Weak<Mutex<Slot>>, id: u64) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.state.expire(id) {
        slot.hide_task = None;
        tracing::debug!("notification {} expired", id);
    }
}
