//! The single, self-expiring user notification.
//!
//! At most one notification exists at a time. Creating a new one replaces the
//! current one and restarts the expiry window from zero.

use chrono::{DateTime, Utc};
use std::{
    fmt::{self, Display, Formatter},
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use tracing::{debug, trace};

pub const MESSAGE_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Danger,
    Info,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Success => "success",
            Severity::Danger => "danger",
            Severity::Info => "info",
            Severity::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    text: String,
    severity: Severity,
    created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(text: String, severity: Severity) -> Self {
        Self {
            text,
            severity,
            created_at: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}

/// Cancels a scheduled callback when invoked. Dropping it does nothing.
pub struct CancelHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelHandle {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

pub type Callback = Box<dyn FnOnce() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Runs `callback` once, `delay` from now, unless cancelled first.
    fn schedule(&self, delay: Duration, callback: Callback) -> CancelHandle;
}

/// Schedules on the ambient tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: Callback) -> CancelHandle {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        CancelHandle::new(move || task.abort())
    }
}

#[derive(Default)]
struct Slot {
    current: Option<Notification>,
    // Bumped on every create/remove so a late expiry can't clear a newer message.
    generation: u64,
    pending: Option<CancelHandle>,
}

#[derive(Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Slot>>,
    scheduler: Arc<dyn Scheduler>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_ttl(scheduler, MESSAGE_TTL)
    }

    pub fn with_ttl(scheduler: Arc<dyn Scheduler>, ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            scheduler,
            ttl,
        }
    }

    pub fn create_message(&self, text: &str, severity: Severity) {
        debug!(%severity, "notification: {}", text);
        let generation = {
            let mut slot = lock(&self.slot);
            if let Some(pending) = slot.pending.take() {
                pending.cancel();
            }
            slot.generation += 1;
            slot.current = Some(Notification::new(text.to_owned(), severity));
            slot.generation
        };

        // Scheduled outside the lock in case the scheduler runs callbacks inline.
        let weak = Arc::downgrade(&self.slot);
        let handle = self
            .scheduler
            .schedule(self.ttl, Box::new(move || expire(weak, generation)));

        let mut slot = lock(&self.slot);
        if slot.generation == generation && slot.current.is_some() {
            slot.pending = Some(handle);
        } else {
            drop(slot);
            handle.cancel();
        }
    }

    pub fn remove_message(&self) {
        let mut slot = lock(&self.slot);
        if let Some(pending) = slot.pending.take() {
            pending.cancel();
        }
        slot.generation += 1;
        slot.current = None;
    }

    pub fn message(&self) -> Option<Notification> {
        lock(&self.slot).current.clone()
    }
}

fn expire(slot: Weak<Mutex<Slot>>, generation: u64) {
    if let Some(slot) = slot.upgrade() {
        let mut slot = lock(&slot);
        if slot.generation == generation {
            trace!("notification expired");
            slot.current = None;
            slot.pending = None;
        }
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}
