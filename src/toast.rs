//! Toast notifications: short-lived UI messages with timed expiry.
//!
//! A `ToastQueue` is an explicit value handed to whoever needs to post or
//! read messages; clones share the same queue. Nothing here is persisted.
//!
//! Expiry works two ways. Each toast records a deadline, and readers prune
//! past-deadline entries. When a tokio runtime is running, `show` also
//! spawns a timer that removes the toast once its duration elapses. That
//! timer is never cancelled, so `remove` must stay idempotent.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::DEFAULT_TOAST_DURATION_MS;
use crate::models::ToastType;

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: u64,
    #[serde(rename = "type")]
    pub toast_type: ToastType,
    pub message: String,
    pub visible: bool,
    #[serde(skip)]
    expires_at: Instant,
}

#[derive(Default)]
struct QueueState {
    toasts: Vec<Toast>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct ToastQueue {
    state: Arc<Mutex<QueueState>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Posts a toast that disappears after `duration`. Returns its id.
    pub fn show(&self, toast_type: ToastType, message: impl Into<String>, duration: Duration) -> u64 {
        let id = {
            let mut state = self.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.toasts.push(Toast {
                id,
                toast_type,
                message: message.into(),
                visible: true,
                expires_at: Instant::now() + duration,
            });
            id
        };

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let queue = self.clone();
            handle.spawn(async move {
                tokio::time::sleep(duration).await;
                queue.remove(id);
            });
        }

        tracing::trace!(id, %toast_type, "Toast shown");
        id
    }

    /// Posts a toast with the default three-second lifetime.
    pub fn show_default(&self, toast_type: ToastType, message: impl Into<String>) -> u64 {
        self.show(
            toast_type,
            message,
            Duration::from_millis(DEFAULT_TOAST_DURATION_MS),
        )
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show_default(ToastType::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show_default(ToastType::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.show_default(ToastType::Info, message)
    }

    /// Removes the toast with `id` if it is still queued.
    pub fn remove(&self, id: u64) -> bool {
        let mut state = self.lock();
        match state.toasts.iter().position(|t| t.id == id) {
            Some(index) => {
                state.toasts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every toast whose deadline is at or before `now`.
    /// Returns how many were dropped.
    pub fn expire(&self, now: Instant) -> usize {
        let mut state = self.lock();
        let before = state.toasts.len();
        state.toasts.retain(|t| t.expires_at > now);
        before - state.toasts.len()
    }

    /// Live toasts, oldest first.
    pub fn visible(&self) -> Vec<Toast> {
        self.expire(Instant::now());
        self.lock().toasts.clone()
    }

    /// Takes every queued toast, expired or not.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut self.lock().toasts)
    }

    /// Number of queued toasts, without pruning.
    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(60);

    #[test]
    fn ids_are_monotonic() {
        let queue = ToastQueue::new();
        let a = queue.show(ToastType::Success, "saved", LONG);
        let b = queue.show(ToastType::Error, "failed", LONG);
        let c = queue.show(ToastType::Info, "note", LONG);
        assert_eq!((a, b, c), (0, 1, 2));
    }

    #[test]
    fn ids_keep_counting_after_removal() {
        let queue = ToastQueue::new();
        let a = queue.show(ToastType::Info, "one", LONG);
        queue.remove(a);
        let b = queue.show(ToastType::Info, "two", LONG);
        assert!(b > a);
    }

    #[test]
    fn remove_is_idempotent() {
        let queue = ToastQueue::new();
        let id = queue.success("saved");
        assert!(queue.remove(id));
        assert!(!queue.remove(id));
        assert!(!queue.remove(999));
        assert!(queue.is_empty());
    }

    #[test]
    fn expire_drops_only_past_deadlines() {
        let queue = ToastQueue::new();
        queue.show(ToastType::Info, "short", Duration::from_millis(10));
        queue.show(ToastType::Info, "long", LONG);

        let later = Instant::now() + Duration::from_secs(1);
        assert_eq!(queue.expire(later), 1);

        let left = queue.visible();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].message, "long");
        assert!(left[0].visible);
    }

    #[test]
    fn clones_share_the_queue() {
        let queue = ToastQueue::new();
        let other = queue.clone();
        other.error("boom");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain()[0].toast_type, ToastType::Error);
        assert!(other.is_empty());
    }

    #[test]
    fn serializes_type_field() {
        let queue = ToastQueue::new();
        queue.info("hello");
        let json = serde_json::to_value(&queue.visible()[0]).unwrap();
        assert_eq!(json["type"], "info");
        assert_eq!(json["message"], "hello");
        assert_eq!(json["id"], 0);
        assert!(json.get("expires_at").is_none());
    }

    #[tokio::test]
    async fn timer_removes_toast_after_duration() {
        let queue = ToastQueue::new();
        let id = queue.show(ToastType::Success, "saved", Duration::from_millis(20));
        assert_eq!(queue.len(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(queue.len(), 0);
        // Manual removal after the timer fired is harmless
        assert!(!queue.remove(id));
    }

    #[tokio::test]
    async fn early_manual_removal_then_timer_is_harmless() {
        let queue = ToastQueue::new();
        let id = queue.show(ToastType::Info, "bye", Duration::from_millis(20));
        let keep = queue.show(ToastType::Info, "stay", LONG);
        assert!(queue.remove(id));

        tokio::time::sleep(Duration::from_millis(100)).await;
        let left = queue.visible();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, keep);
    }
}
