//! NotificationQueue - transient toast messages with a bounded queue.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// Short label used by the terminal renderer.
    pub fn label(self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "ok",
            NotificationKind::Warning => "warn",
            NotificationKind::Error => "error",
        }
    }
}

/// Lifecycle phase of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    /// Inserted but not yet shown.
    Entering,
    /// Fully visible.
    Shown,
    /// Hide transition running; removed when it completes.
    Leaving,
}

/// A single transient message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
    pub phase: NotificationPhase,
}

/// Timing of the notification lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTiming {
    /// Delay between insertion and the shown state.
    pub show_delay: Duration,
    /// Time from insertion until the hide transition starts.
    pub duration: Duration,
    /// Length of the hide transition.
    pub hide_transition: Duration,
}

impl Default for NotificationTiming {
    fn default() -> Self {
        Self {
            show_delay: Duration::from_millis(100),
            duration: Duration::from_millis(3000),
            hide_transition: Duration::from_millis(300),
        }
    }
}

/// Bounded queue of notifications.
///
/// When full, pushing evicts the oldest notification. All methods take the
/// current instant explicitly so the lifecycle is driven by the caller's clock.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    capacity: usize,
    timing: NotificationTiming,
    next_id: u64,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl NotificationQueue {
    /// Default number of notifications kept at once.
    pub const DEFAULT_CAPACITY: usize = 3;

    /// Create a queue with default timing. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self::with_timing(capacity, NotificationTiming::default())
    }

    pub fn with_timing(capacity: usize, timing: NotificationTiming) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            timing,
            next_id: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn timing(&self) -> NotificationTiming {
        self.timing
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert a notification, evicting the oldest if the queue is full.
    ///
    /// Returns the new notification's id.
    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) -> u64 {
        while self.items.len() >= self.capacity {
            if let Some(evicted) = self.items.pop_front() {
                log::debug!("Evicting notification {}: {}", evicted.id, evicted.message);
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        log::debug!("Notification {} ({}): {}", id, kind.label(), message);

        self.items.push_back(Notification {
            id,
            kind,
            message,
            created_at: now,
            phase: NotificationPhase::Entering,
        });
        id
    }

    /// Advance lifecycles to `now` and drop notifications whose hide
    /// transition has finished.
    pub fn tick(&mut self, now: Instant) {
        let timing = self.timing;
        self.items.retain_mut(|item| {
            let age = now.saturating_duration_since(item.created_at);
            if age >= timing.duration + timing.hide_transition {
                return false;
            }
            item.phase = if age >= timing.duration {
                NotificationPhase::Leaving
            } else if age >= timing.show_delay {
                NotificationPhase::Shown
            } else {
                NotificationPhase::Entering
            };
            true
        });
    }

    /// Remove a notification early.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// All notifications still in the queue, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    /// Notifications currently in the shown phase, oldest first.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.items
            .iter()
            .filter(|item| item.phase == NotificationPhase::Shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_push_starts_entering() {
        let now = Instant::now();
        let mut queue = NotificationQueue::default();
        let id = queue.push(NotificationKind::Info, "hello", now);
        let item = queue.iter().next().unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.phase, NotificationPhase::Entering);
        assert_eq!(queue.visible().count(), 0);
    }

    #[test]
    fn test_lifecycle_phases() {
        let start = Instant::now();
        let mut queue = NotificationQueue::default();
        queue.push(NotificationKind::Success, "done", start);

        queue.tick(start + ms(99));
        assert_eq!(queue.iter().next().unwrap().phase, NotificationPhase::Entering);

        queue.tick(start + ms(100));
        assert_eq!(queue.visible().count(), 1);

        queue.tick(start + ms(3000));
        assert_eq!(queue.iter().next().unwrap().phase, NotificationPhase::Leaving);
        assert_eq!(queue.visible().count(), 0);

        queue.tick(start + ms(3299));
        assert_eq!(queue.len(), 1);

        queue.tick(start + ms(3300));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_evicts_oldest_first() {
        let now = Instant::now();
        let mut queue = NotificationQueue::new(3);
        for i in 0..5 {
            queue.push(NotificationKind::Info, format!("msg {}", i), now + ms(i));
        }
        assert_eq!(queue.len(), 3);
        let messages: Vec<_> = queue.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["msg 2", "msg 3", "msg 4"]);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let now = Instant::now();
        let mut queue = NotificationQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.push(NotificationKind::Info, "a", now);
        queue.push(NotificationKind::Info, "b", now);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().unwrap().message, "b");
    }

    #[test]
    fn test_ids_are_unique_across_evictions() {
        let now = Instant::now();
        let mut queue = NotificationQueue::new(1);
        let a = queue.push(NotificationKind::Info, "a", now);
        let b = queue.push(NotificationKind::Info, "b", now);
        assert_ne!(a, b);
    }

    #[test]
    fn test_dismiss() {
        let now = Instant::now();
        let mut queue = NotificationQueue::default();
        let a = queue.push(NotificationKind::Warning, "a", now);
        queue.push(NotificationKind::Error, "b", now);
        assert!(queue.dismiss(a));
        assert!(!queue.dismiss(a));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_custom_timing() {
        let start = Instant::now();
        let timing = NotificationTiming {
            show_delay: Duration::ZERO,
            duration: ms(500),
            hide_transition: ms(100),
        };
        let mut queue = NotificationQueue::with_timing(2, timing);
        queue.push(NotificationKind::Info, "quick", start);
        queue.tick(start);
        assert_eq!(queue.visible().count(), 1);
        queue.tick(start + ms(600));
        assert!(queue.is_empty());
    }
}
