//! Notification log - Keeps recent user-facing notifications for the host

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::ports::outbound::{Notification, NotificationLevel, NotificationPort};

/// Bounded log of notifications, newest last
pub struct NotificationLog {
    capacity: usize,
    entries: Mutex<VecDeque<Notification>>,
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn recent(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

impl NotificationPort for NotificationLog {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Warning => tracing::warn!("{}", notification.message),
            NotificationLevel::Error => tracing::error!("{}", notification.message),
        }

        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_drops_oldest_when_full() {
        let log = NotificationLog::new(2);
        log.notify(Notification::warning("first"));
        log.notify(Notification::error("second"));
        log.notify(Notification::error("third"));

        let messages: Vec<String> = log.recent().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["second".to_string(), "third".to_string()]);
    }
}
