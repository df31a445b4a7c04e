use crate::core::notifications::{MessageKind, NotificationMessage};
use chrono::Utc;

#[derive(Debug, Clone, PartialEq)]
pub struct InboxEntry {
    pub id: String,
    pub read: bool,
    pub message: NotificationMessage,
}

impl InboxEntry {
    pub fn title(&self) -> String {
        NotificationCenter::title_for(&self.message)
    }

    pub fn body(&self) -> String {
        NotificationCenter::body_for(&self.message)
    }
}

/// Notification center: newest first, with read tracking.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    entries: Vec<InboxEntry>,
    sequence: u64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: NotificationMessage) -> String {
        self.sequence += 1;
        let id = format!("{}-{}", Utc::now().timestamp_millis(), self.sequence);
        self.entries.insert(
            0,
            InboxEntry {
                id: id.clone(),
                read: false,
                message,
            },
        );
        id
    }

    pub fn title_for(message: &NotificationMessage) -> String {
        message.describe().0
    }

    pub fn body_for(message: &NotificationMessage) -> String {
        message.describe().1
    }

    pub fn entries(&self) -> &[InboxEntry] {
        &self.entries
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.read).count()
    }

    pub fn unread_of_kind(&self, kind: MessageKind) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.read && e.message.kind == kind)
            .count()
    }

    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for entry in &mut self.entries {
            entry.read = true;
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(kind: MessageKind, id: &str) -> NotificationMessage {
        NotificationMessage {
            kind,
            data: serde_json::json!({"id": id}),
            timestamp: "2025-05-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_newest_first_and_unique_ids() {
        let mut center = NotificationCenter::new();
        let first = center.push(message(MessageKind::BookingUpdated, "B1"));
        let second = center.push(message(MessageKind::BookingCancelled, "B2"));

        assert_ne!(first, second);
        assert_eq!(center.entries()[0].id, second);
        assert_eq!(center.entries()[0].body(), "Booking #B2 was cancelled");
        assert_eq!(center.unread_count(), 2);
        assert_eq!(center.unread_of_kind(MessageKind::BookingCancelled), 1);
    }

    #[test]
    fn test_read_tracking() {
        let mut center = NotificationCenter::new();
        let a = center.push(message(MessageKind::BookingUpdated, "B1"));
        center.push(message(MessageKind::BookingUpdated, "B2"));
        center.push(message(MessageKind::SystemNotification, "S1"));

        assert!(center.mark_as_read(&a));
        assert!(!center.mark_as_read("missing"));
        assert_eq!(center.unread_count(), 2);

        assert!(center.remove(&a));
        assert_eq!(center.entries().len(), 2);
        assert_eq!(center.unread_count(), 2);

        center.mark_all_as_read();
        assert_eq!(center.unread_count(), 0);

        center.clear();
        assert!(center.entries().is_empty());
    }
}
