use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Failed,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: NotificationKind,
    pub message: String,
}

/// Notifications newest first, with an unread counter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotificationCenter {
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at the front. A notification with a known id replaces the old entry.
    pub fn add(&mut self, notification: Notification) {
        self.items.retain(|existing| existing.id != notification.id);
        self.items.insert(0, notification);
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    /// Returns `true` if an unread notification flipped to read.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Notification> {
        let index = self.items.iter().position(|n| n.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }
}

/// Relative label for a notification timestamp, both values in epoch seconds.
pub fn time_ago(timestamp: f64, now: f64) -> String {
    let seconds = (now - timestamp).floor() as i64;
    if seconds < 5 {
        return "Just now".to_string();
    }
    if seconds < 60 {
        return format!("{seconds} seconds ago");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} min ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        let suffix = if hours > 1 { "s" } else { "" };
        return format!("{hours} hr{suffix} ago");
    }
    let days = hours / 24;
    let suffix = if days > 1 { "s" } else { "" };
    format!("{days} day{suffix} ago")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: &str, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            message: format!("message {id}"),
            kind: NotificationKind::Info,
            read,
            timestamp: 0.0,
            url: None,
        }
    }

    #[test]
    fn newest_first_and_unread_count() {
        let mut center = NotificationCenter::new();
        center.add(notification("a", false));
        center.add(notification("b", true));
        center.add(notification("c", false));

        let ids: Vec<_> = center.items().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(center.unread_count(), 2);
    }

    #[test]
    fn mark_read_only_counts_once() {
        let mut center = NotificationCenter::new();
        center.add(notification("a", false));
        assert!(center.mark_read("a"));
        assert!(!center.mark_read("a"));
        assert!(!center.mark_read("missing"));
        assert_eq!(center.unread_count(), 0);
    }

    #[test]
    fn wire_shape_parses() {
        let parsed: Notification = serde_json::from_str(
            r#"{"id":"n1","message":"Dataset prepared","type":"success","read":false,"timestamp":1700000000.5,"url":"/datasets/ui/display/3"}"#,
        )
        .unwrap();
        assert_eq!(parsed.kind, NotificationKind::Success);
        assert_eq!(parsed.url.as_deref(), Some("/datasets/ui/display/3"));
    }

    #[test]
    fn time_ago_buckets() {
        assert_eq!(time_ago(100.0, 102.0), "Just now");
        assert_eq!(time_ago(100.0, 130.0), "30 seconds ago");
        assert_eq!(time_ago(0.0, 5.0 * 60.0), "5 min ago");
        assert_eq!(time_ago(0.0, 3600.0), "1 hr ago");
        assert_eq!(time_ago(0.0, 3.0 * 3600.0), "3 hrs ago");
        assert_eq!(time_ago(0.0, 24.0 * 3600.0), "1 day ago");
        assert_eq!(time_ago(0.0, 72.0 * 3600.0), "3 days ago");
    }

    #[test]
    fn future_timestamp_is_just_now() {
        assert_eq!(time_ago(200.0, 100.0), "Just now");
    }
}
