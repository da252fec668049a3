use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Alert,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone)]
pub struct NotificationStore {
    notifications: Vec<Notification>,
    enabled: bool,
}

impl NotificationStore {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self {
            notifications,
            enabled: true,
        }
    }

    pub fn mark_read(&mut self, id: &str) -> Result<Notification> {
        let notification = self
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::not_found("notification", id))?;
        notification.read = true;
        Ok(notification.clone())
    }

    /// Marks everything read and returns how many were unread.
    pub fn mark_all_read(&mut self) -> usize {
        let mut flipped = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            flipped += 1;
        }
        flipped
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    pub fn list(&self) -> Vec<Notification> {
        self.notifications.clone()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

pub fn default_notifications() -> Vec<Notification> {
    let now = Utc::now();
    vec![
        Notification {
            id: "1".to_string(),
            title: "Emergency Alert".to_string(),
            message: "Medical emergency reported at your location. Help is on the way.".to_string(),
            created_at: now - Duration::hours(2),
            read: false,
            kind: NotificationKind::Alert,
        },
        Notification {
            id: "2".to_string(),
            title: "Contact Added".to_string(),
            message: "Jane Smith has been added to your emergency contacts.".to_string(),
            created_at: now - Duration::days(1),
            read: true,
            kind: NotificationKind::Success,
        },
        Notification {
            id: "3".to_string(),
            title: "System Update".to_string(),
            message: "Emergency Beacon has been updated with new features.".to_string(),
            created_at: now - Duration::days(3),
            read: true,
            kind: NotificationKind::Info,
        },
    ]
}

/// Coarse "2 hours ago" style age used by list views.
pub fn format_age(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(ts);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };
    if age.num_seconds() < 60 {
        "just now".to_string()
    } else if age.num_minutes() < 60 {
        plural(age.num_minutes(), "minute")
    } else if age.num_hours() < 24 {
        plural(age.num_hours(), "hour")
    } else {
        plural(age.num_days(), "day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_read() -> anyhow::Result<()> {
        let mut store = NotificationStore::new(default_notifications());
        assert_eq!(store.unread_count(), 1);
        let n = store.mark_read("1")?;
        assert!(n.read);
        assert_eq!(store.unread_count(), 0);
        // second call is harmless
        store.mark_read("1")?;
        assert!(matches!(store.mark_read("9"), Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_mark_all_read_counts_flips() {
        let mut store = NotificationStore::new(default_notifications());
        assert_eq!(store.mark_all_read(), 1);
        assert_eq!(store.mark_all_read(), 0);
        assert!(store.list().iter().all(|n| n.read));
    }

    #[test]
    fn test_enabled_toggle() {
        let mut store = NotificationStore::default();
        assert!(store.enabled());
        store.set_enabled(false);
        assert!(!store.enabled());
        assert!(store.is_empty());
    }

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        assert_eq!(format_age(now, now), "just now");
        assert_eq!(format_age(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_age(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(format_age(now - Duration::days(3), now), "3 days ago");
    }
}
