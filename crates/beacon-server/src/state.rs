use crate::dispatch::DispatchRegistry;
use crate::metrics;
use beacon_core::{
    default_contacts, default_history, default_notifications, Alert, AlertCategory, AlertManager,
    AlertStatus, Contact, ContactStore, NewContact, Notification, NotificationStore, SettingKey,
    Settings,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

const EVENT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UiEvent {
    EmergencyRequested { dispatch_id: u64, category: AlertCategory },
    DispatchCancelled { dispatch_id: u64 },
    AlertTriggered { id: String, category: AlertCategory },
    AlertResolved { id: String },
    LocationResolved { location: String },
    ContactAdded { name: String },
    ContactRemoved { name: String },
    NotificationsRead { count: usize },
    SettingChanged { key: SettingKey, value: bool },
    Error(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct UiEventLogEntry {
    pub timestamp: chrono::DateTime<Utc>,
    pub event: UiEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "address", rename_all = "lowercase")]
pub enum LocationState {
    Determining,
    Resolved(String),
}

/// Seed data the stores start from.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub alerts: Vec<Alert>,
    pub contacts: Vec<Contact>,
    pub notifications: Vec<Notification>,
}

impl SeedData {
    pub fn builtin() -> Self {
        Self {
            alerts: default_history(),
            contacts: default_contacts(),
            notifications: default_notifications(),
        }
    }

    pub fn empty() -> Self {
        Self {
            alerts: Vec::new(),
            contacts: Vec::new(),
            notifications: Vec::new(),
        }
    }
}

/// Single source of truth shared by the HTTP API and the terminal UI.
///
/// Each store sits behind its own lock; every operation takes the lock once,
/// so readers never see a half-applied change.
#[derive(Clone)]
pub struct AppState {
    pub alerts: Arc<RwLock<AlertManager>>,
    pub contacts: Arc<RwLock<ContactStore>>,
    pub notifications: Arc<RwLock<NotificationStore>>,
    pub settings: Arc<RwLock<Settings>>,
    pub location: Arc<RwLock<LocationState>>,
    pub dispatches: DispatchRegistry,
    pub event_log: Arc<RwLock<VecDeque<UiEventLogEntry>>>,
    pub fallback_location: Arc<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(seed: SeedData, fallback_location: String) -> Self {
        let alerts = AlertManager::with_history(seed.alerts);
        metrics::set_active_alerts(alerts.active_count());
        Self {
            alerts: Arc::new(RwLock::new(alerts)),
            contacts: Arc::new(RwLock::new(ContactStore::with_contacts(seed.contacts))),
            notifications: Arc::new(RwLock::new(NotificationStore::new(seed.notifications))),
            settings: Arc::new(RwLock::new(Settings::default())),
            location: Arc::new(RwLock::new(LocationState::Determining)),
            dispatches: DispatchRegistry::default(),
            event_log: Arc::new(RwLock::new(VecDeque::new())),
            fallback_location: Arc::new(fallback_location),
            start_time: Instant::now(),
        }
    }

    pub async fn trigger_alert(&self, category: &str, location: &str) -> beacon_core::Result<Alert> {
        let (alert, active) = {
            let mut alerts = self.alerts.write().await;
            let alert = alerts.trigger(category, location)?;
            (alert, alerts.active_count())
        };
        metrics::record_alert_triggered(alert.category);
        metrics::set_active_alerts(active);
        self.push_event(UiEvent::AlertTriggered {
            id: alert.id.clone(),
            category: alert.category,
        })
        .await;
        Ok(alert)
    }

    pub async fn resolve_alert(&self, id: &str) -> beacon_core::Result<Alert> {
        let (alert, was_active, active) = {
            let mut alerts = self.alerts.write().await;
            let was_active = alerts.get(id).is_some_and(|a| a.is_active());
            let alert = alerts.resolve(id)?;
            (alert, was_active, alerts.active_count())
        };
        if was_active {
            metrics::record_alert_resolved();
            metrics::set_active_alerts(active);
            self.push_event(UiEvent::AlertResolved { id: alert.id.clone() }).await;
        }
        Ok(alert)
    }

    pub async fn list_alerts(&self, status: Option<AlertStatus>) -> Vec<Alert> {
        self.alerts.read().await.list_by_status(status)
    }

    pub async fn add_contact(&self, new: NewContact) -> beacon_core::Result<Contact> {
        let contact = self.contacts.write().await.add(new)?;
        self.push_event(UiEvent::ContactAdded {
            name: contact.name.clone(),
        })
        .await;
        Ok(contact)
    }

    pub async fn delete_contact(&self, id: &str) -> beacon_core::Result<Contact> {
        let contact = self.contacts.write().await.delete(id)?;
        self.push_event(UiEvent::ContactRemoved {
            name: contact.name.clone(),
        })
        .await;
        Ok(contact)
    }

    pub async fn mark_notification_read(&self, id: &str) -> beacon_core::Result<Notification> {
        let notification = self.notifications.write().await.mark_read(id)?;
        self.push_event(UiEvent::NotificationsRead { count: 1 }).await;
        Ok(notification)
    }

    pub async fn mark_all_notifications_read(&self) -> usize {
        let count = self.notifications.write().await.mark_all_read();
        if count > 0 {
            self.push_event(UiEvent::NotificationsRead { count }).await;
        }
        count
    }

    pub async fn set_notifications_enabled(&self, enabled: bool) {
        self.notifications.write().await.set_enabled(enabled);
    }

    pub async fn set_setting(&self, key: SettingKey, value: bool) -> Settings {
        let settings = {
            let mut settings = self.settings.write().await;
            settings.set(key, value);
            settings.clone()
        };
        self.push_event(UiEvent::SettingChanged { key, value }).await;
        settings
    }

    pub async fn toggle_setting(&self, key: SettingKey) -> bool {
        let value = self.settings.write().await.toggle(key);
        self.push_event(UiEvent::SettingChanged { key, value }).await;
        value
    }

    pub async fn set_location(&self, address: String) {
        *self.location.write().await = LocationState::Resolved(address.clone());
        self.push_event(UiEvent::LocationResolved { location: address }).await;
    }

    /// Address attached to new alerts: the resolved location, or the
    /// configured placeholder while the lookup is still running.
    pub async fn trigger_location(&self) -> String {
        match &*self.location.read().await {
            LocationState::Resolved(address) => address.clone(),
            LocationState::Determining => self.fallback_location.as_ref().clone(),
        }
    }

    pub async fn push_event(&self, event: UiEvent) {
        let mut log = self.event_log.write().await;
        log.push_back(UiEventLogEntry {
            timestamp: Utc::now(),
            event,
        });
        while log.len() > EVENT_LOG_CAPACITY {
            log.pop_front();
        }
    }

    pub async fn get_events(&self, limit: usize) -> Vec<UiEventLogEntry> {
        let log = self.event_log.read().await;
        let start = log.len().saturating_sub(limit);
        log.iter().skip(start).cloned().collect()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    fn state() -> AppState {
        AppState::new(SeedData::builtin(), "1 Test Way".to_string())
    }

    #[test]
    fn test_new_state_publishes_active_alert_gauge() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        ::metrics::with_local_recorder(&recorder, state);
        assert!(handle.render().contains("active_alerts 0"));
    }

    #[tokio::test]
    async fn test_trigger_visible_on_next_read() {
        let state = state();
        let alert = state.trigger_alert("fire", "9 Ash St").await.unwrap();
        let alerts = state.list_alerts(None).await;
        assert_eq!(alerts[0].id, alert.id);
        assert_eq!(state.list_alerts(Some(AlertStatus::Active)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_logs_only_real_transitions() {
        let state = state();
        let alert = state.trigger_alert("sos", "9 Ash St").await.unwrap();
        state.resolve_alert(&alert.id).await.unwrap();
        state.resolve_alert(&alert.id).await.unwrap();

        let resolved = state
            .get_events(10)
            .await
            .into_iter()
            .filter(|e| matches!(e.event, UiEvent::AlertResolved { .. }))
            .count();
        assert_eq!(resolved, 1);
    }

    #[tokio::test]
    async fn test_failed_trigger_leaves_no_event() {
        let state = state();
        assert!(state.trigger_alert("flood", "9 Ash St").await.is_err());
        assert!(state.get_events(10).await.is_empty());
        assert_eq!(state.list_alerts(None).await.len(), 2);
    }

    #[tokio::test]
    async fn test_trigger_location_falls_back_until_resolved() {
        let state = state();
        assert_eq!(state.trigger_location().await, "1 Test Way");
        state.set_location("5 Real Rd".to_string()).await;
        assert_eq!(state.trigger_location().await, "5 Real Rd");
    }

    #[tokio::test]
    async fn test_event_log_is_bounded() {
        let state = state();
        for i in 0..(EVENT_LOG_CAPACITY + 20) {
            state.push_event(UiEvent::Error(format!("e{}", i))).await;
        }
        assert_eq!(state.event_log.read().await.len(), EVENT_LOG_CAPACITY);
        let last = state.get_events(1).await;
        assert!(matches!(&last[0].event, UiEvent::Error(msg) if msg == "e519"));
    }
}
