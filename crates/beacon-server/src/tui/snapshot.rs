use crate::dispatch::DispatchInfo;
use crate::state::{AppState, LocationState, UiEventLogEntry};
use beacon_core::{Alert, Contact, Notification, Settings};

const SNAPSHOT_EVENTS: usize = 30;

/// Copy of the shared state taken once per frame so rendering never holds a lock.
#[derive(Clone)]
pub struct UiSnapshot {
    pub alerts: Vec<Alert>,
    pub active_alerts: usize,
    pub contacts: Vec<Contact>,
    pub notifications: Vec<Notification>,
    pub notifications_enabled: bool,
    pub unread: usize,
    pub settings: Settings,
    pub location: LocationState,
    pub pending: Vec<DispatchInfo>,
    pub events: Vec<UiEventLogEntry>,
    pub uptime_seconds: u64,
}

impl UiSnapshot {
    pub async fn from_state(state: &AppState) -> Self {
        let (alerts, active_alerts) = {
            let alerts = state.alerts.read().await;
            (alerts.list(), alerts.active_count())
        };
        let (notifications, notifications_enabled, unread) = {
            let store = state.notifications.read().await;
            (store.list(), store.enabled(), store.unread_count())
        };

        Self {
            alerts,
            active_alerts,
            contacts: state.contacts.read().await.list(),
            notifications,
            notifications_enabled,
            unread,
            settings: state.settings.read().await.clone(),
            location: state.location.read().await.clone(),
            pending: state.dispatches.pending(),
            events: state.get_events(SNAPSHOT_EVENTS).await,
            uptime_seconds: state.uptime_seconds(),
        }
    }

    pub fn is_dispatching(&self) -> bool {
        !self.pending.is_empty()
    }
}
