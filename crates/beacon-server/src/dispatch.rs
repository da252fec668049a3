use crate::metrics;
use crate::state::{AppState, UiEvent};
use beacon_core::{Alert, AlertCategory};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

/// Navigation request sent to the UI once a dispatch produced its alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerIntent {
    pub category: AlertCategory,
    pub triggered: bool,
    pub alert_id: String,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch {0} was cancelled")]
    Cancelled(u64),
    #[error(transparent)]
    Rejected(#[from] beacon_core::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchInfo {
    pub id: u64,
    pub category: AlertCategory,
    pub location: String,
    pub started_at: DateTime<Utc>,
}

struct DispatchEntry {
    info: DispatchInfo,
    abort: Option<AbortHandle>,
}

/// In-flight dispatches keyed by id.
///
/// Removing an entry is the commit point: the task only creates its alert if
/// it removes its own entry first, and a cancel only succeeds if it removes the
/// entry before the task does.
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    entries: Arc<DashMap<u64, DispatchEntry>>,
    next_id: Arc<AtomicU64>,
}

impl DispatchRegistry {
    fn register(&self, category: AlertCategory, location: String) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries.insert(
            id,
            DispatchEntry {
                info: DispatchInfo {
                    id,
                    category,
                    location,
                    started_at: Utc::now(),
                },
                abort: None,
            },
        );
        id
    }

    fn attach(&self, id: u64, abort: AbortHandle) {
        if let Some(mut entry) = self.entries.get_mut(&id) {
            entry.abort = Some(abort);
        }
    }

    fn claim(&self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Cancels a pending dispatch. Returns false if it already completed or
    /// never existed.
    pub fn cancel(&self, id: u64) -> bool {
        match self.entries.remove(&id) {
            Some((_, entry)) => {
                if let Some(abort) = entry.abort {
                    abort.abort();
                }
                metrics::record_dispatch_cancelled();
                tracing::warn!("Dispatch {} cancelled", id);
                true
            }
            None => false,
        }
    }

    pub fn pending(&self) -> Vec<DispatchInfo> {
        let mut pending: Vec<DispatchInfo> =
            self.entries.iter().map(|e| e.value().info.clone()).collect();
        pending.sort_by_key(|info| info.id);
        pending
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Simulates contacting emergency services: waits `delay`, then triggers the
/// alert. Concurrent dispatches are allowed and each yields its own alert.
#[derive(Clone)]
pub struct Dispatcher {
    state: AppState,
    delay: Duration,
    intents: mpsc::UnboundedSender<TriggerIntent>,
}

impl Dispatcher {
    pub fn new(
        state: AppState,
        delay: Duration,
        intents: mpsc::UnboundedSender<TriggerIntent>,
    ) -> Self {
        Self {
            state,
            delay,
            intents,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Validates the request and starts the delayed trigger.
    ///
    /// Without an explicit `location` the current device location (or its
    /// placeholder) is used.
    pub async fn start(
        &self,
        category: &str,
        location: Option<&str>,
    ) -> Result<PendingDispatch, beacon_core::Error> {
        let category: AlertCategory = category.parse()?;
        let location = match location {
            Some(location) => location.trim().to_string(),
            None => self.state.trigger_location().await,
        };
        if location.is_empty() {
            return Err(beacon_core::Error::invalid("location must not be empty"));
        }

        let id = self.state.dispatches.register(category, location.clone());
        metrics::record_dispatch_started(category);
        self.state
            .push_event(UiEvent::EmergencyRequested {
                dispatch_id: id,
                category,
            })
            .await;
        tracing::info!("Dispatch {} started: {} at {}", id, category, location);

        let state = self.state.clone();
        let intents = self.intents.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !state.dispatches.claim(id) {
                return Err(DispatchError::Cancelled(id));
            }
            let alert = state.trigger_alert(category.as_str(), &location).await?;
            let _ = intents.send(TriggerIntent {
                category,
                triggered: true,
                alert_id: alert.id.clone(),
            });
            Ok(alert)
        });
        self.state.dispatches.attach(id, handle.abort_handle());

        Ok(PendingDispatch {
            id,
            category,
            handle: Some(handle),
            registry: self.state.dispatches.clone(),
        })
    }

    pub async fn cancel(&self, id: u64) -> Result<(), beacon_core::Error> {
        if self.state.dispatches.cancel(id) {
            self.state
                .push_event(UiEvent::DispatchCancelled { dispatch_id: id })
                .await;
            Ok(())
        } else {
            Err(beacon_core::Error::not_found("dispatch", &id.to_string()))
        }
    }
}

/// Handle to a running dispatch. Dropping it cancels the dispatch unless it
/// was detached or already finished.
pub struct PendingDispatch {
    id: u64,
    category: AlertCategory,
    handle: Option<JoinHandle<Result<Alert, DispatchError>>>,
    registry: DispatchRegistry,
}

impl PendingDispatch {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn category(&self) -> AlertCategory {
        self.category
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    pub fn cancel(&self) -> bool {
        self.registry.cancel(self.id)
    }

    pub async fn wait(mut self) -> Result<Alert, DispatchError> {
        let id = self.id;
        let result = match self.handle.as_mut() {
            Some(handle) => match handle.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(DispatchError::Cancelled(id)),
                Err(e) => std::panic::resume_unwind(e.into_panic()),
            },
            None => Err(DispatchError::Cancelled(id)),
        };
        self.handle = None;
        result
    }

    /// Lets the dispatch run without this handle; it stays cancellable by id.
    pub fn detach(mut self) -> u64 {
        self.handle = None;
        self.id
    }
}

impl Drop for PendingDispatch {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                self.registry.cancel(self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SeedData;
    use beacon_core::AlertStatus;

    const DELAY: Duration = Duration::from_millis(50);

    fn setup() -> (Dispatcher, mpsc::UnboundedReceiver<TriggerIntent>) {
        let state = AppState::new(SeedData::builtin(), "1 Test Way".to_string());
        let (tx, rx) = mpsc::unbounded_channel();
        (Dispatcher::new(state, DELAY, tx), rx)
    }

    #[tokio::test]
    async fn test_dispatch_triggers_after_delay() {
        let (dispatcher, mut intents) = setup();
        let pending = dispatcher.start("medical", Some("1 Elm St")).await.unwrap();
        assert_eq!(dispatcher.state().dispatches.len(), 1);
        assert_eq!(dispatcher.state().list_alerts(None).await.len(), 2);

        let alert = pending.wait().await.unwrap();
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.location, "1 Elm St");

        let alerts = dispatcher.state().list_alerts(None).await;
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].id, alert.id);
        assert!(dispatcher.state().dispatches.is_empty());

        let intent = intents.recv().await.unwrap();
        assert_eq!(
            intent,
            TriggerIntent {
                category: AlertCategory::Medical,
                triggered: true,
                alert_id: alert.id,
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_prevents_mutation() {
        let (dispatcher, mut intents) = setup();
        let pending = dispatcher.start("fire", None).await.unwrap();
        assert!(pending.cancel());
        assert!(!pending.cancel());

        assert!(matches!(
            pending.wait().await,
            Err(DispatchError::Cancelled(_))
        ));
        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(dispatcher.state().list_alerts(None).await.len(), 2);
        assert!(intents.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_drop_discards_pending_dispatch() {
        let (dispatcher, _intents) = setup();
        let pending = dispatcher.start("police", None).await.unwrap();
        drop(pending);
        assert!(dispatcher.state().dispatches.is_empty());

        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(dispatcher.state().list_alerts(None).await.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_dispatches_are_independent() {
        let (dispatcher, _intents) = setup();
        let first = dispatcher.start("medical", None).await.unwrap();
        let second = dispatcher.start("medical", None).await.unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(dispatcher.state().dispatches.pending().len(), 2);

        let a = first.wait().await.unwrap();
        let b = second.wait().await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(
            dispatcher
                .state()
                .list_alerts(Some(AlertStatus::Active))
                .await
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_up_front() {
        let (dispatcher, _intents) = setup();
        assert!(matches!(
            dispatcher.start("flood", None).await,
            Err(beacon_core::Error::InvalidInput(_))
        ));
        assert!(matches!(
            dispatcher.start("sos", Some("  ")).await,
            Err(beacon_core::Error::InvalidInput(_))
        ));
        assert!(dispatcher.state().dispatches.is_empty());
    }

    #[tokio::test]
    async fn test_detached_dispatch_cancel_by_id() {
        let (dispatcher, _intents) = setup();
        let id = dispatcher.start("sos", None).await.unwrap().detach();
        assert_eq!(dispatcher.state().dispatches.len(), 1);

        dispatcher.cancel(id).await.unwrap();
        assert!(matches!(
            dispatcher.cancel(id).await,
            Err(beacon_core::Error::NotFound(_))
        ));
        tokio::time::sleep(DELAY * 3).await;
        assert_eq!(dispatcher.state().list_alerts(None).await.len(), 2);
    }

    #[tokio::test]
    async fn test_detached_dispatch_completes() {
        let (dispatcher, mut intents) = setup();
        dispatcher.start("sos", None).await.unwrap().detach();
        let intent = intents.recv().await.unwrap();
        let alerts = dispatcher.state().list_alerts(None).await;
        assert_eq!(alerts[0].id, intent.alert_id);
        assert_eq!(alerts[0].location, "1 Test Way");
    }
}
