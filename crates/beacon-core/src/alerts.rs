use crate::error::{Error, Result};
use crate::ids::IdGenerator;
use crate::responders::placeholder_dispatch;
use crate::types::{Alert, AlertCategory, AlertStatus};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;

/// Owns the alert collection, newest first.
///
/// Alerts are never removed. The only mutation after creation is the single
/// `active -> resolved` transition performed by [`AlertManager::resolve`].
#[derive(Debug, Clone)]
pub struct AlertManager {
    alerts: Vec<Alert>,
    ids: IdGenerator,
}

impl AlertManager {
    pub fn new() -> Self {
        Self {
            alerts: Vec::new(),
            ids: IdGenerator::new("alert"),
        }
    }

    pub fn with_history(seed: Vec<Alert>) -> Self {
        let mut manager = Self::new();
        manager.seed_history(seed);
        manager
    }

    /// Replaces the collection with historical records.
    ///
    /// Every seed is stored as resolved. Order is kept as given; a repeated id
    /// keeps its first occurrence.
    pub fn seed_history(&mut self, seed: Vec<Alert>) {
        let mut seen = HashSet::new();
        self.alerts = seed
            .into_iter()
            .filter(|alert| {
                let fresh = seen.insert(alert.id.clone());
                if !fresh {
                    tracing::warn!("Skipping duplicate seed alert {}", alert.id);
                }
                fresh
            })
            .map(|mut alert| {
                alert.status = AlertStatus::Resolved;
                alert
            })
            .collect();
        tracing::debug!("Seeded {} historical alerts", self.alerts.len());
    }

    /// Creates a new active alert and puts it at the front of the list.
    ///
    /// Fails with [`Error::InvalidInput`] for an unknown category or a blank
    /// location; the collection is left untouched in that case.
    pub fn trigger(&mut self, category: &str, location: &str) -> Result<Alert> {
        let category: AlertCategory = category.parse()?;
        let location = location.trim();
        if location.is_empty() {
            return Err(Error::invalid("location must not be empty"));
        }

        let alerts = &self.alerts;
        let id = self
            .ids
            .next_unused(|candidate| alerts.iter().any(|a| a.id == candidate));
        let (responders, eta) = placeholder_dispatch(category);

        let alert = Alert {
            id,
            category,
            status: AlertStatus::Active,
            location: location.to_string(),
            created_at: Utc::now(),
            responders: Some(responders),
            eta_minutes: Some(eta),
        };
        self.alerts.insert(0, alert.clone());

        tracing::info!(
            "Alert {} triggered: {} at {}",
            alert.id,
            alert.category,
            alert.location
        );
        Ok(alert)
    }

    /// Marks an alert resolved. Resolving an already resolved alert is a no-op.
    pub fn resolve(&mut self, id: &str) -> Result<Alert> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::not_found("alert", id))?;

        if alert.status == AlertStatus::Active {
            alert.status = AlertStatus::Resolved;
            tracing::info!("Alert {} resolved", alert.id);
        }
        Ok(alert.clone())
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn list(&self) -> Vec<Alert> {
        self.alerts.clone()
    }

    pub fn list_active(&self) -> Vec<Alert> {
        self.filtered(AlertStatus::Active)
    }

    pub fn list_resolved(&self) -> Vec<Alert> {
        self.filtered(AlertStatus::Resolved)
    }

    pub fn list_by_status(&self, status: Option<AlertStatus>) -> Vec<Alert> {
        match status {
            Some(status) => self.filtered(status),
            None => self.list(),
        }
    }

    fn filtered(&self, status: AlertStatus) -> Vec<Alert> {
        self.alerts
            .iter()
            .filter(|a| a.status == status)
            .cloned()
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_active()).count()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in history shown on first start.
pub fn default_history() -> Vec<Alert> {
    vec![
        Alert::historical(
            "1",
            AlertCategory::Medical,
            "123 Main St, New York, NY",
            seed_time(2023, 5, 15, 14, 30),
        ),
        Alert::historical(
            "2",
            AlertCategory::Police,
            "456 Park Ave, New York, NY",
            seed_time(2023, 5, 10, 9, 15),
        ),
    ]
}

fn seed_time(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> AlertManager {
        AlertManager::with_history(vec![
            Alert::historical("A", AlertCategory::Medical, "1 Oak St", seed_time(2023, 5, 15, 14, 30)),
            Alert::historical("B", AlertCategory::Police, "2 Pine St", seed_time(2023, 5, 10, 9, 15)),
        ])
    }

    fn ids(alerts: &[Alert]) -> Vec<String> {
        alerts.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_trigger_creates_active_alert() -> anyhow::Result<()> {
        let mut manager = AlertManager::new();
        let mut seen = HashSet::new();
        for category in AlertCategory::ALL {
            let alert = manager.trigger(category.as_str(), "1 Elm St")?;
            assert_eq!(alert.status, AlertStatus::Active);
            assert_eq!(alert.category, category);
            assert!(alert.responders.as_ref().is_some_and(|r| !r.is_empty()));
            assert!(alert.eta_minutes.is_some());
            assert!(seen.insert(alert.id.clone()), "duplicate id {}", alert.id);
        }
        assert_eq!(manager.len(), 4);
        Ok(())
    }

    #[test]
    fn test_trigger_rejects_unknown_category() {
        let mut manager = seeded();
        let before = manager.list();
        let err = manager.trigger("flood", "1 Elm St").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(manager.list(), before);
    }

    #[test]
    fn test_trigger_rejects_blank_location() {
        let mut manager = seeded();
        assert!(matches!(
            manager.trigger("fire", ""),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            manager.trigger("fire", "   "),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_resolve_only_touches_target() -> anyhow::Result<()> {
        let mut manager = seeded();
        let first = manager.trigger("medical", "1 Elm St")?;
        let second = manager.trigger("fire", "2 Elm St")?;
        let before = manager.list();

        let resolved = manager.resolve(&first.id)?;
        assert_eq!(resolved.status, AlertStatus::Resolved);

        let after = manager.list();
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(after.iter()) {
            if old.id == first.id {
                let mut expected = old.clone();
                expected.status = AlertStatus::Resolved;
                assert_eq!(new, &expected);
            } else {
                assert_eq!(new, old);
            }
        }
        assert!(manager.get(&second.id).is_some_and(|a| a.is_active()));
        Ok(())
    }

    #[test]
    fn test_resolve_is_idempotent() -> anyhow::Result<()> {
        let mut manager = seeded();
        let before = manager.list();
        let alert = manager.resolve("A")?;
        assert_eq!(alert.status, AlertStatus::Resolved);
        assert_eq!(manager.list(), before);
        Ok(())
    }

    #[test]
    fn test_resolve_unknown_id() {
        let mut manager = seeded();
        let before = manager.list();
        let err = manager.resolve("missing").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(manager.list(), before);
    }

    #[test]
    fn test_seed_then_two_triggers() -> anyhow::Result<()> {
        let mut manager = AlertManager::new();
        manager.seed_history(default_history());
        let first = manager.trigger("police", "10 Main St")?;
        let second = manager.trigger("sos", "11 Main St")?;

        let list = manager.list();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
        assert!(list[0].created_at >= list[1].created_at);
        assert!(list[..2].iter().all(|a| a.is_active()));
        assert!(list[2..].iter().all(|a| !a.is_active()));
        assert_eq!(manager.active_count(), 2);
        Ok(())
    }

    #[test]
    fn test_trigger_then_resolve_scenario() -> anyhow::Result<()> {
        let mut manager = seeded();
        let c = manager.trigger("medical", "1 Elm St")?;
        assert_eq!(c.status, AlertStatus::Active);
        assert!(c.responders.as_ref().is_some_and(|r| !r.is_empty()));
        assert_eq!(ids(&manager.list()), vec![c.id.clone(), "A".into(), "B".into()]);

        manager.resolve(&c.id)?;
        let list = manager.list();
        assert_eq!(ids(&list), vec![c.id.clone(), "A".into(), "B".into()]);
        assert_eq!(list[0].status, AlertStatus::Resolved);
        assert_eq!(list[0].responders, c.responders);
        Ok(())
    }

    #[test]
    fn test_seed_forces_resolved_and_dedupes() {
        let mut active = Alert::historical("X", AlertCategory::Fire, "3 Birch St", Utc::now());
        active.status = AlertStatus::Active;
        let duplicate = Alert::historical("X", AlertCategory::Sos, "4 Birch St", Utc::now());

        let manager = AlertManager::with_history(vec![active, duplicate]);
        let list = manager.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, AlertStatus::Resolved);
        assert_eq!(list[0].category, AlertCategory::Fire);
    }

    #[test]
    fn test_filtered_views_keep_order() -> anyhow::Result<()> {
        let mut manager = seeded();
        let first = manager.trigger("medical", "1 Elm St")?;
        let second = manager.trigger("police", "2 Elm St")?;
        manager.resolve(&first.id)?;

        assert_eq!(ids(&manager.list_active()), vec![second.id.clone()]);
        assert_eq!(
            ids(&manager.list_resolved()),
            vec![first.id.clone(), "A".into(), "B".into()]
        );
        assert_eq!(manager.list_by_status(None).len(), 4);
        Ok(())
    }

    #[test]
    fn test_default_history_is_resolved() {
        let history = default_history();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|a| a.status == AlertStatus::Resolved));
        assert!(history[0].created_at > history[1].created_at);
    }
}
