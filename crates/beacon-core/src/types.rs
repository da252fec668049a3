use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Medical,
    Police,
    Fire,
    Sos,
}

impl AlertCategory {
    pub const ALL: [AlertCategory; 4] = [
        AlertCategory::Medical,
        AlertCategory::Police,
        AlertCategory::Fire,
        AlertCategory::Sos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCategory::Medical => "medical",
            AlertCategory::Police => "police",
            AlertCategory::Fire => "fire",
            AlertCategory::Sos => "sos",
        }
    }

    /// Human-readable label shown on buttons and alert cards.
    pub fn label(&self) -> &'static str {
        match self {
            AlertCategory::Medical => "Medical Emergency",
            AlertCategory::Police => "Police Assistance",
            AlertCategory::Fire => "Fire Emergency",
            AlertCategory::Sos => "SOS Call",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medical" => Ok(AlertCategory::Medical),
            "police" => Ok(AlertCategory::Police),
            "fire" => Ok(AlertCategory::Fire),
            "sos" => Ok(AlertCategory::Sos),
            other => Err(Error::invalid(format!("unknown alert category '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(AlertStatus::Active),
            "resolved" => Ok(AlertStatus::Resolved),
            other => Err(Error::invalid(format!("unknown alert status '{}'", other))),
        }
    }
}

/// One emergency incident. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub category: AlertCategory,
    pub status: AlertStatus,
    pub location: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<u32>,
}

impl Alert {
    /// Historical record, always resolved and without dispatch data.
    pub fn historical(
        id: impl Into<String>,
        category: AlertCategory,
        location: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            status: AlertStatus::Resolved,
            location: location.into(),
            created_at,
            responders: None,
            eta_minutes: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("medical".parse::<AlertCategory>(), Ok(AlertCategory::Medical));
        assert_eq!(" SOS ".parse::<AlertCategory>(), Ok(AlertCategory::Sos));
        assert!(matches!(
            "flood".parse::<AlertCategory>(),
            Err(Error::InvalidInput(_))
        ));
        assert!("".parse::<AlertCategory>().is_err());
    }

    #[test]
    fn test_category_wire_format() {
        let json = serde_json::to_string(&AlertCategory::Fire).unwrap();
        assert_eq!(json, "\"fire\"");
        for category in AlertCategory::ALL {
            assert_eq!(category.as_str().parse::<AlertCategory>(), Ok(category));
        }
    }

    #[test]
    fn test_historical_alert_omits_dispatch_fields() {
        let alert = Alert::historical("1", AlertCategory::Police, "456 Park Ave", Utc::now());
        assert_eq!(alert.status, AlertStatus::Resolved);
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["status"], "resolved");
        assert!(value.get("responders").is_none());
        assert!(value.get("eta_minutes").is_none());
    }
}
