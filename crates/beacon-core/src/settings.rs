use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    LocationSharing,
    Notifications,
    SoundAlerts,
    Vibration,
    AutoEmergencyCall,
    DarkMode,
    BiometricAuth,
    DataSync,
}

impl SettingKey {
    /// Display order, grouped by section.
    pub const ALL: [SettingKey; 8] = [
        SettingKey::LocationSharing,
        SettingKey::Notifications,
        SettingKey::SoundAlerts,
        SettingKey::Vibration,
        SettingKey::AutoEmergencyCall,
        SettingKey::DarkMode,
        SettingKey::BiometricAuth,
        SettingKey::DataSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::LocationSharing => "location_sharing",
            SettingKey::Notifications => "notifications",
            SettingKey::SoundAlerts => "sound_alerts",
            SettingKey::Vibration => "vibration",
            SettingKey::AutoEmergencyCall => "auto_emergency_call",
            SettingKey::DarkMode => "dark_mode",
            SettingKey::BiometricAuth => "biometric_auth",
            SettingKey::DataSync => "data_sync",
        }
    }

    pub fn section(&self) -> &'static str {
        match self {
            SettingKey::LocationSharing => "Location",
            SettingKey::Notifications | SettingKey::SoundAlerts | SettingKey::Vibration => {
                "Notifications"
            }
            SettingKey::AutoEmergencyCall => "Emergency Settings",
            SettingKey::DarkMode | SettingKey::BiometricAuth | SettingKey::DataSync => {
                "App Settings"
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SettingKey::LocationSharing => "Location Sharing",
            SettingKey::Notifications => "Push Notifications",
            SettingKey::SoundAlerts => "Sound Alerts",
            SettingKey::Vibration => "Vibration",
            SettingKey::AutoEmergencyCall => "Auto Emergency Call",
            SettingKey::DarkMode => "Dark Mode",
            SettingKey::BiometricAuth => "Biometric Authentication",
            SettingKey::DataSync => "Data Synchronization",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SettingKey::LocationSharing => {
                "Allow the app to access your location for emergency services"
            }
            SettingKey::Notifications => "Receive alerts about emergencies and updates",
            SettingKey::SoundAlerts => "Play sound when emergency notifications arrive",
            SettingKey::Vibration => "Vibrate when emergency notifications arrive",
            SettingKey::AutoEmergencyCall => {
                "Automatically call emergency services in critical situations"
            }
            SettingKey::DarkMode => "Use dark theme throughout the app",
            SettingKey::BiometricAuth => "Use fingerprint or face ID to secure the app",
            SettingKey::DataSync => "Sync your data across multiple devices",
        }
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| Error::invalid(format!("unknown setting '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

/// User preferences. Flags are stored only; nothing acts on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub location_sharing: bool,
    pub notifications: bool,
    pub sound_alerts: bool,
    pub vibration: bool,
    pub auto_emergency_call: bool,
    pub dark_mode: bool,
    pub biometric_auth: bool,
    pub data_sync: bool,
    pub profile: Profile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location_sharing: true,
            notifications: true,
            sound_alerts: true,
            vibration: true,
            auto_emergency_call: false,
            dark_mode: false,
            biometric_auth: true,
            data_sync: true,
            profile: Profile {
                name: "John Doe".to_string(),
                email: "john.doe@example.com".to_string(),
            },
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> bool {
        *self.flag(key)
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        *self.flag_mut(key) = value;
        tracing::info!("Setting {} = {}", key.as_str(), value);
    }

    /// Flips a flag and returns its new value.
    pub fn toggle(&mut self, key: SettingKey) -> bool {
        let value = !self.get(key);
        self.set(key, value);
        value
    }

    /// Authentication is not implemented; logging out only records the request.
    pub fn logout(&self) {
        tracing::info!("Logout requested for {}", self.profile.email);
    }

    fn flag(&self, key: SettingKey) -> &bool {
        match key {
            SettingKey::LocationSharing => &self.location_sharing,
            SettingKey::Notifications => &self.notifications,
            SettingKey::SoundAlerts => &self.sound_alerts,
            SettingKey::Vibration => &self.vibration,
            SettingKey::AutoEmergencyCall => &self.auto_emergency_call,
            SettingKey::DarkMode => &self.dark_mode,
            SettingKey::BiometricAuth => &self.biometric_auth,
            SettingKey::DataSync => &self.data_sync,
        }
    }

    fn flag_mut(&mut self, key: SettingKey) -> &mut bool {
        match key {
            SettingKey::LocationSharing => &mut self.location_sharing,
            SettingKey::Notifications => &mut self.notifications,
            SettingKey::SoundAlerts => &mut self.sound_alerts,
            SettingKey::Vibration => &mut self.vibration,
            SettingKey::AutoEmergencyCall => &mut self.auto_emergency_call,
            SettingKey::DarkMode => &mut self.dark_mode,
            SettingKey::BiometricAuth => &mut self.biometric_auth,
            SettingKey::DataSync => &mut self.data_sync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.get(SettingKey::LocationSharing));
        assert!(!settings.get(SettingKey::AutoEmergencyCall));
        assert!(!settings.get(SettingKey::DarkMode));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut settings = Settings::default();
        assert!(settings.toggle(SettingKey::DarkMode));
        assert!(settings.dark_mode);
        assert!(!settings.toggle(SettingKey::DarkMode));
        settings.set(SettingKey::Vibration, false);
        assert!(!settings.vibration);
    }

    #[test]
    fn test_key_parse() {
        assert_eq!("data_sync".parse::<SettingKey>(), Ok(SettingKey::DataSync));
        assert!(matches!(
            "telepathy".parse::<SettingKey>(),
            Err(Error::InvalidInput(_))
        ));
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>(), Ok(key));
        }
    }
}
