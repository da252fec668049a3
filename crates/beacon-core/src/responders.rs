use crate::types::AlertCategory;

/// ETA reported for every simulated dispatch.
pub const PLACEHOLDER_ETA_MINUTES: u32 = 5;

/// Fabricated dispatch data attached to freshly triggered alerts.
///
/// There is no real dispatch integration; these values only give the alert
/// screen something to show.
pub fn placeholder_dispatch(category: AlertCategory) -> (Vec<String>, u32) {
    let responders: &[&str] = match category {
        AlertCategory::Medical => &["Ambulance #42", "Dr. Smith"],
        AlertCategory::Police => &["Patrol Unit 17", "Officer Ramirez"],
        AlertCategory::Fire => &["Engine Company 9", "Ladder 3"],
        AlertCategory::Sos => &["Ambulance #42", "Patrol Unit 17"],
    };
    (
        responders.iter().map(|r| r.to_string()).collect(),
        PLACEHOLDER_ETA_MINUTES,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_responders() {
        for category in AlertCategory::ALL {
            let (responders, eta) = placeholder_dispatch(category);
            assert!(!responders.is_empty(), "{} has no responders", category);
            assert_eq!(eta, PLACEHOLDER_ETA_MINUTES);
        }
    }
}
