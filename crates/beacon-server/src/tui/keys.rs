use crate::tui::app::TuiTab;
use beacon_core::AlertCategory;
use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiAction {
    Quit,
    ToggleHelp,
    SwitchTab(TuiTab),
    MoveSelectionUp,
    MoveSelectionDown,
    TriggerEmergency(AlertCategory),
    CancelDispatch,
    ResolveAlert,
    AddContact,
    DeleteContact,
    MarkRead,
    MarkAllRead,
    ToggleNotifications,
    ToggleSetting,
    Logout,
}

/// Maps a key press in normal mode. Global keys win over tab-specific ones.
pub fn key_to_action(tab: TuiTab, key: KeyCode) -> Option<TuiAction> {
    let global = match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(TuiAction::Quit),
        KeyCode::Char('?') => Some(TuiAction::ToggleHelp),
        KeyCode::Char('1') => Some(TuiAction::SwitchTab(TuiTab::Home)),
        KeyCode::Char('2') => Some(TuiAction::SwitchTab(TuiTab::Alerts)),
        KeyCode::Char('3') => Some(TuiAction::SwitchTab(TuiTab::Contacts)),
        KeyCode::Char('4') => Some(TuiAction::SwitchTab(TuiTab::Notifications)),
        KeyCode::Char('5') => Some(TuiAction::SwitchTab(TuiTab::Settings)),
        KeyCode::Up => Some(TuiAction::MoveSelectionUp),
        KeyCode::Down => Some(TuiAction::MoveSelectionDown),
        _ => None,
    };
    if global.is_some() {
        return global;
    }

    match (tab, key) {
        (TuiTab::Home, KeyCode::Char('m')) => Some(TuiAction::TriggerEmergency(AlertCategory::Medical)),
        (TuiTab::Home, KeyCode::Char('p')) => Some(TuiAction::TriggerEmergency(AlertCategory::Police)),
        (TuiTab::Home, KeyCode::Char('f')) => Some(TuiAction::TriggerEmergency(AlertCategory::Fire)),
        (TuiTab::Home, KeyCode::Char('s')) => Some(TuiAction::TriggerEmergency(AlertCategory::Sos)),
        (TuiTab::Home, KeyCode::Char('c')) => Some(TuiAction::CancelDispatch),
        (TuiTab::Alerts, KeyCode::Enter) => Some(TuiAction::ResolveAlert),
        (TuiTab::Contacts, KeyCode::Char('a')) => Some(TuiAction::AddContact),
        (TuiTab::Contacts, KeyCode::Char('d')) => Some(TuiAction::DeleteContact),
        (TuiTab::Notifications, KeyCode::Enter) => Some(TuiAction::MarkRead),
        (TuiTab::Notifications, KeyCode::Char('A')) => Some(TuiAction::MarkAllRead),
        (TuiTab::Notifications, KeyCode::Char('t')) => Some(TuiAction::ToggleNotifications),
        (TuiTab::Settings, KeyCode::Char(' ')) => Some(TuiAction::ToggleSetting),
        (TuiTab::Settings, KeyCode::Char('l')) => Some(TuiAction::Logout),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_keys() {
        assert_eq!(key_to_action(TuiTab::Alerts, KeyCode::Esc), Some(TuiAction::Quit));
        assert_eq!(
            key_to_action(TuiTab::Home, KeyCode::Char('5')),
            Some(TuiAction::SwitchTab(TuiTab::Settings))
        );
        assert_eq!(key_to_action(TuiTab::Contacts, KeyCode::Char('?')), Some(TuiAction::ToggleHelp));
    }

    #[test]
    fn test_emergency_keys_only_on_home() {
        assert_eq!(
            key_to_action(TuiTab::Home, KeyCode::Char('f')),
            Some(TuiAction::TriggerEmergency(AlertCategory::Fire))
        );
        assert_eq!(key_to_action(TuiTab::Alerts, KeyCode::Char('f')), None);
    }

    #[test]
    fn test_tab_specific_keys() {
        assert_eq!(key_to_action(TuiTab::Alerts, KeyCode::Enter), Some(TuiAction::ResolveAlert));
        assert_eq!(key_to_action(TuiTab::Notifications, KeyCode::Enter), Some(TuiAction::MarkRead));
        assert_eq!(key_to_action(TuiTab::Notifications, KeyCode::Char('A')), Some(TuiAction::MarkAllRead));
        assert_eq!(key_to_action(TuiTab::Notifications, KeyCode::Char('a')), None);
        assert_eq!(key_to_action(TuiTab::Contacts, KeyCode::Char('a')), Some(TuiAction::AddContact));
        assert_eq!(key_to_action(TuiTab::Settings, KeyCode::Char(' ')), Some(TuiAction::ToggleSetting));
    }
}
