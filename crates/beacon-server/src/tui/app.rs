use crate::dispatch::{Dispatcher, PendingDispatch, TriggerIntent};
use crate::state::AppState;
use crate::tui::keys::{key_to_action, TuiAction};
use crate::tui::snapshot::UiSnapshot;
use beacon_core::{AlertCategory, NewContact, SettingKey};
use crossterm::event::KeyCode;
use std::time::{Duration, Instant};

pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiTab {
    Home,
    Alerts,
    Contacts,
    Notifications,
    Settings,
}

impl TuiTab {
    pub const ALL: [TuiTab; 5] = [
        TuiTab::Home,
        TuiTab::Alerts,
        TuiTab::Contacts,
        TuiTab::Notifications,
        TuiTab::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            TuiTab::Home => "Home",
            TuiTab::Alerts => "Alerts",
            TuiTab::Contacts => "Contacts",
            TuiTab::Notifications => "Notifications",
            TuiTab::Settings => "Settings",
        }
    }
}

/// Short-lived message shown over the current tab.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub is_success: bool,
    pub shown_at: Instant,
}

pub const CONTACT_FIELDS: [&str; 4] = ["Name", "Phone", "Email", "Relationship"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub fields: [String; 4],
    pub focus: usize,
}

impl ContactForm {
    fn next_field(&mut self) {
        self.focus = (self.focus + 1) % CONTACT_FIELDS.len();
    }

    fn prev_field(&mut self) {
        self.focus = (self.focus + CONTACT_FIELDS.len() - 1) % CONTACT_FIELDS.len();
    }

    fn to_new_contact(&self) -> NewContact {
        let [name, phone, email, relationship] = self.fields.clone();
        NewContact {
            name,
            phone,
            email,
            relationship,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    ContactForm(ContactForm),
    ConfirmDelete { id: String, name: String },
}

pub struct TuiApp {
    pub state: AppState,
    dispatcher: Dispatcher,
    pub snapshot: UiSnapshot,
    pub current_tab: TuiTab,
    pub mode: InputMode,
    pub show_help: bool,
    pub notice: Option<Notice>,
    pub alert_index: usize,
    pub contact_index: usize,
    pub notification_index: usize,
    pub setting_index: usize,
    // Dropping these cancels dispatches still waiting on their delay.
    pending: Vec<PendingDispatch>,
    focus_alert: Option<String>,
}

impl TuiApp {
    pub async fn new(dispatcher: Dispatcher) -> Self {
        let state = dispatcher.state().clone();
        let snapshot = UiSnapshot::from_state(&state).await;
        Self {
            state,
            dispatcher,
            snapshot,
            current_tab: TuiTab::Home,
            mode: InputMode::Normal,
            show_help: false,
            notice: None,
            alert_index: 0,
            contact_index: 0,
            notification_index: 0,
            setting_index: 0,
            pending: Vec::new(),
            focus_alert: None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn notify(&mut self, message: impl Into<String>, is_success: bool) {
        self.notice = Some(Notice {
            message: message.into(),
            is_success,
            shown_at: Instant::now(),
        });
    }

    /// Re-reads shared state and clamps selections to the new list sizes.
    pub async fn refresh(&mut self) {
        self.snapshot = UiSnapshot::from_state(&self.state).await;
        self.pending.retain(|p| !p.is_finished());

        if let Some(id) = self.focus_alert.take() {
            if let Some(idx) = self.snapshot.alerts.iter().position(|a| a.id == id) {
                self.alert_index = idx;
            }
        }

        clamp(&mut self.alert_index, self.snapshot.alerts.len());
        clamp(&mut self.contact_index, self.snapshot.contacts.len());
        clamp(&mut self.notification_index, self.snapshot.notifications.len());
        clamp(&mut self.setting_index, SettingKey::ALL.len());

        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }

    /// Jumps to the Alerts tab with the freshly triggered alert selected.
    pub fn apply_intent(&mut self, intent: TriggerIntent) {
        if !intent.triggered {
            return;
        }
        self.current_tab = TuiTab::Alerts;
        self.notify(format!("{} alert sent", intent.category.label()), true);
        self.focus_alert = Some(intent.alert_id);
    }

    /// Returns true if the app should quit.
    pub async fn handle_key(&mut self, key: KeyCode) -> bool {
        let quit = match std::mem::replace(&mut self.mode, InputMode::Normal) {
            InputMode::ContactForm(form) => {
                self.handle_form_key(form, key).await;
                false
            }
            InputMode::ConfirmDelete { id, name } => {
                self.handle_confirm_key(id, name, key).await;
                false
            }
            InputMode::Normal => {
                if self.show_help && key == KeyCode::Esc {
                    self.show_help = false;
                    false
                } else {
                    match key_to_action(self.current_tab, key) {
                        Some(action) => self.handle_action(action).await,
                        None => false,
                    }
                }
            }
        };
        if !quit {
            self.refresh().await;
        }
        quit
    }

    pub async fn handle_action(&mut self, action: TuiAction) -> bool {
        match action {
            TuiAction::Quit => return true,
            TuiAction::ToggleHelp => self.show_help = !self.show_help,
            TuiAction::SwitchTab(tab) => self.current_tab = tab,
            TuiAction::MoveSelectionUp => {
                if let Some((idx, _)) = self.selection_mut() {
                    *idx = idx.saturating_sub(1);
                }
            }
            TuiAction::MoveSelectionDown => {
                if let Some((idx, len)) = self.selection_mut() {
                    if *idx + 1 < len {
                        *idx += 1;
                    }
                }
            }
            TuiAction::TriggerEmergency(category) => self.trigger_emergency(category).await,
            TuiAction::CancelDispatch => self.cancel_dispatch().await,
            TuiAction::ResolveAlert => self.resolve_selected_alert().await,
            TuiAction::AddContact => self.mode = InputMode::ContactForm(ContactForm::default()),
            TuiAction::DeleteContact => {
                if let Some(contact) = self.snapshot.contacts.get(self.contact_index) {
                    self.mode = InputMode::ConfirmDelete {
                        id: contact.id.clone(),
                        name: contact.name.clone(),
                    };
                }
            }
            TuiAction::MarkRead => {
                if let Some(n) = self.snapshot.notifications.get(self.notification_index) {
                    let id = n.id.clone();
                    if let Err(e) = self.state.mark_notification_read(&id).await {
                        self.notify(e.to_string(), false);
                    }
                }
            }
            TuiAction::MarkAllRead => {
                let count = self.state.mark_all_notifications_read().await;
                self.notify(format!("Marked {} notification(s) as read", count), true);
            }
            TuiAction::ToggleNotifications => {
                let enabled = !self.snapshot.notifications_enabled;
                self.state.set_notifications_enabled(enabled).await;
                let label = if enabled { "enabled" } else { "disabled" };
                self.notify(format!("Notifications {}", label), true);
            }
            TuiAction::ToggleSetting => {
                let key = SettingKey::ALL[self.setting_index % SettingKey::ALL.len()];
                let value = self.state.toggle_setting(key).await;
                let label = if value { "on" } else { "off" };
                self.notify(format!("{}: {}", key.title(), label), true);
            }
            TuiAction::Logout => {
                self.state.settings.read().await.logout();
                self.notify("Logged out", true);
            }
        }
        false
    }

    fn selection_mut(&mut self) -> Option<(&mut usize, usize)> {
        match self.current_tab {
            TuiTab::Home => None,
            TuiTab::Alerts => Some((&mut self.alert_index, self.snapshot.alerts.len())),
            TuiTab::Contacts => Some((&mut self.contact_index, self.snapshot.contacts.len())),
            TuiTab::Notifications => Some((
                &mut self.notification_index,
                self.snapshot.notifications.len(),
            )),
            TuiTab::Settings => Some((&mut self.setting_index, SettingKey::ALL.len())),
        }
    }

    async fn trigger_emergency(&mut self, category: AlertCategory) {
        match self.dispatcher.start(category.as_str(), None).await {
            Ok(pending) => {
                self.notify(format!("Requesting {}...", category.label()), true);
                self.pending.push(pending);
            }
            Err(e) => {
                tracing::warn!("Emergency request rejected: {}", e);
                self.notify(e.to_string(), false);
            }
        }
    }

    async fn cancel_dispatch(&mut self) {
        self.pending.retain(|p| !p.is_finished());
        let Some(pending) = self.pending.pop() else {
            self.notify("No emergency request in progress", false);
            return;
        };
        let id = pending.detach();
        match self.dispatcher.cancel(id).await {
            Ok(()) => self.notify("Emergency request cancelled", true),
            Err(e) => self.notify(e.to_string(), false),
        }
    }

    async fn resolve_selected_alert(&mut self) {
        let Some(alert) = self.snapshot.alerts.get(self.alert_index) else {
            return;
        };
        if !alert.is_active() {
            self.notify("Alert already resolved", false);
            return;
        }
        let id = alert.id.clone();
        match self.state.resolve_alert(&id).await {
            Ok(alert) => self.notify(format!("{} resolved", alert.category.label()), true),
            Err(e) => self.notify(e.to_string(), false),
        }
    }

    async fn handle_form_key(&mut self, mut form: ContactForm, key: KeyCode) {
        match key {
            KeyCode::Esc => return,
            KeyCode::Enter => match self.state.add_contact(form.to_new_contact()).await {
                Ok(contact) => {
                    self.notify(format!("Added {}", contact.name), true);
                    self.contact_index = self.snapshot.contacts.len();
                    return;
                }
                Err(e) => self.notify(e.to_string(), false),
            },
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => {
                form.fields[form.focus].pop();
            }
            KeyCode::Char(c) => form.fields[form.focus].push(c),
            _ => {}
        }
        self.mode = InputMode::ContactForm(form);
    }

    async fn handle_confirm_key(&mut self, id: String, name: String, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => match self.state.delete_contact(&id).await {
                Ok(_) => self.notify(format!("Removed {}", name), true),
                Err(e) => self.notify(e.to_string(), false),
            },
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
            _ => self.mode = InputMode::ConfirmDelete { id, name },
        }
    }
}

fn clamp(idx: &mut usize, len: usize) {
    if *idx >= len {
        *idx = len.saturating_sub(1);
    }
}
