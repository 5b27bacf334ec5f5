// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FormKind, ViewKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browse,
    Search,
    Form(FormKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_view: ViewKind,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Browse,
            active_view: ViewKind::PurchaseOrders,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    ShowView(ViewKind),
    StartSearch,
    OpenForm,
    ExitToBrowse,
    Notify(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ViewChanged(ViewKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::ShowView(view) => {
                if view == self.active_view {
                    return Vec::new();
                }
                self.active_view = view;
                vec![AppEvent::ViewChanged(view)]
            }
            AppCommand::StartSearch => {
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::OpenForm => match self.active_view.form() {
                Some(kind) => {
                    self.mode = AppMode::Form(kind);
                    vec![AppEvent::ModeChanged(self.mode)]
                }
                None => {
                    let message = format!("{} is read-only", self.active_view.label());
                    vec![self.set_status(&message)]
                }
            },
            AppCommand::ExitToBrowse => {
                self.mode = AppMode::Browse;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::Notify(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = ViewKind::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_view = views[next];
        vec![AppEvent::ViewChanged(self.active_view)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState};
    use crate::{FormKind, ViewKind};

    #[test]
    fn view_rotation_wraps_both_ways() {
        let mut state = AppState {
            active_view: ViewKind::Pickups,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::NextView);
        assert_eq!(state.active_view, ViewKind::PurchaseOrders);
        assert_eq!(events, vec![AppEvent::ViewChanged(ViewKind::PurchaseOrders)]);

        state.dispatch(AppCommand::PrevView);
        assert_eq!(state.active_view, ViewKind::Pickups);
    }

    #[test]
    fn showing_the_active_view_is_a_no_op() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::ShowView(ViewKind::PurchaseOrders)).is_empty());
        assert_eq!(
            state.dispatch(AppCommand::ShowView(ViewKind::Equipment)),
            vec![AppEvent::ViewChanged(ViewKind::Equipment)]
        );
    }

    #[test]
    fn form_opens_for_the_active_view() {
        let mut state = AppState {
            active_view: ViewKind::ServiceBudgets,
            ..AppState::default()
        };
        state.dispatch(AppCommand::OpenForm);
        assert_eq!(state.mode, AppMode::Form(FormKind::ServiceBudget));

        state.dispatch(AppCommand::ExitToBrowse);
        assert_eq!(state.mode, AppMode::Browse);
    }

    #[test]
    fn read_only_views_refuse_forms() {
        let mut state = AppState {
            active_view: ViewKind::Equipment,
            ..AppState::default()
        };
        let events = state.dispatch(AppCommand::OpenForm);
        assert_eq!(state.mode, AppMode::Browse);
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated("equipos is read-only".to_owned())]
        );
    }

    #[test]
    fn status_can_be_set_and_cleared() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Notify("3 registros".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("3 registros"));

        let events = state.dispatch(AppCommand::ClearStatus);
        assert_eq!(events, vec![AppEvent::StatusCleared]);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn search_mode_round_trip() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::StartSearch);
        assert_eq!(state.mode, AppMode::Search);
        state.dispatch(AppCommand::ExitToBrowse);
        assert_eq!(state.mode, AppMode::Browse);
    }
}
