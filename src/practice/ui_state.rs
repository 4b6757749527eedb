// REFCUE Session UI State
// Copyright (c) 2026 Xing_The_Creator | REFCUE
//
// Which top-level panel the front-end shows. Exactly one is active.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Panel {
    /// Welcome screen shown before the first start.
    Splash,
    Player,
    ContactForm,
    /// "All done" screen once a playlist runs out.
    Finished,
}

/// Player instruction raised by a contact form toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerRequest {
    Pause,
    Resume,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUiState {
    pub active: Panel,
    /// Panel to restore when the contact form closes.
    pub last: Option<Panel>,
    pub finished: bool,
}

impl Default for SessionUiState {
    fn default() -> Self {
        Self {
            active: Panel::Splash,
            last: None,
            finished: false,
        }
    }
}

impl SessionUiState {
    pub fn contact_open(&self) -> bool {
        self.active == Panel::ContactForm
    }

    pub fn start(&mut self) {
        *self = Self {
            active: Panel::Player,
            last: None,
            finished: false,
        };
    }

    /// Playlist ran out. Behind an open contact form the finished screen
    /// becomes the panel to restore.
    pub fn finish(&mut self) {
        self.finished = true;
        if self.contact_open() {
            self.last = Some(Panel::Finished);
        } else {
            self.active = Panel::Finished;
            self.last = None;
        }
    }

    pub fn reset_to_splash(&mut self) {
        *self = Self::default();
    }

    pub fn toggle_contact(&mut self) -> Option<PlayerRequest> {
        if self.contact_open() {
            let restored = self.last.take().unwrap_or(Panel::Splash);
            debug!("[UI] Contact form closed, back to {:?}", restored);
            self.active = restored;
            (restored == Panel::Player).then_some(PlayerRequest::Resume)
        } else {
            let previous = self.active;
            debug!("[UI] Contact form opened over {:?}", previous);
            self.last = Some(previous);
            self.active = Panel::ContactForm;
            (previous == Panel::Player).then_some(PlayerRequest::Pause)
        }
    }
}
