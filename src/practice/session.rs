// REFCUE Practice Session
// Copyright (c) 2026 Xing_The_Creator | REFCUE
//
// Ties the cursor and the panel state together. Every user action or player
// report comes in as a `SessionEvent`; what the player and the page must do
// next goes out as a list of `Effect`s.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use super::catalog::Catalog;
use super::cursor::{CursorPhase, EndDetection, PlaybackCursor, PlaybackState, TickOutcome};
use super::playlist::build_playlist;
use super::ui_state::{Panel, PlayerRequest, SessionUiState};
use super::Selection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    Start {
        selection: Selection,
    },
    Restart,
    #[serde(rename_all = "camelCase")]
    PositionTick {
        current_time: Option<f64>,
        duration: Option<f64>,
    },
    ToggleContact,
    ReturnToSplash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Effect {
    /// Point the player at a clip, or unload it with `None`.
    LoadClip(Option<String>),
    SetPlaying(bool),
    ShowPanel(Panel),
    /// The playlist ran out.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    EmptyTopics,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyTopics => write!(f, "Select at least one topic"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Everything the browser keeps in its session storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub playback: PlaybackState,
    pub ui: SessionUiState,
    pub selection: Option<Selection>,
}

pub struct PracticeSession {
    catalog: Arc<Catalog>,
    cursor: PlaybackCursor,
    ui: SessionUiState,
    selection: Option<Selection>,
}

impl PracticeSession {
    pub fn new(catalog: Arc<Catalog>, end_detection: EndDetection) -> Self {
        Self {
            catalog,
            cursor: PlaybackCursor::new(end_detection),
            ui: SessionUiState::default(),
            selection: None,
        }
    }

    /// Rehydrate from a snapshot. Clips are re-read from the catalog and URLs it
    /// no longer knows are dropped; the panels are then brought in line with
    /// whatever the cursor ended up doing.
    pub fn restore(
        catalog: Arc<Catalog>,
        snapshot: SessionSnapshot,
        end_detection: EndDetection,
    ) -> Self {
        let cursor = PlaybackCursor::restore(snapshot.playback, end_detection, |url| {
            catalog.lookup(url).cloned()
        });
        let mut ui = snapshot.ui;
        settle_panels(&mut ui, cursor.phase());

        Self {
            catalog,
            cursor,
            ui,
            selection: snapshot.selection,
        }
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn ui(&self) -> &SessionUiState {
        &self.ui
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            playback: self.cursor.state(),
            ui: self.ui.clone(),
            selection: self.selection.clone(),
        }
    }

    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<Effect>, SessionError> {
        self.handle_with_rng(event, &mut rand::thread_rng())
    }

    pub fn handle_with_rng<R: Rng + ?Sized>(
        &mut self,
        event: SessionEvent,
        rng: &mut R,
    ) -> Result<Vec<Effect>, SessionError> {
        match event {
            SessionEvent::Start { selection } => {
                if selection.topics.is_empty() {
                    return Err(SessionError::EmptyTopics);
                }
                Ok(self.load(selection, rng))
            }
            SessionEvent::Restart => match self.selection.clone() {
                Some(selection) => Ok(self.load(selection, rng)),
                None => Ok(Vec::new()),
            },
            SessionEvent::PositionTick {
                current_time,
                duration,
            } => Ok(self.tick(current_time, duration)),
            SessionEvent::ToggleContact => {
                let mut effects = Vec::new();
                match self.ui.toggle_contact() {
                    Some(PlayerRequest::Pause) => effects.push(Effect::SetPlaying(false)),
                    Some(PlayerRequest::Resume) => effects.push(Effect::SetPlaying(true)),
                    None => {}
                }
                effects.push(Effect::ShowPanel(self.ui.active));
                Ok(effects)
            }
            SessionEvent::ReturnToSplash => {
                self.ui.reset_to_splash();
                Ok(vec![Effect::ShowPanel(Panel::Splash)])
            }
        }
    }

    fn load<R: Rng + ?Sized>(&mut self, selection: Selection, rng: &mut R) -> Vec<Effect> {
        let playlist = build_playlist(&self.catalog, &selection, rng);
        info!(
            "[SESSION] Loading {} clips ({} / {:?})",
            playlist.len(),
            selection.format,
            selection.topics
        );
        self.selection = Some(selection);

        match self.cursor.restart(playlist) {
            CursorPhase::Playing => {
                self.ui.start();
                vec![
                    Effect::LoadClip(self.cursor.current_url().map(str::to_string)),
                    Effect::SetPlaying(true),
                    Effect::ShowPanel(Panel::Player),
                ]
            }
            _ => {
                if self.ui.contact_open() {
                    self.ui.last = Some(Panel::Splash);
                } else {
                    self.ui.reset_to_splash();
                }
                self.ui.finished = false;
                vec![
                    Effect::LoadClip(None),
                    Effect::SetPlaying(false),
                    Effect::ShowPanel(self.ui.active),
                ]
            }
        }
    }

    fn tick(&mut self, current_time: Option<f64>, duration: Option<f64>) -> Vec<Effect> {
        match self.cursor.tick(current_time, duration) {
            TickOutcome::Unchanged => Vec::new(),
            TickOutcome::Advanced(clip) => vec![Effect::LoadClip(Some(clip.url))],
            TickOutcome::Finished => {
                self.ui.finish();
                vec![
                    Effect::LoadClip(None),
                    Effect::SetPlaying(false),
                    Effect::Finished,
                    Effect::ShowPanel(self.ui.active),
                ]
            }
        }
    }
}

/// The player panel needs a clip and the finished panel needs a finished
/// cursor; anything else falls back to what the cursor supports.
fn settle_panels(ui: &mut SessionUiState, phase: CursorPhase) {
    let settled = match phase {
        CursorPhase::Playing => Panel::Player,
        CursorPhase::Finished => Panel::Finished,
        CursorPhase::Idle => Panel::Splash,
    };
    let settle = |panel: Panel| match panel {
        Panel::Player | Panel::Finished if panel != settled => settled,
        other => other,
    };

    ui.active = settle(ui.active);
    ui.last = ui.last.map(settle);
    if phase != CursorPhase::Finished {
        ui.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::practice::{ClipDescriptor, Format, PracticeOption, Topic};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn clip(format: Option<Format>, topic: Option<Topic>, name: &str) -> ClipDescriptor {
        ClipDescriptor {
            format,
            topic,
            name: name.to_string(),
            url: format!("/media/{}", name),
        }
    }

    fn session() -> PracticeSession {
        let catalog = Catalog::from_clips(vec![
            clip(Some(Format::Expressive), Some(Topic::Penalties), "clip1.mp4"),
            clip(Some(Format::Receptive), Some(Topic::Penalties), "clip2.mp4"),
            clip(Some(Format::Expressive), None, "intro.mp4"),
            clip(None, None, "outro.mp4"),
        ]);
        PracticeSession::new(Arc::new(catalog), EndDetection::Exact)
    }

    fn start(topics: Vec<Topic>) -> SessionEvent {
        SessionEvent::Start {
            selection: Selection::new(
                Format::Expressive,
                topics,
                vec![PracticeOption::Intro, PracticeOption::Outro],
            ),
        }
    }

    fn end_tick() -> SessionEvent {
        SessionEvent::PositionTick {
            current_time: Some(2.0),
            duration: Some(2.0),
        }
    }

    #[test]
    fn test_full_session_walkthrough() {
        let mut s = session();
        let mut rng = StdRng::seed_from_u64(5);

        let effects = s
            .handle_with_rng(start(vec![Topic::Penalties]), &mut rng)
            .unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::LoadClip(Some("/media/intro.mp4".to_string())),
                Effect::SetPlaying(true),
                Effect::ShowPanel(Panel::Player),
            ]
        );
        assert_eq!(s.ui().active, Panel::Player);

        let mid = SessionEvent::PositionTick {
            current_time: Some(0.5),
            duration: Some(2.0),
        };
        assert!(s.handle(mid).unwrap().is_empty());

        assert_eq!(
            s.handle(end_tick()).unwrap(),
            vec![Effect::LoadClip(Some("/media/clip1.mp4".to_string()))]
        );
        assert_eq!(
            s.handle(end_tick()).unwrap(),
            vec![Effect::LoadClip(Some("/media/outro.mp4".to_string()))]
        );

        let effects = s.handle(end_tick()).unwrap();
        assert!(effects.contains(&Effect::Finished));
        assert!(effects.contains(&Effect::ShowPanel(Panel::Finished)));
        assert!(s.ui().finished);
        assert_eq!(s.cursor().phase(), CursorPhase::Finished);
    }

    #[test]
    fn test_start_requires_a_topic() {
        let mut s = session();
        assert_eq!(s.handle(start(vec![])), Err(SessionError::EmptyTopics));
        assert_eq!(
            SessionError::EmptyTopics.to_string(),
            "Select at least one topic"
        );
        assert!(s.selection().is_none());
    }

    #[test]
    fn test_restart_reuses_selection() {
        let mut s = session();
        assert!(s.handle(SessionEvent::Restart).unwrap().is_empty());

        s.handle(start(vec![Topic::Penalties])).unwrap();
        for _ in 0..3 {
            s.handle(end_tick()).unwrap();
        }
        assert!(s.cursor().is_finished());

        let effects = s.handle(SessionEvent::Restart).unwrap();
        assert_eq!(effects[0], Effect::LoadClip(Some("/media/intro.mp4".to_string())));
        assert!(!s.cursor().is_finished());
        assert!(!s.ui().finished);
        assert_eq!(s.ui().active, Panel::Player);
    }

    #[test]
    fn test_empty_playlist_stays_idle() {
        let mut s = session();
        let selection = Selection::new(Format::Receptive, vec![Topic::Other], vec![]);
        let effects = s.handle(SessionEvent::Start { selection }).unwrap();
        assert_eq!(effects[0], Effect::LoadClip(None));
        assert_eq!(s.cursor().phase(), CursorPhase::Idle);
        assert_eq!(s.ui().active, Panel::Splash);
    }

    #[test]
    fn test_restart_while_playing_rebuilds_queue() {
        let mut s = session();
        s.handle(start(vec![Topic::Penalties])).unwrap();
        s.handle(end_tick()).unwrap();
        assert_eq!(s.cursor().current().unwrap().name, "clip1.mp4");
        assert_eq!(s.cursor().remaining(), 1);

        let effects = s.handle(SessionEvent::Restart).unwrap();
        assert_eq!(effects[0], Effect::LoadClip(Some("/media/intro.mp4".to_string())));
        assert_eq!(s.cursor().current().unwrap().name, "intro.mp4");
        let queued: Vec<&str> = s.cursor().queue().map(|c| c.name.as_str()).collect();
        assert_eq!(queued, vec!["clip1.mp4", "outro.mp4"]);
    }

    #[test]
    fn test_empty_start_behind_contact_form() {
        let mut s = session();
        s.handle(start(vec![Topic::Penalties])).unwrap();
        s.handle(SessionEvent::ToggleContact).unwrap();

        let selection = Selection::new(Format::Receptive, vec![Topic::Other], vec![]);
        s.handle(SessionEvent::Start { selection }).unwrap();
        assert_eq!(s.ui().active, Panel::ContactForm);
        assert_eq!(s.ui().last, Some(Panel::Splash));

        assert_eq!(
            s.handle(SessionEvent::ToggleContact).unwrap(),
            vec![Effect::ShowPanel(Panel::Splash)]
        );
        assert_eq!(s.cursor().phase(), CursorPhase::Idle);
    }

    #[test]
    fn test_restore_skips_clips_missing_from_catalog() {
        let s = session();
        let mut forged = clip(Some(Format::Expressive), Some(Topic::Penalties), "clip1.mp4");
        forged.name = "renamed.mp4".to_string();
        let snapshot = SessionSnapshot {
            playback: PlaybackState {
                current_url: Some("/media/gone.mp4".to_string()),
                queue: vec![forged, clip(None, None, "outro.mp4")],
                finished: false,
            },
            ui: SessionUiState {
                active: Panel::Player,
                last: None,
                finished: false,
            },
            selection: None,
        };

        let mut restored =
            PracticeSession::restore(s.catalog.clone(), snapshot, EndDetection::Exact);
        assert_eq!(restored.cursor().current().unwrap().name, "clip1.mp4");
        assert_eq!(restored.cursor().remaining(), 1);
        assert_eq!(restored.ui().active, Panel::Player);
        assert_eq!(
            restored.handle(end_tick()).unwrap(),
            vec![Effect::LoadClip(Some("/media/outro.mp4".to_string()))]
        );
    }

    #[test]
    fn test_restore_with_nothing_left_shows_splash() {
        let s = session();
        let snapshot = SessionSnapshot {
            playback: PlaybackState {
                current_url: Some("/media/gone.mp4".to_string()),
                queue: vec![clip(None, None, "also_gone.mp4")],
                finished: false,
            },
            ui: SessionUiState {
                active: Panel::ContactForm,
                last: Some(Panel::Player),
                finished: true,
            },
            selection: None,
        };

        let restored = PracticeSession::restore(s.catalog.clone(), snapshot, EndDetection::Exact);
        assert_eq!(restored.cursor().phase(), CursorPhase::Idle);
        assert_eq!(restored.ui().active, Panel::ContactForm);
        assert_eq!(restored.ui().last, Some(Panel::Splash));
        assert!(!restored.ui().finished);
    }

    #[test]
    fn test_contact_toggle_effects() {
        let mut s = session();
        s.handle(start(vec![Topic::Penalties])).unwrap();

        assert_eq!(
            s.handle(SessionEvent::ToggleContact).unwrap(),
            vec![Effect::SetPlaying(false), Effect::ShowPanel(Panel::ContactForm)]
        );
        assert_eq!(
            s.handle(SessionEvent::ToggleContact).unwrap(),
            vec![Effect::SetPlaying(true), Effect::ShowPanel(Panel::Player)]
        );
    }

    #[test]
    fn test_snapshot_restore() {
        let mut s = session();
        s.handle(start(vec![Topic::Penalties])).unwrap();
        s.handle(end_tick()).unwrap();
        let snapshot = s.snapshot();

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();
        let restored =
            PracticeSession::restore(s.catalog.clone(), parsed, EndDetection::Exact);
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.cursor().current().unwrap().name, "clip1.mp4");
    }

    #[test]
    fn test_event_wire_format() {
        let tick: SessionEvent =
            serde_json::from_str(r#"{"type":"positionTick","currentTime":3.5,"duration":null}"#)
                .unwrap();
        assert_eq!(
            tick,
            SessionEvent::PositionTick {
                current_time: Some(3.5),
                duration: None
            }
        );
        let effect = serde_json::to_value(Effect::ShowPanel(Panel::Finished)).unwrap();
        assert_eq!(effect["type"], "showPanel");
        assert_eq!(effect["value"], "finished");
    }
}
