// REFCUE Playback Cursor
// Copyright (c) 2026 Xing_The_Creator | REFCUE
//
// One clip at a time. The browser's player reports position/duration ticks,
// the cursor decides when the current clip is over and what comes next.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

use super::ClipDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorPhase {
    Idle,
    Playing,
    Finished,
}

/// What a tick did to the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Still inside the current clip (or nothing is playing).
    Unchanged,
    /// The previous clip ended; this one is now current.
    Advanced(ClipDescriptor),
    /// The last clip ended.
    Finished,
}

/// How the end of a clip is recognised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndDetection {
    /// `current_time == duration`
    Exact,
    /// `current_time >= duration - tolerance`
    Tolerance(f64),
}

impl EndDetection {
    /// `0.0` (or anything non-positive / non-finite) keeps exact equality.
    pub fn from_tolerance(tolerance: f64) -> Self {
        if tolerance.is_finite() && tolerance > 0.0 {
            EndDetection::Tolerance(tolerance)
        } else {
            EndDetection::Exact
        }
    }

    /// Missing or non-finite values never count as the end.
    pub fn is_end(&self, current_time: Option<f64>, duration: Option<f64>) -> bool {
        let (current, total) = match (current_time, duration) {
            (Some(c), Some(d)) if c.is_finite() && d.is_finite() => (c, d),
            _ => return false,
        };
        match self {
            EndDetection::Exact => current == total,
            EndDetection::Tolerance(eps) => current >= total - eps,
        }
    }
}

impl Default for EndDetection {
    fn default() -> Self {
        EndDetection::Exact
    }
}

/// Serialisable view of the cursor, as kept in the browser session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_url: Option<String>,
    pub queue: Vec<ClipDescriptor>,
    pub finished: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PlaybackCursor {
    current: Option<ClipDescriptor>,
    queue: VecDeque<ClipDescriptor>,
    finished: bool,
    end_detection: EndDetection,
}

impl PlaybackCursor {
    pub fn new(end_detection: EndDetection) -> Self {
        Self {
            end_detection,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> CursorPhase {
        if self.current.is_some() {
            CursorPhase::Playing
        } else if self.finished {
            CursorPhase::Finished
        } else {
            CursorPhase::Idle
        }
    }

    pub fn current(&self) -> Option<&ClipDescriptor> {
        self.current.as_ref()
    }

    /// URL handed to the player; `None` stops it.
    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|clip| clip.url.as_str())
    }

    pub fn queue(&self) -> impl Iterator<Item = &ClipDescriptor> {
        self.queue.iter()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Load a fresh playlist. An empty one leaves the cursor idle.
    pub fn start(&mut self, playlist: Vec<ClipDescriptor>) -> CursorPhase {
        let mut queue: VecDeque<ClipDescriptor> = playlist.into();
        self.current = queue.pop_front();
        self.queue = queue;
        self.finished = false;

        match &self.current {
            Some(clip) => info!(
                "[CURSOR] ▶ Playing {} ({} queued)",
                clip.name,
                self.queue.len()
            ),
            None => info!("[CURSOR] Empty playlist, staying idle"),
        }
        self.phase()
    }

    /// Same as `start`; the old queue is dropped.
    pub fn restart(&mut self, playlist: Vec<ClipDescriptor>) -> CursorPhase {
        debug!("[CURSOR] Restart discards {} queued clips", self.queue.len());
        self.start(playlist)
    }

    /// React to a position report from the player.
    pub fn tick(&mut self, current_time: Option<f64>, duration: Option<f64>) -> TickOutcome {
        if self.current.is_none() || !self.end_detection.is_end(current_time, duration) {
            return TickOutcome::Unchanged;
        }

        match self.queue.pop_front() {
            Some(next) => {
                debug!("[CURSOR] Advancing to {} ({} left)", next.name, self.queue.len());
                self.current = Some(next.clone());
                TickOutcome::Advanced(next)
            }
            None => {
                info!("[CURSOR] ⏹ Playlist exhausted");
                self.current = None;
                self.finished = true;
                TickOutcome::Finished
            }
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_url: self.current_url().map(str::to_string),
            queue: self.queue.iter().cloned().collect(),
            finished: self.finished,
        }
    }

    /// Rebuild a cursor from a saved state. Every clip, queued or current, is
    /// looked up again by URL through `resolve` and unknown URLs are dropped.
    /// A lost current clip hands over to the next queued one.
    pub fn restore<F>(state: PlaybackState, end_detection: EndDetection, resolve: F) -> Self
    where
        F: Fn(&str) -> Option<ClipDescriptor>,
    {
        let mut queue: VecDeque<ClipDescriptor> = state
            .queue
            .iter()
            .filter_map(|clip| resolve(&clip.url))
            .collect();
        let current = state
            .current_url
            .as_deref()
            .and_then(&resolve)
            .or_else(|| queue.pop_front());

        Self {
            finished: current.is_none() && state.finished,
            current,
            queue,
            end_detection,
        }
    }
}
