//! The picker session: roster text, wheel, winners and their workflow.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{Color, SpinTuning};
use crate::entries::{derive_segments, remove_entries, Segment};
use crate::spin::{pick_second, PickCount, SessionState, SpinEngine, SpinRejected, SpinStep};
use crate::store::EntryStore;

/// Something the view should react to after a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new segment passed under the pointer.
    Tick,
    /// The wheel stopped; the session is now Celebrating.
    Landed(Vec<Segment>),
}

pub struct Session<S: EntryStore> {
    store: S,
    palette: Vec<Color>,
    default_text: String,
    text: String,
    segments: Vec<Segment>,
    engine: SpinEngine,
    pick_count: PickCount,
    winners: Vec<Segment>,
    /// Set after a failed save; later failures log at debug until a save succeeds.
    store_failing: bool,
}

impl<S: EntryStore> Session<S> {
    /// Load the persisted roster once, falling back to `default_roster`.
    pub fn new(store: S, palette: Vec<Color>, default_roster: &[String], tuning: SpinTuning) -> Self {
        let default_text = default_roster.join("\n");
        let text = match store.load() {
            Ok(Some(text)) => {
                info!(bytes = text.len(), "loaded persisted roster");
                text
            }
            Ok(None) => {
                info!("no persisted roster, using built-in default");
                default_text.clone()
            }
            Err(err) => {
                warn!(%err, "roster store unavailable, using built-in default");
                default_text.clone()
            }
        };
        let segments = derive_segments(&text, &palette);

        Self {
            store,
            palette,
            default_text,
            text,
            segments,
            engine: SpinEngine::new(tuning),
            pick_count: PickCount::One,
            winners: Vec::new(),
            store_failing: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn state(&self) -> SessionState {
        self.engine.state()
    }

    pub fn winners(&self) -> &[Segment] {
        &self.winners
    }

    pub fn pick_count(&self) -> PickCount {
        self.pick_count
    }

    pub fn rotation(&self) -> f64 {
        self.engine.rotation()
    }

    pub fn can_spin(&self) -> bool {
        self.state() == SessionState::Idle && self.segments.len() >= self.pick_count.min_segments()
    }

    /// Replace the roster text. Ignored unless Idle.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        if self.state() != SessionState::Idle {
            debug!(state = ?self.state(), "text edit ignored");
            return false;
        }
        self.replace_text(text.into());
        true
    }

    /// Ignored while a spin is in flight.
    pub fn set_pick_count(&mut self, pick: PickCount) -> bool {
        if self.state() == SessionState::Spinning {
            return false;
        }
        self.pick_count = pick;
        true
    }

    /// Single trigger entry point for pointer and keyboard alike.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        match self
            .engine
            .request_spin(self.segments.len(), self.pick_count, rng)
        {
            Ok(velocity) => {
                self.winners.clear();
                info!(segments = self.segments.len(), velocity, "spin started");
                true
            }
            Err(reason) => {
                match reason {
                    SpinRejected::NotIdle(state) => debug!(?state, "spin ignored"),
                    SpinRejected::TooFewSegments { have, need } => {
                        debug!(have, need, "spin ignored, not enough entries")
                    }
                }
                false
            }
        }
    }

    /// Advance the wheel one frame.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<SessionEvent> {
        match self.engine.step(self.segments.len()) {
            SpinStep::Resting | SpinStep::Coasting { crossed: false } => None,
            SpinStep::Coasting { crossed: true } => Some(SessionEvent::Tick),
            SpinStep::Landed { index } => {
                let mut winners = vec![self.segments[index].clone()];
                if self.pick_count == PickCount::Two {
                    if let Some(second) = pick_second(index, self.segments.len(), rng) {
                        winners.push(self.segments[second].clone());
                    }
                }
                info!(
                    index,
                    winners = ?winners.iter().map(|w| w.text.as_str()).collect::<Vec<_>>(),
                    "wheel landed"
                );
                self.winners = winners.clone();
                Some(SessionEvent::Landed(winners))
            }
        }
    }

    /// Delete the winners' lines from the roster and return to Idle.
    pub fn remove_winners(&mut self) -> bool {
        if self.state() != SessionState::Celebrating {
            return false;
        }
        let texts: Vec<&str> = self.winners.iter().map(|w| w.text.as_str()).collect();
        let next = remove_entries(&self.text, &texts);
        info!(removed = ?texts, "removing winners");
        self.winners.clear();
        self.engine.settle();
        self.replace_text(next);
        true
    }

    /// Keep the roster as is and return to Idle. Also used for dismiss.
    pub fn keep_winners(&mut self) -> bool {
        if !self.engine.settle() {
            return false;
        }
        info!("keeping winners");
        self.winners.clear();
        true
    }

    /// Restore the last persisted roster. Ignored while Spinning.
    pub fn reset(&mut self) -> bool {
        if self.state() == SessionState::Spinning {
            return false;
        }
        let restored = match self.store.load() {
            Ok(Some(text)) => text,
            Ok(None) => self.default_text.clone(),
            Err(err) => {
                warn!(%err, "roster store unavailable on reset, using built-in default");
                self.default_text.clone()
            }
        };
        info!("reset roster");
        self.winners.clear();
        self.engine.force_idle();
        self.replace_text(restored);
        true
    }

    /// Empty the roster. Ignored while Spinning.
    pub fn clear_all(&mut self) -> bool {
        if self.state() == SessionState::Spinning {
            return false;
        }
        info!("cleared roster");
        self.winners.clear();
        self.engine.force_idle();
        self.replace_text(String::new());
        true
    }

    fn replace_text(&mut self, text: String) {
        match self.store.save(&text) {
            Ok(()) if self.store_failing => {
                info!("roster store writable again");
                self.store_failing = false;
            }
            Ok(()) => {}
            Err(err) if self.store_failing => debug!(%err, "roster still not persisted"),
            Err(err) => {
                warn!(%err, "failed to persist roster, further failures logged at debug");
                self.store_failing = true;
            }
        }
        self.segments = derive_segments(&text, &self.palette);
        self.text = text;
    }
}
