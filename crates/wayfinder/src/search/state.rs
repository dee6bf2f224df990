//! The search state machine.
//!
//! Pure and synchronous: the machine never spawns, sleeps or talks to the
//! network. It tells its driver what to do next ([`InputEffect`]) and accepts
//! outcomes tagged with the [`RequestSeq`] they were issued under, so that a
//! superseded response can never overwrite newer state.

use std::fmt;

use tracing::{debug, warn};
use wayfinder_providers::{CandidateId, CandidateLocation, GeocodeError};

/// Monotonic sequence number of issued searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RequestSeq(u64);

impl RequestSeq {
    const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the search surface currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SearchPhase {
    /// Nothing to show: empty query, or the last search found nothing.
    #[default]
    Idle,
    /// Query changed, debounce timer pending.
    Typing,
    /// A geocode call is outstanding.
    Loading,
    /// Candidates present and the results panel is open.
    Showing,
    /// Candidates present but the panel is closed.
    Hidden,
}

/// What the driver must do after [`SearchMachine::input`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEffect {
    /// Arm the debounce timer for `query` under `seq`.
    Schedule { seq: RequestSeq, query: String },
    /// Blank input: cancel any pending timer, no network call.
    Cleared,
    /// Same text as before, nothing to do.
    Unchanged,
}

/// Outcome of feeding a geocode result back into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied { count: usize },
    /// The call failed; treated as zero candidates.
    Failed,
    /// Superseded by a newer request, discarded.
    Stale,
}

/// Observable state of the search surface.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchSnapshot {
    pub query: String,
    /// Provider rank order.
    pub candidates: Vec<CandidateLocation>,
    pub results_visible: bool,
    pub loading: bool,
    pub phase: SearchPhase,
}

#[derive(Debug, Default)]
pub struct SearchMachine {
    query: String,
    candidates: Vec<CandidateLocation>,
    phase: SearchPhase,
    latest: RequestSeq,
    outstanding: Option<RequestSeq>,
}

impl SearchMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[CandidateLocation] {
        &self.candidates
    }

    pub const fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub const fn is_loading(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Only ever true with a non-empty candidate list.
    pub fn results_visible(&self) -> bool {
        self.phase == SearchPhase::Showing && !self.candidates.is_empty()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            query: self.query.clone(),
            candidates: self.candidates.clone(),
            results_visible: self.results_visible(),
            loading: self.is_loading(),
            phase: self.phase,
        }
    }

    /// Bump the sequence so every request issued so far becomes stale.
    fn invalidate(&mut self) {
        self.latest = self.latest.next();
        self.outstanding = None;
    }

    /// The user edited the query text.
    pub fn input(&mut self, text: impl Into<String>) -> InputEffect {
        let text = text.into();
        if text == self.query {
            return InputEffect::Unchanged;
        }
        self.query = text;
        self.invalidate();

        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            self.candidates.clear();
            self.phase = SearchPhase::Idle;
            return InputEffect::Cleared;
        }

        self.phase = SearchPhase::Typing;
        InputEffect::Schedule {
            seq: self.latest,
            query: trimmed.to_owned(),
        }
    }

    /// The debounce timer for `seq` fired. Returns `false` if `seq` has been
    /// superseded in the meantime.
    pub fn begin_loading(&mut self, seq: RequestSeq) -> bool {
        if seq != self.latest || self.phase != SearchPhase::Typing {
            debug!(%seq, latest = %self.latest, "Ignoring superseded debounce timer");
            return false;
        }
        self.phase = SearchPhase::Loading;
        self.outstanding = Some(seq);
        true
    }

    /// A geocode call issued under `seq` completed.
    pub fn resolve(
        &mut self,
        seq: RequestSeq,
        outcome: Result<Vec<CandidateLocation>, GeocodeError>,
    ) -> Resolution {
        if self.outstanding != Some(seq) {
            debug!(%seq, latest = %self.latest, "Discarding stale geocode response");
            return Resolution::Stale;
        }
        self.outstanding = None;

        let resolution = match outcome {
            Ok(candidates) => {
                self.candidates = candidates;
                Resolution::Applied {
                    count: self.candidates.len(),
                }
            }
            Err(e) => {
                warn!(%seq, query = %self.query, error = %e, "Geocode search failed, showing no candidates");
                self.candidates.clear();
                Resolution::Failed
            }
        };
        self.phase = if self.candidates.is_empty() {
            SearchPhase::Idle
        } else {
            SearchPhase::Showing
        };
        resolution
    }

    /// The input gained focus: reopen the panel if there is anything in it.
    pub fn focus(&mut self) -> bool {
        if self.phase == SearchPhase::Hidden && !self.candidates.is_empty() {
            self.phase = SearchPhase::Showing;
            return true;
        }
        false
    }

    /// Close the panel without selecting anything.
    pub fn dismiss(&mut self) -> bool {
        if self.phase == SearchPhase::Showing {
            self.phase = SearchPhase::Hidden;
            return true;
        }
        false
    }

    /// Pick a candidate from the open results panel.
    ///
    /// The query becomes the candidate's label and the panel closes. Returns
    /// the candidate for the map navigator, or `None` if the panel is not open
    /// or does not list `id`.
    pub fn select(&mut self, id: &CandidateId) -> Option<CandidateLocation> {
        if self.phase != SearchPhase::Showing {
            debug!(%id, phase = ?self.phase, "Ignoring selection while results are not shown");
            return None;
        }
        let candidate = self.candidates.iter().find(|c| c.id() == id)?.clone();

        self.invalidate();
        self.query = candidate.label().to_owned();
        self.phase = SearchPhase::Hidden;
        Some(candidate)
    }

    /// Explicit reset from the clear button.
    pub fn clear(&mut self) {
        self.invalidate();
        self.query.clear();
        self.candidates.clear();
        self.phase = SearchPhase::Idle;
    }
}
