//! Fetch lifecycle state machine shared by every polled view.
//!
//! ```text
//!  Idle ──trigger──▶ Fetching ──ok──▶ Idle
//!   ▲                   │
//!   └──trigger── Failed ◀┘ err
//! ```
//!
//! A trigger while `Fetching` is dropped, never queued. Deactivation bumps the
//! generation so a response that lands afterwards no longer matches its ticket.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use tracing::debug;

use crate::api::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    #[default]
    Idle,
    Fetching,
    Failed,
}

/// What asked for a fetch. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Activation,
    Tick,
    Manual,
}

/// Proof that a fetch was started; must be handed back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Wall-clock source for `last_updated`, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone)]
pub struct PollController {
    state: PollState,
    generation: u64,
    active: bool,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<FetchError>,
}

impl Default for PollController {
    fn default() -> Self {
        Self::new()
    }
}

impl PollController {
    pub fn new() -> Self {
        Self {
            state: PollState::Idle,
            generation: 0,
            active: true,
            last_updated: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Start a fetch unless one is already running or the view is gone.
    pub fn try_begin(&mut self, trigger: Trigger) -> Option<FetchTicket> {
        if !self.active {
            debug!(?trigger, "fetch_trigger_ignored_inactive");
            return None;
        }
        if self.state == PollState::Fetching {
            debug!(?trigger, "fetch_trigger_ignored_in_flight");
            return None;
        }
        self.generation += 1;
        self.state = PollState::Fetching;
        debug!(?trigger, generation = self.generation, "fetch_begin");
        Some(FetchTicket {
            generation: self.generation,
        })
    }

    /// Whether a completion for `ticket` may still be applied.
    pub fn accepts(&self, ticket: FetchTicket) -> bool {
        self.active && self.state == PollState::Fetching && ticket.generation == self.generation
    }

    pub fn succeed(&mut self, ticket: FetchTicket, at: DateTime<Utc>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.state = PollState::Idle;
        self.last_updated = Some(at);
        self.last_error = None;
        true
    }

    pub fn fail(&mut self, ticket: FetchTicket, error: FetchError) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.state = PollState::Failed;
        self.last_error = Some(error);
        true
    }

    /// Stop accepting triggers and orphan any fetch in flight.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.generation += 1;
    }
}
