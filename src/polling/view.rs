//! Snapshot owners for the leaderboard and detail screens.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::controller::{Clock, FetchTicket, PollController, PollState, Trigger};
use crate::api::error::{FetchError, FetchResult};
use crate::leaderboard::{BoardView, PipelineDetail, project_detail};

/// A view whose data comes from one repeatable fetch.
pub trait PolledView: Send + 'static {
    type Snapshot: Clone + Send + Sync + 'static;

    fn trigger(&mut self, trigger: Trigger) -> Option<FetchTicket>;

    /// Apply a fetch result. Returns `false` when the result was stale and ignored.
    fn complete(&mut self, ticket: FetchTicket, result: FetchResult<Value>) -> bool;

    /// Narrow what the view shows without refetching.
    fn apply_query(&mut self, _query: &str) {}

    fn deactivate(&mut self);

    fn snapshot(&self) -> Self::Snapshot;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeaderboardSnapshot {
    pub board: BoardView,
    pub state: PollState,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<FetchError>,
}

impl LeaderboardSnapshot {
    pub fn is_loading(&self) -> bool {
        self.state == PollState::Fetching
    }
}

pub struct LeaderboardView {
    controller: PollController,
    clock: Arc<dyn Clock>,
    board: BoardView,
}

impl LeaderboardView {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            controller: PollController::new(),
            clock,
            board: BoardView::default(),
        }
    }

    pub fn board(&self) -> &BoardView {
        &self.board
    }

    pub fn state(&self) -> PollState {
        self.controller.state()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.controller.last_updated()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.controller.last_error()
    }
}

impl PolledView for LeaderboardView {
    type Snapshot = LeaderboardSnapshot;

    fn trigger(&mut self, trigger: Trigger) -> Option<FetchTicket> {
        self.controller.try_begin(trigger)
    }

    fn complete(&mut self, ticket: FetchTicket, result: FetchResult<Value>) -> bool {
        if !self.controller.accepts(ticket) {
            debug!("leaderboard_result_discarded");
            return false;
        }
        // Build the whole replacement before touching state. Transport and
        // backend failures leave the previous snapshot intact; an unusable
        // body empties the board.
        match result.and_then(|payload| BoardView::from_payload(&payload, &self.board.query)) {
            Ok(board) => {
                info!(
                    pipelines = board.ranked.len(),
                    visible = board.rows.len(),
                    "leaderboard_snapshot_replaced"
                );
                self.board = board;
                self.controller.succeed(ticket, self.clock.now())
            }
            Err(err) => {
                warn!(error = %err, "leaderboard_fetch_failed");
                if matches!(err, FetchError::MalformedPayload(_)) {
                    self.board = BoardView::new(Vec::new(), &self.board.query);
                }
                self.controller.fail(ticket, err)
            }
        }
    }

    fn apply_query(&mut self, query: &str) {
        self.board = self.board.with_query(query);
    }

    fn deactivate(&mut self) {
        self.controller.deactivate();
    }

    fn snapshot(&self) -> LeaderboardSnapshot {
        LeaderboardSnapshot {
            board: self.board.clone(),
            state: self.controller.state(),
            last_updated: self.controller.last_updated(),
            error: self.controller.last_error().cloned(),
        }
    }
}

/// How the detail screen should present itself right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailStatus<'a> {
    Loading,
    Ready(&'a PipelineDetail),
    /// The backend has nothing for this pipeline.
    NoData,
    /// Retryable or malformed-response failure.
    Failed(&'a FetchError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSnapshot {
    pub pipeline: String,
    pub detail: Option<PipelineDetail>,
    pub state: PollState,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<FetchError>,
}

impl DetailSnapshot {
    pub fn is_loading(&self) -> bool {
        self.state == PollState::Fetching
    }

    pub fn status(&self) -> DetailStatus<'_> {
        match (&self.error, &self.detail) {
            (Some(FetchError::NotFound(_)), _) => DetailStatus::NoData,
            (Some(err), _) => DetailStatus::Failed(err),
            (None, Some(detail)) => DetailStatus::Ready(detail),
            (None, None) => DetailStatus::Loading,
        }
    }
}

pub struct DetailView {
    pipeline: String,
    controller: PollController,
    clock: Arc<dyn Clock>,
    detail: Option<PipelineDetail>,
}

impl DetailView {
    pub fn new(pipeline: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: pipeline.into(),
            controller: PollController::new(),
            clock,
            detail: None,
        }
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }
}

impl PolledView for DetailView {
    type Snapshot = DetailSnapshot;

    fn trigger(&mut self, trigger: Trigger) -> Option<FetchTicket> {
        self.controller.try_begin(trigger)
    }

    fn complete(&mut self, ticket: FetchTicket, result: FetchResult<Value>) -> bool {
        if !self.controller.accepts(ticket) {
            debug!(pipeline = %self.pipeline, "detail_result_discarded");
            return false;
        }
        match result.and_then(|payload| project_detail(&self.pipeline, &payload)) {
            Ok(detail) => {
                info!(
                    pipeline = %self.pipeline,
                    mismatches = detail.mismatch_count,
                    "detail_loaded"
                );
                self.detail = Some(detail);
                self.controller.succeed(ticket, self.clock.now())
            }
            Err(err) => {
                warn!(pipeline = %self.pipeline, error = %err, "detail_fetch_failed");
                self.controller.fail(ticket, err)
            }
        }
    }

    fn deactivate(&mut self) {
        self.controller.deactivate();
    }

    fn snapshot(&self) -> DetailSnapshot {
        DetailSnapshot {
            pipeline: self.pipeline.clone(),
            detail: self.detail.clone(),
            state: self.controller.state(),
            last_updated: self.controller.last_updated(),
            error: self.controller.last_error().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::DetailOutcome;
    use crate::polling::controller::ManualClock;
    use chrono::TimeZone;
    use serde_json::json;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
        ))
    }

    #[test]
    fn successful_fetch_replaces_snapshot_and_stamps_time() {
        let mut view = LeaderboardView::new(clock());
        let ticket = view.trigger(Trigger::Activation).unwrap();
        assert!(view.complete(
            ticket,
            Ok(json!({"results": {"A": {"accuracy": 0.9}, "B": {"accuracy": 0.5}}}))
        ));
        let snap = view.snapshot();
        assert_eq!(snap.state, PollState::Idle);
        assert_eq!(snap.board.stats.count, 2);
        assert!(snap.last_updated.is_some());

        let ticket = view.trigger(Trigger::Tick).unwrap();
        assert!(view.complete(ticket, Ok(json!({"results": {"Z": {}}}))));
        let names: Vec<&str> = view.board().rows.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Z"]);
    }

    #[test]
    fn failed_fetch_keeps_previous_snapshot() {
        let mut view = LeaderboardView::new(clock());
        let ticket = view.trigger(Trigger::Activation).unwrap();
        view.complete(ticket, Ok(json!({"results": {"A": {"accuracy": 0.9}}})));
        let before = view.board().clone();

        let ticket = view.trigger(Trigger::Manual).unwrap();
        view.complete(ticket, Err(FetchError::Network("refused".into())));
        assert_eq!(view.state(), PollState::Failed);
        assert_eq!(view.board(), &before);

        let ticket = view.trigger(Trigger::Manual).unwrap();
        view.complete(ticket, Err(FetchError::Backend {
            status: 500,
            detail: "boom".into(),
        }));
        assert_eq!(view.board(), &before);
    }

    #[test]
    fn malformed_body_empties_the_board() {
        let mut view = LeaderboardView::new(clock());
        view.apply_query("a");
        let ticket = view.trigger(Trigger::Activation).unwrap();
        view.complete(ticket, Ok(json!({"results": {"A": {"accuracy": 0.9}}})));
        assert_eq!(view.board().rows.len(), 1);

        let ticket = view.trigger(Trigger::Manual).unwrap();
        view.complete(ticket, Ok(json!({"results": [1]})));
        let snap = view.snapshot();
        assert_eq!(snap.state, PollState::Failed);
        assert!(matches!(snap.error, Some(FetchError::MalformedPayload(_))));
        assert!(snap.board.rows.is_empty());
        assert!(snap.board.ranked.is_empty());
        assert_eq!(snap.board.query, "a");
        assert_eq!(snap.board.stats.count, 0);
    }

    #[test]
    fn query_survives_snapshot_replacement() {
        let mut view = LeaderboardView::new(clock());
        view.apply_query("fast");
        let ticket = view.trigger(Trigger::Activation).unwrap();
        view.complete(
            ticket,
            Ok(json!({"results": {"fast-a": {}, "slow-b": {}, "FAST-c": {}}})),
        );
        assert_eq!(view.board().rows.len(), 2);
        assert_eq!(view.board().ranked.len(), 3);
    }

    #[test]
    fn response_after_deactivation_is_ignored() {
        let mut view = LeaderboardView::new(clock());
        let ticket = view.trigger(Trigger::Activation).unwrap();
        view.deactivate();
        assert!(!view.complete(ticket, Ok(json!({"results": {"A": {}}}))));
        assert!(view.board().ranked.is_empty());
        assert_eq!(view.last_updated(), None);
    }

    #[test]
    fn detail_statuses() {
        let mut view = DetailView::new("p", clock());
        assert_eq!(view.snapshot().status(), DetailStatus::Loading);

        let ticket = view.trigger(Trigger::Activation).unwrap();
        view.complete(ticket, Ok(json!({"results": {"wrong_matches": []}})));
        let snap = view.snapshot();
        match snap.status() {
            DetailStatus::Ready(detail) => assert_eq!(detail.outcome, DetailOutcome::AllCorrect),
            other => panic!("unexpected status {other:?}"),
        }

        let ticket = view.trigger(Trigger::Manual).unwrap();
        view.complete(ticket, Err(FetchError::NotFound("p".into())));
        assert_eq!(view.snapshot().status(), DetailStatus::NoData);

        let ticket = view.trigger(Trigger::Manual).unwrap();
        view.complete(ticket, Err(FetchError::Network("down".into())));
        let snap = view.snapshot();
        assert!(matches!(snap.status(), DetailStatus::Failed(e) if e.is_retryable()));
        assert!(snap.detail.is_some());
    }
}
