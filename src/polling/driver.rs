//! Async event loop that owns one view, its timer and its single in-flight fetch.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use super::controller::{Clock, FetchTicket, Trigger};
use super::view::{DetailSnapshot, DetailView, LeaderboardSnapshot, LeaderboardView, PolledView};
use crate::api::client::BenchmarkApi;
use crate::api::error::FetchResult;
use crate::config::ClientConfig;

pub type BoxFetch = Pin<Box<dyn Future<Output = FetchResult<Value>> + Send>>;

/// Starts a fresh request each time it is called.
pub type Fetcher = Arc<dyn Fn() -> BoxFetch + Send + Sync>;

/// Source of periodic refresh triggers.
pub trait Ticker: Send + 'static {
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Fixed-period ticker. The first tick lands one period after creation.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticker for views that only refresh on demand.
#[derive(Debug, Default)]
pub struct NeverTicker;

impl Ticker for NeverTicker {
    async fn tick(&mut self) {
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Refresh,
    Search(String),
}

pub struct ViewDriver<V: PolledView, T: Ticker> {
    view: V,
    ticker: T,
    fetch: Fetcher,
    commands: mpsc::UnboundedReceiver<ViewCommand>,
    snapshots: watch::Sender<V::Snapshot>,
    in_flight: Option<(FetchTicket, BoxFetch)>,
}

impl<V: PolledView, T: Ticker> ViewDriver<V, T> {
    /// Drive the view until every command sender is dropped.
    ///
    /// Returns the last published snapshot.
    pub async fn run(mut self) -> V::Snapshot {
        self.start(Trigger::Activation);
        self.publish();

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(ViewCommand::Refresh) => self.start(Trigger::Manual),
                    Some(ViewCommand::Search(query)) => self.view.apply_query(&query),
                    None => break,
                },
                _ = self.ticker.tick() => self.start(Trigger::Tick),
                (ticket, result) = poll_in_flight(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.view.complete(ticket, result);
                }
            }
            self.publish();
        }

        // Drop the pending request without awaiting it.
        self.view.deactivate();
        if self.in_flight.take().is_some() {
            debug!("in_flight_fetch_discarded");
        }
        self.publish();
        info!("view_driver_stopped");
        self.snapshots.borrow().clone()
    }

    fn start(&mut self, trigger: Trigger) {
        if let Some(ticket) = self.view.trigger(trigger) {
            self.in_flight = Some((ticket, (self.fetch)()));
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.view.snapshot());
    }
}

async fn poll_in_flight(
    slot: &mut Option<(FetchTicket, BoxFetch)>,
) -> (FetchTicket, FetchResult<Value>) {
    match slot {
        Some((ticket, fut)) => {
            let result = fut.await;
            (*ticket, result)
        }
        None => std::future::pending().await,
    }
}

/// Caller side of a running [`ViewDriver`].
pub struct ViewHandle<S> {
    commands: mpsc::UnboundedSender<ViewCommand>,
    snapshots: watch::Receiver<S>,
    task: JoinHandle<S>,
}

impl<S: Clone + Send + Sync + 'static> ViewHandle<S> {
    pub fn spawn<V, T>(view: V, ticker: T, fetch: Fetcher) -> Self
    where
        V: PolledView<Snapshot = S>,
        T: Ticker,
    {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (snap_tx, snap_rx) = watch::channel(view.snapshot());
        let driver = ViewDriver {
            view,
            ticker,
            fetch,
            commands: cmd_rx,
            snapshots: snap_tx,
            in_flight: None,
        };
        Self {
            commands: cmd_tx,
            snapshots: snap_rx,
            task: tokio::spawn(driver.run()),
        }
    }

    pub fn refresh(&self) {
        let _ = self.commands.send(ViewCommand::Refresh);
    }

    pub fn search(&self, query: impl Into<String>) {
        let _ = self.commands.send(ViewCommand::Search(query.into()));
    }

    pub fn snapshot(&self) -> S {
        self.snapshots.borrow().clone()
    }

    /// A receiver that wakes whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.snapshots.clone()
    }

    /// Deactivate the view and wait for its task to finish.
    pub async fn shutdown(self) -> Result<S> {
        drop(self.commands);
        self.task.await.context("view driver task failed")
    }
}

/// Leaderboard view refreshed every `config.poll_interval`.
pub fn spawn_leaderboard<A: BenchmarkApi>(
    api: Arc<A>,
    config: &ClientConfig,
    clock: Arc<dyn Clock>,
) -> ViewHandle<LeaderboardSnapshot> {
    let fetch: Fetcher = Arc::new(move || -> BoxFetch {
        let api = Arc::clone(&api);
        Box::pin(async move { api.fetch_leaderboard().await })
    });
    ViewHandle::spawn(
        LeaderboardView::new(clock),
        IntervalTicker::new(config.poll_interval),
        fetch,
    )
}

/// Detail view for one pipeline. Fetches on activation and on manual refresh.
pub fn spawn_detail<A: BenchmarkApi>(
    api: Arc<A>,
    pipeline: impl Into<String>,
    clock: Arc<dyn Clock>,
) -> ViewHandle<DetailSnapshot> {
    let pipeline = pipeline.into();
    let name = pipeline.clone();
    let fetch: Fetcher = Arc::new(move || -> BoxFetch {
        let api = Arc::clone(&api);
        let name = name.clone();
        Box::pin(async move { api.fetch_pipeline(&name).await })
    });
    ViewHandle::spawn(DetailView::new(pipeline, clock), NeverTicker, fetch)
}
