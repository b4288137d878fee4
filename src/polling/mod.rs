//! Fetch lifecycle for the screens that show backend data.
//!
//! Each view owns its snapshot and runs on its own task; nothing is shared
//! between the leaderboard and a detail view.

pub mod controller;
pub mod driver;
pub mod view;

pub use controller::{Clock, FetchTicket, ManualClock, PollController, PollState, SystemClock, Trigger};
pub use driver::{
    Fetcher, IntervalTicker, NeverTicker, Ticker, ViewCommand, ViewHandle, spawn_detail,
    spawn_leaderboard,
};
pub use view::{
    DetailSnapshot, DetailStatus, DetailView, LeaderboardSnapshot, LeaderboardView, PolledView,
};
