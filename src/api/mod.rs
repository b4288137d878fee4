//! Backend request/response contract.
//!
//! - **[`client`]**: `BenchmarkApi` trait and the reqwest implementation.
//! - **[`error`]**: `FetchError`, the error taxonomy every view recovers from.
//! - **[`forms`]**: execution forms with pre-dispatch validation.

pub mod client;
pub mod error;
pub mod forms;

pub use client::{BenchmarkApi, HttpBenchmarkClient, error_detail};
pub use error::{FetchError, FetchResult};
pub use forms::{BenchmarkRunForm, PipelineRunForm};
