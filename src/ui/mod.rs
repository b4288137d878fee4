//! Terminal UI: ratatui screens plus the formatting they share with the CLI.

pub mod components;
pub mod data;
pub mod shortcuts;
pub mod tui;
