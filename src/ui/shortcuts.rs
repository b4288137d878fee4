//! Keyboard shortcut constants for consistent documentation.

pub const QUIT: &str = "q/Esc";
pub const REFRESH: &str = "r";
pub const FOCUS_SEARCH: &str = "/";
pub const CLEAR_SEARCH: &str = "Ctrl+U";
pub const DETAIL_OPEN: &str = "Enter";
pub const DETAIL_CLOSE: &str = "Esc";
pub const THEME: &str = "F2";
pub const TOGGLE_CHART: &str = "c";

// Navigation
pub const MOVE: &str = "Up/Down j/k";
pub const JUMP_TOP: &str = "Home";
pub const JUMP_BOTTOM: &str = "End";
