//! Terminal UI (TUI) module for cursochat.

// === Submodules ===

pub mod app;
pub mod ui;

// === Re-exports ===

pub use app::TuiOptions;
pub use ui::run_tui;
