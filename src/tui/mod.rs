//! Terminal presentation layer — ratatui.
//!
//! Renders the two translation cards and forwards key events to the
//! session as intents. Same shape as a TEA app: model (`TuiApp`) +
//! update (key dispatch) + view (render). Immediate mode, no retained
//! widget state. The TUI holds no invariants of its own — all
//! translation state lives in the session.

pub mod app;
pub mod input;
pub mod input_line;
pub mod render;
pub mod runner;
