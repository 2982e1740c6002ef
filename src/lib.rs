//! triglot — an interactive translation console for English, Korean,
//! and Khmer, backed by the Gemini `generateContent` API.
//!
//! Architecture:
//! - `session` owns all translation state and decides when attempts are
//!   issued (debounced input, sequence-ordered results).
//! - `translate` performs one remote attempt per call and classifies
//!   every outcome into a uniform result value.
//! - `speech` wraps external host commands for speech input/output.
//! - `tui` renders the session and turns key events into intents.
//!
//! The session performs no I/O and the client holds no state, so the
//! interesting behavior is unit-testable end to end.

pub mod config;
pub mod lang;
pub mod session;
pub mod speech;
pub mod translate;
pub mod tui;
