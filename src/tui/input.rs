//! Key binding dispatch for the TUI.
//!
//! Ctrl+C quits. Esc clears the input. Tab swaps the language pair.
//! F2/F3 cycle the source/target language. Ctrl+P toggles the
//! polite/casual register. Enter translates the pending edit now.
//! Ctrl+R toggles listening, Ctrl+T speaks the output, Ctrl+Y copies it,
//! Ctrl+D dismisses the error. Everything else edits the input buffer.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::session::TranslationAttempt;
use crate::speech::{RECOGNITION_UNSUPPORTED_MESSAGE, SYNTHESIS_UNSUPPORTED_MESSAGE};

use super::app::TuiApp;
use super::input_line::InputKey;

/// What the runner must do after a key was handled.
#[derive(Debug)]
pub enum Intent {
    None,
    /// Execute a translation attempt and report its result back.
    Attempt(TranslationAttempt),
    /// Start listening, or abort the active listening task.
    ToggleListening,
    /// Speak text through the synthesizer.
    Speak { text: String, locale_tag: &'static str },
}

impl From<Option<TranslationAttempt>> for Intent {
    fn from(attempt: Option<TranslationAttempt>) -> Self {
        attempt.map_or(Intent::None, Intent::Attempt)
    }
}

/// Dispatch one key event.
pub fn handle_key(app: &mut TuiApp, key: KeyEvent, now: Instant) -> Intent {
    // Any keystroke consumes the transient footer notice.
    app.notice = None;

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            Intent::None
        }
        KeyCode::Char('d') if ctrl => {
            app.session.dismiss_error();
            Intent::None
        }
        KeyCode::Char('p') if ctrl => app.session.toggle_polite().into(),
        KeyCode::Char('y') if ctrl => {
            copy_output(app);
            Intent::None
        }
        KeyCode::Char('t') if ctrl => speak_output(app),
        KeyCode::Char('r') if ctrl => toggle_listening(app),
        KeyCode::Esc => {
            app.session.clear_input();
            app.input.clear();
            Intent::None
        }
        KeyCode::Tab => {
            let attempt = app.session.swap_languages();
            app.sync_input_from_session();
            attempt.into()
        }
        KeyCode::F(2) => {
            let next = app.session.source_lang().cycled();
            app.session.set_source_lang(next).into()
        }
        KeyCode::F(3) => {
            let next = app.session.target_lang().cycled();
            app.session.set_target_lang(next).into()
        }
        KeyCode::Enter => app.session.flush().into(),
        _ => {
            if app.input.handle_key(key) == InputKey::Edited {
                app.session.set_source_text(app.input.content(), now);
            }
            Intent::None
        }
    }
}

/// Put the output text on the system clipboard.
fn copy_output(app: &mut TuiApp) {
    let text = app.session.output_text().to_string();
    if text.is_empty() {
        app.set_notice("Nothing to copy.");
        return;
    }
    match arboard::Clipboard::new().and_then(|mut clip| clip.set_text(text)) {
        Ok(()) => app.set_notice("Output copied to clipboard."),
        Err(err) => {
            warn!("clipboard copy failed: {err}");
            app.set_notice("Clipboard is not available.");
        }
    }
}

/// Speak the output text in the target language.
fn speak_output(app: &mut TuiApp) -> Intent {
    if !app.capability.synthesis {
        app.set_notice(SYNTHESIS_UNSUPPORTED_MESSAGE);
        return Intent::None;
    }
    let text = app.session.output_text().to_string();
    if text.is_empty() {
        app.set_notice("Nothing to speak.");
        return Intent::None;
    }
    Intent::Speak {
        text,
        locale_tag: app.session.target_lang().locale_tag(),
    }
}

/// Start or stop listening, if recognition is available at all.
fn toggle_listening(app: &mut TuiApp) -> Intent {
    if !app.session.listening() && !app.capability.recognition {
        app.set_notice(RECOGNITION_UNSUPPORTED_MESSAGE);
        return Intent::None;
    }
    Intent::ToggleListening
}
