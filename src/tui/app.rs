//! TUI model — the session plus view-only state.

use crate::session::Session;
use crate::speech::SpeechCapability;

use super::input_line::InputBuffer;

/// Everything the view reads and the key dispatcher mutates.
pub struct TuiApp {
    pub session: Session,
    pub input: InputBuffer,
    /// Host speech capabilities, probed once at startup.
    pub capability: SpeechCapability,
    /// Transient feedback line (copy confirmation, unsupported notices).
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl TuiApp {
    pub fn new(session: Session, capability: SpeechCapability) -> Self {
        Self {
            session,
            input: InputBuffer::new(),
            capability,
            notice: None,
            should_quit: false,
        }
    }

    /// Show a transient feedback message in the footer.
    pub fn set_notice(&mut self, text: &str) {
        self.notice = Some(text.to_string());
    }

    /// Re-seed the editable buffer after an intent rewrote the source
    /// text underneath it (clear, swap, transcript arrival).
    pub fn sync_input_from_session(&mut self) {
        self.input.set_content(self.session.source_text());
    }
}
