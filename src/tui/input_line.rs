//! Editable source-text buffer with cursor.
//!
//! Stores a `String` and a character-offset cursor. Handles insert,
//! delete, cursor movement, and clipboard paste (via `arboard`). Every
//! key is reported as edited / moved / ignored so the caller knows when
//! the session's source text actually changed.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    /// Content changed — the session should see the new text.
    Edited,
    /// Only the cursor moved.
    CursorMoved,
    /// Not an editing key.
    Ignored,
}

/// The editable source-text buffer. Cursor is a character offset
/// (0 = before the first char); multi-byte text is handled by converting
/// to byte offsets at the edit point.
#[derive(Debug, Default)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Clear content and reset the cursor.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Replace the content, cursor at the end. Used when an intent
    /// rewrites the text out from under the widget (clear, swap,
    /// transcript arrival).
    pub fn set_content(&mut self, text: &str) {
        self.content = text.to_string();
        self.cursor = self.content.chars().count();
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputKey {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('v') if ctrl => self.paste_clipboard(),
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Backspace if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => {
                self.insert_char(ch);
                InputKey::Edited
            }
            KeyCode::Backspace => self.delete_back(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                InputKey::CursorMoved
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.content.chars().count());
                InputKey::CursorMoved
            }
            KeyCode::Home => {
                self.cursor = 0;
                InputKey::CursorMoved
            }
            KeyCode::End => {
                self.cursor = self.content.chars().count();
                InputKey::CursorMoved
            }
            _ => InputKey::Ignored,
        }
    }

    fn insert_char(&mut self, ch: char) {
        // Bare carriage returns never belong in the buffer.
        if ch == '\r' {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    fn delete_back(&mut self) -> InputKey {
        if self.cursor == 0 {
            return InputKey::Ignored;
        }
        self.cursor -= 1;
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.content.replace_range(start..end, "");
        InputKey::Edited
    }

    fn delete_forward(&mut self) -> InputKey {
        if self.cursor >= self.content.chars().count() {
            return InputKey::Ignored;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.content.replace_range(start..end, "");
        InputKey::Edited
    }

    /// Delete back to the start of the previous word.
    fn delete_word_back(&mut self) -> InputKey {
        if self.cursor == 0 {
            return InputKey::Ignored;
        }
        let chars: Vec<char> = self.content.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let start = self.byte_offset(pos);
        let end = self.byte_offset(self.cursor);
        self.content.replace_range(start..end, "");
        self.cursor = pos;
        InputKey::Edited
    }

    /// Paste from the system clipboard, normalizing line endings.
    fn paste_clipboard(&mut self) -> InputKey {
        let Ok(text) = arboard::Clipboard::new().and_then(|mut clip| clip.get_text()) else {
            return InputKey::Ignored;
        };
        let clean = text.replace("\r\n", "\n").replace('\r', "\n");
        if clean.is_empty() {
            return InputKey::Ignored;
        }
        let at = self.byte_offset(self.cursor);
        self.content.insert_str(at, &clean);
        self.cursor += clean.chars().count();
        InputKey::Edited
    }

    /// Convert a character offset to a byte offset.
    fn byte_offset(&self, char_pos: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}
