//! Speech ports — external engines for speech input and output.
//!
//! Both capabilities are host commands configured by name and invoked
//! with a locale tag. Availability is probed once at startup; an
//! unavailable capability is surfaced as a message, never attempted.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::warn;

use crate::config::SpeechConfig;

/// Shown when the mic key is pressed without a recognizer available.
pub const RECOGNITION_UNSUPPORTED_MESSAGE: &str =
    "Speech recognition is not supported on this system.";

/// Shown when the speak key is pressed without a synthesizer available.
pub const SYNTHESIS_UNSUPPORTED_MESSAGE: &str =
    "Speech output is not supported on this system.";

/// Host speech capabilities, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeechCapability {
    pub synthesis: bool,
    pub recognition: bool,
}

/// Probe the host for the configured speech commands. A capability is
/// available when its command is configured and resolves to an
/// executable file.
pub fn probe(config: &SpeechConfig) -> SpeechCapability {
    SpeechCapability {
        synthesis: config
            .synthesizer_command
            .as_deref()
            .is_some_and(command_resolves),
        recognition: config
            .recognizer_command
            .as_deref()
            .is_some_and(command_resolves),
    }
}

/// Whether a command names an executable: an existing file when given as
/// a path, or found in one of the PATH directories otherwise.
fn command_resolves(command: &str) -> bool {
    let path = std::path::Path::new(command);
    if path.components().count() > 1 {
        return path.is_file();
    }
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths).any(|dir| dir.join(command).is_file())
    })
}

/// Speech-to-text port: one listening session, at most one transcript.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Listen in the given locale until the engine finishes. Resolves to
    /// the final transcript, or `None` when nothing was recognized.
    async fn transcribe(&self, locale_tag: &str) -> std::io::Result<Option<String>>;
}

/// Transcriber backed by an external command that prints one transcript
/// to stdout. The child is killed if the listening task is aborted.
pub struct CommandTranscriber {
    command: String,
}

impl CommandTranscriber {
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Transcriber for CommandTranscriber {
    async fn transcribe(&self, locale_tag: &str) -> std::io::Result<Option<String>> {
        let output = Command::new(&self.command)
            .arg(locale_tag)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            warn!(command = %self.command, status = ?output.status.code(), "recognizer exited with failure");
            return Ok(None);
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!transcript.is_empty()).then_some(transcript))
    }
}

/// Text-to-speech port. Fire-and-forget: the text goes to the command's
/// stdin and no result is consumed.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    command: String,
}

impl Synthesizer {
    pub fn new(command: String) -> Self {
        Self { command }
    }

    /// Speak the text in the given locale. Spawn failures are logged and
    /// otherwise ignored.
    pub fn speak(&self, text: &str, locale_tag: &str) {
        let command = self.command.clone();
        let locale_tag = locale_tag.to_string();
        let text = text.to_string();

        tokio::spawn(async move {
            let spawned = Command::new(&command)
                .arg(&locale_tag)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            match spawned {
                Ok(mut child) => {
                    if let Some(mut stdin) = child.stdin.take() {
                        let _ = stdin.write_all(text.as_bytes()).await;
                    }
                    let _ = child.wait().await;
                }
                Err(err) => warn!(command = %command, "speech synthesis failed: {err}"),
            }
        });
    }
}
