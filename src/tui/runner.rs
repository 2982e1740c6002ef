//! Event loop — keys, the debounce deadline, results, and transcripts.
//!
//! One task owns the session. Translation attempts and listening
//! sessions run as spawned tasks reporting back over channels, so the
//! loop below is the only writer of session state. Results may arrive
//! out of order; the session's sequence rule decides what sticks.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::session::{Session, TranslationAttempt};
use crate::speech::{self, CommandTranscriber, Synthesizer, Transcriber};
use crate::translate::{TranslationResult, Translator};

use super::app::TuiApp;
use super::input::{self, Intent};
use super::render;

/// Build the session from config and drive the terminal UI until quit.
pub async fn run(config: AppConfig, translator: Translator) -> anyhow::Result<()> {
    let source = config.source_language().context("config: source_lang")?;
    let target = config.target_language().context("config: target_lang")?;
    let session = Session::new(source, target, config.quiet_interval());

    let capability = speech::probe(&config.speech);
    info!(
        ?capability,
        model = translator.model(),
        has_credential = translator.has_credential(),
        "starting session"
    );

    let transcriber: Option<Arc<dyn Transcriber>> = config
        .speech
        .recognizer_command
        .clone()
        .filter(|_| capability.recognition)
        .map(|cmd| Arc::new(CommandTranscriber::new(cmd)) as Arc<dyn Transcriber>);
    let synthesizer = config
        .speech
        .synthesizer_command
        .clone()
        .filter(|_| capability.synthesis)
        .map(Synthesizer::new);

    let mut app = TuiApp::new(session, capability);

    let mut terminal = ratatui::init();
    let result = event_loop(
        &mut terminal,
        &mut app,
        Arc::new(translator),
        transcriber,
        synthesizer,
    )
    .await;
    ratatui::restore();
    result
}

async fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut TuiApp,
    translator: Arc<Translator>,
    transcriber: Option<Arc<dyn Transcriber>>,
    synthesizer: Option<Synthesizer>,
) -> anyhow::Result<()> {
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(u64, TranslationResult)>();
    let (transcript_tx, mut transcript_rx) = mpsc::unbounded_channel::<Option<String>>();
    let mut events = EventStream::new();
    let mut listen_task: Option<JoinHandle<()>> = None;

    loop {
        terminal.draw(|frame| render::draw(frame, app))?;
        if app.should_quit {
            break;
        }

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match input::handle_key(app, key, Instant::now()) {
                            Intent::None => {}
                            Intent::Attempt(attempt) => {
                                spawn_attempt(attempt, &translator, &result_tx);
                            }
                            Intent::Speak { text, locale_tag } => {
                                if let Some(synth) = &synthesizer {
                                    synth.speak(&text, locale_tag);
                                }
                            }
                            Intent::ToggleListening => {
                                toggle_listening(app, &transcriber, &transcript_tx, &mut listen_task);
                            }
                        }
                    }
                    // Resize and the rest just trigger the redraw above.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                }
            }

            _ = sleep_until(app.session.deadline()) => {
                if let Some(attempt) = app.session.tick(Instant::now()) {
                    spawn_attempt(attempt, &translator, &result_tx);
                }
            }

            Some((seq, result)) = result_rx.recv() => {
                app.session.apply_result(seq, result);
            }

            Some(transcript) = transcript_rx.recv() => {
                app.session.set_listening(false);
                listen_task = None;
                if let Some(text) = transcript {
                    app.session.push_transcript(&text, Instant::now());
                    app.sync_input_from_session();
                }
            }
        }
    }

    if let Some(task) = listen_task {
        task.abort();
    }
    Ok(())
}

/// Sleep until the debounce deadline, or forever when nothing is pending.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await
        }
        None => std::future::pending().await,
    }
}

/// Run one attempt off-loop and report its result with its sequence tag.
fn spawn_attempt(
    attempt: TranslationAttempt,
    translator: &Arc<Translator>,
    result_tx: &mpsc::UnboundedSender<(u64, TranslationResult)>,
) {
    let translator = Arc::clone(translator);
    let result_tx = result_tx.clone();
    tokio::spawn(async move {
        let result = translator.translate(&attempt.request).await;
        let _ = result_tx.send((attempt.seq, result));
    });
}

/// Start a listening session, or abort the active one. Aborting kills
/// the recognizer child process (`kill_on_drop`).
fn toggle_listening(
    app: &mut TuiApp,
    transcriber: &Option<Arc<dyn Transcriber>>,
    transcript_tx: &mpsc::UnboundedSender<Option<String>>,
    listen_task: &mut Option<JoinHandle<()>>,
) {
    if let Some(task) = listen_task.take() {
        task.abort();
        app.session.set_listening(false);
        return;
    }

    let Some(transcriber) = transcriber else {
        app.set_notice(speech::RECOGNITION_UNSUPPORTED_MESSAGE);
        return;
    };

    let locale_tag = app.session.source_lang().locale_tag();
    app.session.set_listening(true);

    let transcriber = Arc::clone(transcriber);
    let transcript_tx = transcript_tx.clone();
    *listen_task = Some(tokio::spawn(async move {
        let transcript = match transcriber.transcribe(locale_tag).await {
            Ok(transcript) => transcript,
            Err(err) => {
                warn!("speech recognition failed: {err}");
                None
            }
        };
        let _ = transcript_tx.send(transcript);
    }));
}
