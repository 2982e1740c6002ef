//! Session orchestration — state, user intents, and the ordering rule.
//!
//! The session owns everything the UI displays and decides when a
//! translation attempt is issued. It performs no I/O itself: intents and
//! timer expiry hand back a `TranslationAttempt` for the runner to
//! execute, and results come back through `apply_result`. That keeps the
//! whole state machine synchronous and unit-testable.
//!
//! Ordering: every attempt carries a sequence number assigned at issue
//! time. A result is applied only if its number exceeds the highest
//! applied so far, so a slow stale response can never overwrite the
//! result of a newer attempt. State changes that make every outstanding
//! attempt stale (clear, empty input, language swap) advance the
//! watermark directly.

pub mod debounce;

use std::time::{Duration, Instant};

use tracing::debug;

use crate::lang::Language;
use crate::translate::{ErrorDescriptor, TranslationRequest, TranslationResult};
use debounce::DebounceTimer;

/// A translation attempt issued by the session. The runner executes it
/// and feeds the outcome back through [`Session::apply_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationAttempt {
    pub seq: u64,
    pub request: TranslationRequest,
}

/// In-memory session state. Mutated only by user intents, timer expiry,
/// and result arrival — there are no concurrent writers.
#[derive(Debug)]
pub struct Session {
    source_text: String,
    output_text: String,
    error: Option<ErrorDescriptor>,
    source_lang: Language,
    target_lang: Language,
    polite: bool,
    listening: bool,
    /// The debounced view of `source_text`: the last value that survived
    /// a full quiet interval (or an explicit settle).
    settled_text: String,
    debounce: DebounceTimer,
    /// Sequence number handed out to the most recent attempt.
    last_issued: u64,
    /// Highest sequence number applied or invalidated. Results at or
    /// below this watermark are discarded.
    watermark: u64,
}

impl Session {
    pub fn new(source_lang: Language, target_lang: Language, quiet: Duration) -> Self {
        Self {
            source_text: String::new(),
            output_text: String::new(),
            error: None,
            source_lang,
            target_lang,
            polite: true,
            listening: false,
            settled_text: String::new(),
            debounce: DebounceTimer::new(quiet),
            last_issued: 0,
            watermark: 0,
        }
    }

    // ── View accessors ──

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    pub fn error(&self) -> Option<&ErrorDescriptor> {
        self.error.as_ref()
    }

    pub fn source_lang(&self) -> Language {
        self.source_lang
    }

    pub fn target_lang(&self) -> Language {
        self.target_lang
    }

    pub fn polite(&self) -> bool {
        self.polite
    }

    pub fn listening(&self) -> bool {
        self.listening
    }

    pub fn settled_text(&self) -> &str {
        &self.settled_text
    }

    /// When the pending input settles, if an edit is being debounced.
    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    // ── User intents ──

    /// Update the source text. The input display reflects the edit
    /// immediately; network activity waits for the quiet interval.
    pub fn set_source_text(&mut self, text: &str, now: Instant) {
        self.source_text = text.to_string();
        self.debounce.schedule(self.source_text.clone(), now);
    }

    /// Append a speech transcript to the source text, space-joined.
    /// Behaves exactly like typing.
    pub fn push_transcript(&mut self, transcript: &str, now: Instant) {
        let joined = if self.source_text.is_empty() {
            transcript.to_string()
        } else {
            format!("{} {}", self.source_text, transcript)
        };
        self.set_source_text(&joined, now);
    }

    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    /// Reset input, output, and error immediately — no quiet interval.
    pub fn clear_input(&mut self) {
        self.source_text.clear();
        self.output_text.clear();
        self.error = None;
        self.settled_text.clear();
        self.debounce.cancel_pending();
        self.discard_inflight();
    }

    /// Clear the error display only; text state is untouched.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Exchange the language pair and the input/output texts. The
    /// swapped-in source counts as already settled, and a fresh attempt
    /// is issued for it so the output tracks the new pair.
    pub fn swap_languages(&mut self) -> Option<TranslationAttempt> {
        std::mem::swap(&mut self.source_lang, &mut self.target_lang);
        std::mem::swap(&mut self.source_text, &mut self.output_text);
        self.error = None;
        if self.target_lang.supports_formality() {
            self.polite = true;
        }

        self.settled_text = self.source_text.clone();
        self.debounce.cancel_pending();
        self.discard_inflight();

        if self.settled_text.trim().is_empty() {
            None
        } else {
            Some(self.issue_attempt())
        }
    }

    /// Change the source language; re-issues an attempt for the settled
    /// text so the output tracks the new pair.
    pub fn set_source_lang(&mut self, lang: Language) -> Option<TranslationAttempt> {
        if lang == self.source_lang {
            return None;
        }
        self.source_lang = lang;
        self.retranslate_settled()
    }

    /// Change the target language; re-issues an attempt for the settled
    /// text so the output tracks the new pair.
    pub fn set_target_lang(&mut self, lang: Language) -> Option<TranslationAttempt> {
        if lang == self.target_lang {
            return None;
        }
        self.target_lang = lang;
        self.retranslate_settled()
    }

    /// Flip the polite/casual register. Meaningful only while the target
    /// has a formality register; otherwise a no-op.
    pub fn toggle_polite(&mut self) -> Option<TranslationAttempt> {
        if !self.target_lang.supports_formality() {
            return None;
        }
        self.polite = !self.polite;
        self.retranslate_settled()
    }

    // ── Timer expiry ──

    /// Check the debounce timer. Call when the deadline passes; returns
    /// the attempt to execute if the settled text changed.
    pub fn tick(&mut self, now: Instant) -> Option<TranslationAttempt> {
        let text = self.debounce.take_expired(now)?;
        self.settle(text)
    }

    /// Settle the pending edit immediately (explicit "translate now").
    pub fn flush(&mut self) -> Option<TranslationAttempt> {
        let text = self.debounce.flush()?;
        self.settle(text)
    }

    // ── Result arrival ──

    /// Apply a finished attempt's result. Returns false when the result
    /// is stale (superseded or invalidated) and was discarded.
    pub fn apply_result(&mut self, seq: u64, result: TranslationResult) -> bool {
        if seq <= self.watermark {
            debug!(seq, watermark = self.watermark, "discarding stale translation result");
            return false;
        }
        self.watermark = seq;

        match result.error {
            Some(err) => {
                self.error = Some(err);
                self.output_text.clear();
            }
            None => {
                self.output_text = result.text;
                self.error = None;
            }
        }
        true
    }

    // ── Internal ──

    /// A settled text value arrived. Empty input clears the display;
    /// anything else that differs from the last settled value issues one
    /// attempt.
    fn settle(&mut self, text: String) -> Option<TranslationAttempt> {
        if text == self.settled_text {
            return None;
        }
        self.settled_text = text;

        if self.settled_text.trim().is_empty() {
            self.output_text.clear();
            self.error = None;
            self.discard_inflight();
            return None;
        }

        Some(self.issue_attempt())
    }

    /// Issue an attempt for the settled text under the current options,
    /// when there is settled text to translate.
    fn retranslate_settled(&mut self) -> Option<TranslationAttempt> {
        if self.settled_text.trim().is_empty() {
            return None;
        }
        Some(self.issue_attempt())
    }

    /// Build the next attempt. Any displayed error is cleared up front so
    /// a stale message is not shown next to a pending result.
    fn issue_attempt(&mut self) -> TranslationAttempt {
        self.error = None;
        self.last_issued += 1;
        TranslationAttempt {
            seq: self.last_issued,
            request: TranslationRequest {
                text: self.settled_text.clone(),
                source: self.source_lang,
                target: self.target_lang,
                polite: self.target_lang.supports_formality().then_some(self.polite),
            },
        }
    }

    /// Invalidate every outstanding attempt.
    fn discard_inflight(&mut self) {
        self.watermark = self.last_issued;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{ErrorKind, TRANSIENT_MESSAGE};

    const QUIET: Duration = Duration::from_millis(600);

    fn session() -> Session {
        Session::new(Language::English, Language::Korean, QUIET)
    }

    fn ok(text: &str) -> TranslationResult {
        TranslationResult {
            text: text.into(),
            error: None,
        }
    }

    fn failed() -> TranslationResult {
        TranslationResult {
            text: String::new(),
            error: Some(ErrorDescriptor {
                kind: ErrorKind::TransientFailure,
                message: TRANSIENT_MESSAGE.into(),
            }),
        }
    }

    #[test]
    fn typing_echoes_immediately_without_an_attempt() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hel", t0);
        assert_eq!(s.source_text(), "Hel");
        assert_eq!(s.tick(t0), None);
        assert!(s.deadline().is_some());
    }

    #[test]
    fn rapid_edits_produce_exactly_one_attempt_with_the_final_value() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("H", t0);
        s.set_source_text("He", t0 + Duration::from_millis(200));
        s.set_source_text("Hello", t0 + Duration::from_millis(400));

        // First deadline has passed, but each edit restarted the timer.
        assert!(s.tick(t0 + QUIET).is_none());

        let attempt = s.tick(t0 + Duration::from_millis(400) + QUIET).unwrap();
        assert_eq!(s.settled_text(), "Hello");
        assert_eq!(attempt.request.text, "Hello");
        assert_eq!(attempt.request.source, Language::English);
        assert_eq!(attempt.request.target, Language::Korean);
        assert_eq!(attempt.request.polite, Some(true));

        // Nothing further pending.
        assert!(s.tick(t0 + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn settling_the_same_value_issues_nothing() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        assert!(s.tick(t0 + QUIET).is_some());

        // Type a character and erase it within the interval.
        s.set_source_text("Hello!", t0 + QUIET);
        s.set_source_text("Hello", t0 + QUIET + Duration::from_millis(100));
        assert!(s.tick(t0 + QUIET * 3).is_none());
    }

    #[test]
    fn empty_settled_text_clears_display_without_an_attempt() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        let attempt = s.tick(t0 + QUIET).unwrap();
        assert!(s.apply_result(attempt.seq, ok("안녕하세요")));
        assert_eq!(s.output_text(), "안녕하세요");

        s.set_source_text("   ", t0 + QUIET);
        assert!(s.tick(t0 + QUIET * 2).is_none());
        assert_eq!(s.output_text(), "");
        assert_eq!(s.error(), None);
    }

    #[test]
    fn stale_result_never_overwrites_a_newer_one() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("first", t0);
        let slow = s.tick(t0 + QUIET).unwrap();

        s.set_source_text("second", t0 + QUIET);
        let fast = s.tick(t0 + QUIET * 2).unwrap();
        assert!(fast.seq > slow.seq);

        // The newer attempt resolves first.
        assert!(s.apply_result(fast.seq, ok("둘째")));
        assert_eq!(s.output_text(), "둘째");

        // The older one straggles in and is discarded silently.
        assert!(!s.apply_result(slow.seq, ok("첫째")));
        assert_eq!(s.output_text(), "둘째");
        assert_eq!(s.error(), None);
    }

    #[test]
    fn stale_error_is_discarded_too() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("first", t0);
        let slow = s.tick(t0 + QUIET).unwrap();
        s.set_source_text("second", t0 + QUIET);
        let fast = s.tick(t0 + QUIET * 2).unwrap();

        assert!(s.apply_result(fast.seq, ok("ok")));
        assert!(!s.apply_result(slow.seq, failed()));
        assert_eq!(s.error(), None);
        assert_eq!(s.output_text(), "ok");
    }

    #[test]
    fn clear_resets_immediately_and_invalidates_inflight() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        let inflight = s.tick(t0 + QUIET).unwrap();

        s.set_source_text("Hello again", t0 + QUIET);
        s.clear_input();

        assert_eq!(s.source_text(), "");
        assert_eq!(s.output_text(), "");
        assert_eq!(s.error(), None);
        // The pending edit is gone, not merely delayed.
        assert!(s.deadline().is_none());
        assert!(s.tick(t0 + QUIET * 10).is_none());
        // The in-flight result lands in a cleared session and is dropped.
        assert!(!s.apply_result(inflight.seq, ok("late")));
        assert_eq!(s.output_text(), "");
    }

    #[test]
    fn error_result_clears_output_and_is_dismissible() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        let a = s.tick(t0 + QUIET).unwrap();
        assert!(s.apply_result(a.seq, ok("안녕하세요")));

        s.set_source_text("Hello!", t0 + QUIET);
        let b = s.tick(t0 + QUIET * 2).unwrap();
        assert!(s.apply_result(b.seq, failed()));
        assert_eq!(s.output_text(), "");
        assert_eq!(s.error().unwrap().kind, ErrorKind::TransientFailure);

        s.dismiss_error();
        assert_eq!(s.error(), None);
        // Dismissal touches the display only.
        assert_eq!(s.source_text(), "Hello!");
    }

    #[test]
    fn issuing_an_attempt_clears_the_previous_error() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        let a = s.tick(t0 + QUIET).unwrap();
        s.apply_result(a.seq, failed());
        assert!(s.error().is_some());

        let b = s.toggle_polite().unwrap();
        assert!(s.error().is_none());
        assert_eq!(b.request.polite, Some(false));
    }

    #[test]
    fn swap_round_trip_restores_languages_and_text_placement() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        let a = s.tick(t0 + QUIET).unwrap();
        s.apply_result(a.seq, ok("안녕하세요"));

        let swap_attempt = s.swap_languages().unwrap();
        assert_eq!(s.source_lang(), Language::Korean);
        assert_eq!(s.target_lang(), Language::English);
        assert_eq!(s.source_text(), "안녕하세요");
        assert_eq!(s.output_text(), "Hello");
        assert_eq!(swap_attempt.request.text, "안녕하세요");
        assert_eq!(swap_attempt.request.source, Language::Korean);
        assert_eq!(swap_attempt.request.target, Language::English);
        // English target has no formality register.
        assert_eq!(swap_attempt.request.polite, None);

        s.swap_languages();
        assert_eq!(s.source_lang(), Language::English);
        assert_eq!(s.target_lang(), Language::Korean);
        assert_eq!(s.source_text(), "Hello");
        assert_eq!(s.output_text(), "안녕하세요");
    }

    #[test]
    fn swap_resets_formality_to_polite_when_the_new_target_has_it() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        let a = s.tick(t0 + QUIET).unwrap();
        s.apply_result(a.seq, ok("안녕"));

        // Casual register, then swap twice: ko target comes back polite.
        s.toggle_polite();
        assert!(!s.polite());
        s.swap_languages(); // target is now English; polite untouched
        assert!(!s.polite());
        s.swap_languages(); // target is Korean again: reset to polite
        assert!(s.polite());
    }

    #[test]
    fn swap_invalidates_inflight_attempts() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        let old = s.tick(t0 + QUIET).unwrap();

        // Swap before the attempt resolves. The typed text moves to the
        // output side; the swapped-in source is empty, so no new attempt.
        assert!(s.swap_languages().is_none());
        assert_eq!(s.output_text(), "Hello");

        // The pre-swap result must not clobber the swapped display.
        assert!(!s.apply_result(old.seq, ok("stale")));
        assert_eq!(s.output_text(), "Hello");
    }

    #[test]
    fn formality_toggle_reissues_for_the_settled_text() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        s.tick(t0 + QUIET).unwrap();

        let attempt = s.toggle_polite().unwrap();
        assert!(!s.polite());
        assert_eq!(attempt.request.text, "Hello");
        assert_eq!(attempt.request.polite, Some(false));

        let attempt = s.toggle_polite().unwrap();
        assert!(s.polite());
        assert_eq!(attempt.request.polite, Some(true));
    }

    #[test]
    fn formality_toggle_is_a_noop_without_a_register_or_text() {
        let mut s = Session::new(Language::Korean, Language::English, QUIET);
        let t0 = Instant::now();
        s.set_source_text("안녕", t0);
        s.tick(t0 + QUIET).unwrap();

        // English target: no register.
        assert!(s.toggle_polite().is_none());
        assert!(s.polite());

        // Korean target but nothing settled yet.
        let mut s = session();
        assert!(s.toggle_polite().is_none());
        assert!(!s.polite());
    }

    #[test]
    fn language_change_retranslates_immediately() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        s.tick(t0 + QUIET).unwrap();

        let attempt = s.set_target_lang(Language::Khmer).unwrap();
        assert_eq!(attempt.request.target, Language::Khmer);
        assert_eq!(attempt.request.text, "Hello");

        // Same language again: nothing to do.
        assert!(s.set_target_lang(Language::Khmer).is_none());
        // Nothing settled: source change issues nothing.
        s.clear_input();
        assert!(s.set_source_lang(Language::Korean).is_none());
    }

    #[test]
    fn transcript_appends_like_typing() {
        let mut s = session();
        let t0 = Instant::now();

        s.push_transcript("Hello", t0);
        assert_eq!(s.source_text(), "Hello");
        s.push_transcript("there", t0 + Duration::from_millis(100));
        assert_eq!(s.source_text(), "Hello there");

        // One settled attempt for the joined text.
        let attempt = s.tick(t0 + Duration::from_millis(100) + QUIET).unwrap();
        assert_eq!(attempt.request.text, "Hello there");
    }

    #[test]
    fn flush_settles_without_waiting() {
        let mut s = session();
        let t0 = Instant::now();

        s.set_source_text("Hello", t0);
        let attempt = s.flush().unwrap();
        assert_eq!(attempt.request.text, "Hello");
        assert!(s.deadline().is_none());
        // A second flush with nothing pending is a no-op.
        assert!(s.flush().is_none());
    }

    #[test]
    fn polite_flag_is_absent_for_targets_without_a_register() {
        let mut s = Session::new(Language::Korean, Language::English, QUIET);
        let t0 = Instant::now();

        s.set_source_text("안녕하세요", t0);
        let attempt = s.tick(t0 + QUIET).unwrap();
        assert_eq!(attempt.request.polite, None);
    }
}
