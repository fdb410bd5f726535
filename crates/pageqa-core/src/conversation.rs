//! Request lifecycle for the Q&A chat.
//!
//! A [`Conversation`] owns the session fields and the transcript and is the
//! only thing that mutates them. One submission runs at a time:
//!
//! ```text
//! Idle -> Submitting -> Settled(Success | RemoteError | TransportError) -> Idle
//! ```
//!
//! Event loops that cannot hold `&mut Conversation` across an await use
//! [`Conversation::begin_submission`] and [`Conversation::settle`] around their
//! own task; everything else can call [`Conversation::submit`].

use crate::service::{QaOutcome, QaService, TransportError};
use crate::state::{ChatMessage, Session, Transcript};

/// The validated request handed to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub url: String,
    pub question: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
}

/// Which terminal entry a submission produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Success,
    RemoteError,
    NetworkUnreachable,
    TransportFailure,
}

#[derive(Debug, Default, Clone)]
pub struct Conversation {
    session: Session,
    transcript: Transcript,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SubmissionState {
        if self.session.is_pending() {
            SubmissionState::Submitting
        } else {
            SubmissionState::Idle
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.session.set_url(url);
    }

    pub fn set_draft_question(&mut self, question: impl Into<String>) {
        self.session.set_draft_question(question);
    }

    pub fn url_mut(&mut self) -> &mut String {
        self.session.url_mut()
    }

    pub fn draft_question_mut(&mut self) -> &mut String {
        self.session.draft_question_mut()
    }

    /// Prefills the draft with a canned prompt. Never submits.
    pub fn apply_suggestion(&mut self, prompt: &str) {
        self.session.set_draft_question(prompt);
    }

    /// Validates the draft, takes the lock and echoes the question into the
    /// transcript. `None` means the submission was skipped and nothing changed.
    pub fn begin_submission(&mut self) -> Option<PendingQuestion> {
        if !self.session.begin_submission() {
            log::debug!(
                "submission skipped (pending: {}, blank draft: {})",
                self.session.is_pending(),
                self.session.draft_question().trim().is_empty()
            );
            return None;
        }

        let question = self.session.draft_question().to_string();
        let url = self.session.url().to_string();
        self.transcript.append(ChatMessage::user(question.clone()));
        log::info!(
            "submitting question ({} chars) about {:?}",
            question.chars().count(),
            url
        );

        Some(PendingQuestion { url, question })
    }

    /// Appends the terminal entry for the outstanding submission and releases
    /// the lock. Ignored when nothing is outstanding.
    pub fn settle(&mut self, outcome: QaOutcome) -> Option<Settlement> {
        if !self.session.is_pending() {
            log::warn!("dropping outcome with no submission outstanding: {outcome:?}");
            return None;
        }

        let (message, settlement) = match outcome {
            QaOutcome::Answer(answer) => (ChatMessage::assistant(answer), Settlement::Success),
            QaOutcome::Remote(error) => {
                self.session.record_error(&error);
                (ChatMessage::error(error), Settlement::RemoteError)
            }
            QaOutcome::Transport(err) => {
                let text = err.to_string();
                self.session.record_error(&text);
                let settlement = match err {
                    TransportError::NetworkUnreachable => Settlement::NetworkUnreachable,
                    TransportError::Other(_) => Settlement::TransportFailure,
                };
                (ChatMessage::error(text), settlement)
            }
        };

        self.transcript.append(message);
        self.session.end_submission();
        log::info!("submission settled: {settlement:?}");

        Some(settlement)
    }

    /// Runs one full submission against `service`.
    pub async fn submit<S>(&mut self, service: &S) -> Option<Settlement>
    where
        S: QaService + ?Sized,
    {
        let pending = self.begin_submission()?;
        let outcome = service.ask(&pending.url, &pending.question).await;
        self.settle(outcome)
    }
}
