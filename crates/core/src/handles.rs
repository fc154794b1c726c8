//! Role-scoped handles over a shared [`InterviewSession`].
//!
//! The interviewer only ever holds a [`Controller`] and the voice agent only a
//! [`Responder`], so neither side can accidentally call the other side's operations.

use crate::{
    error::BridgeError,
    payload::{Answer, Prompt, Question},
    session::InterviewSession,
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

/// Anything the interviewer can put a question to and get an answer back from.
///
/// This is the seam between whatever decides *what* to ask and whatever actually
/// reaches the founder.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    /// Asks one question and waits for its answer.
    async fn ask(&self, question: Question) -> Result<Answer, BridgeError>;

    /// Declares that no more questions will be asked.
    fn finish(&self);
}

/// Interviewer-side handle: ask questions, end the dialogue.
#[derive(Debug, Clone)]
pub struct Controller {
    session: Arc<InterviewSession>,
    answer_timeout: Duration,
}

impl Controller {
    pub fn new(session: Arc<InterviewSession>, answer_timeout: Duration) -> Self {
        Self {
            session,
            answer_timeout,
        }
    }

    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    pub fn answer_timeout(&self) -> Duration {
        self.answer_timeout
    }

    /// Pushes a question with this handle's answer timeout.
    pub async fn ask(&self, question: impl Into<Question>) -> Result<Answer, BridgeError> {
        self.session
            .push_question(question, self.answer_timeout)
            .await
    }

    pub fn finish(&self) {
        self.session.signal_end();
    }
}

#[async_trait]
impl AnswerSource for Controller {
    async fn ask(&self, question: Question) -> Result<Answer, BridgeError> {
        Controller::ask(self, question).await
    }

    fn finish(&self) {
        Controller::finish(self);
    }
}

/// Voice-agent-side handle: fetch questions, hand back answers.
#[derive(Debug, Clone)]
pub struct Responder {
    session: Arc<InterviewSession>,
    question_timeout: Duration,
}

impl Responder {
    pub fn new(session: Arc<InterviewSession>, question_timeout: Duration) -> Self {
        Self {
            session,
            question_timeout,
        }
    }

    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    pub fn question_timeout(&self) -> Duration {
        self.question_timeout
    }

    /// Waits for the next prompt with this handle's question timeout.
    pub async fn next_question(&self) -> Result<Prompt, BridgeError> {
        self.session.get_next_question(self.question_timeout).await
    }

    pub fn answer(&self, answer: impl Into<Answer>) {
        self.session.submit_answer(answer);
    }
}
