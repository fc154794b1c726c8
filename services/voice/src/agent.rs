//! Voice Agent
//!
//! The responder side of an interview: it relays each question to the founder over
//! the speech pipeline and hands the transcribed reply back to the session. It never
//! decides what to ask; questions come from whoever holds the session's controller.

use crate::speech::SpeechPipeline;
use anyhow::{Context, Result};
use interview_core::{Prompt, Responder};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

pub const GREETING: &str =
    "Hi! Thanks for joining. I'll be asking you a few questions about your business. Ready when you are!";
pub const CLOSING: &str =
    "That's all the questions I have. Thanks so much for sharing, this was really helpful!";
pub const SILENCE_FAREWELL: &str = "It looks like we're done. Thanks for your time!";
pub const ACKNOWLEDGEMENT: &str = "Got it, thanks.";
pub const MOVE_ON: &str = "No worries, let's move on.";
/// Submitted as the answer when the founder stays silent.
pub const NO_RESPONSE: &str = "[no response]";

/// Settings for the agent's own listening behavior.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub speech_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            speech_timeout: Duration::from_secs(60),
        }
    }
}

/// Why the agent stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The interviewer signalled the end of the dialogue.
    Completed,
    /// No question arrived within the responder's question timeout.
    Silence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewOutcome {
    pub questions_heard: usize,
    /// Answers with actual speech, not counting `[no response]`.
    pub answers_given: usize,
    pub end_reason: EndReason,
}

pub struct VoiceAgent {
    speech: Arc<dyn SpeechPipeline>,
    responder: Responder,
    settings: AgentSettings,
}

impl VoiceAgent {
    pub fn new(
        speech: Arc<dyn SpeechPipeline>,
        responder: Responder,
        settings: AgentSettings,
    ) -> Self {
        Self {
            speech,
            responder,
            settings,
        }
    }

    /// Runs the interview loop until the dialogue ends or goes silent.
    ///
    /// Speech pipeline failures abort the loop and are returned to the caller.
    #[instrument(name = "voice_agent", skip_all, fields(room = %self.responder.session_id()))]
    pub async fn run(&self) -> Result<InterviewOutcome> {
        self.speech.say(GREETING).await?;

        let mut questions_heard = 0;
        let mut answers_given = 0;

        let end_reason = loop {
            let question = match self.responder.next_question().await {
                Ok(Prompt::Question(question)) => question,
                Ok(Prompt::EndOfDialogue) => {
                    self.speech.say(CLOSING).await?;
                    break EndReason::Completed;
                }
                Err(e) if e.is_timeout() => {
                    warn!(
                        timeout = ?self.responder.question_timeout(),
                        "No question received, ending"
                    );
                    self.speech.say(SILENCE_FAREWELL).await?;
                    break EndReason::Silence;
                }
                Err(e) => return Err(e.into()),
            };
            questions_heard += 1;

            self.speech.say(&question.text).await?;

            match self.speech.listen(self.settings.speech_timeout).await? {
                Some(transcript) => {
                    info!(question = %question.text, "Founder answered");
                    self.responder.answer(transcript);
                    answers_given += 1;
                    self.speech.say(ACKNOWLEDGEMENT).await?;
                }
                None => {
                    info!(question = %question.text, "No response from founder");
                    self.responder.answer(NO_RESPONSE);
                    self.speech.say(MOVE_ON).await?;
                }
            }
        };

        info!(questions_heard, answers_given, ?end_reason, "Interview complete");
        Ok(InterviewOutcome {
            questions_heard,
            answers_given,
            end_reason,
        })
    }
}

/// Waits for a spawned agent to finish, unless `abandon` resolves first.
///
/// The agent may be in the middle of listening when the dialogue ends, so the
/// caller decides how long it is willing to wait. An abandoned agent is aborted.
pub async fn join_agent(
    mut task: JoinHandle<Result<InterviewOutcome>>,
    abandon: impl Future<Output = ()>,
) -> Result<InterviewOutcome> {
    tokio::select! {
        joined = &mut task => joined.context("Voice agent task panicked")?,
        () = abandon => {
            task.abort();
            anyhow::bail!("voice agent abandoned before finishing")
        }
    }
}
