//! Scripted Interviewer
//!
//! A controller that walks through a fixed list of questions. It stands in for the
//! reasoning component that would normally decide what to ask next, and shows how
//! any such component plugs into a session: through [`AnswerSource`] alone.

use anyhow::{Context, Result};
use interview_core::{AnswerSource, BridgeError, Question};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// One exchange of the interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

pub type Transcript = Vec<QaPair>;

/// The built-in founder questions, used when no question file is configured.
pub fn default_questions() -> Vec<String> {
    vec![
        "Can you tell me about your target customer? Who are you building this for?".to_string(),
        "What's the main problem they face that your product solves?".to_string(),
    ]
}

/// Reads questions from a text file, one per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn load_questions(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read questions from {}", path.display()))?;
    let questions: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    anyhow::ensure!(
        !questions.is_empty(),
        "No questions found in {}",
        path.display()
    );
    Ok(questions)
}

pub struct ScriptedInterviewer {
    questions: Vec<String>,
    pause: Duration,
}

impl ScriptedInterviewer {
    pub fn new(questions: Vec<String>) -> Self {
        Self {
            questions,
            pause: Duration::from_secs(1),
        }
    }

    /// Sets the pause between an answer and the next question.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Asks every question in order, then ends the dialogue.
    ///
    /// The dialogue is ended on failure too, so the voice agent is not left waiting
    /// for questions that will never come.
    #[instrument(name = "scripted_interview", skip_all, fields(questions = self.questions.len()))]
    pub async fn run(&self, source: &dyn AnswerSource) -> Result<Transcript, BridgeError> {
        let result = self.ask_all(source).await;
        source.finish();
        result
    }

    async fn ask_all(&self, source: &dyn AnswerSource) -> Result<Transcript, BridgeError> {
        let mut transcript = Vec::with_capacity(self.questions.len());
        for (i, question) in self.questions.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            let answer = source.ask(Question::new(question.as_str())).await?;
            info!(index = i, "Answer received");
            transcript.push(QaPair {
                question: question.clone(),
                answer: answer.text,
            });
        }
        Ok(transcript)
    }
}
