//! Values exchanged between the interviewer and the voice agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-session sequence number assigned to each question when it is enqueued.
pub type QuestionId = u64;

/// A question for the founder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// Free-form context from whoever produced the question (topic, follow-up hints, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl From<&str> for Question {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Question {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// The founder's answer, usually a final speech-to-text transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Set by the session from the last question handed to the voice agent.
    #[serde(skip)]
    question_id: Option<QuestionId>,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
            question_id: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The question this answer was given for, if any question had been delivered.
    pub fn question_id(&self) -> Option<QuestionId> {
        self.question_id
    }

    pub(crate) fn tagged(mut self, question_id: Option<QuestionId>) -> Self {
        self.question_id = question_id;
        self
    }
}

impl From<&str> for Answer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Answer {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// What the voice agent receives when it asks for the next thing to say.
///
/// The end of the dialogue is its own variant, so no question text can ever be
/// mistaken for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prompt {
    Question(Question),
    EndOfDialogue,
}

impl Prompt {
    pub fn is_end(&self) -> bool {
        matches!(self, Prompt::EndOfDialogue)
    }

    /// The question text, or `None` for the end-of-dialogue marker.
    pub fn text(&self) -> Option<&str> {
        match self {
            Prompt::Question(q) => Some(&q.text),
            Prompt::EndOfDialogue => None,
        }
    }
}
