//! Interview Core
//!
//! The coordination primitive behind a voice interview: an interviewer that decides
//! what to ask and a voice agent that speaks questions and transcribes answers run
//! as independent tasks and only ever meet through an [`InterviewSession`].
//!
//! - `payload`: question, answer, and prompt types carried over the session channels.
//! - `error`: the error taxonomy surfaced to both sides.
//! - `session`: the question/answer rendezvous with timeouts and the end signal.
//! - `handles`: role-scoped views of a session for each side of the dialogue.
//! - `registry`: a keyed store of live sessions, addressed by room name.

pub mod error;
pub mod handles;
pub mod payload;
pub mod registry;
pub mod session;

pub use error::{BridgeError, WaitTarget};
pub use handles::{AnswerSource, Controller, Responder};
pub use payload::{Answer, Prompt, Question, QuestionId};
pub use registry::SessionRegistry;
pub use session::{
    DEFAULT_ANSWER_TIMEOUT, DEFAULT_QUESTION_TIMEOUT, DialogueState, InterviewSession,
};
