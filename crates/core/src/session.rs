//! The question/answer rendezvous for a single interview.
//!
//! The interviewer side calls [`InterviewSession::push_question`] and waits for the
//! founder's answer; the voice agent side calls [`InterviewSession::get_next_question`]
//! and [`InterviewSession::submit_answer`]. The two sides never call each other, they
//! only meet on the session's two FIFO channels.

use crate::{
    error::{BridgeError, DIALOGUE_ENDED, WaitTarget},
    handles::{Controller, Responder},
    payload::{Answer, Prompt, Question, QuestionId},
};
use std::{
    fmt,
    sync::{
        Arc, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tracing::{instrument, trace};

/// How long the interviewer waits for an answer unless told otherwise.
pub const DEFAULT_ANSWER_TIMEOUT: Duration = Duration::from_secs(120);
/// How long the voice agent waits for the next question unless told otherwise.
pub const DEFAULT_QUESTION_TIMEOUT: Duration = Duration::from_secs(300);

/// Lifecycle of a dialogue. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    Active,
    Ended,
}

/// Item on the question channel. Ids stay inside the session.
enum Queued {
    Question { id: QuestionId, question: Question },
    End,
}

struct Lifecycle {
    state: DialogueState,
    last_assigned: QuestionId,
}

/// State of one interview dialogue, identified by its room name.
///
/// Only one question is in flight at a time: overlapping `push_question` calls take
/// turns, and an answer that arrives for a question whose asker already timed out is
/// discarded instead of being handed to the next asker.
pub struct InterviewSession {
    id: String,
    /// Guards the `Ended` transition together with question enqueueing.
    lifecycle: std::sync::Mutex<Lifecycle>,
    question_tx: mpsc::UnboundedSender<Queued>,
    question_rx: Mutex<mpsc::UnboundedReceiver<Queued>>,
    answer_tx: mpsc::UnboundedSender<Answer>,
    answer_rx: Mutex<mpsc::UnboundedReceiver<Answer>>,
    /// Held by a `push_question` call from enqueue until its answer arrives.
    turn: Mutex<()>,
    /// Id of the last question handed to the voice agent, 0 if none yet.
    last_delivered: AtomicU64,
}

impl InterviewSession {
    pub fn new(id: impl Into<String>) -> Self {
        let (question_tx, question_rx) = mpsc::unbounded_channel();
        let (answer_tx, answer_rx) = mpsc::unbounded_channel();
        Self {
            id: id.into(),
            lifecycle: std::sync::Mutex::new(Lifecycle {
                state: DialogueState::Active,
                last_assigned: 0,
            }),
            question_tx,
            question_rx: Mutex::new(question_rx),
            answer_tx,
            answer_rx: Mutex::new(answer_rx),
            turn: Mutex::new(()),
            last_delivered: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> DialogueState {
        self.lifecycle().state
    }

    pub fn is_ended(&self) -> bool {
        self.state() == DialogueState::Ended
    }

    /// Interviewer-side view of this session.
    pub fn controller(self: &Arc<Self>, answer_timeout: Duration) -> Controller {
        Controller::new(Arc::clone(self), answer_timeout)
    }

    /// Voice-agent-side view of this session.
    pub fn responder(self: &Arc<Self>, question_timeout: Duration) -> Responder {
        Responder::new(Arc::clone(self), question_timeout)
    }

    /// Asks a question and waits up to `timeout` for the answer.
    ///
    /// The timeout also covers waiting for an earlier in-flight question to be
    /// answered. Once enqueued, a question is never retracted: if this call times
    /// out, the voice agent may still receive and answer it, and that late answer
    /// will be dropped.
    ///
    /// # Errors
    ///
    /// - `IllegalState` if [`signal_end`](Self::signal_end) was already called, or is
    ///   called while this call waits for its turn.
    /// - `Timeout` with [`WaitTarget::Turn`] if the deadline passed before the question
    ///   was enqueued. The voice agent never sees that question.
    /// - `Timeout` with [`WaitTarget::Answer`] if the question was enqueued but no
    ///   answer arrived in time.
    #[instrument(name = "push_question", skip_all, fields(session = %self.id))]
    pub async fn push_question(
        &self,
        question: impl Into<Question>,
        timeout: Duration,
    ) -> Result<Answer, BridgeError> {
        if self.is_ended() {
            return Err(BridgeError::IllegalState(DIALOGUE_ENDED));
        }
        let deadline = Instant::now() + timeout;
        let timed_out = |waiting_for| {
            trace!(?timeout, %waiting_for, "Deadline passed");
            BridgeError::Timeout {
                waited: timeout,
                waiting_for,
            }
        };

        let _turn = tokio::time::timeout_at(deadline, self.turn.lock())
            .await
            .map_err(|_| timed_out(WaitTarget::Turn))?;
        let id = self.enqueue(question.into())?;
        trace!(question_id = id, "Question enqueued");

        tokio::time::timeout_at(deadline, self.await_answer(id))
            .await
            .map_err(|_| timed_out(WaitTarget::Answer))?
    }

    async fn await_answer(&self, id: QuestionId) -> Result<Answer, BridgeError> {
        let mut answers = self.answer_rx.lock().await;
        loop {
            let answer = answers.recv().await.ok_or(BridgeError::Disconnected)?;
            match answer.question_id() {
                Some(answered) if answered < id => {
                    trace!(answered, waiting_for = id, "Discarding late answer");
                }
                _ => return Ok(answer),
            }
        }
    }

    fn enqueue(&self, question: Question) -> Result<QuestionId, BridgeError> {
        let mut lifecycle = self.lifecycle();
        if lifecycle.state == DialogueState::Ended {
            return Err(BridgeError::IllegalState(DIALOGUE_ENDED));
        }
        lifecycle.last_assigned += 1;
        let id = lifecycle.last_assigned;
        self.question_tx
            .send(Queued::Question { id, question })
            .map_err(|_| BridgeError::Disconnected)?;
        Ok(id)
    }

    /// Waits up to `timeout` for the next question or the end-of-dialogue marker.
    ///
    /// Nothing is consumed when the wait times out.
    #[instrument(name = "get_next_question", skip_all, fields(session = %self.id))]
    pub async fn get_next_question(&self, timeout: Duration) -> Result<Prompt, BridgeError> {
        let next = tokio::time::timeout(timeout, async {
            let mut questions = self.question_rx.lock().await;
            questions.recv().await.ok_or(BridgeError::Disconnected)
        })
        .await
        .map_err(|_| BridgeError::Timeout {
            waited: timeout,
            waiting_for: WaitTarget::Question,
        })??;

        Ok(match next {
            Queued::Question { id, question } => {
                self.last_delivered.store(id, Ordering::Release);
                trace!(question_id = id, "Question delivered");
                Prompt::Question(question)
            }
            Queued::End => {
                trace!("End of dialogue delivered");
                Prompt::EndOfDialogue
            }
        })
    }

    /// Hands an answer to the waiting interviewer. Never blocks.
    ///
    /// Allowed after the dialogue ended, since the last answer may still be on its way.
    pub fn submit_answer(&self, answer: impl Into<Answer>) {
        let delivered = self.last_delivered.load(Ordering::Acquire);
        let answer = answer.into().tagged((delivered != 0).then_some(delivered));
        if self.answer_tx.send(answer).is_err() {
            trace!(session = %self.id, "Answer channel closed, answer dropped");
        }
    }

    /// Ends the dialogue and queues the end-of-dialogue marker for the voice agent.
    ///
    /// Idempotent: the marker is queued once no matter how often this is called.
    pub fn signal_end(&self) {
        let mut lifecycle = self.lifecycle();
        if lifecycle.state == DialogueState::Ended {
            return;
        }
        lifecycle.state = DialogueState::Ended;
        if self.question_tx.send(Queued::End).is_err() {
            trace!(session = %self.id, "Question channel closed, end marker dropped");
        }
        trace!(session = %self.id, "Dialogue ended");
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for InterviewSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterviewSession")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const WAIT: Duration = Duration::from_secs(5);

    fn session() -> Arc<InterviewSession> {
        Arc::new(InterviewSession::new("test-room"))
    }

    #[tokio::test]
    async fn test_push_question_and_answer() {
        let session = session();

        let agent_side = tokio::spawn({
            let session = session.clone();
            async move {
                let prompt = session.get_next_question(WAIT).await.unwrap();
                assert_eq!(prompt.text(), Some("What is your target market?"));
                session.submit_answer("Small businesses in retail");
            }
        });

        let answer = session
            .push_question("What is your target market?", WAIT)
            .await
            .unwrap();
        assert_eq!(answer.text, "Small businesses in retail");
        assert_eq!(answer.question_id(), Some(1));
        agent_side.await.unwrap();
    }

    #[tokio::test]
    async fn test_multiple_questions_in_order() {
        let session = session();
        let questions = [
            "Who is your customer?",
            "What problem do you solve?",
            "How big is the market?",
        ];
        let answers = ["SMB owners", "Inventory management", "10B TAM"];

        let agent_side = tokio::spawn({
            let session = session.clone();
            async move {
                for (expected, answer) in questions.iter().zip(answers) {
                    let prompt = session.get_next_question(WAIT).await.unwrap();
                    assert_eq!(prompt.text(), Some(*expected));
                    session.submit_answer(answer);
                }
            }
        });

        for (question, expected) in questions.iter().zip(answers) {
            let answer = session.push_question(*question, WAIT).await.unwrap();
            assert_eq!(answer.text, expected);
        }
        agent_side.await.unwrap();
    }

    #[tokio::test]
    async fn test_signal_end_delivers_marker_once() {
        let session = session();
        session.signal_end();
        session.signal_end();
        assert_eq!(session.state(), DialogueState::Ended);

        let prompt = session.get_next_question(WAIT).await.unwrap();
        assert_eq!(prompt, Prompt::EndOfDialogue);

        let err = session
            .get_next_question(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_push_after_end_is_rejected() {
        let session = session();
        session.signal_end();

        let err = session
            .push_question("Should not work", WAIT)
            .await
            .unwrap_err();
        assert_eq!(err, BridgeError::IllegalState(DIALOGUE_ENDED));

        // Only the end marker is queued.
        assert_eq!(
            session.get_next_question(WAIT).await.unwrap(),
            Prompt::EndOfDialogue
        );
        assert!(
            session
                .get_next_question(Duration::from_millis(50))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_timeout_without_responder() {
        let session = session();
        let started = Instant::now();

        let err = session
            .push_question("Waiting forever", Duration::from_millis(100))
            .await
            .unwrap_err();

        let elapsed = started.elapsed();
        assert!(matches!(
            err,
            BridgeError::Timeout {
                waiting_for: WaitTarget::Answer,
                ..
            }
        ));
        assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");

        // The question is not retracted.
        let prompt = session.get_next_question(WAIT).await.unwrap();
        assert_eq!(prompt.text(), Some("Waiting forever"));
    }

    #[tokio::test]
    async fn test_get_next_question_timeout_consumes_nothing() {
        let session = session();
        let err = session
            .get_next_question(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::Timeout {
                waited: Duration::from_millis(20),
                waiting_for: WaitTarget::Question,
            }
        );

        session.signal_end();
        assert!(session.get_next_question(WAIT).await.unwrap().is_end());
    }

    #[tokio::test]
    async fn test_late_answer_is_not_delivered_to_next_question() {
        let session = session();
        assert!(
            session
                .push_question("First?", Duration::from_millis(20))
                .await
                .unwrap_err()
                .is_timeout()
        );

        // The agent gets to the first question after the asker gave up.
        let prompt = session.get_next_question(WAIT).await.unwrap();
        assert_eq!(prompt.text(), Some("First?"));
        session.submit_answer("late answer to first");

        let agent_side = tokio::spawn({
            let session = session.clone();
            async move {
                let prompt = session.get_next_question(WAIT).await.unwrap();
                assert_eq!(prompt.text(), Some("Second?"));
                session.submit_answer("answer to second");
            }
        });

        let answer = session.push_question("Second?", WAIT).await.unwrap();
        assert_eq!(answer.text, "answer to second");
        assert_eq!(answer.question_id(), Some(2));
        agent_side.await.unwrap();
    }

    #[tokio::test]
    async fn test_overlapping_pushes_take_turns() {
        let session = session();

        let agent_side = tokio::spawn({
            let session = session.clone();
            async move {
                for _ in 0..2 {
                    let prompt = session.get_next_question(WAIT).await.unwrap();
                    let text = prompt.text().unwrap().to_string();
                    session.submit_answer(format!("answer to {text}"));
                }
            }
        });

        let (a, b) = tokio::join!(
            session.push_question("A", WAIT),
            session.push_question("B", WAIT)
        );
        assert_eq!(a.unwrap().text, "answer to A");
        assert_eq!(b.unwrap().text, "answer to B");
        agent_side.await.unwrap();
    }

    #[tokio::test]
    async fn test_turn_timeout_never_enqueues() {
        let session = session();

        let (first, second) = tokio::join!(
            session.push_question("A", Duration::from_millis(300)),
            session.push_question("B", Duration::from_millis(50))
        );

        assert_eq!(
            second.unwrap_err(),
            BridgeError::Timeout {
                waited: Duration::from_millis(50),
                waiting_for: WaitTarget::Turn,
            }
        );
        assert!(matches!(
            first.unwrap_err(),
            BridgeError::Timeout {
                waiting_for: WaitTarget::Answer,
                ..
            }
        ));

        let prompt = session.get_next_question(WAIT).await.unwrap();
        assert_eq!(prompt.text(), Some("A"));
        assert!(
            session
                .get_next_question(Duration::from_millis(50))
                .await
                .unwrap_err()
                .is_timeout()
        );
    }

    #[tokio::test]
    async fn test_end_while_waiting_for_turn_rejects_push() {
        let session = session();

        let (first, second, ()) = tokio::join!(
            session.push_question("A", WAIT),
            session.push_question("B", WAIT),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                session.signal_end();
                let prompt = session.get_next_question(WAIT).await.unwrap();
                assert_eq!(prompt.text(), Some("A"));
                session.submit_answer("answer to A");
            }
        );

        assert_eq!(first.unwrap().text, "answer to A");
        assert_eq!(
            second.unwrap_err(),
            BridgeError::IllegalState(DIALOGUE_ENDED)
        );

        // The end marker is the last thing queued.
        assert!(session.get_next_question(WAIT).await.unwrap().is_end());
        assert!(
            session
                .get_next_question(Duration::from_millis(50))
                .await
                .unwrap_err()
                .is_timeout()
        );
    }

    #[tokio::test]
    async fn test_untagged_answers_accepted_in_order() {
        let session = session();
        session.submit_answer("early one");
        session.submit_answer("early two");

        let first = session.push_question("Q1", WAIT).await.unwrap();
        let second = session.push_question("Q2", WAIT).await.unwrap();
        assert_eq!(first.text, "early one");
        assert_eq!(first.question_id(), None);
        assert_eq!(second.text, "early two");
        assert_eq!(second.question_id(), None);

        // Both questions are still waiting for the agent.
        assert_eq!(
            session.get_next_question(WAIT).await.unwrap().text(),
            Some("Q1")
        );
        assert_eq!(
            session.get_next_question(WAIT).await.unwrap().text(),
            Some("Q2")
        );
    }

    #[tokio::test]
    async fn test_answer_allowed_after_end() {
        let session = session();

        let agent_side = tokio::spawn({
            let session = session.clone();
            async move {
                session.get_next_question(WAIT).await.unwrap();
                session.signal_end();
                session.submit_answer("still counts");
            }
        });

        let answer = session.push_question("Last one?", WAIT).await.unwrap();
        assert_eq!(answer.text, "still counts");
        agent_side.await.unwrap();
    }
}
