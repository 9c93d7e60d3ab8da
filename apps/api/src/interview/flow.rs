//! Interview flow control: the relevance gate between an answer and the next
//! prompt.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::interview::evaluator::{
    ClarificationError, ClarificationGenerator, EvaluationError, RelevanceEvaluator,
    LOWEST_RELEVANCE,
};
use crate::interview::session::{FlowStep, InterviewSession};
use crate::interview::InterviewError;

#[derive(Debug, Clone)]
pub struct FlowPolicy {
    /// Answers scoring below this are sent back with a clarification.
    pub relevance_threshold: u8,
    /// `None` keeps clarifying for as long as answers stay below the gate.
    pub max_clarifications: Option<u32>,
    pub call_timeout: Duration,
}

pub struct FlowController {
    evaluator: Arc<dyn RelevanceEvaluator>,
    clarifier: Arc<dyn ClarificationGenerator>,
    policy: FlowPolicy,
}

impl FlowController {
    pub fn new(
        evaluator: Arc<dyn RelevanceEvaluator>,
        clarifier: Arc<dyn ClarificationGenerator>,
        policy: FlowPolicy,
    ) -> Self {
        Self {
            evaluator,
            clarifier,
            policy,
        }
    }

    pub fn policy(&self) -> &FlowPolicy {
        &self.policy
    }

    /// Scores `answer` against the current question and moves the session on.
    ///
    /// Below the threshold the cursor stays put and a clarification is
    /// returned; otherwise the answer is recorded and the next question (or
    /// completion) is returned. Answering a completed interview is a
    /// `StateViolation`. If the clarifier fails the session is left untouched.
    pub async fn submit_answer(
        &self,
        session: &mut InterviewSession,
        answer: &str,
    ) -> Result<FlowStep, InterviewError> {
        let question = session.ensure_accepting()?.to_string();
        let index = session.current_question_index();
        let relevance = self.score(&question, answer).await;

        if relevance >= self.policy.relevance_threshold {
            info!("Answer to question {index} accepted (relevance {relevance})");
            return Ok(session.accept(answer, relevance));
        }

        if let Some(max) = self.policy.max_clarifications {
            if session.clarifications() >= max {
                warn!(
                    "Question {index} reached {max} clarifications; advancing without an accepted answer"
                );
                return Ok(session.force_advance(answer, relevance));
            }
        }

        info!("Answer to question {index} below threshold (relevance {relevance}); clarifying");
        let clarification = tokio::time::timeout(
            self.policy.call_timeout,
            self.clarifier.rephrase(&question, answer),
        )
        .await
        .map_err(|_| ClarificationError::Timeout(self.policy.call_timeout))??;

        Ok(session.hold(clarification, relevance))
    }

    /// Evaluation never fails the flow: errors, timeouts and malformed
    /// scores all count as the lowest relevance band.
    async fn score(&self, question: &str, answer: &str) -> u8 {
        let result = tokio::time::timeout(
            self.policy.call_timeout,
            self.evaluator.evaluate(question, answer),
        )
        .await
        .unwrap_or(Err(EvaluationError::Timeout(self.policy.call_timeout)));

        match result {
            Ok(score) => score,
            Err(e) => {
                warn!("Relevance evaluation failed, scoring as {LOWEST_RELEVANCE}: {e}");
                LOWEST_RELEVANCE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::interview::session::{InterviewStatus, PromptKind};
    use crate::testing::{
        EchoClarifier, FailingClarifier, ScriptedEvaluator, SlowClarifier, SlowEvaluator,
    };

    fn policy(max_clarifications: Option<u32>) -> FlowPolicy {
        FlowPolicy {
            relevance_threshold: 6,
            max_clarifications,
            call_timeout: Duration::from_secs(5),
        }
    }

    fn controller(evaluator: ScriptedEvaluator, max: Option<u32>) -> FlowController {
        FlowController::new(Arc::new(evaluator), Arc::new(EchoClarifier), policy(max))
    }

    fn session() -> InterviewSession {
        InterviewSession::new(vec!["Q1".to_string(), "Q2".to_string()])
    }

    #[tokio::test]
    async fn test_relevant_answer_advances_and_records() {
        let flow = controller(ScriptedEvaluator::scores(&[8]), None);
        let mut session = session();

        let step = flow.submit_answer(&mut session, "a solid answer").await.unwrap();
        assert_eq!(step.status, InterviewStatus::InProgress);
        assert_eq!(step.question.as_deref(), Some("Q2"));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers()[0].answer, "a solid answer");
    }

    #[tokio::test]
    async fn test_irrelevant_answer_clarifies_on_same_question() {
        let flow = controller(ScriptedEvaluator::scores(&[3]), None);
        let mut session = session();

        let step = flow.submit_answer(&mut session, "I like turtles").await.unwrap();
        assert_eq!(step.status, InterviewStatus::InProgress);
        assert_eq!(step.kind, Some(PromptKind::Clarification));
        assert_eq!(step.question.as_deref(), Some("To clarify: Q1"));
        assert_eq!(session.current_question_index(), 0);
        assert!(session.answers().is_empty());
    }

    #[tokio::test]
    async fn test_two_relevant_answers_complete_interview() {
        let flow = controller(ScriptedEvaluator::scores(&[8, 7]), None);
        let mut session = session();

        flow.submit_answer(&mut session, "one").await.unwrap();
        let step = flow.submit_answer(&mut session, "two").await.unwrap();
        assert_eq!(step.status, InterviewStatus::Completed);
        assert!(step.question.is_none());
        assert_eq!(session.answers().len(), 2);
    }

    #[tokio::test]
    async fn test_answer_after_completion_is_state_violation() {
        let flow = controller(ScriptedEvaluator::scores(&[8, 8]), None);
        let mut session = session();
        flow.submit_answer(&mut session, "one").await.unwrap();
        flow.submit_answer(&mut session, "two").await.unwrap();

        let err = flow.submit_answer(&mut session, "three").await.unwrap_err();
        assert!(matches!(err, InterviewError::StateViolation(_)));
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let flow = controller(ScriptedEvaluator::scores(&[6]), None);
        let mut session = session();
        let step = flow.submit_answer(&mut session, "borderline").await.unwrap();
        assert_eq!(step.question.as_deref(), Some("Q2"));
    }

    #[tokio::test]
    async fn test_evaluation_failure_takes_clarification_path() {
        let evaluator = ScriptedEvaluator::new(vec![Err(EvaluationError::Malformed(
            "not json".to_string(),
        ))]);
        let flow = controller(evaluator, None);
        let mut session = session();

        let step = flow.submit_answer(&mut session, "answer").await.unwrap();
        assert_eq!(step.kind, Some(PromptKind::Clarification));
        assert_eq!(session.last_relevance(), Some(LOWEST_RELEVANCE));
    }

    #[tokio::test]
    async fn test_evaluator_sees_current_question() {
        let evaluator = Arc::new(ScriptedEvaluator::scores(&[2, 9, 9]));
        let flow = FlowController::new(evaluator.clone(), Arc::new(EchoClarifier), policy(None));
        let mut session = session();

        flow.submit_answer(&mut session, "a").await.unwrap();
        flow.submit_answer(&mut session, "b").await.unwrap();
        flow.submit_answer(&mut session, "c").await.unwrap();

        let questions: Vec<String> = evaluator.calls().into_iter().map(|(q, _)| q).collect();
        assert_eq!(questions, vec!["Q1", "Q1", "Q2"]);
    }

    #[tokio::test]
    async fn test_clarification_cap_forces_advance() {
        let flow = controller(ScriptedEvaluator::scores(&[1, 1, 1]), Some(2));
        let mut session = session();

        flow.submit_answer(&mut session, "x").await.unwrap();
        flow.submit_answer(&mut session, "y").await.unwrap();
        let step = flow.submit_answer(&mut session, "z").await.unwrap();

        assert_eq!(step.question.as_deref(), Some("Q2"));
        assert_eq!(step.kind, Some(PromptKind::Question));
        assert!(session.answers().is_empty());
        assert_eq!(session.unresolved().len(), 1);
    }

    #[tokio::test]
    async fn test_clarifier_failure_leaves_session_untouched() {
        let flow = FlowController::new(
            Arc::new(ScriptedEvaluator::scores(&[1])),
            Arc::new(FailingClarifier),
            policy(None),
        );
        let mut session = session();

        let err = flow.submit_answer(&mut session, "x").await.unwrap_err();
        assert!(matches!(err, InterviewError::Clarification(_)));
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.clarifications(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluator_timeout_scores_lowest_and_clarifies() {
        let flow = FlowController::new(
            Arc::new(SlowEvaluator(Duration::from_secs(60))),
            Arc::new(EchoClarifier),
            FlowPolicy {
                call_timeout: Duration::from_secs(1),
                ..policy(None)
            },
        );
        let mut session = session();

        let step = flow.submit_answer(&mut session, "answer").await.unwrap();
        assert_eq!(step.kind, Some(PromptKind::Clarification));
        assert_eq!(step.question.as_deref(), Some("To clarify: Q1"));
        assert_eq!(session.last_relevance(), Some(LOWEST_RELEVANCE));
        assert_eq!(session.current_question_index(), 0);
        assert!(session.answers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clarifier_timeout_is_error_and_leaves_session_untouched() {
        let flow = FlowController::new(
            Arc::new(ScriptedEvaluator::scores(&[2])),
            Arc::new(SlowClarifier(Duration::from_secs(60))),
            FlowPolicy {
                call_timeout: Duration::from_secs(1),
                ..policy(None)
            },
        );
        let mut session = session();

        let err = flow.submit_answer(&mut session, "answer").await.unwrap_err();
        assert!(matches!(
            err,
            InterviewError::Clarification(ClarificationError::Timeout(_))
        ));
        assert_eq!(session.current_question_index(), 0);
        assert_eq!(session.clarifications(), 0);
        assert_eq!(session.last_relevance(), None);
        assert!(session.answers().is_empty());
    }
}
