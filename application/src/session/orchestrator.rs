//! The per-session turn pipeline.
//!
//! [`InterviewSession`] owns one [`InterviewState`] exclusively and runs
//! the turn pipeline over it:
//!
//! 1. record the candidate message into the open turn
//! 2. observer analysis
//! 3. candidate-profile merge (may seed the initial difficulty)
//! 4. termination check (stop command)
//! 5. difficulty adjustment, answered turns only (snapshotted for rollback)
//! 6. interviewer reply, then commit
//!
//! The commit at the end of stage 6 is what makes a turn real: thoughts are
//! attached, analysis results are absorbed, the turn counter moves, and the
//! next turn opens. Any failure before the commit rolls back the difficulty
//! snapshot and leaves the turn open, so the candidate can simply resend
//! their message.

use std::sync::Arc;

use coach_domain::{
    adjust_difficulty, AgentThought, DifficultyLevel, DomainError, InterviewFeedback,
    InterviewState, ObserverAnalysis, ResponseKind,
};
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agents::{AgentError, EvaluatorAgent, InterviewerAgent, ObserverAgent};
use crate::config::InterviewConfig;
use crate::ports::completion_gateway::CompletionGateway;
use crate::ports::observability::InterviewTracker;
use crate::ports::transcript_store::TranscriptStore;

/// Shown when a pipeline stage failed and the turn was rolled back.
const RECOVERY_MESSAGE: &str =
    "I'm sorry, something went wrong on my side. Could you send your answer again?";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session has not been started")]
    NotStarted,

    #[error("Session has already been started")]
    AlreadyStarted,

    #[error("Session is terminated")]
    Terminated,

    #[error("Turn processing was cancelled")]
    Cancelled,

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Created,
    Active,
    Terminated,
}

/// Result of processing one candidate message.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// A committed turn: the interviewer's next visible message.
    Reply(String),
    /// The pipeline failed and was rolled back; the turn is still open and
    /// the candidate may resend their message.
    Failed { message: String },
    /// The session terminated on this message.
    Finished {
        message: String,
        feedback: Box<InterviewFeedback>,
    },
}

/// Snapshot of the difficulty controller for rollback.
#[derive(Debug, Clone, Copy)]
struct DifficultySnapshot {
    difficulty: DifficultyLevel,
    good_streak: u32,
    bad_streak: u32,
}

pub struct InterviewSession {
    id: String,
    config: InterviewConfig,
    state: InterviewState,
    status: SessionStatus,
    feedback: Option<InterviewFeedback>,
    observer: ObserverAgent,
    interviewer: InterviewerAgent,
    evaluator: EvaluatorAgent,
    tracker: Arc<dyn InterviewTracker>,
    transcripts: Arc<dyn TranscriptStore>,
}

impl InterviewSession {
    pub fn new(
        id: impl Into<String>,
        config: InterviewConfig,
        gateway: Arc<dyn CompletionGateway>,
        tracker: Arc<dyn InterviewTracker>,
        transcripts: Arc<dyn TranscriptStore>,
    ) -> Self {
        let state = InterviewState::new(config.job_description.clone());
        Self {
            id: id.into(),
            observer: ObserverAgent::new(gateway.clone(), &config),
            interviewer: InterviewerAgent::new(gateway.clone(), &config),
            evaluator: EvaluatorAgent::new(gateway, &config),
            config,
            state,
            status: SessionStatus::Created,
            feedback: None,
            tracker,
            transcripts,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn state(&self) -> &InterviewState {
        &self.state
    }

    pub fn feedback(&self) -> Option<&InterviewFeedback> {
        self.feedback.as_ref()
    }

    /// Start the session: open the trace, generate the greeting, and open
    /// the first turn with it.
    pub async fn start(&mut self) -> Result<String, SessionError> {
        match self.status {
            SessionStatus::Created => {}
            SessionStatus::Active => return Err(SessionError::AlreadyStarted),
            SessionStatus::Terminated => return Err(SessionError::Terminated),
        }

        self.tracker.start_trace(&self.id);
        let greeting = self.interviewer.generate_greeting(&self.id, &self.state).await?;
        self.tracker
            .add_span(&self.id, "greeting", json!({"chars": greeting.len()}));
        self.state.open_turn(greeting.clone())?;
        self.status = SessionStatus::Active;
        info!(session_id = %self.id, "session started");
        Ok(greeting)
    }

    /// Run the turn pipeline for one candidate message.
    pub async fn process_message(&mut self, message: &str) -> Result<TurnOutcome, SessionError> {
        self.process_message_cancellable(message, &CancellationToken::new())
            .await
    }

    /// Like [`process_message`](Self::process_message), but abandons the
    /// turn between stages once `cancel` fires. A cancelled turn rolls back
    /// like a failed one.
    pub async fn process_message_cancellable(
        &mut self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, SessionError> {
        match self.status {
            SessionStatus::Active => {}
            SessionStatus::Created => return Err(SessionError::NotStarted),
            SessionStatus::Terminated => return Err(SessionError::Terminated),
        }

        // Stage 1: memory-only, safe to repeat on a resent message.
        self.state.record_candidate_message(message);

        // Stage 2: observer analysis.
        if cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        let analysis = match self.observer.analyze(&self.id, &self.state, message).await {
            Ok(analysis) => analysis,
            Err(err) => return Ok(self.fail_turn("observer", err)),
        };
        self.tracker.add_span(
            &self.id,
            "observer_analysis",
            json!({
                "response_type": format!("{:?}", analysis.kind),
                "answered": analysis.answered_last_question,
                "is_gibberish": analysis.is_gibberish,
            }),
        );

        // Stage 3: profile merge. Fill-only and idempotent, so it is never
        // rolled back; a newly learned target grade seeds the difficulty
        // before any question was graded.
        if let Some(extracted) = &analysis.extracted_info
            && let Some(grade) = self.state.candidate.merge(extracted)
            && self.state.completed_turns == 0
        {
            self.state.current_difficulty = grade.initial_difficulty();
            debug!(
                session_id = %self.id,
                difficulty = self.state.current_difficulty.as_str(),
                "seeded initial difficulty from target grade"
            );
        }

        // Stage 4: stop command terminates without an interviewer call.
        if analysis.kind == ResponseKind::StopCommand {
            self.state.attach_thoughts(analysis.thoughts.clone());
            return match self.terminate().await {
                Ok(outcome) => Ok(outcome),
                Err(err) => Ok(self.fail_turn("evaluator", err)),
            };
        }

        // Stage 5: difficulty adjustment, snapshotted for rollback. The
        // controller runs only when the active question was resolved; an
        // off-topic or counter-question turn leaves the streaks untouched.
        let snapshot = DifficultySnapshot {
            difficulty: self.state.current_difficulty,
            good_streak: self.state.consecutive_good_answers,
            bad_streak: self.state.consecutive_bad_answers,
        };
        if analysis.answered_last_question {
            let (difficulty, good, bad) = adjust_difficulty(
                snapshot.difficulty,
                snapshot.good_streak,
                snapshot.bad_streak,
                &analysis,
            );
            self.state.current_difficulty = difficulty;
            self.state.consecutive_good_answers = good;
            self.state.consecutive_bad_answers = bad;
            if difficulty != snapshot.difficulty {
                info!(
                    session_id = %self.id,
                    from = snapshot.difficulty.as_str(),
                    to = difficulty.as_str(),
                    "difficulty moved"
                );
            }
        }

        // Stage 6: interviewer reply, then commit.
        if cancel.is_cancelled() {
            self.restore(snapshot);
            return Err(SessionError::Cancelled);
        }
        let reply = match self
            .interviewer
            .respond(&self.id, &self.state, message, &analysis)
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                self.restore(snapshot);
                return Ok(self.fail_turn("interviewer", err));
            }
        };
        self.tracker
            .add_span(&self.id, "interviewer_reply", json!({"chars": reply.len()}));

        self.commit_turn(&analysis, message, &reply)?;

        if self.state.completed_turns >= self.config.max_turns {
            info!(session_id = %self.id, "turn limit reached");
            return match self.terminate().await {
                Ok(TurnOutcome::Finished { feedback, .. }) => Ok(TurnOutcome::Finished {
                    message: reply,
                    feedback,
                }),
                Ok(other) => Ok(other),
                // The turn is already committed; the reply stands even if
                // feedback generation failed. The session stays active so a
                // stop command can retry the evaluator.
                Err(err) => {
                    warn!(session_id = %self.id, error = %err, "feedback generation failed at turn limit");
                    Ok(TurnOutcome::Reply(reply))
                }
            };
        }

        Ok(TurnOutcome::Reply(reply))
    }

    /// Terminate now: generate the feedback, persist transcripts, close the
    /// trace. Used by the explicit stop surface.
    pub async fn force_stop(&mut self) -> Result<InterviewFeedback, SessionError> {
        match self.status {
            SessionStatus::Active => {}
            SessionStatus::Created => return Err(SessionError::NotStarted),
            SessionStatus::Terminated => return Err(SessionError::Terminated),
        }
        let feedback = self.generate_feedback().await?;
        self.finish(&feedback);
        Ok(feedback)
    }

    /// At most one feedback per session.
    async fn generate_feedback(&mut self) -> Result<InterviewFeedback, SessionError> {
        if self.feedback.is_some() {
            return Err(SessionError::Domain(DomainError::FeedbackAlreadyGenerated));
        }
        let feedback = self.evaluator.evaluate(&self.id, &self.state).await?;
        self.feedback = Some(feedback.clone());
        Ok(feedback)
    }

    async fn terminate(&mut self) -> Result<TurnOutcome, SessionError> {
        let feedback = self.generate_feedback().await?;
        self.finish(&feedback);
        Ok(TurnOutcome::Finished {
            message: "Thank you for the interview! Here is your feedback.".to_string(),
            feedback: Box::new(feedback),
        })
    }

    fn finish(&mut self, feedback: &InterviewFeedback) {
        self.status = SessionStatus::Terminated;

        match self.transcripts.save_summary(&self.state, feedback) {
            Ok(path) => debug!(session_id = %self.id, path = %path.display(), "summary transcript written"),
            Err(err) => warn!(session_id = %self.id, error = %err, "summary transcript failed"),
        }
        let metrics = self.tracker.session_metrics(&self.id);
        match self
            .transcripts
            .save_detailed(&self.state, feedback, metrics.as_ref())
        {
            Ok(path) => debug!(session_id = %self.id, path = %path.display(), "detailed transcript written"),
            Err(err) => warn!(session_id = %self.id, error = %err, "detailed transcript failed"),
        }
        if let Some(metrics) = metrics {
            info!(session_id = %self.id, "{}", metrics.to_summary_string());
        }
        self.tracker.finalize_trace(&self.id);
        info!(session_id = %self.id, turns = self.state.completed_turns, "session terminated");
    }

    /// Commit stage: the only place a turn becomes real.
    fn commit_turn(
        &mut self,
        analysis: &ObserverAnalysis,
        candidate_message: &str,
        reply: &str,
    ) -> Result<(), SessionError> {
        let mut thoughts = analysis.thoughts.clone();
        thoughts.push(AgentThought::new(
            "Observer",
            "Interviewer",
            analysis.recommendation.clone(),
        ));
        self.state.attach_thoughts(thoughts);
        self.state.absorb_analysis(analysis, candidate_message);
        self.state.completed_turns += 1;
        self.state.open_turn(reply)?;
        self.tracker.add_span(
            &self.id,
            "turn_committed",
            json!({"turn": self.state.completed_turns}),
        );
        Ok(())
    }

    fn restore(&mut self, snapshot: DifficultySnapshot) {
        self.state.current_difficulty = snapshot.difficulty;
        self.state.consecutive_good_answers = snapshot.good_streak;
        self.state.consecutive_bad_answers = snapshot.bad_streak;
    }

    fn fail_turn(&self, stage: &str, err: impl std::fmt::Display) -> TurnOutcome {
        warn!(session_id = %self.id, stage, error = %err, "turn failed, rolled back");
        self.tracker
            .add_span(&self.id, "turn_failed", json!({"stage": stage, "error": err.to_string()}));
        TurnOutcome::Failed {
            message: RECOVERY_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::completion_gateway::{
        Completion, CompletionGateway, CompletionRequest, GatewayError, StructuredCompletion,
        TokenUsage,
    };
    use crate::ports::observability::NoInterviewTracker;
    use crate::ports::transcript_store::NoTranscriptStore;
    use async_trait::async_trait;
    use coach_domain::extract_json_payload;
    use std::sync::Mutex;

    /// One scripted gateway step: either a raw response text or an error.
    enum Step {
        Text(String),
        Fail(GatewayError),
    }

    struct ScriptedGateway {
        steps: Mutex<Vec<Step>>,
        generations: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn new() -> Self {
            Self {
                steps: Mutex::new(Vec::new()),
                generations: Mutex::new(Vec::new()),
            }
        }

        fn push_text(&self, text: &str) {
            self.steps.lock().unwrap().push(Step::Text(text.to_string()));
        }

        fn push_error(&self) {
            self.steps.lock().unwrap().push(Step::Fail(GatewayError::RetriesExhausted {
                attempts: 3,
                last_error: "backend down".to_string(),
            }));
        }

        fn next(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
            self.generations
                .lock()
                .unwrap()
                .push(request.generation_name.clone());
            let mut steps = self.steps.lock().unwrap();
            assert!(!steps.is_empty(), "scripted gateway ran dry");
            match steps.remove(0) {
                Step::Text(text) => Ok(text),
                Step::Fail(err) => Err(err),
            }
        }

        fn generation_names(&self) -> Vec<String> {
            self.generations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionGateway for ScriptedGateway {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<Completion, GatewayError> {
            Ok(Completion {
                text: self.next(request)?,
                usage: TokenUsage::default(),
            })
        }

        async fn complete_structured(
            &self,
            request: &CompletionRequest,
        ) -> Result<StructuredCompletion, GatewayError> {
            let raw = self.next(request)?;
            let payload = extract_json_payload(&raw)
                .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
            Ok(StructuredCompletion {
                payload,
                raw,
                usage: TokenUsage::default(),
            })
        }
    }

    fn observer_json(
        kind: &str,
        answered: bool,
        increase: bool,
        simplify: bool,
    ) -> String {
        format!(
            r#"<r>{{"response_type": "{kind}", "quality": "good",
                "is_factually_correct": true, "is_gibberish": false,
                "answered_last_question": {answered},
                "detected_topics": ["Rust"],
                "recommendation": "NEXT_STEP=ASK_NEW",
                "should_increase_difficulty": {increase},
                "should_simplify": {simplify}}}</r>"#
        )
    }

    fn feedback_json() -> &'static str {
        r#"<r>{
            "verdict": {"grade": "Middle", "hiring_recommendation": "Hire", "confidence_score": 75},
            "technical_review": {"confirmed_skills": [], "knowledge_gaps": []},
            "soft_skills_review": {
                "clarity": "Good", "clarity_details": "d",
                "honesty": "High", "honesty_details": "d",
                "engagement": "High", "engagement_details": "d"
            },
            "roadmap": {"items": [], "summary": "keep going"},
            "general_comments": "ok"
        }</r>"#
    }

    fn session(gateway: Arc<ScriptedGateway>) -> InterviewSession {
        session_with_config(gateway, InterviewConfig::default())
    }

    fn session_with_config(
        gateway: Arc<ScriptedGateway>,
        config: InterviewConfig,
    ) -> InterviewSession {
        InterviewSession::new(
            "test-session",
            config,
            gateway,
            Arc::new(NoInterviewTracker),
            Arc::new(NoTranscriptStore),
        )
    }

    async fn started(gateway: &Arc<ScriptedGateway>) -> InterviewSession {
        gateway.push_text("Hello! Please introduce yourself.");
        let mut session = session(gateway.clone());
        session.start().await.unwrap();
        session
    }

    #[tokio::test]
    async fn start_opens_first_turn_with_greeting() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_text("Welcome to the interview!");
        let mut session = session(gateway.clone());

        let greeting = session.start().await.unwrap();
        assert_eq!(greeting, "Welcome to the interview!");
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.state().active_question(), Some("Welcome to the interview!"));
        assert_eq!(session.state().completed_turns, 0);

        assert!(matches!(session.start().await, Err(SessionError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn message_before_start_is_rejected() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = session(gateway);
        assert!(matches!(
            session.process_message("hi").await,
            Err(SessionError::NotStarted)
        ));
    }

    #[tokio::test]
    async fn successful_turn_commits_and_opens_next() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;
        gateway.push_text(&observer_json("normal", true, false, false));
        gateway.push_text("Good. Next question: what is ownership?");

        let outcome = session.process_message("borrowing means...").await.unwrap();
        let TurnOutcome::Reply(reply) = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(reply, "Good. Next question: what is ownership?");
        assert_eq!(session.state().completed_turns, 1);
        assert_eq!(session.state().active_question(), Some(reply.as_str()));
        assert_eq!(session.state().covered_topics, vec!["Rust"]);
        // committed turn holds the candidate message and the thoughts
        let committed = &session.state().turns[0];
        assert_eq!(committed.candidate_message.as_deref(), Some("borrowing means..."));
        assert!(!committed.thoughts.is_empty());
    }

    #[tokio::test]
    async fn two_good_answers_raise_difficulty() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;

        for reply in ["Q2", "Q3"] {
            gateway.push_text(&observer_json("excellent", true, true, false));
            gateway.push_text(reply);
        }
        session.process_message("a1").await.unwrap();
        assert_eq!(session.state().current_difficulty, DifficultyLevel::Basic);
        assert_eq!(session.state().consecutive_good_answers, 1);

        session.process_message("a2").await.unwrap();
        assert_eq!(session.state().current_difficulty, DifficultyLevel::Intermediate);
        assert_eq!(session.state().consecutive_good_answers, 0);
    }

    #[tokio::test]
    async fn observer_failure_leaves_turn_open() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;
        gateway.push_error();

        let outcome = session.process_message("my answer").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Failed { .. }));
        assert_eq!(session.state().completed_turns, 0);
        assert!(session.state().turns[0].is_open() || session.state().turns[0].candidate_message.is_some());
        assert_eq!(session.status(), SessionStatus::Active);

        // resending works: the open turn is simply reprocessed
        gateway.push_text(&observer_json("normal", true, false, false));
        gateway.push_text("Next question.");
        let outcome = session.process_message("my answer").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Reply(_)));
        assert_eq!(session.state().completed_turns, 1);
    }

    #[tokio::test]
    async fn interviewer_failure_rolls_back_difficulty() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;

        // first good answer builds a streak of 1
        gateway.push_text(&observer_json("excellent", true, true, false));
        gateway.push_text("Q2");
        session.process_message("a1").await.unwrap();
        assert_eq!(session.state().consecutive_good_answers, 1);

        // second good answer would raise the level, but the interviewer fails
        gateway.push_text(&observer_json("excellent", true, true, false));
        gateway.push_error();
        let outcome = session.process_message("a2").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Failed { .. }));

        // difficulty and streaks restored to the pre-turn snapshot
        assert_eq!(session.state().current_difficulty, DifficultyLevel::Basic);
        assert_eq!(session.state().consecutive_good_answers, 1);
        assert_eq!(session.state().completed_turns, 1);

        // retry succeeds and the promotion lands
        gateway.push_text(&observer_json("excellent", true, true, false));
        gateway.push_text("Q3");
        session.process_message("a2").await.unwrap();
        assert_eq!(session.state().current_difficulty, DifficultyLevel::Intermediate);
        assert_eq!(session.state().completed_turns, 2);
    }

    #[tokio::test]
    async fn stop_command_skips_interviewer_and_evaluates_once() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;
        gateway.push_text(&observer_json("stop_command", false, false, false));
        gateway.push_text(feedback_json());

        let outcome = session.process_message("enough, give me feedback").await.unwrap();
        let TurnOutcome::Finished { feedback, .. } = outcome else {
            panic!("expected termination");
        };
        assert_eq!(feedback.verdict.confidence_score, 75);
        assert_eq!(session.status(), SessionStatus::Terminated);
        // the stopped turn never commits
        assert_eq!(session.state().completed_turns, 0);

        // greeting, observer, evaluator; no interviewer_reply generation
        assert_eq!(
            gateway.generation_names(),
            vec!["greeting", "observer_analysis", "final_feedback"]
        );

        assert!(matches!(
            session.process_message("hello?").await,
            Err(SessionError::Terminated)
        ));
        assert!(matches!(session.force_stop().await, Err(SessionError::Terminated)));
    }

    #[tokio::test]
    async fn turn_limit_terminates_after_commit() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_text("greeting");
        let mut session = session_with_config(
            gateway.clone(),
            InterviewConfig::default().with_max_turns(2),
        );
        session.start().await.unwrap();

        gateway.push_text(&observer_json("normal", true, false, false));
        gateway.push_text("Q2");
        session.process_message("a1").await.unwrap();

        gateway.push_text(&observer_json("normal", true, false, false));
        gateway.push_text("Q3");
        gateway.push_text(feedback_json());
        let outcome = session.process_message("a2").await.unwrap();

        let TurnOutcome::Finished { message, feedback } = outcome else {
            panic!("expected termination at the turn limit");
        };
        assert_eq!(message, "Q3");
        assert_eq!(feedback.verdict.confidence_score, 75);
        assert_eq!(session.state().completed_turns, 2);
        assert_eq!(session.status(), SessionStatus::Terminated);
    }

    #[tokio::test]
    async fn grade_seeds_initial_difficulty() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;
        gateway.push_text(
            r#"<r>{"response_type": "introduction", "quality": "acceptable",
                "answered_last_question": true,
                "extracted_info": {"name": "Sam", "grade": "Senior",
                                   "technologies": ["Rust", "Postgres"]}}</r>"#,
        );
        gateway.push_text("Great, let's talk Rust.");

        session.process_message("I'm Sam, a senior Rust developer").await.unwrap();
        assert_eq!(session.state().current_difficulty, DifficultyLevel::Advanced);
        assert_eq!(session.state().candidate.name.as_deref(), Some("Sam"));
        assert_eq!(session.state().candidate.technologies, vec!["Rust", "Postgres"]);
    }

    #[tokio::test]
    async fn unanswered_question_never_moves_difficulty() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;
        // backend wrongly sets both signals on an unanswered reply
        gateway.push_text(&observer_json("off_topic", false, true, true));
        gateway.push_text("Back to my question, please.");

        session.process_message("how about that weather").await.unwrap();
        assert_eq!(session.state().current_difficulty, DifficultyLevel::Basic);
        assert_eq!(session.state().consecutive_good_answers, 0);
        assert_eq!(session.state().consecutive_bad_answers, 0);
    }

    #[tokio::test]
    async fn unanswered_turn_preserves_good_streak() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;

        // first good answer builds a streak of 1
        gateway.push_text(&observer_json("excellent", true, true, false));
        gateway.push_text("Q2");
        session.process_message("a1").await.unwrap();
        assert_eq!(session.state().consecutive_good_answers, 1);

        // a counter-question commits a turn but must not touch the controller
        gateway.push_text(&observer_json("counter_question", false, false, false));
        gateway.push_text("Good question. Back to mine, though.");
        session.process_message("what does the team ship?").await.unwrap();
        assert_eq!(session.state().completed_turns, 2);
        assert_eq!(session.state().consecutive_good_answers, 1);
        assert_eq!(session.state().current_difficulty, DifficultyLevel::Basic);

        // the streak survives the detour, so the next good answer promotes
        gateway.push_text(&observer_json("excellent", true, true, false));
        gateway.push_text("Q4");
        session.process_message("a2").await.unwrap();
        assert_eq!(session.state().current_difficulty, DifficultyLevel::Intermediate);
        assert_eq!(session.state().consecutive_good_answers, 0);
    }

    #[tokio::test]
    async fn cancellation_between_stages_rolls_back() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = session
            .process_message_cancellable("answer", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Cancelled));
        assert_eq!(session.state().completed_turns, 0);
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[tokio::test]
    async fn force_stop_generates_feedback_once() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;
        gateway.push_text(feedback_json());

        let feedback = session.force_stop().await.unwrap();
        assert_eq!(feedback.verdict.confidence_score, 75);
        assert_eq!(session.status(), SessionStatus::Terminated);
        assert!(session.feedback().is_some());
    }

    #[tokio::test]
    async fn evaluator_failure_on_stop_keeps_session_alive() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut session = started(&gateway).await;
        gateway.push_text(&observer_json("stop_command", false, false, false));
        gateway.push_error();

        let outcome = session.process_message("stop").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Failed { .. }));
        assert_eq!(session.status(), SessionStatus::Active);
        assert!(session.feedback().is_none());

        // retrying the stop works
        gateway.push_text(&observer_json("stop_command", false, false, false));
        gateway.push_text(feedback_json());
        let outcome = session.process_message("stop").await.unwrap();
        assert!(matches!(outcome, TurnOutcome::Finished { .. }));
    }
}
