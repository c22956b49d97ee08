//! Concurrent session registry.
//!
//! Each session is wrapped in its own async mutex, so turns of one session
//! serialize while distinct sessions run fully in parallel. The registry
//! also holds a per-session [`CancellationToken`] that a concurrent
//! `force_stop` fires to abandon an in-flight turn between stages.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use coach_domain::InterviewFeedback;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::config::InterviewConfig;
use crate::ports::completion_gateway::CompletionGateway;
use crate::ports::observability::InterviewTracker;
use crate::ports::transcript_store::TranscriptStore;

use super::orchestrator::{InterviewSession, SessionError, SessionStatus, TurnOutcome};

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error(transparent)]
    Session(#[from] SessionError),
}

struct SessionEntry {
    session: Arc<Mutex<InterviewSession>>,
    cancel: CancellationToken,
}

/// Registry of live sessions plus the collaborators new sessions wire in.
pub struct SessionStore {
    gateway: Arc<dyn CompletionGateway>,
    tracker: Arc<dyn InterviewTracker>,
    transcripts: Arc<dyn TranscriptStore>,
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl SessionStore {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        tracker: Arc<dyn InterviewTracker>,
        transcripts: Arc<dyn TranscriptStore>,
    ) -> Self {
        Self {
            gateway,
            tracker,
            transcripts,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new session in the `Created` state.
    pub async fn create(&self, config: InterviewConfig) -> SessionId {
        let id = SessionId::generate();
        let session = InterviewSession::new(
            id.to_string(),
            config,
            self.gateway.clone(),
            self.tracker.clone(),
            self.transcripts.clone(),
        );
        self.sessions.lock().await.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                cancel: CancellationToken::new(),
            },
        );
        info!(session_id = %id, "session created");
        id
    }

    /// Start a session and return its greeting.
    pub async fn start(&self, id: SessionId) -> Result<String, StoreError> {
        let session = self.session(id).await?;
        let mut session = session.lock().await;
        Ok(session.start().await?)
    }

    /// Run one turn. Turns of the same session serialize on its mutex.
    pub async fn process_message(
        &self,
        id: SessionId,
        message: &str,
    ) -> Result<TurnOutcome, StoreError> {
        let (session, cancel) = {
            let sessions = self.sessions.lock().await;
            let entry = sessions.get(&id).ok_or(StoreError::UnknownSession(id))?;
            (entry.session.clone(), entry.cancel.clone())
        };
        let mut session = session.lock().await;
        Ok(session.process_message_cancellable(message, &cancel).await?)
    }

    /// Terminate a session immediately and return its feedback.
    ///
    /// Fires the session's cancellation token first so an in-flight turn is
    /// abandoned between stages rather than waited out to completion.
    pub async fn force_stop(&self, id: SessionId) -> Result<InterviewFeedback, StoreError> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            let entry = sessions.get_mut(&id).ok_or(StoreError::UnknownSession(id))?;
            entry.cancel.cancel();
            // fresh token for any turns after a failed stop
            entry.cancel = CancellationToken::new();
            entry.session.clone()
        };
        let mut session = session.lock().await;
        Ok(session.force_stop().await?)
    }

    pub async fn status(&self, id: SessionId) -> Result<SessionStatus, StoreError> {
        let session = self.session(id).await?;
        let status = session.lock().await.status();
        Ok(status)
    }

    /// Drop a session from the registry.
    pub async fn remove(&self, id: SessionId) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::UnknownSession(id))
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    async fn session(&self, id: SessionId) -> Result<Arc<Mutex<InterviewSession>>, StoreError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&id)
            .map(|entry| entry.session.clone())
            .ok_or(StoreError::UnknownSession(id))
    }
}
