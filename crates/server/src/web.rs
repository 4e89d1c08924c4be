//! HTTP transport for the movie agent.
//!
//! Routes:
//! - `POST /api/message` - `{input, session_id?}` in, `AgentReply` out
//! - `GET /api/health` - model backend readiness
//!
//! Sessions live in memory, keyed by id. A session is checked out of the
//! store for the length of a turn, so concurrent requests for the same
//! conversation get 409 instead of interleaving. Sessions idle for longer
//! than `SessionLimits::idle_ttl` are dropped, and the store never holds
//! more than `SessionLimits::max_sessions` idle sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use dialogue::Session;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::orchestrator::{AgentError, AgentReply, MovieAgent, ReplyAction};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Bounds on the in-memory session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Idle sessions older than this are dropped
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

struct SessionSlot {
    /// `None` while a turn is in flight
    session: Option<Session>,
    last_seen: Instant,
}

#[derive(Default)]
struct SessionStore {
    slots: HashMap<Uuid, SessionSlot>,
}

impl SessionStore {
    /// Take a session out of the store, creating one for unknown or missing ids.
    fn checkout(
        &mut self,
        session_id: Option<Uuid>,
        limits: &SessionLimits,
        now: Instant,
        new_session: impl FnOnce() -> Session,
    ) -> Result<Session, ApiError> {
        if let Some(id) = session_id {
            if let Some(slot) = self.slots.get_mut(&id) {
                let session = slot.session.take().ok_or(ApiError::Busy(id))?;
                slot.last_seen = now;
                return Ok(session);
            }
            debug!("Unknown session {}, starting a new one", id);
        }

        self.evict(limits, now);
        let session = new_session();
        info!("Started session {}", session.id());
        self.slots.insert(
            session.id(),
            SessionSlot {
                session: None,
                last_seen: now,
            },
        );
        Ok(session)
    }

    fn checkin(&mut self, session: Session, now: Instant) {
        self.slots.insert(
            session.id(),
            SessionSlot {
                session: Some(session),
                last_seen: now,
            },
        );
    }

    fn discard(&mut self, session_id: Uuid) {
        self.slots.remove(&session_id);
    }

    /// Drop expired idle sessions, then the least recently used idle ones
    /// until there is room for one more. Sessions mid-turn are never dropped.
    fn evict(&mut self, limits: &SessionLimits, now: Instant) {
        let before = self.slots.len();
        self.slots.retain(|_, slot| {
            slot.session.is_none() || now.saturating_duration_since(slot.last_seen) < limits.idle_ttl
        });

        while self.slots.len() >= limits.max_sessions {
            let oldest = self
                .slots
                .iter()
                .filter(|(_, slot)| slot.session.is_some())
                .min_by_key(|(_, slot)| slot.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => self.discard(id),
                None => break,
            }
        }

        let evicted = before - self.slots.len();
        if evicted > 0 {
            debug!("Evicted {} idle sessions ({} left)", evicted, self.slots.len());
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    agent: Arc<MovieAgent>,
    sessions: Arc<Mutex<SessionStore>>,
    limits: SessionLimits,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub input: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub checked_at: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Empty input")]
    EmptyInput,

    #[error("session {0} is still processing a message")]
    Busy(Uuid),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("turn failed: {0}")]
    TurnFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::EmptyInput => (StatusCode::BAD_REQUEST, "EMPTY_INPUT"),
            ApiError::Busy(_) => (StatusCode::CONFLICT, "SESSION_BUSY"),
            ApiError::Agent(_) => (StatusCode::BAD_REQUEST, "INVALID_COMMAND"),
            ApiError::TurnFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

pub fn router(agent: Arc<MovieAgent>) -> Router {
    router_with_limits(agent, SessionLimits::default())
}

pub fn router_with_limits(agent: Arc<MovieAgent>, limits: SessionLimits) -> Router {
    let state = AppState {
        agent,
        sessions: Arc::new(Mutex::new(SessionStore::default())),
        limits,
    };
    Router::new()
        .route("/api/message", post(message))
        .route("/api/health", get(health))
        .with_state(state)
}

pub async fn message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Response, ApiError> {
    let input = request.input.trim().to_string();
    if input.is_empty() {
        return Err(ApiError::EmptyInput);
    }

    let session = state.sessions.lock().await.checkout(
        request.session_id,
        &state.limits,
        Instant::now(),
        || state.agent.new_session(),
    )?;
    let session_id = session.id();

    // Detached from the request: the session is checked back in even if
    // the client disconnects mid-turn.
    let reply = match tokio::spawn(run_turn(state.clone(), session, input)).await {
        Ok(result) => result?,
        Err(err) => {
            error!("Turn for session {} failed: {}", session_id, err);
            state.sessions.lock().await.discard(session_id);
            return Err(ApiError::TurnFailed(err.to_string()));
        }
    };

    let status = if reply.action == ReplyAction::Unavailable {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    Ok((status, Json(reply)).into_response())
}

async fn run_turn(state: AppState, mut session: Session, input: String) -> Result<AgentReply, AgentError> {
    let result = state.agent.handle(&mut session, &input).await;
    state.sessions.lock().await.checkin(session, Instant::now());
    result
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ready = state.agent.ready().await;
    let payload = HealthResponse {
        status: if ready { "ok" } else { "unavailable" },
        checked_at: Utc::now().to_rfc3339(),
    };
    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}
