//! Request context carrying the caller identity and cancellation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::UserId;

/// An authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's user ID.
    pub user_id: UserId,
    /// The username, for logs.
    pub username: String,
    /// Administrators bypass membership filtering.
    pub is_admin: bool,
}

impl Actor {
    /// Creates a new actor.
    pub fn new(user_id: UserId, username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            user_id,
            username: username.into(),
            is_admin,
        }
    }
}

/// Context for one service call.
///
/// Identity extraction happens upstream; this crate only reads the result.
/// Cancelling the token aborts the call with `Cancelled`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The caller, when authenticated.
    pub actor: Option<Actor>,
    /// Correlation ID for logs.
    pub request_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
    /// Cancellation signal from the caller.
    pub cancel: CancellationToken,
}

impl RequestContext {
    /// Context for an authenticated caller.
    pub fn new(actor: Actor) -> Self {
        Self::build(Some(actor))
    }

    /// Context without a caller. Reads work; mutations fail.
    pub fn anonymous() -> Self {
        Self::build(None)
    }

    fn build(actor: Option<Actor>) -> Self {
        Self {
            actor,
            request_id: Uuid::now_v7(),
            request_time: Utc::now(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The caller, or `Unauthenticated`.
    pub fn require_actor(&self) -> AppResult<&Actor> {
        self.actor
            .as_ref()
            .ok_or_else(|| AppError::unauthenticated("No authenticated caller"))
    }
}
