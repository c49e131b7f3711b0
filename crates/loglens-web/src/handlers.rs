//! Log file endpoints
//!
//! Every admin endpoint asks the gate first, then checks its parameters,
//! then resolves the handler and performs the file operation. Unknown
//! handlers, missing files and misconfiguration are all answered with
//! 200 and a body whose `status` says what happened.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::Extension;
use loglens_core::{CallerIdentity, Decision, DenyReason, FileAccessResult, Operation};
use loglens_logs::{RejectReason, Submission};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HandlerQuery {
    pub handler_name: Option<String>,
}

/// Query string as extracted; a malformed one is reported only after the gate
type HandlerParams = Result<Query<HandlerQuery>, QueryRejection>;

fn handler_name(params: &HandlerParams) -> Result<&str, ApiError> {
    match params {
        Ok(Query(query)) => query
            .handler_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(ApiError::MissingHandlerName),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Ok,
    NotFound,
    Misconfigured,
}

/// Body of `request/file`
#[derive(Debug, Serialize, Deserialize)]
pub struct LogFileBody {
    pub text: String,
    pub timestamp: f64,
    pub status: LookupStatus,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl LogFileBody {
    fn failed(status: LookupStatus, text: String) -> Self {
        Self {
            text,
            timestamp: 0.0,
            status,
            truncated: false,
        }
    }
}

/// Body of `request/timestamp`
#[derive(Debug, Serialize, Deserialize)]
pub struct TimestampBody {
    pub timestamp: f64,
    pub status: LookupStatus,
}

/// Why a handler name did not lead to a path
struct LookupFailure {
    status: LookupStatus,
    message: String,
}

fn resolve_path(state: &AppState, name: &str) -> Result<PathBuf, LookupFailure> {
    state.registry.resolve_path(name).map_err(|e| {
        if e.is_not_found() {
            LookupFailure {
                status: LookupStatus::NotFound,
                message: format!("Handler {} is not registered", name),
            }
        } else {
            LookupFailure {
                status: LookupStatus::Misconfigured,
                message: format!(
                    "Improperly configured.\n{}\nPlease check the logging configuration",
                    e
                ),
            }
        }
    })
}

/// Answer for a gate denial on an admin endpoint
pub(crate) fn deny(state: &AppState, identity: &CallerIdentity, reason: DenyReason) -> Response {
    debug!("Denied {} ({})", identity.display_name(), reason);
    match reason {
        DenyReason::NotPrivileged => {
            ApiError::Forbidden(format!("403 Forbidden: {}", reason)).into_response()
        }
        _ => Redirect::to(&state.url("/login")).into_response(),
    }
}

macro_rules! require_admin {
    ($state:expr, $identity:expr) => {
        if let Decision::Denied(reason) = $state
            .gate
            .authorize(&$identity, Operation::AdminFileOperation)
        {
            return deny(&$state, &$identity, reason);
        }
    };
}

/// Paths of every file-backed handler
pub async fn request_logfile_paths(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
) -> Response {
    require_admin!(state, identity);

    Json(state.registry.list_file_backed_handlers()).into_response()
}

/// Content and modification time of a handler's file
pub async fn request_logfile(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    params: HandlerParams,
) -> Response {
    require_admin!(state, identity);
    let name = match handler_name(&params) {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };

    let path = match resolve_path(&state, name) {
        Ok(path) => path,
        Err(failure) => {
            return Json(LogFileBody::failed(failure.status, failure.message)).into_response()
        }
    };

    let body = match state.files.read_file(&path) {
        FileAccessResult::Content {
            text,
            last_modified,
            truncated,
        } => LogFileBody {
            text,
            timestamp: last_modified,
            status: LookupStatus::Ok,
            truncated,
        },
        FileAccessResult::NotFound { requested_path } => LogFileBody::failed(
            LookupStatus::NotFound,
            format!("Log file {} not found", requested_path.display()),
        ),
        FileAccessResult::Misconfigured { reason } => {
            LogFileBody::failed(LookupStatus::Misconfigured, reason)
        }
        other => LogFileBody::failed(
            LookupStatus::Misconfigured,
            format!("Unexpected file access result: {:?}", other),
        ),
    };

    Json(body).into_response()
}

/// Modification time of a handler's file, for polling
pub async fn request_logfile_timestamp(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    params: HandlerParams,
) -> Response {
    require_admin!(state, identity);
    let name = match handler_name(&params) {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };

    let body = match resolve_path(&state, name) {
        Ok(path) => match state.files.stat_timestamp(&path) {
            FileAccessResult::Modified { last_modified } => TimestampBody {
                timestamp: last_modified,
                status: LookupStatus::Ok,
            },
            FileAccessResult::NotFound { .. } => TimestampBody {
                timestamp: 0.0,
                status: LookupStatus::NotFound,
            },
            _ => TimestampBody {
                timestamp: 0.0,
                status: LookupStatus::Misconfigured,
            },
        },
        Err(failure) => TimestampBody {
            timestamp: 0.0,
            status: failure.status,
        },
    };

    Json(body).into_response()
}

/// Truncate a handler's file
pub async fn clear_logfile(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    params: HandlerParams,
) -> Response {
    require_admin!(state, identity);
    let name = match handler_name(&params) {
        Ok(name) => name,
        Err(e) => return e.into_response(),
    };

    let path = match resolve_path(&state, name) {
        Ok(path) => path,
        Err(failure) => return failure.message.into_response(),
    };

    match state.files.clear_file(&path) {
        FileAccessResult::Cleared => {
            info!("{} cleared handler {}", identity.display_name(), name);
            format!("Log file {} cleared", path.display()).into_response()
        }
        FileAccessResult::NotFound { .. } => "No logs available".into_response(),
        FileAccessResult::Misconfigured { reason } => {
            format!("Improperly configured: {}", reason).into_response()
        }
        other => format!("Unexpected file access result: {:?}", other).into_response(),
    }
}

/// Record a log message sent by a browser
pub async fn post_client_log(
    State(state): State<AppState>,
    Extension(identity): Extension<CallerIdentity>,
    body: Bytes,
) -> Response {
    if let Decision::Denied(reason) = state
        .gate
        .authorize(&identity, Operation::ClientLogSubmission)
    {
        return ApiError::Forbidden(reason.to_string()).into_response();
    }

    match state.ingest.submit_payload(&body) {
        Submission::Accepted(_) => (StatusCode::OK, "Log message processed.").into_response(),
        Submission::Rejected(RejectReason::Disabled) => {
            ApiError::Forbidden(RejectReason::Disabled.to_string()).into_response()
        }
        Submission::Rejected(reason) => ApiError::BadRequest(reason.to_string()).into_response(),
    }
}
