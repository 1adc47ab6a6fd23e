use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use super::dto::{
    CreateSessionRequest, LogListResponse, LogsQuery, SessionResponse, UpdateSessionStatusRequest,
};
use crate::entities::sea_orm_active_enums::SessionStatus;
use crate::error::ApiError;
use crate::extractor::{AuthClaims, UserRole};
use crate::repositories::{LogRepository, ScoreRepository, SessionRepository};

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/attendance/sessions", post(create_session))
        .route(
            "/api/v1/attendance/sessions/{session_id}/status",
            patch(update_session_status),
        )
        .route(
            "/api/v1/attendance/sessions/{session_id}",
            get(get_session),
        )
        .route(
            "/api/v1/attendance/sessions/{session_id}/logs",
            get(get_session_logs),
        )
}

/// Create an attendance session (class teacher or admin)
///
/// The session opens active with the whole enrolled roster marked absent.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "session_number out of range"),
        (status = 403, description = "Forbidden - class teacher or admin only"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Session number already used for this class"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance Sessions"
)]
pub async fn create_session(
    AuthClaims(claims): AuthClaims,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session_repo = SessionRepository::new();
    let session = session_repo
        .create_session(
            payload.class_id,
            payload.session_number,
            payload.session_date,
            payload.room,
            payload.notes,
            &claims,
        )
        .await?;

    let attendees = session_repo.attendees(session.session_id).await?;
    let response = SessionResponse::from_parts(session, attendees);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Change session status (class teacher, session creator or admin)
///
/// Setting `completed` synchronously recomputes the class's attendance
/// scores; the request only succeeds once the recompute has finished.
#[utoipa::path(
    patch,
    path = "/api/v1/attendance/sessions/{session_id}/status",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = UpdateSessionStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SessionResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Session not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance Sessions"
)]
pub async fn update_session_status(
    AuthClaims(claims): AuthClaims,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateSessionStatusRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session_repo = SessionRepository::new();
    let session = session_repo
        .transition_status(session_id, payload.status, &claims)
        .await?;

    if session.status == SessionStatus::Completed {
        ScoreRepository::new()
            .recompute_class(session.class_id)
            .await?;
    }

    let attendees = session_repo.attendees(session.session_id).await?;
    let response = SessionResponse::from_parts(session, attendees);
    Ok((StatusCode::OK, Json(response)))
}

/// Get a session with its present/absent membership
#[utoipa::path(
    get,
    path = "/api/v1/attendance/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session retrieved", body = SessionResponse),
        (status = 404, description = "Session not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance Sessions"
)]
pub async fn get_session(
    AuthClaims(_claims): AuthClaims,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session_repo = SessionRepository::new();
    let session = session_repo.find_by_id(session_id).await?;
    let attendees = session_repo.attendees(session_id).await?;
    let response = SessionResponse::from_parts(session, attendees);
    Ok((StatusCode::OK, Json(response)))
}

/// List check-in logs of a session
///
/// Students only see their own log; the class teacher and admins see all.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/sessions/{session_id}/logs",
    params(
        ("session_id" = Uuid, Path, description = "Session ID"),
        LogsQuery
    ),
    responses(
        (status = 200, description = "Logs retrieved", body = LogListResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Session not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance Sessions"
)]
pub async fn get_session_logs(
    AuthClaims(claims): AuthClaims,
    Path(session_id): Path<Uuid>,
    Query(query): Query<LogsQuery>,
) -> Result<(StatusCode, Json<LogListResponse>), ApiError> {
    let session_repo = SessionRepository::new();
    let (_session, class) = session_repo.find_with_class(session_id).await?;

    let student_filter = if claims.role == UserRole::Student {
        // A student may only read their own rows, whatever the query says.
        Some(claims.user_id)
    } else if claims.can_manage_class(&class) {
        query.student_id
    } else {
        return Err(ApiError::Forbidden(
            "Only the class teacher or an admin can list session logs".to_string(),
        ));
    };

    let logs = LogRepository::new()
        .find_for_session(session_id, student_filter)
        .await?;

    let response = LogListResponse {
        total: logs.len(),
        logs: logs.into_iter().map(Into::into).collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}
