//! Check-in gateway: both entry points funnel into the session engine's
//! reconcile.

use axum::{Json, Router, extract::Path, http::StatusCode, routing::post};
use uuid::Uuid;

use super::dto::{FaceCheckinRequest, ManualCheckinRequest};
use crate::entities::sea_orm_active_enums::{AttendanceStatus, CheckType};
use crate::error::ApiError;
use crate::extractor::AuthClaims;
use crate::repositories::{CheckinMeta, SessionRepository};
use crate::routes::sessions::dto::LogResponse;

pub fn create_route() -> Router {
    Router::new()
        .route(
            "/api/v1/attendance/sessions/{session_id}/checkin/face",
            post(face_checkin),
        )
        .route(
            "/api/v1/attendance/sessions/{session_id}/checkin/manual",
            post(manual_checkin),
        )
}

/// Face-recognition-assisted check-in
///
/// Always records `present` with check type `auto`. Allowed for the class
/// teacher, an admin, or the student checking themselves in.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/sessions/{session_id}/checkin/face",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = FaceCheckinRequest,
    responses(
        (status = 200, description = "Check-in recorded", body = LogResponse),
        (status = 400, description = "Student not enrolled or invalid confidence"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Session not found"),
        (status = 422, description = "Session not active"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Check-in"
)]
pub async fn face_checkin(
    AuthClaims(claims): AuthClaims,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<FaceCheckinRequest>,
) -> Result<(StatusCode, Json<LogResponse>), ApiError> {
    if let Some(confidence) = payload.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ApiError::InvalidArgument(
                "confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
    }

    let session_repo = SessionRepository::new();
    let (_session, class) = session_repo.find_with_class(session_id).await?;

    let self_checkin = claims.user_id == payload.student_id;
    if !self_checkin && !claims.can_manage_class(&class) {
        return Err(ApiError::Forbidden(
            "Face check-in is limited to the student themselves, the class teacher or an admin"
                .to_string(),
        ));
    }

    let log = session_repo
        .reconcile(
            session_id,
            payload.student_id,
            AttendanceStatus::Present,
            CheckType::Auto,
            CheckinMeta {
                recognized_confidence: payload.confidence,
                captured_face_url: payload.captured_face_url,
                note: None,
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(log.into())))
}

/// Manual check-in by a teacher or admin
///
/// Records the supplied status (present, absent or late) with an optional
/// note.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/sessions/{session_id}/checkin/manual",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = ManualCheckinRequest,
    responses(
        (status = 200, description = "Check-in recorded", body = LogResponse),
        (status = 400, description = "Student not enrolled"),
        (status = 403, description = "Forbidden - class teacher or admin only"),
        (status = 404, description = "Session not found"),
        (status = 422, description = "Session not active"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Check-in"
)]
pub async fn manual_checkin(
    AuthClaims(claims): AuthClaims,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ManualCheckinRequest>,
) -> Result<(StatusCode, Json<LogResponse>), ApiError> {
    let session_repo = SessionRepository::new();
    let (_session, class) = session_repo.find_with_class(session_id).await?;

    if !claims.can_manage_class(&class) {
        return Err(ApiError::Forbidden(
            "Only the class teacher or an admin can record manual check-ins".to_string(),
        ));
    }

    let log = session_repo
        .reconcile(
            session_id,
            payload.student_id,
            payload.status,
            CheckType::Manual,
            CheckinMeta {
                recognized_confidence: None,
                captured_face_url: None,
                note: payload.note,
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(log.into())))
}
