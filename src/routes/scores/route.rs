use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use super::dto::ScoreListResponse;
use crate::error::ApiError;
use crate::extractor::{AuthClaims, UserRole};
use crate::repositories::{ClassRepository, ScoreRepository};

pub fn create_route() -> Router {
    Router::new()
        .route(
            "/api/v1/attendance/classes/{class_id}/scores/recompute",
            post(recompute_scores),
        )
        .route(
            "/api/v1/attendance/classes/{class_id}/scores",
            get(get_class_scores),
        )
        .route(
            "/api/v1/attendance/students/{student_id}/scores",
            get(get_student_scores),
        )
}

/// Recompute attendance scores for a class (class teacher or admin)
#[utoipa::path(
    post,
    path = "/api/v1/attendance/classes/{class_id}/scores/recompute",
    params(
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Scores recomputed", body = ScoreListResponse),
        (status = 403, description = "Forbidden - class teacher or admin only"),
        (status = 404, description = "Class not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Scores"
)]
pub async fn recompute_scores(
    AuthClaims(claims): AuthClaims,
    Path(class_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ScoreListResponse>), ApiError> {
    let class = ClassRepository::new().get(class_id).await?;
    if !claims.can_manage_class(&class) {
        return Err(ApiError::Forbidden(
            "Only the class teacher or an admin can recompute scores".to_string(),
        ));
    }

    let scores = ScoreRepository::new().recompute_class(class_id).await?;
    let response = ScoreListResponse {
        total: scores.len(),
        scores: scores.into_iter().map(Into::into).collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Attendance scores of a class (class teacher or admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/classes/{class_id}/scores",
    params(
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Scores retrieved", body = ScoreListResponse),
        (status = 403, description = "Forbidden - class teacher or admin only"),
        (status = 404, description = "Class not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Scores"
)]
pub async fn get_class_scores(
    AuthClaims(claims): AuthClaims,
    Path(class_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ScoreListResponse>), ApiError> {
    let class = ClassRepository::new().get(class_id).await?;
    if !claims.can_manage_class(&class) {
        return Err(ApiError::Forbidden(
            "Only the class teacher or an admin can view class scores".to_string(),
        ));
    }

    let scores = ScoreRepository::new().scores_for_class(class_id).await?;
    let response = ScoreListResponse {
        total: scores.len(),
        scores: scores.into_iter().map(Into::into).collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Attendance scores of a student
///
/// Students see only their own scores; a teacher sees the rows belonging to
/// classes they teach; admins see everything.
#[utoipa::path(
    get,
    path = "/api/v1/attendance/students/{student_id}/scores",
    params(
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Scores retrieved", body = ScoreListResponse),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Scores"
)]
pub async fn get_student_scores(
    AuthClaims(claims): AuthClaims,
    Path(student_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ScoreListResponse>), ApiError> {
    let score_repo = ScoreRepository::new();

    let scores = match claims.role {
        UserRole::Admin => score_repo.scores_for_student(student_id).await?,
        UserRole::Teacher => {
            score_repo
                .scores_for_student_owned_by(student_id, claims.user_id)
                .await?
        }
        UserRole::Student => {
            if claims.user_id != student_id {
                return Err(ApiError::Forbidden(
                    "Students can only view their own scores".to_string(),
                ));
            }
            score_repo.scores_for_student(student_id).await?
        }
    };

    let response = ScoreListResponse {
        total: scores.len(),
        scores: scores.into_iter().map(Into::into).collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}
