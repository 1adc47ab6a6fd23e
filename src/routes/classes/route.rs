use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use super::dto::{ClassResponse, CreateClassRequest, EnrollStudentRequest, EnrollmentListResponse};
use crate::error::ApiError;
use crate::extractor::{AuthClaims, UserRole};
use crate::repositories::ClassRepository;

pub fn create_route() -> Router {
    Router::new()
        .route("/api/v1/classes", post(create_class))
        .route("/api/v1/classes/{class_id}", get(get_class))
        .route(
            "/api/v1/classes/{class_id}/enrollments",
            post(enroll_student),
        )
        .route(
            "/api/v1/classes/{class_id}/enrollments",
            get(list_enrollments),
        )
}

/// Create a teaching class (Admin only)
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn create_class(
    AuthClaims(claims): AuthClaims,
    Json(payload): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<ClassResponse>), ApiError> {
    if !claims.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admin can create classes".to_string(),
        ));
    }

    let class_repo = ClassRepository::new();
    let class = class_repo
        .create(
            Uuid::new_v4(),
            payload.name,
            payload.teacher_id,
            payload.total_sessions,
            payload.max_absent_allowed,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(class.into())))
}

/// Get class by ID
#[utoipa::path(
    get,
    path = "/api/v1/classes/{class_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class retrieved", body = ClassResponse),
        (status = 404, description = "Class not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn get_class(
    AuthClaims(_claims): AuthClaims,
    Path(class_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ClassResponse>), ApiError> {
    let class = ClassRepository::new().get(class_id).await?;
    Ok((StatusCode::OK, Json(class.into())))
}

/// Enroll a student into a class (Admin or class teacher)
#[utoipa::path(
    post,
    path = "/api/v1/classes/{class_id}/enrollments",
    params(
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    request_body = EnrollStudentRequest,
    responses(
        (status = 201, description = "Student enrolled"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Student already enrolled"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn enroll_student(
    AuthClaims(claims): AuthClaims,
    Path(class_id): Path<Uuid>,
    Json(payload): Json<EnrollStudentRequest>,
) -> Result<StatusCode, ApiError> {
    let class_repo = ClassRepository::new();
    let class = class_repo.get(class_id).await?;

    if !claims.can_manage_class(&class) {
        return Err(ApiError::Forbidden(
            "Only the class teacher or an admin can enroll students".to_string(),
        ));
    }

    class_repo.enroll_student(class_id, payload.student_id).await?;
    Ok(StatusCode::CREATED)
}

/// List enrolled student ids of a class
#[utoipa::path(
    get,
    path = "/api/v1/classes/{class_id}/enrollments",
    params(
        ("class_id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Enrollments retrieved", body = EnrollmentListResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn list_enrollments(
    AuthClaims(claims): AuthClaims,
    Path(class_id): Path<Uuid>,
) -> Result<(StatusCode, Json<EnrollmentListResponse>), ApiError> {
    let class_repo = ClassRepository::new();
    let class = class_repo.get(class_id).await?;

    if claims.role == UserRole::Student {
        let enrolled = class_repo.is_enrolled(class_id, claims.user_id).await?;
        if !enrolled {
            return Err(ApiError::Forbidden(
                "Students can only view classes they are enrolled in".to_string(),
            ));
        }
    } else if !claims.can_manage_class(&class) {
        return Err(ApiError::Forbidden(
            "Only the class teacher or an admin can view the roster".to_string(),
        ));
    }

    let student_ids = class_repo.enrolled_student_ids(class_id).await?;
    let response = EnrollmentListResponse {
        total: student_ids.len(),
        student_ids,
    };
    Ok((StatusCode::OK, Json(response)))
}
