use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::entities::sea_orm_active_enums::{AttendanceStatus, CheckType, SessionStatus};
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Service API",
        description = "Attendance session lifecycle, check-in and scoring"
    ),
    paths(
        routes::health::route::health,
        routes::classes::route::create_class,
        routes::classes::route::get_class,
        routes::classes::route::enroll_student,
        routes::classes::route::list_enrollments,
        routes::sessions::route::create_session,
        routes::sessions::route::update_session_status,
        routes::sessions::route::get_session,
        routes::sessions::route::get_session_logs,
        routes::checkin::route::face_checkin,
        routes::checkin::route::manual_checkin,
        routes::scores::route::recompute_scores,
        routes::scores::route::get_class_scores,
        routes::scores::route::get_student_scores,
    ),
    components(schemas(
        SessionStatus,
        AttendanceStatus,
        CheckType,
        routes::classes::dto::CreateClassRequest,
        routes::classes::dto::ClassResponse,
        routes::classes::dto::EnrollStudentRequest,
        routes::classes::dto::EnrollmentListResponse,
        routes::sessions::dto::CreateSessionRequest,
        routes::sessions::dto::UpdateSessionStatusRequest,
        routes::sessions::dto::PresentEntry,
        routes::sessions::dto::SessionResponse,
        routes::sessions::dto::LogResponse,
        routes::sessions::dto::LogListResponse,
        routes::checkin::dto::FaceCheckinRequest,
        routes::checkin::dto::ManualCheckinRequest,
        routes::scores::dto::StudentScoreResponse,
        routes::scores::dto::ScoreListResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Classes", description = "Teaching class management"),
        (name = "Attendance Sessions", description = "Session lifecycle and reads"),
        (name = "Check-in", description = "Manual and face-recognition check-in"),
        (name = "Scores", description = "Derived attendance scores")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
