use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::AttendanceStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FaceCheckinRequest {
    pub student_id: Uuid,
    /// Face embedding produced by the matching service. Opaque to this
    /// service and never persisted or logged.
    pub descriptor: Option<Vec<f32>>,
    /// Match confidence in 0.0..=1.0 as reported by the matcher.
    pub confidence: Option<f32>,
    /// Reference to the captured frame, already persisted by file storage.
    pub captured_face_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualCheckinRequest {
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}
