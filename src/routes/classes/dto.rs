use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::teaching_class;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClassRequest {
    pub name: String,
    pub teacher_id: Uuid,
    pub total_sessions: i32,
    /// Absences a student may accumulate before failing; defaults to 3.
    pub max_absent_allowed: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassResponse {
    pub class_id: Uuid,
    pub name: String,
    pub teacher_id: Uuid,
    pub total_sessions: i32,
    pub max_absent_allowed: i32,
    pub create_at: DateTime<Utc>,
    pub update_at: DateTime<Utc>,
}

impl From<teaching_class::Model> for ClassResponse {
    fn from(model: teaching_class::Model) -> Self {
        Self {
            class_id: model.class_id,
            name: model.name,
            teacher_id: model.teacher_id,
            total_sessions: model.total_sessions,
            max_absent_allowed: model.max_absent_allowed,
            create_at: model.create_at,
            update_at: model.update_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollStudentRequest {
    pub student_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentListResponse {
    pub total: usize,
    pub student_ids: Vec<Uuid>,
}
