use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::student_score;

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentScoreResponse {
    pub class_id: Uuid,
    pub student_id: Uuid,
    pub total_sessions: i32,
    pub absent_sessions: i32,
    pub attendance_score: f32,
    pub max_absent_allowed: i32,
    pub is_failed_due_to_absent: bool,
    pub last_updated: DateTime<Utc>,
}

impl From<student_score::Model> for StudentScoreResponse {
    fn from(model: student_score::Model) -> Self {
        Self {
            class_id: model.class_id,
            student_id: model.student_id,
            total_sessions: model.total_sessions,
            absent_sessions: model.absent_sessions,
            attendance_score: model.attendance_score,
            max_absent_allowed: model.max_absent_allowed,
            is_failed_due_to_absent: model.is_failed_due_to_absent,
            last_updated: model.last_updated,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreListResponse {
    pub total: usize,
    pub scores: Vec<StudentScoreResponse>,
}
