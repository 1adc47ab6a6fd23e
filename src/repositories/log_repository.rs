//! Attendance log store: at most one log per (session, student) pair.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::attendance_log;
use crate::entities::sea_orm_active_enums::{AttendanceStatus, CheckType};
use crate::error::ApiResult;
use crate::static_service::DATABASE_CONNECTION;

/// Optional fields attached to a check-in; confidence and captured image
/// come from the face path, the note from the manual path.
#[derive(Debug, Clone, Default)]
pub struct CheckinMeta {
    pub recognized_confidence: Option<f32>,
    pub captured_face_url: Option<String>,
    pub note: Option<String>,
}

pub struct LogRepository {
    db: DatabaseConnection,
}

impl LogRepository {
    pub fn new() -> Self {
        Self {
            db: DATABASE_CONNECTION
                .get()
                .expect("DATABASE_CONNECTION not set")
                .clone(),
        }
    }

    pub fn with_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates the log on first check-in for the pair and overwrites it on
    /// every following one. Generic over the connection so the session
    /// engine can call it inside its reconcile transaction.
    pub async fn upsert<C: ConnectionTrait>(
        &self,
        db: &C,
        session_id: Uuid,
        student_id: Uuid,
        status: AttendanceStatus,
        check_type: CheckType,
        meta: &CheckinMeta,
        now: DateTime<Utc>,
    ) -> Result<attendance_log::Model, sea_orm::DbErr> {
        let recognized = check_type == CheckType::Auto;
        let existing = attendance_log::Entity::find_by_id((session_id, student_id))
            .one(db)
            .await?;

        let result = match existing {
            Some(model) => {
                let mut active: attendance_log::ActiveModel = model.into();
                active.status = Set(status);
                active.recognized = Set(recognized);
                active.recognized_confidence =
                    Set(recognized.then_some(meta.recognized_confidence).flatten());
                active.captured_face_url = Set(meta.captured_face_url.clone());
                active.note = Set(meta.note.clone());
                active.recorded_at = Set(now);
                active.update(db).await?
            }
            None => {
                let active = attendance_log::ActiveModel {
                    session_id: Set(session_id),
                    student_id: Set(student_id),
                    status: Set(status),
                    recognized: Set(recognized),
                    recognized_confidence: Set(recognized
                        .then_some(meta.recognized_confidence)
                        .flatten()),
                    captured_face_url: Set(meta.captured_face_url.clone()),
                    note: Set(meta.note.clone()),
                    recorded_at: Set(now),
                };
                active.insert(db).await?
            }
        };

        Ok(result)
    }

    pub async fn find_for_session(
        &self,
        session_id: Uuid,
        student_id: Option<Uuid>,
    ) -> ApiResult<Vec<attendance_log::Model>> {
        let mut query = attendance_log::Entity::find()
            .filter(attendance_log::Column::SessionId.eq(session_id));
        if let Some(student_id) = student_id {
            query = query.filter(attendance_log::Column::StudentId.eq(student_id));
        }
        let logs = query
            .order_by_asc(attendance_log::Column::RecordedAt)
            .all(&self.db)
            .await?;
        Ok(logs)
    }

    pub async fn find_for_pair(
        &self,
        session_id: Uuid,
        student_id: Uuid,
    ) -> ApiResult<Option<attendance_log::Model>> {
        let log = attendance_log::Entity::find_by_id((session_id, student_id))
            .one(&self.db)
            .await?;
        Ok(log)
    }

    /// Explicit-absent counts per student across the given sessions. A
    /// student with no log for a session is not counted as absent.
    pub async fn absent_counts(&self, session_ids: &[Uuid]) -> ApiResult<HashMap<Uuid, i64>> {
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        if session_ids.is_empty() {
            return Ok(counts);
        }

        let absents = attendance_log::Entity::find()
            .filter(attendance_log::Column::SessionId.is_in(session_ids.iter().copied()))
            .filter(attendance_log::Column::Status.eq(AttendanceStatus::Absent))
            .all(&self.db)
            .await?;

        for log in absents {
            *counts.entry(log.student_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
