use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{AttendanceStatus, CheckType, SessionStatus};
use crate::entities::{attendance_log, attendance_session, session_attendee};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub class_id: Uuid,
    /// 1-based index within the class's planned sessions.
    pub session_number: i32,
    pub session_date: Option<NaiveDate>,
    pub room: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSessionStatusRequest {
    pub status: SessionStatus,
}

/// A student on the present side of the roster partition.
#[derive(Debug, Serialize, ToSchema)]
pub struct PresentEntry {
    pub student_id: Uuid,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub check_type: Option<CheckType>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub class_id: Uuid,
    pub session_number: i32,
    pub session_date: Option<NaiveDate>,
    pub room: Option<String>,
    pub status: SessionStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub students_present: Vec<PresentEntry>,
    pub students_absent: Vec<Uuid>,
}

impl SessionResponse {
    pub fn from_parts(
        session: attendance_session::Model,
        attendees: Vec<session_attendee::Model>,
    ) -> Self {
        let mut students_present = Vec::new();
        let mut students_absent = Vec::new();
        for attendee in attendees {
            if attendee.present {
                students_present.push(PresentEntry {
                    student_id: attendee.student_id,
                    checked_in_at: attendee.checked_in_at,
                    check_type: attendee.check_type,
                });
            } else {
                students_absent.push(attendee.student_id);
            }
        }

        Self {
            session_id: session.session_id,
            class_id: session.class_id,
            session_number: session.session_number,
            session_date: session.session_date,
            room: session.room,
            status: session.status,
            start_time: session.start_time,
            notes: session.notes,
            created_by: session.created_by,
            students_present,
            students_absent,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogResponse {
    pub session_id: Uuid,
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    pub recognized: bool,
    pub recognized_confidence: Option<f32>,
    pub captured_face_url: Option<String>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl From<attendance_log::Model> for LogResponse {
    fn from(model: attendance_log::Model) -> Self {
        Self {
            session_id: model.session_id,
            student_id: model.student_id,
            status: model.status,
            recognized: model.recognized,
            recognized_confidence: model.recognized_confidence,
            captured_face_url: model.captured_face_url,
            note: model.note,
            recorded_at: model.recorded_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogListResponse {
    pub total: usize,
    pub logs: Vec<LogResponse>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct LogsQuery {
    /// Restrict to one student's log.
    pub student_id: Option<Uuid>,
}
