//! Attendance session engine: lifecycle, authorization gating and the
//! present/absent roster reconciliation both check-in paths funnel into.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{AttendanceStatus, CheckType, SessionStatus};
use crate::entities::{attendance_log, attendance_session, session_attendee, teaching_class};
use crate::error::{ApiError, ApiResult};
use crate::extractor::TokenClaims;
use crate::repositories::{CheckinMeta, ClassRepository, LogRepository};
use crate::static_service::DATABASE_CONNECTION;
use crate::utils::keyed_lock::SESSION_LOCKS;

pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
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

    fn class_repo(&self) -> ClassRepository {
        ClassRepository::with_db(self.db.clone())
    }

    fn log_repo(&self) -> LogRepository {
        LogRepository::with_db(self.db.clone())
    }

    /// Creates a session for (class, session_number) with the full current
    /// roster marked absent. The session starts in `active` immediately.
    pub async fn create_session(
        &self,
        class_id: Uuid,
        session_number: i32,
        session_date: Option<NaiveDate>,
        room: Option<String>,
        notes: Option<String>,
        claims: &TokenClaims,
    ) -> ApiResult<attendance_session::Model> {
        let class = self.class_repo().get(class_id).await?;

        if !claims.can_manage_class(&class) {
            return Err(ApiError::Forbidden(
                "Only the class teacher or an admin can create attendance sessions".to_string(),
            ));
        }

        if session_number < 1 || session_number > class.total_sessions {
            return Err(ApiError::InvalidArgument(format!(
                "session_number must be between 1 and {}",
                class.total_sessions
            )));
        }

        let existing = attendance_session::Entity::find()
            .filter(attendance_session::Column::ClassId.eq(class_id))
            .filter(attendance_session::Column::SessionNumber.eq(session_number))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ApiError::Conflict(format!(
                "Session {} already exists for class {}",
                session_number, class_id
            )));
        }

        let roster = self.class_repo().enrolled_student_ids(class_id).await?;
        let now = Utc::now();
        let session_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        let session = attendance_session::ActiveModel {
            session_id: Set(session_id),
            class_id: Set(class_id),
            session_number: Set(session_number),
            session_date: Set(session_date),
            room: Set(room),
            status: Set(SessionStatus::Active),
            start_time: Set(Some(now)),
            notes: Set(notes),
            created_by: Set(claims.user_id),
            create_at: Set(now),
            update_at: Set(now),
        };

        let session = session.insert(&txn).await.map_err(|e| {
            // A concurrent create for the same (class, session_number) loses
            // at the unique index.
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ApiError::Conflict(format!(
                    "Session {} already exists for class {}",
                    session_number, class_id
                ))
            } else {
                ApiError::Database(e)
            }
        })?;

        for student_id in roster {
            let attendee = session_attendee::ActiveModel {
                session_id: Set(session_id),
                student_id: Set(student_id),
                present: Set(false),
                checked_in_at: Set(None),
                check_type: Set(None),
            };
            attendee.insert(&txn).await?;
        }

        txn.commit().await?;

        tracing::info!(
            "Created attendance session {} (#{}) for class {}",
            session_id,
            session_number,
            class_id
        );
        Ok(session)
    }

    pub async fn find_by_id(&self, session_id: Uuid) -> ApiResult<attendance_session::Model> {
        attendance_session::Entity::find_by_id(session_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", session_id)))
    }

    pub async fn find_with_class(
        &self,
        session_id: Uuid,
    ) -> ApiResult<(attendance_session::Model, teaching_class::Model)> {
        let session = self.find_by_id(session_id).await?;
        let class = self.class_repo().get(session.class_id).await?;
        Ok((session, class))
    }

    /// Sets the session status. Any status is reachable from any status;
    /// activating backfills `start_time`, completing deliberately records no
    /// end time. The caller runs the score recompute when the new status is
    /// `completed`.
    pub async fn transition_status(
        &self,
        session_id: Uuid,
        new_status: SessionStatus,
        claims: &TokenClaims,
    ) -> ApiResult<attendance_session::Model> {
        let (session, class) = self.find_with_class(session_id).await?;

        let authorized = claims.can_manage_class(&class) || claims.user_id == session.created_by;
        if !authorized {
            return Err(ApiError::Forbidden(
                "Only the class teacher, the session creator or an admin can change session status"
                    .to_string(),
            ));
        }

        let start_time = session.start_time;
        let mut active: attendance_session::ActiveModel = session.into();
        active.status = Set(new_status);
        if new_status == SessionStatus::Active && start_time.is_none() {
            active.start_time = Set(Some(Utc::now()));
        }
        active.update_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        tracing::info!("Session {} status set to {:?}", session_id, new_status);
        Ok(updated)
    }

    /// Shared core of both check-in paths. Upserts the (session, student)
    /// log and moves the student to the matching side of the present/absent
    /// partition. Safe to call repeatedly; the latest call's fields win.
    pub async fn reconcile(
        &self,
        session_id: Uuid,
        student_id: Uuid,
        new_status: AttendanceStatus,
        check_type: CheckType,
        meta: CheckinMeta,
    ) -> ApiResult<attendance_log::Model> {
        // The partition update is a read-modify-write over two tables;
        // serialize it per session.
        let _guard = SESSION_LOCKS.acquire(session_id).await;

        let session = self.find_by_id(session_id).await?;
        if !session.is_active() {
            return Err(ApiError::RuleViolation(
                "Check-in rejected: session is not active".to_string(),
            ));
        }

        if !self
            .class_repo()
            .is_enrolled(session.class_id, student_id)
            .await?
        {
            return Err(ApiError::InvalidArgument(format!(
                "Student {} is not enrolled in class {}",
                student_id, session.class_id
            )));
        }

        let now = Utc::now();
        let present = new_status == AttendanceStatus::Present;

        let txn = self.db.begin().await?;

        let log = self
            .log_repo()
            .upsert(&txn, session_id, student_id, new_status, check_type, &meta, now)
            .await?;

        let attendee = session_attendee::Entity::find_by_id((session_id, student_id))
            .one(&txn)
            .await?;
        match attendee {
            Some(row) => {
                let mut active: session_attendee::ActiveModel = row.into();
                active.present = Set(present);
                active.checked_in_at = Set(present.then_some(now));
                active.check_type = Set(present.then_some(check_type));
                active.update(&txn).await?;
            }
            None => {
                // Student enrolled after the session was created; the
                // partition tracks the current roster, so add the row now.
                let active = session_attendee::ActiveModel {
                    session_id: Set(session_id),
                    student_id: Set(student_id),
                    present: Set(present),
                    checked_in_at: Set(present.then_some(now)),
                    check_type: Set(present.then_some(check_type)),
                };
                active.insert(&txn).await?;
            }
        }

        txn.commit().await?;

        tracing::debug!(
            "Reconciled student {} in session {} to {:?} ({:?})",
            student_id,
            session_id,
            new_status,
            check_type
        );
        Ok(log)
    }

    pub async fn attendees(&self, session_id: Uuid) -> ApiResult<Vec<session_attendee::Model>> {
        let rows = session_attendee::Entity::find()
            .filter(session_attendee::Column::SessionId.eq(session_id))
            .order_by_asc(session_attendee::Column::StudentId)
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::extractor::UserRole;
    use crate::test_utils::{assert_partition, claims_for, setup_test_db};

    async fn seed(
        db: &DatabaseConnection,
        students: usize,
    ) -> (teaching_class::Model, Vec<Uuid>, TokenClaims) {
        let (class, roster) = crate::test_utils::seed_class(db, students, 10, None).await;
        let teacher = claims_for(class.teacher_id, UserRole::Teacher);
        (class, roster, teacher)
    }

    #[tokio::test]
    async fn test_create_session_marks_roster_absent() {
        let db = setup_test_db().await;
        let (class, roster, teacher) = seed(&db, 5).await;
        let repo = SessionRepository::with_db(db.clone());

        let session = repo
            .create_session(class.class_id, 1, None, Some("B-201".to_string()), None, &teacher)
            .await
            .unwrap();

        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.start_time.is_some());
        assert_eq!(session.created_by, teacher.user_id);

        let attendees = repo.attendees(session.session_id).await.unwrap();
        assert_eq!(attendees.len(), 5);
        assert!(attendees.iter().all(|a| !a.present));
        assert_partition(&db, session.session_id, &roster).await;
    }

    #[tokio::test]
    async fn test_create_session_authorization() {
        let db = setup_test_db().await;
        let (class, _roster, _teacher) = seed(&db, 2).await;
        let repo = SessionRepository::with_db(db.clone());

        let other_teacher = claims_for(Uuid::new_v4(), UserRole::Teacher);
        let err = repo
            .create_session(class.class_id, 1, None, None, None, &other_teacher)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let student = claims_for(Uuid::new_v4(), UserRole::Student);
        let err = repo
            .create_session(class.class_id, 1, None, None, None, &student)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        // Admins act on any class.
        let admin = claims_for(Uuid::new_v4(), UserRole::Admin);
        assert!(repo
            .create_session(class.class_id, 1, None, None, None, &admin)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_session_validations() {
        let db = setup_test_db().await;
        let (class, _roster, teacher) = seed(&db, 2).await;
        let repo = SessionRepository::with_db(db.clone());

        let err = repo
            .create_session(Uuid::new_v4(), 1, None, None, None, &teacher)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = repo
            .create_session(class.class_id, 0, None, None, None, &teacher)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));

        let err = repo
            .create_session(class.class_id, class.total_sessions + 1, None, None, None, &teacher)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_duplicate_session_number_conflict() {
        let db = setup_test_db().await;
        let (class, _roster, teacher) = seed(&db, 3).await;
        let repo = SessionRepository::with_db(db.clone());

        repo.create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap();
        let err = repo
            .create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_creates_one_winner() {
        let db = setup_test_db().await;
        let (class, _roster, teacher) = seed(&db, 3).await;
        let admin = claims_for(Uuid::new_v4(), UserRole::Admin);

        let repo_a = SessionRepository::with_db(db.clone());
        let repo_b = SessionRepository::with_db(db.clone());

        let (a, b) = tokio::join!(
            repo_a.create_session(class.class_id, 2, None, None, None, &teacher),
            repo_b.create_session(class.class_id, 2, None, None, None, &admin),
        );

        assert!(a.is_ok() ^ b.is_ok(), "exactly one create must win");
        let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(loser, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reconcile_moves_student_between_sides() {
        let db = setup_test_db().await;
        let (class, roster, teacher) = seed(&db, 4).await;
        let repo = SessionRepository::with_db(db.clone());
        let session = repo
            .create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap();

        let student = roster[0];
        repo.reconcile(
            session.session_id,
            student,
            AttendanceStatus::Present,
            CheckType::Manual,
            CheckinMeta::default(),
        )
        .await
        .unwrap();

        let attendees = repo.attendees(session.session_id).await.unwrap();
        let row = attendees.iter().find(|a| a.student_id == student).unwrap();
        assert!(row.present);
        assert_eq!(row.check_type, Some(CheckType::Manual));
        assert!(row.checked_in_at.is_some());
        assert_partition(&db, session.session_id, &roster).await;

        // Back to absent: presence fields are cleared, partition holds.
        repo.reconcile(
            session.session_id,
            student,
            AttendanceStatus::Absent,
            CheckType::Manual,
            CheckinMeta::default(),
        )
        .await
        .unwrap();

        let attendees = repo.attendees(session.session_id).await.unwrap();
        let row = attendees.iter().find(|a| a.student_id == student).unwrap();
        assert!(!row.present);
        assert_eq!(row.check_type, None);
        assert!(row.checked_in_at.is_none());
        assert_partition(&db, session.session_id, &roster).await;
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent_last_write_wins() {
        let db = setup_test_db().await;
        let (class, roster, teacher) = seed(&db, 3).await;
        let repo = SessionRepository::with_db(db.clone());
        let session = repo
            .create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap();
        let student = roster[0];

        repo.reconcile(
            session.session_id,
            student,
            AttendanceStatus::Present,
            CheckType::Auto,
            CheckinMeta {
                recognized_confidence: Some(0.81),
                captured_face_url: None,
                note: None,
            },
        )
        .await
        .unwrap();

        let log = repo
            .reconcile(
                session.session_id,
                student,
                AttendanceStatus::Present,
                CheckType::Auto,
                CheckinMeta {
                    recognized_confidence: Some(0.97),
                    captured_face_url: Some("faces/123.jpg".to_string()),
                    note: None,
                },
            )
            .await
            .unwrap();

        assert!(log.recognized);
        assert_eq!(log.recognized_confidence, Some(0.97));

        // Still exactly one log row and one present entry for the pair.
        let logs = attendance_log::Entity::find()
            .filter(attendance_log::Column::SessionId.eq(session.session_id))
            .filter(attendance_log::Column::StudentId.eq(student))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].recognized_confidence, Some(0.97));
        assert_eq!(logs[0].captured_face_url.as_deref(), Some("faces/123.jpg"));

        let present: Vec<_> = repo
            .attendees(session.session_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|a| a.present)
            .collect();
        assert_eq!(present.len(), 1);
        assert_partition(&db, session.session_id, &roster).await;
    }

    #[tokio::test]
    async fn test_reconcile_rejects_unenrolled_student() {
        let db = setup_test_db().await;
        let (class, roster, teacher) = seed(&db, 3).await;
        let repo = SessionRepository::with_db(db.clone());
        let session = repo
            .create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap();

        let outsider = Uuid::new_v4();
        let err = repo
            .reconcile(
                session.session_id,
                outsider,
                AttendanceStatus::Present,
                CheckType::Manual,
                CheckinMeta::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));

        // No log and no partition change.
        let logs = attendance_log::Entity::find()
            .filter(attendance_log::Column::SessionId.eq(session.session_id))
            .all(&db)
            .await
            .unwrap();
        assert!(logs.is_empty());
        assert_partition(&db, session.session_id, &roster).await;
    }

    #[tokio::test]
    async fn test_reconcile_rejects_inactive_session() {
        let db = setup_test_db().await;
        let (class, roster, teacher) = seed(&db, 3).await;
        let repo = SessionRepository::with_db(db.clone());
        let session = repo
            .create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap();

        for status in [SessionStatus::Pending, SessionStatus::Completed] {
            repo.transition_status(session.session_id, status, &teacher)
                .await
                .unwrap();

            let err = repo
                .reconcile(
                    session.session_id,
                    roster[0],
                    AttendanceStatus::Present,
                    CheckType::Auto,
                    CheckinMeta::default(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::RuleViolation(_)));
        }

        let logs = attendance_log::Entity::find()
            .filter(attendance_log::Column::SessionId.eq(session.session_id))
            .all(&db)
            .await
            .unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_transition_status_permissive_and_authorized() {
        let db = setup_test_db().await;
        let (class, _roster, teacher) = seed(&db, 2).await;
        let repo = SessionRepository::with_db(db.clone());
        let session = repo
            .create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap();

        // Any state is reachable from any state, completed -> pending included.
        let s = repo
            .transition_status(session.session_id, SessionStatus::Completed, &teacher)
            .await
            .unwrap();
        assert_eq!(s.status, SessionStatus::Completed);
        let s = repo
            .transition_status(session.session_id, SessionStatus::Pending, &teacher)
            .await
            .unwrap();
        assert_eq!(s.status, SessionStatus::Pending);
        let s = repo
            .transition_status(session.session_id, SessionStatus::Active, &teacher)
            .await
            .unwrap();
        assert_eq!(s.status, SessionStatus::Active);
        assert!(s.start_time.is_some());

        let stranger = claims_for(Uuid::new_v4(), UserRole::Teacher);
        let err = repo
            .transition_status(session.session_id, SessionStatus::Completed, &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_reconcile_adds_row_for_late_enrollment() {
        let db = setup_test_db().await;
        let (class, mut roster, teacher) = seed(&db, 2).await;
        let repo = SessionRepository::with_db(db.clone());
        let session = repo
            .create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap();

        // Enroll a new student after the session was created.
        let late_student = Uuid::new_v4();
        ClassRepository::with_db(db.clone())
            .enroll_student(class.class_id, late_student)
            .await
            .unwrap();
        roster.push(late_student);

        repo.reconcile(
            session.session_id,
            late_student,
            AttendanceStatus::Present,
            CheckType::Manual,
            CheckinMeta::default(),
        )
        .await
        .unwrap();

        assert_partition(&db, session.session_id, &roster).await;
    }
}
