//! Scoring engine: recomputes per-(student, class) attendance scores from
//! completed sessions' logs. Full replace, idempotent.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::config::{ABSENCE_PENALTY_POINTS, MAX_ATTENDANCE_SCORE};
use crate::entities::sea_orm_active_enums::SessionStatus;
use crate::entities::{attendance_session, student_score};
use crate::error::ApiResult;
use crate::repositories::{ClassRepository, LogRepository};
use crate::static_service::DATABASE_CONNECTION;
use crate::utils::keyed_lock::CLASS_LOCKS;

pub struct ScoreRepository {
    db: DatabaseConnection,
}

impl ScoreRepository {
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

    /// Recomputes scores for every enrolled student of the class from all
    /// of its completed sessions. Only explicit `absent` logs count toward
    /// the absence total; a linear penalty of 2 points per absence is
    /// clamped at zero.
    pub async fn recompute_class(&self, class_id: Uuid) -> ApiResult<Vec<student_score::Model>> {
        // Completion-triggered and manual recomputes for one class must not
        // interleave.
        let _guard = CLASS_LOCKS.acquire(class_id).await;

        let class_repo = ClassRepository::with_db(self.db.clone());
        let class = class_repo.get(class_id).await?;
        let roster = class_repo.enrolled_student_ids(class_id).await?;

        let completed_ids: Vec<Uuid> = attendance_session::Entity::find()
            .filter(attendance_session::Column::ClassId.eq(class_id))
            .filter(attendance_session::Column::Status.eq(SessionStatus::Completed))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        let total_sessions = completed_ids.len() as i32;

        let absent_counts = LogRepository::with_db(self.db.clone())
            .absent_counts(&completed_ids)
            .await?;

        let now = Utc::now();
        let mut scores = Vec::with_capacity(roster.len());

        for student_id in roster {
            let absent_sessions = absent_counts.get(&student_id).copied().unwrap_or(0) as i32;
            let attendance_score =
                (MAX_ATTENDANCE_SCORE - ABSENCE_PENALTY_POINTS * absent_sessions as f32).max(0.0);
            let is_failed = absent_sessions > class.max_absent_allowed;

            let existing = student_score::Entity::find_by_id((class_id, student_id))
                .one(&self.db)
                .await?;

            let stored = match existing {
                Some(model) => {
                    let mut active: student_score::ActiveModel = model.into();
                    active.total_sessions = Set(total_sessions);
                    active.absent_sessions = Set(absent_sessions);
                    active.attendance_score = Set(attendance_score);
                    active.max_absent_allowed = Set(class.max_absent_allowed);
                    active.is_failed_due_to_absent = Set(is_failed);
                    active.last_updated = Set(now);
                    active.update(&self.db).await?
                }
                None => {
                    let active = student_score::ActiveModel {
                        class_id: Set(class_id),
                        student_id: Set(student_id),
                        total_sessions: Set(total_sessions),
                        absent_sessions: Set(absent_sessions),
                        attendance_score: Set(attendance_score),
                        max_absent_allowed: Set(class.max_absent_allowed),
                        is_failed_due_to_absent: Set(is_failed),
                        last_updated: Set(now),
                    };
                    active.insert(&self.db).await?
                }
            };
            scores.push(stored);
        }

        tracing::info!(
            "Recomputed {} attendance scores for class {} over {} completed sessions",
            scores.len(),
            class_id,
            total_sessions
        );
        Ok(scores)
    }

    pub async fn scores_for_student(&self, student_id: Uuid) -> ApiResult<Vec<student_score::Model>> {
        let scores = student_score::Entity::find()
            .filter(student_score::Column::StudentId.eq(student_id))
            .order_by_asc(student_score::Column::ClassId)
            .all(&self.db)
            .await?;
        Ok(scores)
    }

    /// Scores of a student restricted to classes taught by `teacher_id`.
    pub async fn scores_for_student_owned_by(
        &self,
        student_id: Uuid,
        teacher_id: Uuid,
    ) -> ApiResult<Vec<student_score::Model>> {
        use crate::entities::teaching_class;

        let scores = self.scores_for_student(student_id).await?;
        let class_ids: Vec<Uuid> = scores.iter().map(|s| s.class_id).collect();
        if class_ids.is_empty() {
            return Ok(scores);
        }

        let owned: Vec<Uuid> = teaching_class::Entity::find()
            .filter(teaching_class::Column::ClassId.is_in(class_ids))
            .filter(teaching_class::Column::TeacherId.eq(teacher_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| c.class_id)
            .collect();

        Ok(scores
            .into_iter()
            .filter(|s| owned.contains(&s.class_id))
            .collect())
    }

    pub async fn scores_for_class(&self, class_id: Uuid) -> ApiResult<Vec<student_score::Model>> {
        let scores = student_score::Entity::find()
            .filter(student_score::Column::ClassId.eq(class_id))
            .order_by_asc(student_score::Column::StudentId)
            .all(&self.db)
            .await?;
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::{AttendanceStatus, CheckType};
    use crate::entities::teaching_class;
    use crate::error::ApiError;
    use crate::extractor::{TokenClaims, UserRole};
    use crate::repositories::{CheckinMeta, SessionRepository};
    use crate::test_utils::{claims_for, seed_class, setup_test_db};
    use sea_orm::DatabaseConnection;

    /// Runs one full session: create #number, log `absentees` as absent, complete.
    async fn run_session(
        db: &DatabaseConnection,
        class: &teaching_class::Model,
        teacher: &TokenClaims,
        number: i32,
        absentees: &[Uuid],
    ) {
        let repo = SessionRepository::with_db(db.clone());
        let session = repo
            .create_session(class.class_id, number, None, None, None, teacher)
            .await
            .unwrap();
        for student in absentees {
            repo.reconcile(
                session.session_id,
                *student,
                AttendanceStatus::Absent,
                CheckType::Manual,
                CheckinMeta::default(),
            )
            .await
            .unwrap();
        }
        repo.transition_status(session.session_id, SessionStatus::Completed, teacher)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_scenario_one_absence() {
        let db = setup_test_db().await;
        let (class, roster) = seed_class(&db, 5, 10, Some(3)).await;
        let teacher = claims_for(class.teacher_id, UserRole::Teacher);
        let s1 = roster[0];

        run_session(&db, &class, &teacher, 1, &[s1]).await;

        let scores = ScoreRepository::with_db(db.clone())
            .recompute_class(class.class_id)
            .await
            .unwrap();
        assert_eq!(scores.len(), 5);

        let score = scores.iter().find(|s| s.student_id == s1).unwrap();
        assert_eq!(score.total_sessions, 1);
        assert_eq!(score.absent_sessions, 1);
        assert_eq!(score.attendance_score, 8.0);
        assert_eq!(score.max_absent_allowed, 3);
        assert!(!score.is_failed_due_to_absent);

        // Students who never got a log are not counted absent.
        let clean = scores.iter().find(|s| s.student_id == roster[1]).unwrap();
        assert_eq!(clean.absent_sessions, 0);
        assert_eq!(clean.attendance_score, 10.0);
    }

    #[tokio::test]
    async fn test_scenario_four_absences_fails() {
        let db = setup_test_db().await;
        let (class, roster) = seed_class(&db, 5, 10, Some(3)).await;
        let teacher = claims_for(class.teacher_id, UserRole::Teacher);
        let s1 = roster[0];

        for number in 1..=4 {
            run_session(&db, &class, &teacher, number, &[s1]).await;
        }

        let scores = ScoreRepository::with_db(db.clone())
            .recompute_class(class.class_id)
            .await
            .unwrap();
        let score = scores.iter().find(|s| s.student_id == s1).unwrap();
        assert_eq!(score.total_sessions, 4);
        assert_eq!(score.absent_sessions, 4);
        assert_eq!(score.attendance_score, 2.0);
        assert!(score.is_failed_due_to_absent);
    }

    #[tokio::test]
    async fn test_score_clamped_at_zero_and_monotonic() {
        let db = setup_test_db().await;
        let (class, roster) = seed_class(&db, 2, 10, Some(3)).await;
        let teacher = claims_for(class.teacher_id, UserRole::Teacher);
        let s1 = roster[0];
        let repo = ScoreRepository::with_db(db.clone());

        let mut previous = f32::MAX;
        for number in 1..=7 {
            run_session(&db, &class, &teacher, number, &[s1]).await;
            let scores = repo.recompute_class(class.class_id).await.unwrap();
            let score = scores.iter().find(|s| s.student_id == s1).unwrap();
            assert!(
                score.attendance_score <= previous,
                "score must never increase with more absences"
            );
            assert!(score.attendance_score >= 0.0);
            previous = score.attendance_score;
        }

        // 7 absences: 10 - 14 clamps to zero.
        assert_eq!(previous, 0.0);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let db = setup_test_db().await;
        let (class, roster) = seed_class(&db, 3, 10, None).await;
        let teacher = claims_for(class.teacher_id, UserRole::Teacher);
        run_session(&db, &class, &teacher, 1, &[roster[0], roster[2]]).await;

        let repo = ScoreRepository::with_db(db.clone());
        let first = repo.recompute_class(class.class_id).await.unwrap();
        let second = repo.recompute_class(class.class_id).await.unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.class_id, b.class_id);
            assert_eq!(a.student_id, b.student_id);
            assert_eq!(a.total_sessions, b.total_sessions);
            assert_eq!(a.absent_sessions, b.absent_sessions);
            assert_eq!(a.attendance_score, b.attendance_score);
            assert_eq!(a.max_absent_allowed, b.max_absent_allowed);
            assert_eq!(a.is_failed_due_to_absent, b.is_failed_due_to_absent);
        }
    }

    #[tokio::test]
    async fn test_recompute_missing_class_touches_nothing() {
        let db = setup_test_db().await;
        let repo = ScoreRepository::with_db(db.clone());

        let err = repo.recompute_class(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let rows = student_score::Entity::find().all(&db).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_only_completed_sessions_count() {
        let db = setup_test_db().await;
        let (class, roster) = seed_class(&db, 2, 10, None).await;
        let teacher = claims_for(class.teacher_id, UserRole::Teacher);
        let s1 = roster[0];

        // Session 1 completes with an absence; session 2 stays active with one.
        run_session(&db, &class, &teacher, 1, &[s1]).await;
        let session_repo = SessionRepository::with_db(db.clone());
        let open = session_repo
            .create_session(class.class_id, 2, None, None, None, &teacher)
            .await
            .unwrap();
        session_repo
            .reconcile(
                open.session_id,
                s1,
                AttendanceStatus::Absent,
                CheckType::Manual,
                CheckinMeta::default(),
            )
            .await
            .unwrap();

        let scores = ScoreRepository::with_db(db.clone())
            .recompute_class(class.class_id)
            .await
            .unwrap();
        let score = scores.iter().find(|s| s.student_id == s1).unwrap();
        assert_eq!(score.total_sessions, 1);
        assert_eq!(score.absent_sessions, 1);
        assert_eq!(score.attendance_score, 8.0);
    }

    #[tokio::test]
    async fn test_late_does_not_count_as_absent() {
        let db = setup_test_db().await;
        let (class, roster) = seed_class(&db, 2, 10, None).await;
        let teacher = claims_for(class.teacher_id, UserRole::Teacher);
        let s1 = roster[0];

        let session_repo = SessionRepository::with_db(db.clone());
        let session = session_repo
            .create_session(class.class_id, 1, None, None, None, &teacher)
            .await
            .unwrap();
        session_repo
            .reconcile(
                session.session_id,
                s1,
                AttendanceStatus::Late,
                CheckType::Manual,
                CheckinMeta {
                    note: Some("arrived 15 minutes in".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        session_repo
            .transition_status(session.session_id, SessionStatus::Completed, &teacher)
            .await
            .unwrap();

        let scores = ScoreRepository::with_db(db.clone())
            .recompute_class(class.class_id)
            .await
            .unwrap();
        let score = scores.iter().find(|s| s.student_id == s1).unwrap();
        assert_eq!(score.absent_sessions, 0);
        assert_eq!(score.attendance_score, 10.0);
    }
}
