//! Shared test setup: a fresh in-memory sqlite database per test, schema
//! built from the entities.

use chrono::Utc;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};
use uuid::Uuid;

use crate::config::JWT_EXPIRED_TIME;
use crate::entities::{
    attendance_log, attendance_session, class_enrollment, session_attendee, student_score,
    teaching_class,
};
use crate::extractor::{TokenClaims, UserRole};
use crate::repositories::ClassRepository;

pub async fn setup_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    // One connection keeps every statement on the same in-memory database.
    opts.max_connections(1);

    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory sqlite");

    let schema = Schema::new(DbBackend::Sqlite);
    let statements = [
        schema.create_table_from_entity(teaching_class::Entity),
        schema.create_table_from_entity(class_enrollment::Entity),
        schema.create_table_from_entity(attendance_session::Entity),
        schema.create_table_from_entity(session_attendee::Entity),
        schema.create_table_from_entity(attendance_log::Entity),
        schema.create_table_from_entity(student_score::Entity),
    ];
    for statement in statements {
        db.execute(db.get_database_backend().build(&statement))
            .await
            .expect("Failed to create table");
    }

    // Mirrors the production unique index; duplicate (class, session_number)
    // inserts must lose here too.
    db.execute_unprepared(
        "CREATE UNIQUE INDEX unique_class_session_number \
         ON attendance_session (class_id, session_number)",
    )
    .await
    .expect("Failed to create unique index");

    db
}

pub fn claims_for(user_id: Uuid, role: UserRole) -> TokenClaims {
    TokenClaims {
        user_id,
        role,
        exp: Utc::now().timestamp() + JWT_EXPIRED_TIME,
    }
}

pub fn admin_claims() -> TokenClaims {
    claims_for(Uuid::new_v4(), UserRole::Admin)
}

/// Creates a class taught by a fresh teacher with `students` enrolled
/// students, returning the class and the roster in enrollment order.
pub async fn seed_class(
    db: &DatabaseConnection,
    students: usize,
    total_sessions: i32,
    max_absent_allowed: Option<i32>,
) -> (teaching_class::Model, Vec<Uuid>) {
    let class_repo = ClassRepository::with_db(db.clone());
    let class = class_repo
        .create(
            Uuid::new_v4(),
            "Intro to Databases".to_string(),
            Uuid::new_v4(),
            total_sessions,
            max_absent_allowed,
        )
        .await
        .expect("Failed to seed class");

    let mut roster = Vec::with_capacity(students);
    for _ in 0..students {
        let student_id = Uuid::new_v4();
        class_repo
            .enroll_student(class.class_id, student_id)
            .await
            .expect("Failed to enroll student");
        roster.push(student_id);
    }

    (class, roster)
}

/// Asserts that a session's attendee rows are exactly one per enrolled
/// student, i.e. present and absent sides partition the roster.
pub async fn assert_partition(db: &DatabaseConnection, session_id: Uuid, roster: &[Uuid]) {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    let rows = session_attendee::Entity::find()
        .filter(session_attendee::Column::SessionId.eq(session_id))
        .all(db)
        .await
        .expect("Failed to load attendees");

    assert_eq!(rows.len(), roster.len(), "partition size mismatch");

    let mut seen: Vec<Uuid> = rows.iter().map(|r| r.student_id).collect();
    seen.sort();
    let mut expected: Vec<Uuid> = roster.to_vec();
    expected.sort();
    assert_eq!(seen, expected, "partition membership mismatch");
}
