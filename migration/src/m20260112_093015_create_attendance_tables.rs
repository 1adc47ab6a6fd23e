use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Attendance sessions: one row per (class, session_number)
        manager
            .create_table(
                Table::create()
                    .table(AttendanceSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceSession::SessionId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceSession::ClassId).uuid().not_null())
                    .col(
                        ColumnDef::new(AttendanceSession::SessionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceSession::SessionDate).date().null())
                    .col(ColumnDef::new(AttendanceSession::Room).string().null())
                    .col(
                        ColumnDef::new(AttendanceSession::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(AttendanceSession::StartTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(AttendanceSession::Notes).string().null())
                    .col(
                        ColumnDef::new(AttendanceSession::CreatedBy)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceSession::CreateAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(AttendanceSession::UpdateAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_session_class")
                            .from_tbl(AttendanceSession::Table)
                            .from_col(AttendanceSession::ClassId)
                            .to_tbl(TeachingClass::Table)
                            .to_col(TeachingClass::ClassId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Concurrent creates for the same (class, session_number) must
        // resolve to exactly one winner.
        manager
            .create_index(
                Index::create()
                    .name("unique_class_session_number")
                    .table(AttendanceSession::Table)
                    .col(AttendanceSession::ClassId)
                    .col(AttendanceSession::SessionNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Per-session roster partition: one row per enrolled student,
        // the present flag decides the side.
        manager
            .create_table(
                Table::create()
                    .table(SessionAttendee::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SessionAttendee::SessionId).uuid().not_null())
                    .col(ColumnDef::new(SessionAttendee::StudentId).uuid().not_null())
                    .col(
                        ColumnDef::new(SessionAttendee::Present)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(SessionAttendee::CheckedInAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(SessionAttendee::CheckType).text().null())
                    .primary_key(
                        Index::create()
                            .col(SessionAttendee::SessionId)
                            .col(SessionAttendee::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_attendee_session")
                            .from_tbl(SessionAttendee::Table)
                            .from_col(SessionAttendee::SessionId)
                            .to_tbl(AttendanceSession::Table)
                            .to_col(AttendanceSession::SessionId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Check-in logs: at most one row per (session, student), overwritten
        // on repeat check-in.
        manager
            .create_table(
                Table::create()
                    .table(AttendanceLog::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AttendanceLog::SessionId).uuid().not_null())
                    .col(ColumnDef::new(AttendanceLog::StudentId).uuid().not_null())
                    .col(ColumnDef::new(AttendanceLog::Status).text().not_null())
                    .col(
                        ColumnDef::new(AttendanceLog::Recognized)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AttendanceLog::RecognizedConfidence)
                            .float()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceLog::CapturedFaceUrl)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(AttendanceLog::Note).string().null())
                    .col(
                        ColumnDef::new(AttendanceLog::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AttendanceLog::SessionId)
                            .col(AttendanceLog::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_log_session")
                            .from_tbl(AttendanceLog::Table)
                            .from_col(AttendanceLog::SessionId)
                            .to_tbl(AttendanceSession::Table)
                            .to_col(AttendanceSession::SessionId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_log_student")
                    .table(AttendanceLog::Table)
                    .col(AttendanceLog::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_attendance_log_student")
                    .table(AttendanceLog::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(AttendanceLog::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SessionAttendee::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("unique_class_session_number")
                    .table(AttendanceSession::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(AttendanceSession::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AttendanceSession {
    Table,
    SessionId,
    ClassId,
    SessionNumber,
    SessionDate,
    Room,
    Status,
    StartTime,
    Notes,
    CreatedBy,
    CreateAt,
    UpdateAt,
}

#[derive(DeriveIden)]
enum SessionAttendee {
    Table,
    SessionId,
    StudentId,
    Present,
    CheckedInAt,
    CheckType,
}

#[derive(DeriveIden)]
enum AttendanceLog {
    Table,
    SessionId,
    StudentId,
    Status,
    Recognized,
    RecognizedConfidence,
    CapturedFaceUrl,
    Note,
    RecordedAt,
}

#[derive(DeriveIden)]
enum TeachingClass {
    Table,
    ClassId,
}
