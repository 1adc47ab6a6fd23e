use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Derived attendance scores, one row per (class, student), fully
        // replaced on every recompute.
        manager
            .create_table(
                Table::create()
                    .table(StudentScore::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StudentScore::ClassId).uuid().not_null())
                    .col(ColumnDef::new(StudentScore::StudentId).uuid().not_null())
                    .col(
                        ColumnDef::new(StudentScore::TotalSessions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StudentScore::AbsentSessions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StudentScore::AttendanceScore)
                            .float()
                            .not_null()
                            .default(10.0),
                    )
                    .col(
                        ColumnDef::new(StudentScore::MaxAbsentAllowed)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(StudentScore::IsFailedDueToAbsent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(StudentScore::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(StudentScore::ClassId)
                            .col(StudentScore::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_score_class")
                            .from_tbl(StudentScore::Table)
                            .from_col(StudentScore::ClassId)
                            .to_tbl(TeachingClass::Table)
                            .to_col(TeachingClass::ClassId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_score_student")
                    .table(StudentScore::Table)
                    .col(StudentScore::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_student_score_student")
                    .table(StudentScore::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(StudentScore::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum StudentScore {
    Table,
    ClassId,
    StudentId,
    TotalSessions,
    AbsentSessions,
    AttendanceScore,
    MaxAbsentAllowed,
    IsFailedDueToAbsent,
    LastUpdated,
}

#[derive(DeriveIden)]
enum TeachingClass {
    Table,
    ClassId,
}
