use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeachingClass::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeachingClass::ClassId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TeachingClass::Name).string().not_null())
                    .col(ColumnDef::new(TeachingClass::TeacherId).uuid().not_null())
                    .col(
                        ColumnDef::new(TeachingClass::TotalSessions)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeachingClass::MaxAbsentAllowed)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(TeachingClass::CreateAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(TeachingClass::UpdateAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassEnrollment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ClassEnrollment::ClassId).uuid().not_null())
                    .col(
                        ColumnDef::new(ClassEnrollment::StudentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassEnrollment::EnrolledAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .primary_key(
                        Index::create()
                            .col(ClassEnrollment::ClassId)
                            .col(ClassEnrollment::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_enrollment_class")
                            .from_tbl(ClassEnrollment::Table)
                            .from_col(ClassEnrollment::ClassId)
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
                    .name("idx_class_enrollment_student")
                    .table(ClassEnrollment::Table)
                    .col(ClassEnrollment::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_class_enrollment_student")
                    .table(ClassEnrollment::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ClassEnrollment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TeachingClass::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum TeachingClass {
    Table,
    ClassId,
    Name,
    TeacherId,
    TotalSessions,
    MaxAbsentAllowed,
    CreateAt,
    UpdateAt,
}

#[derive(DeriveIden)]
enum ClassEnrollment {
    Table,
    ClassId,
    StudentId,
    EnrolledAt,
}
