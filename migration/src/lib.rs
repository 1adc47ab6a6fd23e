pub use sea_orm_migration::prelude::*;

mod m20260110_000001_create_table_teaching_class;
mod m20260112_093015_create_attendance_tables;
mod m20260118_141200_create_table_student_score;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_create_table_teaching_class::Migration),
            Box::new(m20260112_093015_create_attendance_tables::Migration),
            Box::new(m20260118_141200_create_table_student_score::Migration),
        ]
    }
}
