//! Entity for the student_score table.
//!
//! Fully derived from completed sessions' logs; never hand-edited. Every
//! recompute replaces all fields of the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_score")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub class_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: Uuid,
    /// Count of the class's completed sessions at last computation.
    pub total_sessions: i32,
    pub absent_sessions: i32,
    pub attendance_score: f32,
    /// Copied from the class at computation time.
    pub max_absent_allowed: i32,
    pub is_failed_due_to_absent: bool,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teaching_class::Entity",
        from = "Column::ClassId",
        to = "super::teaching_class::Column::ClassId"
    )]
    Class,
}

impl Related<super::teaching_class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
