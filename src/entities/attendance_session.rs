//! Entity for the attendance_session table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SessionStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_session")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: Uuid,
    pub class_id: Uuid,
    /// 1..=total_sessions of the owning class; (class_id, session_number)
    /// carries a unique index.
    pub session_number: i32,
    pub session_date: Option<Date>,
    pub room: Option<String>,
    pub status: SessionStatus,
    pub start_time: Option<DateTimeUtc>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub create_at: DateTimeUtc,
    pub update_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teaching_class::Entity",
        from = "Column::ClassId",
        to = "super::teaching_class::Column::ClassId"
    )]
    Class,
    #[sea_orm(has_many = "super::session_attendee::Entity")]
    Attendees,
    #[sea_orm(has_many = "super::attendance_log::Entity")]
    Logs,
}

impl Related<super::teaching_class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::session_attendee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendees.def()
    }
}

impl Related<super::attendance_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Logs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}
