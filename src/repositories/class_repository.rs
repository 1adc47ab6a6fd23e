use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::config::DEFAULT_MAX_ABSENT_ALLOWED;
use crate::entities::{class_enrollment, teaching_class};
use crate::error::{ApiError, ApiResult};
use crate::static_service::DATABASE_CONNECTION;

pub struct ClassRepository {
    db: DatabaseConnection,
}

impl ClassRepository {
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

    pub async fn find_by_id(&self, class_id: Uuid) -> ApiResult<Option<teaching_class::Model>> {
        let class = teaching_class::Entity::find_by_id(class_id)
            .one(&self.db)
            .await?;
        Ok(class)
    }

    /// Like `find_by_id` but missing classes are an error.
    pub async fn get(&self, class_id: Uuid) -> ApiResult<teaching_class::Model> {
        self.find_by_id(class_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Teaching class {} not found", class_id)))
    }

    pub async fn create(
        &self,
        class_id: Uuid,
        name: String,
        teacher_id: Uuid,
        total_sessions: i32,
        max_absent_allowed: Option<i32>,
    ) -> ApiResult<teaching_class::Model> {
        if total_sessions < 1 {
            return Err(ApiError::InvalidArgument(
                "total_sessions must be at least 1".to_string(),
            ));
        }

        let now = Utc::now();
        let class = teaching_class::ActiveModel {
            class_id: Set(class_id),
            name: Set(name),
            teacher_id: Set(teacher_id),
            total_sessions: Set(total_sessions),
            max_absent_allowed: Set(max_absent_allowed.unwrap_or(DEFAULT_MAX_ABSENT_ALLOWED)),
            create_at: Set(now),
            update_at: Set(now),
        };

        let result = class.insert(&self.db).await?;
        Ok(result)
    }

    pub async fn enroll_student(
        &self,
        class_id: Uuid,
        student_id: Uuid,
    ) -> ApiResult<class_enrollment::Model> {
        self.get(class_id).await?;

        let existing = class_enrollment::Entity::find_by_id((class_id, student_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ApiError::Conflict(format!(
                "Student {} is already enrolled in class {}",
                student_id, class_id
            )));
        }

        let enrollment = class_enrollment::ActiveModel {
            class_id: Set(class_id),
            student_id: Set(student_id),
            enrolled_at: Set(Utc::now()),
        };

        let result = enrollment.insert(&self.db).await?;
        Ok(result)
    }

    pub async fn enrolled_student_ids(&self, class_id: Uuid) -> ApiResult<Vec<Uuid>> {
        let rows = class_enrollment::Entity::find()
            .filter(class_enrollment::Column::ClassId.eq(class_id))
            .order_by_asc(class_enrollment::Column::EnrolledAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.student_id).collect())
    }

    pub async fn is_enrolled(&self, class_id: Uuid, student_id: Uuid) -> ApiResult<bool> {
        let row = class_enrollment::Entity::find_by_id((class_id, student_id))
            .one(&self.db)
            .await?;
        Ok(row.is_some())
    }
}
