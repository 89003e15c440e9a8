//! 班级成员存储操作

use super::SeaOrmStorage;
use crate::entity::class_members::{ActiveModel, Column, Entity as ClassMembers};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::errors::{PortalError, Result};
use crate::models::{class_members::entities::ClassMember, classes::entities::Class};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 加入班级
    pub async fn add_class_member_impl(
        &self,
        class_id: i64,
        student_id: i64,
        student_name: &str,
    ) -> Result<ClassMember> {
        let model = ActiveModel {
            class_id: Set(class_id),
            student_id: Set(student_id),
            student_name: Set(student_name.to_string()),
            joined_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::from_db(e, "加入班级失败"))?;

        Ok(result.into_class_member())
    }

    /// 获取学生在班级中的成员记录
    pub async fn get_class_member_impl(
        &self,
        class_id: i64,
        student_id: i64,
    ) -> Result<Option<ClassMember>> {
        let result = ClassMembers::find()
            .filter(
                Condition::all()
                    .add(Column::ClassId.eq(class_id))
                    .add(Column::StudentId.eq(student_id)),
            )
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(result.map(|m| m.into_class_member()))
    }

    /// 列出班级成员（按加入时间）
    pub async fn list_class_members_impl(&self, class_id: i64) -> Result<Vec<ClassMember>> {
        let result = ClassMembers::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::JoinedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级成员列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_class_member()).collect())
    }

    /// 列出学生加入的班级
    pub async fn list_student_classes_impl(&self, student_id: i64) -> Result<Vec<Class>> {
        let class_ids: Vec<i64> = ClassMembers::find()
            .filter(Column::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询学生班级失败: {e}")))?
            .into_iter()
            .map(|m| m.class_id)
            .collect();

        if class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let classes = Classes::find()
            .filter(ClassColumn::Id.is_in(class_ids))
            .order_by_desc(ClassColumn::CreatedAt)
            .order_by_desc(ClassColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok(classes.into_iter().map(|m| m.into_class()).collect())
    }
}
