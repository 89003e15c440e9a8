//! 提交存储操作

use super::SeaOrmStorage;
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{PortalError, Result};
use crate::models::submissions::{
    entities::{Submission, SubmissionStatus},
    requests::{NewSubmission, SubmissionReview},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建提交
    pub async fn create_submission_impl(&self, req: NewSubmission) -> Result<Submission> {
        let model = ActiveModel {
            class_id: Set(req.class_id),
            assignment_id: Set(req.assignment_id),
            teacher_id: Set(req.teacher_id),
            student_id: Set(req.student_id),
            file_id: Set(req.file_id),
            note: Set(req.note),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            status: Set(SubmissionStatus::Pending.to_string()),
            grade: Set(None),
            feedback: Set(String::new()),
            reviewed_at: Set(None),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| PortalError::from_db(e, "创建提交失败"))?;

        Ok(result.into_submission())
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, submission_id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 通过文件 ID 获取提交
    pub async fn get_submission_by_file_id_impl(&self, file_id: &str) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::FileId.eq(file_id))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 获取学生对某作业的提交
    pub async fn get_student_submission_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(
                Condition::all()
                    .add(Column::AssignmentId.eq(assignment_id))
                    .add(Column::StudentId.eq(student_id)),
            )
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 列出班级提交（新提交在前）
    pub async fn list_submissions_by_class_impl(
        &self,
        class_id: i64,
        student_id: Option<i64>,
    ) -> Result<Vec<Submission>> {
        let mut condition = Condition::all().add(Column::ClassId.eq(class_id));
        if let Some(student_id) = student_id {
            condition = condition.add(Column::StudentId.eq(student_id));
        }

        let result = Submissions::find()
            .filter(condition)
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 列出学生的全部提交
    pub async fn list_submissions_by_student_impl(&self, student_id: i64) -> Result<Vec<Submission>> {
        let result = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 批改提交
    pub async fn review_submission_impl(
        &self,
        submission_id: i64,
        review: SubmissionReview,
    ) -> Result<Option<Submission>> {
        if self.get_submission_by_id_impl(submission_id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(submission_id),
            status: Set(review.status.to_string()),
            grade: Set(review.grade),
            feedback: Set(review.feedback),
            reviewed_at: Set(Some(chrono::Utc::now().timestamp())),
            ..Default::default()
        };

        model
            .update(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("批改提交失败: {e}")))?;

        self.get_submission_by_id_impl(submission_id).await
    }
}
