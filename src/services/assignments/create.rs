use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::AssignmentService;
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::requests::{CreateAssignmentRequest, NewAssignment},
};
use crate::utils::validate::non_empty;

/// 解析截止时间，空串视为未设置
fn parse_due(raw: Option<&str>) -> Result<Option<i64>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc).timestamp()))
            .map_err(|_| format!("Invalid due date '{s}', expected RFC 3339")),
    }
}

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_data: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let uid = match RequireSession::extract_user_id(request) {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                "Unauthorized: missing user id",
            )));
        }
    };

    // 1. 班级存在且属于当前教师
    let class = match storage.get_class_by_id(assignment_data.class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "Class not found",
            )));
        }
        Err(e) => {
            error!("Failed to load class {}: {}", assignment_data.class_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::AssignmentCreationFailed,
                    "Assignment creation failed",
                )),
            );
        }
    };

    if class.teacher_id != uid {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "You can only create assignments in your own classes",
        )));
    }

    // 2. 字段校验
    let (Some(course), Some(title)) = (
        non_empty(&assignment_data.course),
        non_empty(&assignment_data.title),
    ) else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Course and title are required",
        )));
    };

    let due_at = match parse_due(assignment_data.due.as_deref()) {
        Ok(due_at) => due_at,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::InvalidDueDate, msg)));
        }
    };

    let new_assignment = NewAssignment {
        class_id: class.id,
        teacher_id: uid,
        course,
        title,
        description: assignment_data.description.as_deref().and_then(non_empty),
        due_at,
    };

    match storage.create_assignment(new_assignment).await {
        Ok(assignment) => {
            info!(
                "Assignment {} created in class {} by {}",
                assignment.id, class.id, uid
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                assignment,
                "Assignment created successfully",
            )))
        }
        Err(e) => {
            error!("Assignment creation failed: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::AssignmentCreationFailed,
                    "Assignment creation failed",
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due() {
        assert_eq!(parse_due(None), Ok(None));
        assert_eq!(parse_due(Some("  ")), Ok(None));
        assert_eq!(
            parse_due(Some("2025-09-01T12:00:00Z")),
            Ok(Some(1_756_728_000))
        );
        assert_eq!(
            parse_due(Some("2025-09-01T14:00:00+02:00")),
            Ok(Some(1_756_728_000))
        );
        assert!(parse_due(Some("next friday")).is_err());
        assert!(parse_due(Some("2025-09-01")).is_err());
    }
}
