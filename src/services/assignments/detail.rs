use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::AssignmentService;
use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode, users::entities::UserRole};

pub async fn get_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (Some(uid), Some(role)) = (
        RequireSession::extract_user_id(request),
        RequireSession::extract_active_role(request),
    ) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing session",
        )));
    };

    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            )));
        }
        Err(e) => {
            error!("Failed to load assignment {}: {}", assignment_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to retrieve assignment",
                )),
            );
        }
    };

    // 班级教师或已加入班级的学生可见
    let allowed = match role {
        UserRole::Teacher => assignment.teacher_id == uid,
        UserRole::Student => match storage.get_class_member(assignment.class_id, uid).await {
            Ok(member) => member.is_some(),
            Err(e) => {
                error!(
                    "Failed to check membership of class {}: {}",
                    assignment.class_id, e
                );
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        "Failed to retrieve assignment",
                    )),
                );
            }
        },
    };

    if !allowed {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotClassMember,
            "No permission for this assignment",
        )));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        assignment,
        "Assignment retrieved successfully",
    )))
}
