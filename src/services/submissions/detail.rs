use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{SubmissionService, with_details};
use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode, users::entities::UserRole};

pub async fn get_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
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

    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "Submission not found",
            )));
        }
        Err(e) => {
            error!("Failed to load submission {}: {}", submission_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to retrieve submission",
                )),
            );
        }
    };

    let allowed = match role {
        UserRole::Student => submission.student_id == uid,
        UserRole::Teacher => submission.teacher_id == uid,
    };
    if !allowed {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "No permission for this submission",
        )));
    }

    match with_details(&storage, vec![submission]).await {
        Ok(mut items) if !items.is_empty() => Ok(HttpResponse::Ok().json(ApiResponse::success(
            items.remove(0),
            "Submission retrieved successfully",
        ))),
        Ok(_) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        ))),
        Err(e) => {
            error!("Failed to load submission details {}: {}", submission_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to retrieve submission",
                )),
            )
        }
    }
}
