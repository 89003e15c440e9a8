use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{SubmissionService, with_details};
use crate::errors::Result;
use crate::middlewares::{RequireClassAccess, RequireSession};
use crate::models::{
    ApiResponse, ErrorCode,
    submissions::responses::{SubmissionListItem, SubmissionListResponse},
};

fn list_response(result: Result<Vec<SubmissionListItem>>) -> HttpResponse {
    match result {
        Ok(items) => HttpResponse::Ok().json(ApiResponse::success(
            SubmissionListResponse { items },
            "Submissions retrieved successfully",
        )),
        Err(e) => {
            error!("Failed to list submissions: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "Failed to retrieve submissions",
            ))
        }
    }
}

pub async fn list_my_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(uid) = RequireSession::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user id",
        )));
    };

    let storage = service.get_storage(request);
    let result = match storage.list_submissions_by_student(uid).await {
        Ok(submissions) => with_details(&storage, submissions).await,
        Err(e) => Err(e),
    };
    Ok(list_response(result))
}

pub async fn list_class_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (Some(access), Some(uid)) = (
        RequireClassAccess::extract_access(request),
        RequireSession::extract_user_id(request),
    ) else {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "No permission for this class",
        )));
    };

    // 班级教师看到全部提交，学生只看到自己的
    let student_filter = if access.is_owner { None } else { Some(uid) };

    let storage = service.get_storage(request);
    let result = match storage
        .list_submissions_by_class(access.class.id, student_filter)
        .await
    {
        Ok(submissions) => with_details(&storage, submissions).await,
        Err(e) => Err(e),
    };
    Ok(list_response(result))
}
