use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::AssignmentService;
use crate::middlewares::RequireClassAccess;
use crate::models::{ApiResponse, ErrorCode, assignments::responses::AssignmentListResponse};

pub async fn list_class_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(access) = RequireClassAccess::extract_access(request) else {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "No permission for this class",
        )));
    };

    let storage = service.get_storage(request);
    match storage.list_assignments_by_class(access.class.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "Assignment list retrieved successfully",
        ))),
        Err(e) => {
            error!(
                "Failed to list assignments of class {}: {}",
                access.class.id, e
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to retrieve assignment list",
                )),
            )
        }
    }
}
