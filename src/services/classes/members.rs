use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassService;
use crate::middlewares::RequireClassAccess;
use crate::models::{ApiResponse, ErrorCode, class_members::responses::ClassMemberListResponse};

pub async fn list_members(
    service: &ClassService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(access) = RequireClassAccess::extract_access(request) else {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "No permission for this class",
        )));
    };

    let storage = service.get_storage(request);
    match storage.list_class_members(access.class.id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassMemberListResponse { items },
            "Class members retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list members of class {}: {}", access.class.id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to retrieve class members",
                )),
            )
        }
    }
}
