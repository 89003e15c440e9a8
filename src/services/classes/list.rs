use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassService;
use crate::{
    middlewares::RequireSession,
    models::{
        ApiResponse, ErrorCode, classes::responses::ClassListResponse, users::entities::UserRole,
    },
};

pub async fn list_my_classes(
    service: &ClassService,
    request: &HttpRequest,
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

    let result = match role {
        UserRole::Teacher => storage.list_classes_by_teacher(uid).await,
        UserRole::Student => storage.list_student_classes(uid).await,
    };

    match result {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ClassListResponse { items },
            "Class list retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to list classes of user {}: {}", uid, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to retrieve class list",
                )),
            )
        }
    }
}
