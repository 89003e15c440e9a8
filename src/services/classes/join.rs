use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::{ClassService, get::normalize_code};
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    class_members::responses::JoinClassResponse,
    classes::{entities::Class, requests::JoinByCodeRequest},
    users::entities::User,
};
use crate::storage::Storage;
use crate::utils::random_code::is_valid_join_code;

pub async fn join_by_code(
    service: &ClassService,
    request: &HttpRequest,
    join_data: JoinByCodeRequest,
) -> ActixResult<HttpResponse> {
    let code = normalize_code(&join_data.code);
    if !is_valid_join_code(&code) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ClassCodeInvalid,
            "Class code must be 6 letters or digits",
        )));
    }

    let storage = service.get_storage(request);
    match storage.get_class_by_code(&code).await {
        Ok(Some(class)) => join_class(&storage, request, class).await,
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => {
            error!("Failed to look up class by code: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ClassJoinFailed,
                    "Failed to join class",
                )),
            )
        }
    }
}

pub async fn join_by_id(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => join_class(&storage, request, class).await,
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ClassNotFound,
            "Class not found",
        ))),
        Err(e) => {
            error!("Failed to look up class {}: {}", class_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ClassJoinFailed,
                    "Failed to join class",
                )),
            )
        }
    }
}

/// 幂等加入：已是成员时返回已有记录
async fn join_class(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    class: Class,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireSession::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user",
        )));
    };

    match storage.get_class_member(class.id, user.id).await {
        Ok(Some(membership)) => return Ok(already_member(class, membership)),
        Ok(None) => {}
        Err(e) => return Ok(join_failed(&user, &class, &e.to_string())),
    }

    match storage.add_class_member(class.id, user.id, &user.name).await {
        Ok(membership) => {
            info!("Student {} joined class {}", user.id, class.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                JoinClassResponse {
                    class,
                    membership,
                    already_member: false,
                },
                "Joined class successfully",
            )))
        }
        // 并发加入时唯一索引冲突，按已加入处理
        Err(e) if e.is_conflict() => match storage.get_class_member(class.id, user.id).await {
            Ok(Some(membership)) => Ok(already_member(class, membership)),
            Ok(None) => Ok(join_failed(&user, &class, "membership vanished after conflict")),
            Err(e) => Ok(join_failed(&user, &class, &e.to_string())),
        },
        Err(e) => Ok(join_failed(&user, &class, &e.to_string())),
    }
}

fn already_member(
    class: Class,
    membership: crate::models::class_members::entities::ClassMember,
) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        JoinClassResponse {
            class,
            membership,
            already_member: true,
        },
        "Already a member of this class",
    ))
}

fn join_failed(user: &User, class: &Class, reason: &str) -> HttpResponse {
    error!(
        "Student {} failed to join class {}: {}",
        user.id, class.id, reason
    );
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::ClassJoinFailed,
        "Failed to join class",
    ))
}
