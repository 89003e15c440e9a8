use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, error, info};

use super::ClassService;
use crate::errors::Result;
use crate::middlewares::RequireSession;
use crate::models::classes::entities::Class;
use crate::models::classes::requests::{CreateClassRequest, NewClass};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::random_code::generate_join_code;
use crate::utils::validate::non_empty;

/// 加入码冲突时的最大尝试次数
const MAX_CODE_ATTEMPTS: usize = 10;
const MAX_CLASS_NAME_LEN: usize = 100;

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
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

    let name = class_data.name.trim().to_string();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Class name is required",
        )));
    }
    if name.chars().count() > MAX_CLASS_NAME_LEN {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Class name must be at most {MAX_CLASS_NAME_LEN} characters"),
        )));
    }
    let description = class_data.description.as_deref().and_then(non_empty);

    match allocate_class(&storage, uid, name, description, generate_join_code).await {
        Ok(Some(class)) => {
            info!("Class {} ({}) created by {}", class.id, class.code, uid);
            Ok(HttpResponse::Created().json(ApiResponse::success(class, "Class created successfully")))
        }
        Ok(None) => {
            error!(
                "Failed to allocate a unique class code after {} attempts",
                MAX_CODE_ATTEMPTS
            );
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ClassCreationFailed,
                    "Could not allocate a unique class code, please try again",
                )),
            )
        }
        Err(e) => {
            error!("Class creation failed: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ClassCreationFailed,
                    "Class creation failed",
                )),
            )
        }
    }
}

/// 生成加入码并插入班级，码已被占用（预检或唯一索引冲突）时换一个重试。
/// 全部尝试都冲突时返回 `Ok(None)`。
async fn allocate_class(
    storage: &Arc<dyn Storage>,
    teacher_id: i64,
    name: String,
    description: Option<String>,
    mut next_code: impl FnMut() -> String,
) -> Result<Option<Class>> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = next_code();

        if storage.get_class_by_code(&code).await?.is_some() {
            debug!("Class code {} already taken (attempt {})", code, attempt);
            continue;
        }

        let new_class = NewClass {
            teacher_id,
            name: name.clone(),
            description: description.clone(),
            join_code: code.clone(),
        };
        match storage.create_class(new_class).await {
            Ok(class) => return Ok(Some(class)),
            Err(e) if e.is_conflict() => {
                debug!("Class code {} taken concurrently (attempt {})", code, attempt);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;

    #[actix_web::test]
    async fn test_allocate_retries_on_collision() {
        let ctx = TestContext::new().await;
        let teacher = ctx.seed_user("t@example.com", "Teacher T", "teacher").await;

        let first = allocate_class(&ctx.storage, teacher, "A".into(), None, || "AAAAAA".into())
            .await
            .expect("allocation should succeed")
            .expect("first code should be free");
        assert_eq!(first.code, "AAAAAA");

        let mut codes = vec!["BBBBBB", "AAAAAA"];
        let second = allocate_class(&ctx.storage, teacher, "B".into(), None, || {
            codes.pop().unwrap_or("CCCCCC").to_string()
        })
        .await
        .expect("allocation should succeed")
        .expect("second code should be free");
        assert_eq!(second.code, "BBBBBB");
    }

    #[actix_web::test]
    async fn test_allocate_gives_up_after_max_attempts() {
        let ctx = TestContext::new().await;
        let teacher = ctx.seed_user("t@example.com", "Teacher T", "teacher").await;
        allocate_class(&ctx.storage, teacher, "A".into(), None, || "ZZZZZZ".into())
            .await
            .expect("allocation should succeed");

        let mut calls = 0;
        let result = allocate_class(&ctx.storage, teacher, "B".into(), None, || {
            calls += 1;
            "ZZZZZZ".into()
        })
        .await
        .expect("allocation should not error");
        assert!(result.is_none());
        assert_eq!(calls, MAX_CODE_ATTEMPTS);
    }
}
