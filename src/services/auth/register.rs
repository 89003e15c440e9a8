use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::requests::RegisterRequest,
    users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
        responses::UserResponse,
    },
};
use crate::storage::Storage;
use crate::utils::password::{PasswordMatch, check_password, hash_password};
use crate::utils::validate::{non_empty, normalize_email, validate_email, validate_password};

use super::AuthService;

/// 未填写姓名时的占位名
const UNNAMED: &str = "(unnamed)";

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 1. 字段校验
    let role = match register_request.role.parse::<UserRole>() {
        Ok(role) => role,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::InvalidRole,
                "Role must be either student or teacher",
            )));
        }
    };

    let email = normalize_email(&register_request.email);
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::InvalidEmail, msg)));
    }

    if let Err(msg) = validate_password(&register_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PasswordTooShort, msg)));
    }

    let name = register_request.name.as_deref().and_then(non_empty);

    // 2. 邮箱已注册则追加角色，否则创建账户
    match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => {
            attach_role(&storage, user, role, name, &register_request.password).await
        }
        Ok(None) => {
            create_account(&storage, email, name, role, &register_request.password).await
        }
        Err(e) => {
            error!("Failed to look up user by email: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Registration failed",
                )),
            )
        }
    }
}

async fn create_account(
    storage: &Arc<dyn Storage>,
    email: String,
    name: Option<String>,
    role: UserRole,
    password: &str,
) -> ActixResult<HttpResponse> {
    let password_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Registration failed",
                )),
            );
        }
    };

    let create_request = CreateUserRequest {
        name: name.unwrap_or_else(|| UNNAMED.to_string()),
        email,
        password_hash,
        role,
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            info!("User {} registered as {}", user.id, role);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                UserResponse::from(user),
                "Registration successful",
            )))
        }
        // 并发注册同一邮箱
        Err(e) if e.is_conflict() => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::EmailAlreadyRegistered,
            "Email is already registered",
        ))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Registration failed",
                )),
            )
        }
    }
}

async fn attach_role(
    storage: &Arc<dyn Storage>,
    user: User,
    role: UserRole,
    name: Option<String>,
    password: &str,
) -> ActixResult<HttpResponse> {
    // 追加角色必须证明账户所有权
    let matched = check_password(password, &user.password_hash);
    if !matched.is_match() {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::EmailAlreadyRegistered,
            "Email is already registered",
        )));
    }

    if matched == PasswordMatch::Legacy {
        rehash_legacy_password(storage, user.id, password).await;
    }

    let already_had_role = user.has_role(role);
    match storage.add_user_role(user.id, role, name).await {
        Ok(Some(updated)) => {
            if !already_had_role {
                info!("Role {} added to user {}", role, updated.id);
            }
            let message = if already_had_role {
                "Account already has this role"
            } else {
                "Role added to existing account"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(updated), message)))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => {
            error!("Failed to add role to user {}: {}", user.id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Registration failed",
                )),
            )
        }
    }
}

/// 明文密码校验通过后改存哈希，失败只记录日志
pub(super) async fn rehash_legacy_password(storage: &Arc<dyn Storage>, user_id: i64, password: &str) {
    match hash_password(password) {
        Ok(hash) => match storage.update_password_hash(user_id, &hash).await {
            Ok(_) => info!("Migrated legacy password of user {} to Argon2", user_id),
            Err(e) => warn!("Failed to store rehashed password for user {}: {}", user_id, e),
        },
        Err(e) => warn!("Failed to rehash legacy password for user {}: {}", user_id, e),
    }
}
