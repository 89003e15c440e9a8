use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{requests::LoginRequest, responses::LoginResponse},
    users::{entities::UserRole, responses::UserResponse},
};
use crate::utils::password::{PasswordMatch, check_password};
use crate::utils::validate::{normalize_email, validate_email, validate_password};

use super::{AuthService, register::rehash_legacy_password};

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let sessions = service.get_sessions(request);

    // 1. 字段校验
    let role = match login_request.role.parse::<UserRole>() {
        Ok(role) => role,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::InvalidRole,
                "Role must be either student or teacher",
            )));
        }
    };

    let email = normalize_email(&login_request.email);
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::InvalidEmail, msg)));
    }
    if let Err(msg) = validate_password(&login_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PasswordTooShort, msg)));
    }

    // 2. 查找用户并校验密码
    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::AuthFailed,
                "Email or password is incorrect",
            )));
        }
        Err(e) => {
            error!("Failed to look up user by email: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed",
                )),
            );
        }
    };

    match check_password(&login_request.password, &user.password_hash) {
        PasswordMatch::Mismatch => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::AuthFailed,
                "Email or password is incorrect",
            )));
        }
        PasswordMatch::Legacy => {
            rehash_legacy_password(&storage, user.id, &login_request.password).await;
        }
        PasswordMatch::Hashed => {}
    }

    // 3. 账户必须拥有所选角色
    if !user.has_role(role) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::RoleNotGranted,
            format!("This account is not registered as a {role}"),
        )));
    }

    // 4. 创建会话
    let session = sessions.create(user.id, role);
    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login of user {}: {}", user.id, e);
    }

    info!("User {} logged in as {}", user.id, role);

    let response = LoginResponse {
        token: session.token,
        expires_in: sessions.ttl_secs(),
        selected_role: role,
        user: UserResponse::from(user),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful")))
}
