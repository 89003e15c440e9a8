//! 验证码找回密码
//!
//! forgot → verify → reset 三步。forgot 对任何邮箱都返回相同响应，
//! verify 对不存在的账户与错误验证码返回相同错误，避免泄露账户是否存在。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{
        requests::{ForgotPasswordRequest, ResetPasswordRequest, VerifyResetCodeRequest},
        responses::VerifyResetCodeResponse,
    },
};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::random_code::{generate_numeric_code, generate_token};
use crate::utils::validate::{normalize_email, validate_password};

use super::AuthService;

/// 验证码位数
const RESET_CODE_LEN: usize = 6;
/// 重置令牌长度
const RESET_TOKEN_LEN: usize = 48;

const FORGOT_MESSAGE: &str = "If the email is registered, a verification code has been sent";
const INVALID_CODE_MESSAGE: &str = "Invalid or expired verification code";

fn invalid_code() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::ResetCodeInvalid,
        INVALID_CODE_MESSAGE,
    ))
}

fn invalid_token() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::ResetTokenInvalid,
        "Invalid or expired reset token",
    ))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        "Password reset failed",
    ))
}

pub async fn handle_forgot_password(
    service: &AuthService,
    forgot_request: ForgotPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = normalize_email(&forgot_request.email);
    if email.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidEmail,
            "Email is required",
        )));
    }

    let storage = service.get_storage(request);
    let config = service.get_config();

    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("Password reset requested for unknown email");
            return Ok(HttpResponse::Ok().json(ApiResponse::success_empty(FORGOT_MESSAGE)));
        }
        Err(e) => {
            error!("Failed to look up user for password reset: {}", e);
            return Ok(HttpResponse::Ok().json(ApiResponse::success_empty(FORGOT_MESSAGE)));
        }
    };

    let code = generate_numeric_code(RESET_CODE_LEN);
    let code_hash = match hash_password(&code) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash reset code: {}", e);
            return Ok(internal_error());
        }
    };

    let expires_at = (Utc::now() + Duration::seconds(config.password_reset.code_ttl)).timestamp();
    match storage.set_reset_code(user.id, &code_hash, expires_at).await {
        Ok(true) => {}
        Ok(false) => {
            warn!("User {} disappeared while issuing reset code", user.id);
            return Ok(HttpResponse::Ok().json(ApiResponse::success_empty(FORGOT_MESSAGE)));
        }
        Err(e) => {
            error!("Failed to store reset code for user {}: {}", user.id, e);
            return Ok(internal_error());
        }
    }

    let ttl_minutes = (config.password_reset.code_ttl + 59) / 60;
    let mailer = service.get_mailer(request);
    match mailer
        .send_reset_code(&user.email, &user.name, &code, ttl_minutes)
        .await
    {
        Ok(()) => info!("Password reset code issued for user {}", user.id),
        Err(e) => warn!("Failed to send reset code to user {}: {}", user.id, e),
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty(FORGOT_MESSAGE)))
}

pub async fn handle_verify_reset_code(
    service: &AuthService,
    verify_request: VerifyResetCodeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();
    let email = normalize_email(&verify_request.email);
    let code = verify_request.code.trim();

    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(invalid_code()),
        Err(e) => {
            // 与不存在的账户返回相同结果
            error!("Failed to look up user for code verification: {}", e);
            return Ok(invalid_code());
        }
    };

    // 1. 必须存在未过期的验证码
    let now = Utc::now();
    let (Some(code_hash), Some(expires_at)) = (
        user.reset.code_hash.as_deref(),
        user.reset.code_expires_at,
    ) else {
        return Ok(invalid_code());
    };
    if now >= expires_at {
        return Ok(invalid_code());
    }

    // 2. 次数用尽后不再比较验证码
    let tries = user.reset.code_tries;
    if tries >= config.password_reset.max_attempts {
        return Ok(HttpResponse::TooManyRequests().json(ApiResponse::error_empty(
            ErrorCode::ResetTooManyAttempts,
            "Too many attempts, please request a new code",
        )));
    }

    // 3. 先记一次尝试再比较，并发请求只有一个能拿到这次机会
    match storage.consume_reset_attempt(user.id, tries).await {
        Ok(true) => {}
        Ok(false) => return Ok(invalid_code()),
        Err(e) => {
            error!("Failed to record reset attempt for user {}: {}", user.id, e);
            return Ok(internal_error());
        }
    }

    if !verify_password(code, code_hash) {
        info!("Wrong reset code for user {} (attempt {})", user.id, tries + 1);
        return Ok(invalid_code());
    }

    // 4. 换发重置令牌
    let reset_token = generate_token(RESET_TOKEN_LEN);
    let token_expires_at = (now + Duration::seconds(config.password_reset.token_ttl)).timestamp();
    match storage
        .set_reset_token(user.id, &reset_token, token_expires_at)
        .await
    {
        Ok(true) => {
            info!("Reset code verified for user {}", user.id);
            let response = VerifyResetCodeResponse {
                reset_token,
                expires_in: config.password_reset.token_ttl,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Code verified")))
        }
        Ok(false) => Ok(invalid_code()),
        Err(e) => {
            error!("Failed to store reset token for user {}: {}", user.id, e);
            Ok(internal_error())
        }
    }
}

pub async fn handle_reset_password(
    service: &AuthService,
    reset_request: ResetPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_password(&reset_request.new_password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::PasswordTooShort, msg)));
    }

    let token = reset_request.reset_token.trim();
    if token.is_empty() {
        return Ok(invalid_token());
    }

    let storage = service.get_storage(request);
    let user = match storage.get_user_by_reset_token(token).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(invalid_token()),
        Err(e) => {
            error!("Failed to look up reset token: {}", e);
            return Ok(internal_error());
        }
    };

    match user.reset.token_expires_at {
        Some(expires_at) if Utc::now() < expires_at => {}
        _ => return Ok(invalid_token()),
    }

    let password_hash = match hash_password(&reset_request.new_password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash new password: {}", e);
            return Ok(internal_error());
        }
    };

    match storage.complete_password_reset(user.id, &password_hash).await {
        Ok(true) => {}
        Ok(false) => return Ok(invalid_token()),
        Err(e) => {
            error!("Failed to reset password for user {}: {}", user.id, e);
            return Ok(internal_error());
        }
    }

    let revoked = service.get_sessions(request).revoke_user(user.id);
    info!(
        "Password reset for user {}, {} session(s) revoked",
        user.id, revoked
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Password has been reset")))
}
