use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode, auth::responses::MeResponse, users::responses::UserResponse,
};

use super::AuthService;

pub async fn handle_me(_service: &AuthService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let (Some(user), Some(session)) = (
        RequireSession::extract_user(request),
        RequireSession::extract_session(request),
    ) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let response = MeResponse {
        user: UserResponse::from(user),
        active_role: session.role,
        session_expires_at: session.expires_at,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "OK")))
}
