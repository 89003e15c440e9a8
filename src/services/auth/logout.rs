use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode};

use super::AuthService;

pub async fn handle_logout(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(session) = RequireSession::extract_session(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    service.get_sessions(request).revoke(&session.token);
    info!("User {} logged out", session.user_id);

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Logged out")))
}
