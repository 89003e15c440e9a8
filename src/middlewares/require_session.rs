/*!
 * 会话认证中间件
 *
 * 从 `Authorization: Bearer <token>` 中取出会话令牌，在内存会话存储中查找，
 * 再从数据库加载用户。成功后把 `User` 与 `Session` 放入请求扩展。
 *
 * ```rust,ignore
 * web::scope("/api/v1/classes")
 *     .wrap(RequireSession)
 *     .route("/mine", web::get().to(list_my_classes))
 * ```
 *
 * 处理函数中：
 *
 * ```rust,ignore
 * let user = RequireSession::extract_user(&req);
 * let role = RequireSession::extract_active_role(&req);
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;
use crate::models::{
    ErrorCode,
    users::entities::{User, UserRole},
};
use crate::session::{Session, SessionStore};
use crate::storage::Storage;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireSession;

enum AuthFailure {
    Unauthorized(&'static str),
    Internal(String),
}

/// 从请求头提取 Bearer 令牌
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn authenticate(req: &ServiceRequest) -> Result<(User, Session), AuthFailure> {
    let token = bearer_token(req.request())
        .ok_or(AuthFailure::Unauthorized("Missing or invalid Authorization header"))?;

    let sessions = req
        .app_data::<web::Data<Arc<SessionStore>>>()
        .ok_or_else(|| AuthFailure::Internal("Session store not found in app data".into()))?
        .get_ref()
        .clone();

    let session = sessions
        .get(&token)
        .ok_or(AuthFailure::Unauthorized("Session is invalid or expired"))?;

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| AuthFailure::Internal("Storage not found in app data".into()))?
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_id(session.user_id)
        .await
        .map_err(|e| AuthFailure::Internal(format!("Failed to load user: {e}")))?;

    match user {
        Some(user) => Ok((user, session)),
        None => {
            // 用户已被删除，会话一并作废
            sessions.revoke(&token);
            Err(AuthFailure::Unauthorized("User no longer exists"))
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            match authenticate(&req).await {
                Ok((user, session)) => {
                    debug!(
                        "Session authentication successful for user {} as {}",
                        user.id, session.role
                    );
                    req.extensions_mut().insert(user);
                    req.extensions_mut().insert(session);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(AuthFailure::Unauthorized(reason)) => {
                    info!(
                        "Session authentication failed for request to {}: {}",
                        req.path(),
                        reason
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::SessionInvalid,
                            &format!("Unauthorized: {reason}"),
                        )
                        .map_into_right_body(),
                    ))
                }
                Err(AuthFailure::Internal(reason)) => {
                    error!("Session authentication error: {}", reason);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Internal server error",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireSession {
    /// 当前用户（需在 RequireSession 之后调用）
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_session(req: &HttpRequest) -> Option<Session> {
        req.extensions().get::<Session>().cloned()
    }

    /// 登录时选择的角色
    pub fn extract_active_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<Session>().map(|session| session.role)
    }
}
