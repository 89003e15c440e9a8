/*!
 * 班级访问控制中间件
 *
 * 必须放在 RequireSession 之后，读取路径参数 `class_id`：
 * - 班级不存在返回 404
 * - 以教师身份登录且是班级创建者，视为 owner
 * - `owner_or_member` 模式下，以学生身份登录且已加入班级，视为 member
 * - 其余情况返回 403
 *
 * 通过后把 `ClassAccess` 放入请求扩展。
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
use tracing::{debug, error};

use crate::{
    models::{
        ErrorCode,
        classes::entities::Class,
        users::entities::{User, UserRole},
    },
    session::Session,
    storage::Storage,
};

use super::create_error_response;

/// 通过检查后的班级访问信息
#[derive(Debug, Clone)]
pub struct ClassAccess {
    pub class: Class,
    pub is_owner: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AccessLevel {
    Owner,
    OwnerOrMember,
}

#[derive(Clone)]
pub struct RequireClassAccess {
    level: AccessLevel,
}

impl RequireClassAccess {
    /// 只允许班级创建者
    pub fn owner() -> Self {
        Self {
            level: AccessLevel::Owner,
        }
    }

    /// 班级创建者或已加入的学生
    pub fn owner_or_member() -> Self {
        Self {
            level: AccessLevel::OwnerOrMember,
        }
    }

    pub fn extract_access(req: &HttpRequest) -> Option<ClassAccess> {
        req.extensions().get::<ClassAccess>().cloned()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireClassAccess
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireClassAccessMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireClassAccessMiddleware {
            service: Rc::new(service),
            level: self.level,
        }))
    }
}

pub struct RequireClassAccessMiddleware<S> {
    service: Rc<S>,
    level: AccessLevel,
}

fn reject<B>(
    req: ServiceRequest,
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> ServiceResponse<EitherBody<B>> {
    req.into_response(create_error_response(status, code, message).map_into_right_body())
}

impl<S, B> Service<ServiceRequest> for RequireClassAccessMiddleware<S>
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
        let level = self.level;

        Box::pin(async move {
            // 1. 会话信息
            let user = req.extensions().get::<User>().cloned();
            let session = req.extensions().get::<Session>().cloned();
            let (user, session) = match (user, session) {
                (Some(user), Some(session)) => (user, session),
                _ => {
                    return Ok(reject(
                        req,
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    ));
                }
            };

            // 2. class_id
            let class_id = match req
                .match_info()
                .get("class_id")
                .and_then(|s| s.parse::<i64>().ok())
                .filter(|id| *id > 0)
            {
                Some(cid) => cid,
                None => {
                    return Ok(reject(
                        req,
                        StatusCode::BAD_REQUEST,
                        ErrorCode::BadRequest,
                        "Missing or invalid class_id",
                    ));
                }
            };

            let Some(storage) = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .map(|s| s.get_ref().clone())
            else {
                error!("Storage not found in app data");
                return Ok(reject(
                    req,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Internal server error",
                ));
            };

            // 3. 班级
            let class = match storage.get_class_by_id(class_id).await {
                Ok(Some(class)) => class,
                Ok(None) => {
                    return Ok(reject(
                        req,
                        StatusCode::NOT_FOUND,
                        ErrorCode::ClassNotFound,
                        "Class not found",
                    ));
                }
                Err(e) => {
                    error!("Failed to load class {}: {}", class_id, e);
                    return Ok(reject(
                        req,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Internal server error",
                    ));
                }
            };

            // 4. 身份判断
            let is_owner = session.role == UserRole::Teacher && class.teacher_id == user.id;
            let allowed = if is_owner {
                true
            } else if level == AccessLevel::OwnerOrMember && session.role == UserRole::Student {
                match storage.get_class_member(class_id, user.id).await {
                    Ok(member) => member.is_some(),
                    Err(e) => {
                        error!("Failed to load membership for class {}: {}", class_id, e);
                        return Ok(reject(
                            req,
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Internal server error",
                        ));
                    }
                }
            } else {
                false
            };

            if !allowed {
                debug!("User {} denied access to class {}", user.id, class_id);
                let code = if session.role == UserRole::Student {
                    ErrorCode::NotClassMember
                } else {
                    ErrorCode::ClassPermissionDenied
                };
                return Ok(reject(
                    req,
                    StatusCode::FORBIDDEN,
                    code,
                    "No permission for this class",
                ));
            }

            req.extensions_mut().insert(ClassAccess { class, is_owner });
            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}
