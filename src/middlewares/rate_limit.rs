/*!
 * 速率限制中间件
 *
 * 按端点前缀和客户端标识计数，超出窗口内的次数后返回 429。
 * 已认证请求以用户 ID 计数，匿名请求以客户端 IP 计数。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(AuthService::login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 固定窗口内的请求计数
#[derive(Clone, Copy, Debug)]
struct RateWindow {
    started_at: Instant,
    count: u32,
}

/// 请求计数存储
///
/// 键为 `前缀:user:ID` 或 `前缀:ip:地址`，值为当前窗口的起点与计数。
/// 窗口从第一次请求开始计时，期间的请求不会推迟窗口结束。
/// 通过 `web::Data<RateLimitStore>` 注入时各 worker 共享同一实例，
/// 未注入时退回进程级实例。
#[derive(Clone)]
pub struct RateLimitStore {
    cache: Cache<String, RateWindow>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                // 只负责回收闲置的键，需不短于最长的限流窗口
                .time_to_live(Duration::from_secs(600))
                .max_capacity(100_000)
                .build(),
        }
    }

    /// 记录一次请求，超出窗口内的配额时返回 false
    pub async fn try_acquire(&self, key: &str, max_requests: u32, window: Duration) -> bool {
        let now = Instant::now();
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|entry| {
                let op = match entry.map(|e| e.into_value()) {
                    Some(current) if now.duration_since(current.started_at) < window => {
                        if current.count >= max_requests {
                            Op::Nop
                        } else {
                            Op::Put(RateWindow {
                                started_at: current.started_at,
                                count: current.count + 1,
                            })
                        }
                    }
                    _ => Op::Put(RateWindow {
                        started_at: now,
                        count: 1,
                    }),
                };
                std::future::ready(op)
            })
            .await;

        !matches!(result, CompResult::Unchanged(_) | CompResult::StillNone(_))
    }
}

impl Default for RateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

static RATE_LIMIT_CACHE: Lazy<RateLimitStore> = Lazy::new(RateLimitStore::new);

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
}

impl RateLimit {
    /// 创建新的速率限制器
    ///
    /// # 参数
    /// - `max_requests`: 时间窗口内允许的最大请求数
    /// - `window_secs`: 时间窗口（秒）
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix: String::new(),
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 登录：5次/分钟
    pub fn login() -> Self {
        Self::new(5, 60).with_prefix("login")
    }

    /// 注册：3次/分钟
    pub fn register() -> Self {
        Self::new(3, 60).with_prefix("register")
    }

    /// 找回密码相关端点：10次/分钟，限制验证码枚举
    pub fn password_reset() -> Self {
        Self::new(10, 60).with_prefix("password_reset")
    }

    /// 加入码查询与加入：10次/分钟
    pub fn class_code() -> Self {
        Self::new(10, 60).with_prefix("class_code")
    }

    /// 作业上传：10次/分钟
    pub fn file_upload() -> Self {
        Self::new(10, 60).with_prefix("upload")
    }
}

/// 提取客户端 IP，连接信息优先，其次是反向代理头
fn extract_client_ip(req: &ServiceRequest) -> String {
    // 尝试从连接信息获取真实 IP（最可信）
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    // 如果连接信息有有效 IP，优先使用
    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    // 从 X-Forwarded-For 头获取（用于反向代理场景）
    // 只取第一个 IP（最接近客户端的）
    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 从 X-Real-IP 头获取
    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    // 如果都没有有效 IP，使用连接信息的默认值
    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

/// 验证 IP 地址格式是否有效
fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

/// 从请求中提取用户 ID（如果已认证）
fn extract_user_id(req: &ServiceRequest) -> Option<i64> {
    req.extensions().get::<User>().map(|user| user.id)
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            max_requests: self.max_requests,
            window_secs: self.window_secs,
            key_prefix: self.key_prefix.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let max_requests = self.max_requests;
        let window_secs = self.window_secs;
        let key_prefix = self.key_prefix.clone();

        Box::pin(async move {
            // 构建限制键
            let identifier = extract_user_id(&req)
                .map(|id| format!("user:{}", id))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));

            let cache_key = if key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", key_prefix, identifier)
            };

            let store = req
                .app_data::<web::Data<RateLimitStore>>()
                .map(|data| data.get_ref().clone())
                .unwrap_or_else(|| RATE_LIMIT_CACHE.clone());

            if !store
                .try_acquire(&cache_key, max_requests, Duration::from_secs(window_secs))
                .await
            {
                warn!(
                    "Rate limit exceeded for key: {} (limit: {}/{}s)",
                    cache_key, max_requests, window_secs
                );
                return Ok(req
                    .into_response(create_rate_limit_response(window_secs).map_into_right_body()));
            }

            // 继续处理请求
            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(login.key_prefix, "login");

        let register = RateLimit::register();
        assert_eq!(register.max_requests, 3);
        assert_eq!(register.window_secs, 60);

        let reset = RateLimit::password_reset();
        assert_eq!(reset.max_requests, 10);
        assert_eq!(reset.key_prefix, "password_reset");

        let code = RateLimit::class_code();
        assert_eq!(code.key_prefix, "class_code");
    }

    #[actix_web::test]
    async fn test_counts_are_per_key() {
        let store = RateLimitStore::new();
        let window = Duration::from_secs(60);
        assert!(store.try_acquire("login:ip:10.0.0.1", 1, window).await);
        assert!(!store.try_acquire("login:ip:10.0.0.1", 1, window).await);
        assert!(store.try_acquire("login:ip:10.0.0.2", 1, window).await);
        assert!(store.try_acquire("register:ip:10.0.0.1", 1, window).await);
    }

    #[actix_web::test]
    async fn test_window_is_fixed_from_first_request() {
        let store = RateLimitStore::new();
        let window = Duration::from_millis(600);
        let key = "upload:user:7";

        assert!(store.try_acquire(key, 2, window).await);
        actix_web::rt::time::sleep(Duration::from_millis(350)).await;
        // 窗口内的第二次请求不会推迟窗口结束
        assert!(store.try_acquire(key, 2, window).await);
        assert!(!store.try_acquire(key, 2, window).await);

        actix_web::rt::time::sleep(Duration::from_millis(350)).await;
        assert!(store.try_acquire(key, 2, window).await);
        assert!(store.try_acquire(key, 2, window).await);
        assert!(!store.try_acquire(key, 2, window).await);
    }
}
