//! 测试辅助：内存 SQLite、数据库文件存储与记录邮件的测试应用

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use actix_web::http::header;
use actix_web::test::TestRequest;

use crate::file_store::{FileStore, database::DatabaseFileStore};
use crate::mail::{Mailer, RecordingMailer};
use crate::middlewares::RateLimitStore;
use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
use crate::session::SessionStore;
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use crate::utils::password::hash_password;

pub const TEST_PASSWORD: &str = "secret123";
pub const MULTIPART_BOUNDARY: &str = "----portal-test-boundary";

pub struct TestContext {
    pub storage: Arc<dyn Storage>,
    pub sessions: Arc<SessionStore>,
    pub mailer: Arc<RecordingMailer>,
    pub file_store: Arc<dyn FileStore>,
    pub rate_limits: RateLimitStore,
    peer_seq: AtomicU32,
}

impl TestContext {
    pub async fn new() -> Self {
        let storage: Arc<dyn Storage> = Arc::new(
            SeaOrmStorage::in_memory()
                .await
                .expect("in-memory database"),
        );
        let file_store: Arc<dyn FileStore> = Arc::new(DatabaseFileStore::new(storage.clone()));
        Self {
            storage,
            sessions: Arc::new(SessionStore::new(3600)),
            mailer: Arc::new(RecordingMailer::default()),
            file_store,
            rate_limits: RateLimitStore::new(),
            peer_seq: AtomicU32::new(1),
        }
    }

    pub fn mailer_handle(&self) -> Arc<dyn Mailer> {
        self.mailer.clone()
    }

    /// 直接写库创建用户，密码为 TEST_PASSWORD
    pub async fn seed_user(&self, email: &str, name: &str, role: &str) -> i64 {
        let role: UserRole = role.parse().expect("valid role");
        self.storage
            .create_user(CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password(TEST_PASSWORD).expect("hash"),
                role,
            })
            .await
            .expect("seed user")
            .id
    }

    /// 每个请求使用不同的来源地址，匿名限流互不影响
    pub fn next_peer(&self) -> SocketAddr {
        let n = self.peer_seq.fetch_add(1, Ordering::SeqCst);
        SocketAddr::from(([10, 0, (n >> 8) as u8, n as u8], 40000))
    }

    fn with_auth(&self, req: TestRequest, token: Option<&str>) -> TestRequest {
        let req = req.peer_addr(self.next_peer());
        match token {
            Some(token) => req.insert_header((header::AUTHORIZATION, format!("Bearer {token}"))),
            None => req,
        }
    }

    pub fn get(&self, uri: &str, token: Option<&str>) -> TestRequest {
        self.with_auth(TestRequest::get().uri(uri), token)
    }

    pub fn post_json(&self, uri: &str, token: Option<&str>, body: serde_json::Value) -> TestRequest {
        self.with_auth(TestRequest::post().uri(uri).set_json(body), token)
    }

    pub fn patch_json(&self, uri: &str, token: Option<&str>, body: serde_json::Value) -> TestRequest {
        self.with_auth(TestRequest::patch().uri(uri).set_json(body), token)
    }

    pub fn post_multipart(&self, uri: &str, token: Option<&str>, body: Vec<u8>) -> TestRequest {
        self.with_auth(
            TestRequest::post()
                .uri(uri)
                .insert_header((
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                ))
                .set_payload(body),
            token,
        )
    }
}

/// 文件部分：(字段名, 文件名, MIME, 内容)
pub type FilePart<'a> = (&'a str, &'a str, &'a str, &'a [u8]);

pub fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, filename, content_type, data) in files {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// 构建挂载全部路由的测试应用
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(
                    actix_web::web::JsonConfig::default()
                        .error_handler(crate::utils::json_error_handler),
                )
                .app_data(
                    actix_web::web::QueryConfig::default()
                        .error_handler(crate::utils::query_error_handler),
                )
                .app_data(actix_web::web::Data::new($ctx.storage.clone()))
                .app_data(actix_web::web::Data::new($ctx.sessions.clone()))
                .app_data(actix_web::web::Data::new($ctx.mailer_handle()))
                .app_data(actix_web::web::Data::new($ctx.file_store.clone()))
                .app_data(actix_web::web::Data::new($ctx.rate_limits.clone()))
                .configure(crate::routes::configure_all),
        )
        .await
    };
}

/// 发送请求，返回状态码与 JSON 响应体（非 JSON 时为 Null）
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body = actix_web::test::read_body(resp).await;
        let json: serde_json::Value =
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }};
}

/// 注册并以指定角色登录，返回会话令牌
macro_rules! sign_in {
    ($app:expr, $ctx:expr, $email:expr, $name:expr, $role:expr) => {{
        let (status, body) = crate::test_support::call!(
            $app,
            $ctx.post_json(
                "/api/v1/auth/register",
                None,
                serde_json::json!({
                    "role": $role,
                    "name": $name,
                    "email": $email,
                    "password": crate::test_support::TEST_PASSWORD,
                }),
            )
        );
        assert!(status.is_success(), "register failed: {status} {body}");
        let (status, body) = crate::test_support::call!(
            $app,
            $ctx.post_json(
                "/api/v1/auth/login",
                None,
                serde_json::json!({
                    "role": $role,
                    "email": $email,
                    "password": crate::test_support::TEST_PASSWORD,
                }),
            )
        );
        assert_eq!(status, 200, "login failed: {body}");
        body["data"]["token"]
            .as_str()
            .expect("session token")
            .to_string()
    }};
}

pub(crate) use {call, sign_in, test_app};
