pub mod login;
pub mod logout;
pub mod password_reset;
pub mod profile;
pub mod register;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::mail::Mailer;
use crate::models::auth::requests::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    VerifyResetCodeRequest,
};
use crate::session::SessionStore;
use crate::storage::Storage;

pub struct AuthService {
    storage: Option<Arc<dyn Storage>>,
}

impl AuthService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_sessions(&self, request: &HttpRequest) -> Arc<SessionStore> {
        request
            .app_data::<web::Data<Arc<SessionStore>>>()
            .expect("Session store not found in app data")
            .get_ref()
            .clone()
    }

    pub(crate) fn get_mailer(&self, request: &HttpRequest) -> Arc<dyn Mailer> {
        request
            .app_data::<web::Data<Arc<dyn Mailer>>>()
            .expect("Mailer not found in app data")
            .get_ref()
            .clone()
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 注册或为已有账户追加角色
    pub async fn register(
        &self,
        register_request: RegisterRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        register::handle_register(self, register_request, request).await
    }

    // 以指定角色登录
    pub async fn login(
        &self,
        login_request: LoginRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, login_request, request).await
    }

    pub async fn logout(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        logout::handle_logout(self, request).await
    }

    // 当前用户与会话信息
    pub async fn me(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        profile::handle_me(self, request).await
    }

    // 找回密码：发送验证码
    pub async fn forgot_password(
        &self,
        forgot_request: ForgotPasswordRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        password_reset::handle_forgot_password(self, forgot_request, request).await
    }

    // 找回密码：校验验证码，换取重置令牌
    pub async fn verify_reset_code(
        &self,
        verify_request: VerifyResetCodeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        password_reset::handle_verify_reset_code(self, verify_request, request).await
    }

    // 找回密码：设置新密码
    pub async fn reset_password(
        &self,
        reset_request: ResetPasswordRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        password_reset::handle_reset_password(self, reset_request, request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::Arc;

    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::session::SessionStore;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::test_support::{TEST_PASSWORD, TestContext, call, sign_in, test_app};

    #[actix_web::test]
    async fn test_register_same_email_appends_role() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);

        let (status, body) = call!(
            app,
            ctx.post_json(
                "/api/v1/auth/register",
                None,
                json!({"role": "student", "name": "Ada", "email": "Ada@Example.com", "password": TEST_PASSWORD}),
            )
        );
        assert_eq!(status, 201, "{body}");
        let user_id = body["data"]["id"].as_i64().expect("user id");

        let (status, body) = call!(
            app,
            ctx.post_json(
                "/api/v1/auth/register",
                None,
                json!({"role": "teacher", "email": "ada@example.com", "password": TEST_PASSWORD}),
            )
        );
        assert_eq!(status, 200, "{body}");
        assert_eq!(body["data"]["id"].as_i64(), Some(user_id));
        assert_eq!(body["data"]["roles"], json!(["student", "teacher"]));
        assert_eq!(body["data"]["name"], "Ada");

        // 密码不一致不能追加角色
        let (status, _) = call!(
            app,
            ctx.post_json(
                "/api/v1/auth/register",
                None,
                json!({"role": "teacher", "email": "ada@example.com", "password": "another-pass"}),
            )
        );
        assert_eq!(status, 409);

        let (status, _) = call!(
            app,
            ctx.post_json(
                "/api/v1/auth/register",
                None,
                json!({"role": "admin", "email": "x@example.com", "password": TEST_PASSWORD}),
            )
        );
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn test_login_requires_granted_role() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        ctx.seed_user("stu@example.com", "Stu", "student").await;

        let (status, body) = call!(
            app,
            ctx.post_json(
                "/api/v1/auth/login",
                None,
                json!({"role": "teacher", "email": "stu@example.com", "password": TEST_PASSWORD}),
            )
        );
        assert_eq!(status, 403, "{body}");

        let (status, _) = call!(
            app,
            ctx.post_json(
                "/api/v1/auth/login",
                None,
                json!({"role": "student", "email": "stu@example.com", "password": "wrong-pass"}),
            )
        );
        assert_eq!(status, 401);

        let (status, body) = call!(
            app,
            ctx.post_json(
                "/api/v1/auth/login",
                None,
                json!({"role": "student", "email": "STU@example.com", "password": TEST_PASSWORD}),
            )
        );
        assert_eq!(status, 200, "{body}");
        assert_eq!(body["data"]["selected_role"], "student");
    }

    #[actix_web::test]
    async fn test_login_rehashes_legacy_plaintext_password() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let user_id = ctx
            .storage
            .create_user(CreateUserRequest {
                name: "Legacy".to_string(),
                email: "legacy@example.com".to_string(),
                password_hash: TEST_PASSWORD.to_string(),
                role: UserRole::Student,
            })
            .await
            .expect("seed legacy user")
            .id;

        let login = |password: &str| {
            ctx.post_json(
                "/api/v1/auth/login",
                None,
                json!({"role": "student", "email": "legacy@example.com", "password": password}),
            )
        };

        let (status, body) = call!(app, login(TEST_PASSWORD));
        assert_eq!(status, 200, "{body}");

        let stored = ctx
            .storage
            .get_user_by_id(user_id)
            .await
            .expect("load user")
            .expect("user exists");
        assert!(stored.password_hash.starts_with("$argon2id$"), "{}", stored.password_hash);

        let (status, body) = call!(app, login(TEST_PASSWORD));
        assert_eq!(status, 200, "{body}");
        let (status, _) = call!(app, login("wrong-pass"));
        assert_eq!(status, 401);
    }

    #[actix_web::test]
    async fn test_expired_session_is_rejected_on_request() {
        let mut ctx = TestContext::new().await;
        ctx.sessions = Arc::new(SessionStore::new(0));
        let app = test_app!(ctx);
        let token = sign_in!(app, ctx, "brief@example.com", "Brief", "student");

        let (status, _) = call!(app, ctx.get("/api/v1/auth/me", Some(&token)));
        assert_eq!(status, 401);
        assert!(ctx.sessions.is_empty());
    }

    #[actix_web::test]
    async fn test_session_me_and_logout() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let token = sign_in!(app, ctx, "t@example.com", "Grace Hopper", "teacher");

        let (status, body) = call!(app, ctx.get("/api/v1/auth/me", Some(&token)));
        assert_eq!(status, 200, "{body}");
        assert_eq!(body["data"]["active_role"], "teacher");
        assert_eq!(body["data"]["user"]["email"], "t@example.com");

        let (status, _) = call!(app, ctx.post_json("/api/v1/auth/logout", Some(&token), json!({})));
        assert_eq!(status, 200);

        let (status, _) = call!(app, ctx.get("/api/v1/auth/me", Some(&token)));
        assert_eq!(status, 401);
        let (status, _) = call!(app, ctx.get("/api/v1/auth/me", None));
        assert_eq!(status, 401);
    }

    #[actix_web::test]
    async fn test_forgot_password_masks_unknown_accounts() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        ctx.seed_user("known@example.com", "Known", "student").await;

        let (status, known) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/forgot", None, json!({"email": "known@example.com"}))
        );
        assert_eq!(status, 200);
        let (status, unknown) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/forgot", None, json!({"email": "nobody@example.com"}))
        );
        assert_eq!(status, 200);
        assert_eq!(known["message"], unknown["message"]);

        let sent = ctx.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "known@example.com");
        assert_eq!(sent[0].code.len(), 6);

        // 投递失败同样返回 200
        ctx.mailer.fail_all();
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/forgot", None, json!({"email": "known@example.com"}))
        );
        assert_eq!(status, 200);

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/verify", None, json!({"email": "nobody@example.com", "code": "123456"}))
        );
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn test_password_reset_flow_revokes_sessions() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let token = sign_in!(app, ctx, "s@example.com", "Sam", "student");

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/forgot", None, json!({"email": "s@example.com"}))
        );
        assert_eq!(status, 200);
        let code = ctx.mailer.last_code_for("s@example.com").expect("code sent");

        let (status, body) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/verify", None, json!({"email": "s@example.com", "code": code}))
        );
        assert_eq!(status, 200, "{body}");
        let reset_token = body["data"]["reset_token"].as_str().expect("reset token").to_string();
        assert_eq!(reset_token.len(), 48);

        // 验证码只能使用一次
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/verify", None, json!({"email": "s@example.com", "code": code}))
        );
        assert_eq!(status, 400);

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/reset", None, json!({"reset_token": reset_token, "new_password": "123"}))
        );
        assert_eq!(status, 400);

        let (status, body) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/reset", None, json!({"reset_token": reset_token, "new_password": "brand-new-pass"}))
        );
        assert_eq!(status, 200, "{body}");

        let (status, _) = call!(app, ctx.get("/api/v1/auth/me", Some(&token)));
        assert_eq!(status, 401);

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/reset", None, json!({"reset_token": reset_token, "new_password": "another-pass"}))
        );
        assert_eq!(status, 400);

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/login", None, json!({"role": "student", "email": "s@example.com", "password": TEST_PASSWORD}))
        );
        assert_eq!(status, 401);
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/login", None, json!({"role": "student", "email": "s@example.com", "password": "brand-new-pass"}))
        );
        assert_eq!(status, 200);
    }

    #[actix_web::test]
    async fn test_reset_lookup_failures_are_masked() {
        use sea_orm::ConnectionTrait;

        let mut ctx = TestContext::new().await;
        let broken = SeaOrmStorage::in_memory().await.expect("in-memory database");
        broken
            .db
            .execute_unprepared("DROP TABLE users")
            .await
            .expect("drop users table");
        ctx.storage = Arc::new(broken);
        let app = test_app!(ctx);

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/forgot", None, json!({"email": "gone@example.com"}))
        );
        assert_eq!(status, 200);

        let (status, body) = call!(
            app,
            ctx.post_json(
                "/api/v1/auth/password/verify",
                None,
                json!({"email": "gone@example.com", "code": "123456"}),
            )
        );
        assert_eq!(status, 400, "{body}");
        assert_eq!(body["message"], "Invalid or expired verification code");
    }

    #[actix_web::test]
    async fn test_reset_code_attempts_are_capped() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        ctx.seed_user("cap@example.com", "Cap", "student").await;

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/forgot", None, json!({"email": "cap@example.com"}))
        );
        assert_eq!(status, 200);
        let code = ctx.mailer.last_code_for("cap@example.com").expect("code sent");
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..5 {
            let (status, _) = call!(
                app,
                ctx.post_json("/api/v1/auth/password/verify", None, json!({"email": "cap@example.com", "code": wrong}))
            );
            assert_eq!(status, 400);
        }

        // 第六次即使验证码正确也被拒绝
        let (status, body) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/verify", None, json!({"email": "cap@example.com", "code": code}))
        );
        assert_eq!(status, 429, "{body}");

        // 重新获取验证码后恢复
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/forgot", None, json!({"email": "cap@example.com"}))
        );
        assert_eq!(status, 200);
        let code = ctx.mailer.last_code_for("cap@example.com").expect("code sent");
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/auth/password/verify", None, json!({"email": "cap@example.com", "code": code}))
        );
        assert_eq!(status, 200);
    }

    #[actix_web::test]
    async fn test_register_is_rate_limited_per_client() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let peer = ctx.next_peer();

        let mut statuses = Vec::new();
        for i in 0..4 {
            let req = actix_web::test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .peer_addr(peer)
                .set_json(json!({"role": "student", "email": format!("r{i}@example.com"), "password": "x"}));
            let (status, _) = call!(app, req);
            statuses.push(status.as_u16());
        }
        // 前三次因密码过短返回 400，第四次被限流
        assert_eq!(statuses, vec![400, 400, 400, 429]);
    }
}
