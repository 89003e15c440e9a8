use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub time: chrono::DateTime<chrono::Utc>,
}

pub struct HealthService;

impl HealthService {
    pub fn new_lazy() -> Self {
        Self
    }

    // 健康检查不使用统一响应包装
    pub async fn check(&self, _request: &HttpRequest) -> ActixResult<HttpResponse> {
        Ok(HttpResponse::Ok().json(HealthResponse {
            ok: true,
            time: chrono::Utc::now(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestContext, call, test_app};

    #[actix_web::test]
    async fn test_health_is_public() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let (status, body) = call!(app, ctx.get("/health", None));
        assert_eq!(status, 200);
        assert_eq!(body["ok"], true);
        assert!(body["time"].is_string());
        assert!(body.get("code").is_none());
    }
}
