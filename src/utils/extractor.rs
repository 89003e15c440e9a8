//! 路径参数提取器
//!
//! 把 `{xxx_id}` 形式的路径参数解析为正整数，非法值直接返回 400 响应，
//! 不会落到 actix 默认的纯文本错误。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_param(message: String) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

fn parse_positive_i64(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(param)
        .ok_or_else(|| bad_param(format!("Missing path parameter: {param}")))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_param(format!("Invalid {param}: {raw}"))),
    }
}

macro_rules! define_id_extractors {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_positive_i64(req, $param).map($name))
                }
            }
        )*
    };
}

define_id_extractors! {
    SafeClassIdI64 => "class_id",
    SafeAssignmentIdI64 => "assignment_id",
    SafeSubmissionIdI64 => "submission_id",
}

/// 文件 ID（UUID 字符串）
#[derive(Debug, Clone)]
pub struct SafeFileId(pub String);

impl FromRequest for SafeFileId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.match_info().get("file_id") {
            Some(raw) => uuid::Uuid::parse_str(raw)
                .map(|id| SafeFileId(id.to_string()))
                .map_err(|_| bad_param(format!("Invalid file_id: {raw}"))),
            None => Err(bad_param("Missing path parameter: file_id".to_string())),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web};

    async fn show_class(id: SafeClassIdI64) -> HttpResponse {
        HttpResponse::Ok().body(id.0.to_string())
    }

    async fn show_file(id: SafeFileId) -> HttpResponse {
        HttpResponse::Ok().body(id.0)
    }

    #[actix_web::test]
    async fn test_id_extractor() {
        let app = test::init_service(
            App::new()
                .route("/c/{class_id}", web::get().to(show_class))
                .route("/f/{file_id}", web::get().to(show_file)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/c/42").to_request()).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(test::read_body(resp).await, "42");

        for bad in ["/c/0", "/c/-3", "/c/abc"] {
            let resp =
                test::call_service(&app, test::TestRequest::get().uri(bad).to_request()).await;
            assert_eq!(resp.status(), 400, "{bad}");
        }

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/f/not-a-uuid")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);

        let id = uuid::Uuid::new_v4().to_string();
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/f/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
    }
}
