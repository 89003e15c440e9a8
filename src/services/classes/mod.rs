pub mod create;
pub mod get;
pub mod join;
pub mod list;
pub mod members;
pub mod search;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::classes::requests::{CreateClassRequest, JoinByCodeRequest, TeacherSearchQuery};
use crate::storage::Storage;

pub struct ClassService {
    storage: Option<Arc<dyn Storage>>,
}

impl ClassService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, request, class_data).await
    }

    // 教师：自己创建的班级；学生：已加入的班级
    pub async fn list_my_classes(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_my_classes(self, request).await
    }

    // 根据加入码获取班级信息
    pub async fn get_class_by_code(
        &self,
        request: &HttpRequest,
        code: String,
    ) -> ActixResult<HttpResponse> {
        get::get_class_by_code(self, request, code).await
    }

    // 按教师姓名模糊搜索
    pub async fn search_by_teacher(
        &self,
        request: &HttpRequest,
        query: TeacherSearchQuery,
    ) -> ActixResult<HttpResponse> {
        search::search_by_teacher(self, request, query).await
    }

    pub async fn join_by_code(
        &self,
        request: &HttpRequest,
        join_data: JoinByCodeRequest,
    ) -> ActixResult<HttpResponse> {
        join::join_by_code(self, request, join_data).await
    }

    pub async fn join_by_id(&self, request: &HttpRequest, class_id: i64) -> ActixResult<HttpResponse> {
        join::join_by_id(self, request, class_id).await
    }

    pub async fn list_members(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        members::list_members(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::test_support::{TestContext, call, sign_in, test_app};

    #[actix_web::test]
    async fn test_create_and_join_class() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let teacher = sign_in!(app, ctx, "t@example.com", "Grace Hopper", "teacher");
        let student = sign_in!(app, ctx, "s@example.com", "Sam", "student");

        let (status, body) = call!(
            app,
            ctx.post_json("/api/v1/classes", Some(&teacher), json!({"name": "  Compilers  "}))
        );
        assert_eq!(status, 201, "{body}");
        assert_eq!(body["data"]["name"], "Compilers");
        let class_id = body["data"]["id"].as_i64().expect("class id");
        let code = body["data"]["code"].as_str().expect("code").to_string();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        // 学生不能创建班级
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/classes", Some(&student), json!({"name": "Mine"}))
        );
        assert_eq!(status, 403);
        let (status, _) = call!(app, ctx.post_json("/api/v1/classes", Some(&teacher), json!({"name": "  "})));
        assert_eq!(status, 400);

        let (status, body) = call!(
            app,
            ctx.get(&format!("/api/v1/classes/code/{}", code.to_lowercase()), Some(&student))
        );
        assert_eq!(status, 200, "{body}");
        assert_eq!(body["data"]["id"].as_i64(), Some(class_id));

        let (status, body) = call!(
            app,
            ctx.post_json("/api/v1/classes/join", Some(&student), json!({"code": format!(" {} ", code.to_lowercase())}))
        );
        assert_eq!(status, 201, "{body}");
        assert_eq!(body["data"]["already_member"], false);
        assert_eq!(body["data"]["membership"]["student_name"], "Sam");

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/classes/join", Some(&student), json!({"code": "ABC"}))
        );
        assert_eq!(status, 400);
        let missing = if code == "ZZZZZZ" { "YYYYYY" } else { "ZZZZZZ" };
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/classes/join", Some(&student), json!({"code": missing}))
        );
        assert_eq!(status, 404);

        let (status, body) = call!(app, ctx.get("/api/v1/classes/mine", Some(&student)));
        assert_eq!(status, 200);
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

        let (status, body) = call!(app, ctx.get("/api/v1/classes/mine", Some(&teacher)));
        assert_eq!(status, 200);
        assert_eq!(body["data"]["items"][0]["id"].as_i64(), Some(class_id));
    }

    #[actix_web::test]
    async fn test_rejoin_is_idempotent() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let teacher = sign_in!(app, ctx, "t@example.com", "Grace Hopper", "teacher");
        let student = sign_in!(app, ctx, "s@example.com", "Sam", "student");

        let (_, body) = call!(app, ctx.post_json("/api/v1/classes", Some(&teacher), json!({"name": "Algebra"})));
        let class_id = body["data"]["id"].as_i64().expect("class id");
        let join_uri = format!("/api/v1/classes/{class_id}/join");

        let (status, first) = call!(app, ctx.post_json(&join_uri, Some(&student), json!({})));
        assert_eq!(status, 201, "{first}");
        let (status, second) = call!(app, ctx.post_json(&join_uri, Some(&student), json!({})));
        assert_eq!(status, 200, "{second}");
        assert_eq!(second["data"]["already_member"], true);
        assert_eq!(second["data"]["membership"]["id"], first["data"]["membership"]["id"]);

        let (status, body) = call!(
            app,
            ctx.get(&format!("/api/v1/classes/{class_id}/members"), Some(&teacher))
        );
        assert_eq!(status, 200, "{body}");
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));

        // 成员列表只对班级教师开放
        let (status, _) = call!(
            app,
            ctx.get(&format!("/api/v1/classes/{class_id}/members"), Some(&student))
        );
        assert_eq!(status, 403);

        let (status, _) = call!(app, ctx.post_json("/api/v1/classes/9999/join", Some(&student), json!({})));
        assert_eq!(status, 404);
        let (status, _) = call!(app, ctx.post_json(&join_uri, Some(&teacher), json!({})));
        assert_eq!(status, 403);
    }

    #[actix_web::test]
    async fn test_search_classes_by_teacher_name() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let grace = sign_in!(app, ctx, "grace@example.com", "Grace Brewster Hopper", "teacher");
        let alan = sign_in!(app, ctx, "alan@example.com", "Alan Turing", "teacher");
        let student = sign_in!(app, ctx, "s@example.com", "Sam", "student");

        call!(app, ctx.post_json("/api/v1/classes", Some(&grace), json!({"name": "COBOL"})));
        call!(app, ctx.post_json("/api/v1/classes", Some(&alan), json!({"name": "Computability"})));

        let (status, body) = call!(app, ctx.get("/api/v1/classes/search?teacher=hopper%20GRACE", Some(&student)));
        assert_eq!(status, 200, "{body}");
        let items = body["data"]["items"].as_array().expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "COBOL");
        assert_eq!(items[0]["teacher_name"], "Grace Brewster Hopper");

        let (status, body) = call!(app, ctx.get("/api/v1/classes/search?teacher=ing", Some(&student)));
        assert_eq!(status, 200);
        assert_eq!(body["data"]["items"][0]["name"], "Computability");

        let (status, body) = call!(app, ctx.get("/api/v1/classes/search?teacher=knuth", Some(&student)));
        assert_eq!(status, 200);
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));

        let (status, _) = call!(app, ctx.get("/api/v1/classes/search?teacher=%20%20", Some(&student)));
        assert_eq!(status, 400);
    }
}
