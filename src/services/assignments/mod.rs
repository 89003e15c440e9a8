pub mod create;
pub mod detail;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::requests::CreateAssignmentRequest;
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
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

    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        assignment_data: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, request, assignment_data).await
    }

    // 班级作业列表（需先经过班级访问检查）
    pub async fn list_class_assignments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_class_assignments(self, request).await
    }

    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_assignment(self, request, assignment_id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::test_support::{TestContext, call, sign_in, test_app};

    #[actix_web::test]
    async fn test_assignment_lifecycle() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let teacher = sign_in!(app, ctx, "t@example.com", "Grace Hopper", "teacher");
        let other_teacher = sign_in!(app, ctx, "o@example.com", "Alan Turing", "teacher");
        let student = sign_in!(app, ctx, "s@example.com", "Sam", "student");
        let outsider = sign_in!(app, ctx, "x@example.com", "Xena", "student");

        let (_, body) = call!(app, ctx.post_json("/api/v1/classes", Some(&teacher), json!({"name": "Systems"})));
        let class_id = body["data"]["id"].as_i64().expect("class id");
        call!(app, ctx.post_json(&format!("/api/v1/classes/{class_id}/join"), Some(&student), json!({})));

        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&teacher), json!({"class_id": 9999, "course": "CS", "title": "Lab"}))
        );
        assert_eq!(status, 404);
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&other_teacher), json!({"class_id": class_id, "course": "CS", "title": "Lab"}))
        );
        assert_eq!(status, 403);
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&teacher), json!({"class_id": class_id, "course": "CS", "title": " "}))
        );
        assert_eq!(status, 400);
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&teacher), json!({"class_id": class_id, "course": "CS", "title": "Lab", "due": "next friday"}))
        );
        assert_eq!(status, 400);
        let (status, _) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&student), json!({"class_id": class_id, "course": "CS", "title": "Lab"}))
        );
        assert_eq!(status, 403);

        let (status, undated) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&teacher), json!({"class_id": class_id, "course": "CS", "title": "Reading"}))
        );
        assert_eq!(status, 201, "{undated}");
        let (status, late) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&teacher), json!({"class_id": class_id, "course": "CS", "title": "Lab 2", "due": "2030-03-01T12:00:00Z"}))
        );
        assert_eq!(status, 201, "{late}");
        let (status, early) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&teacher), json!({"class_id": class_id, "course": "CS", "title": "Lab 1", "due": "2030-02-01T12:00:00+08:00"}))
        );
        assert_eq!(status, 201, "{early}");

        let (status, body) = call!(
            app,
            ctx.get(&format!("/api/v1/classes/{class_id}/assignments"), Some(&student))
        );
        assert_eq!(status, 200, "{body}");
        let titles: Vec<&str> = body["data"]["items"]
            .as_array()
            .expect("items")
            .iter()
            .filter_map(|a| a["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["Lab 1", "Lab 2", "Reading"]);

        let (status, _) = call!(
            app,
            ctx.get(&format!("/api/v1/classes/{class_id}/assignments"), Some(&outsider))
        );
        assert_eq!(status, 403);

        let assignment_id = early["data"]["id"].as_i64().expect("assignment id");
        let detail_uri = format!("/api/v1/assignments/{assignment_id}");
        let (status, body) = call!(app, ctx.get(&detail_uri, Some(&student)));
        assert_eq!(status, 200);
        assert_eq!(body["data"]["course"], "CS");
        let (status, _) = call!(app, ctx.get(&detail_uri, Some(&teacher)));
        assert_eq!(status, 200);
        let (status, _) = call!(app, ctx.get(&detail_uri, Some(&outsider)));
        assert_eq!(status, 403);
        let (status, _) = call!(app, ctx.get(&detail_uri, Some(&other_teacher)));
        assert_eq!(status, 403);
        let (status, _) = call!(app, ctx.get("/api/v1/assignments/424242", Some(&student)));
        assert_eq!(status, 404);
    }
}
