pub mod download;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::file_store::FileStore;
use crate::storage::Storage;

pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
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

    pub(crate) fn get_file_store(&self, request: &HttpRequest) -> Arc<dyn FileStore> {
        request
            .app_data::<web::Data<Arc<dyn FileStore>>>()
            .expect("File store not found in app data")
            .get_ref()
            .clone()
    }

    // Handle file download
    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        file_id: String,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, file_id).await
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::header;
    use actix_web::test;
    use serde_json::json;

    use crate::file_store::FileStore;
    use crate::test_support::{TestContext, call, multipart_body, sign_in, test_app};

    const PDF: &[u8] = b"%PDF-1.7\nreport body\n";

    #[actix_web::test]
    async fn test_download_permissions_and_content() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let teacher = sign_in!(app, ctx, "t@example.com", "Grace Hopper", "teacher");
        let student = sign_in!(app, ctx, "s@example.com", "Sam", "student");
        let classmate = sign_in!(app, ctx, "c@example.com", "Cleo", "student");
        let other_teacher = sign_in!(app, ctx, "o@example.com", "Alan Turing", "teacher");

        let (_, body) = call!(app, ctx.post_json("/api/v1/classes", Some(&teacher), json!({"name": "Systems"})));
        let class_id = body["data"]["id"].as_i64().expect("class id");
        for token in [&student, &classmate] {
            call!(app, ctx.post_json(&format!("/api/v1/classes/{class_id}/join"), Some(token.as_str()), json!({})));
        }
        let (_, body) = call!(
            app,
            ctx.post_json("/api/v1/assignments", Some(&teacher), json!({"class_id": class_id, "course": "CS", "title": "Report"}))
        );
        let assignment_id = body["data"]["id"].as_i64().expect("assignment id").to_string();

        let upload = multipart_body(
            &[("assignment_id", assignment_id.as_str())],
            &[("file", "drafts/report final.pdf", "application/pdf", PDF)],
        );
        let (status, body) = call!(app, ctx.post_multipart("/api/v1/submissions", Some(&student), upload));
        assert_eq!(status, 201, "{body}");
        let file_id = body["data"]["file_id"].as_str().expect("file id").to_string();
        let uri = format!("/api/v1/files/{file_id}");

        for token in [&student, &teacher] {
            let resp = test::call_service(&app, ctx.get(&uri, Some(token.as_str())).to_request()).await;
            assert_eq!(resp.status(), 200);
            assert_eq!(
                resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
                Some("application/pdf")
            );
            let disposition = resp
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert!(disposition.starts_with("attachment"), "{disposition}");
            assert!(disposition.contains("report final.pdf"), "{disposition}");
            assert_eq!(test::read_body(resp).await, PDF);
        }

        for token in [&classmate, &other_teacher] {
            let (status, _) = call!(app, ctx.get(&uri, Some(token.as_str())));
            assert_eq!(status, 403);
        }
        let (status, _) = call!(app, ctx.get(&uri, None));
        assert_eq!(status, 401);

        let (status, _) = call!(app, ctx.get("/api/v1/files/not-a-file-id", Some(&student)));
        assert_eq!(status, 400);
        let (status, _) = call!(
            app,
            ctx.get("/api/v1/files/6f1c1f4e-3a52-4b8e-9d0e-1a2b3c4d5e6f", Some(&student))
        );
        assert_eq!(status, 404);

        // 记录存在但内容丢失
        ctx.file_store.delete(&file_id).await.expect("delete blob");
        let (status, _) = call!(app, ctx.get(&uri, Some(&student)));
        assert_eq!(status, 404);
    }
}
