pub mod create;
pub mod detail;
pub mod list;
pub mod review;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::file_store::FileStore;
use crate::models::submissions::{
    entities::Submission, requests::ReviewSubmissionRequest, responses::SubmissionListItem,
};
use crate::storage::Storage;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
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

    // 学生上传作业（multipart）
    pub async fn create_submission(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        create::create_submission(self, request, payload).await
    }

    pub async fn list_my_submissions(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_my_submissions(self, request).await
    }

    // 班级提交列表（需先经过班级访问检查）
    pub async fn list_class_submissions(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_class_submissions(self, request).await
    }

    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, request, submission_id).await
    }

    // 教师批改
    pub async fn review_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        review_data: ReviewSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        review::review_submission(self, request, submission_id, review_data).await
    }
}

/// 为提交补充学生姓名和文件信息
pub(crate) async fn with_details(
    storage: &Arc<dyn Storage>,
    submissions: Vec<Submission>,
) -> Result<Vec<SubmissionListItem>> {
    let mut student_ids: Vec<i64> = submissions.iter().map(|s| s.student_id).collect();
    student_ids.sort_unstable();
    student_ids.dedup();
    let file_ids: Vec<String> = submissions.iter().map(|s| s.file_id.clone()).collect();

    let names: HashMap<i64, String> = storage
        .get_users_by_ids(&student_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();
    let mut files: HashMap<String, _> = storage
        .get_file_records(&file_ids)
        .await?
        .into_iter()
        .map(|f| (f.id.clone(), f))
        .collect();

    Ok(submissions
        .into_iter()
        .map(|submission| SubmissionListItem {
            student_name: names.get(&submission.student_id).cloned().unwrap_or_default(),
            file: files.remove(&submission.file_id),
            submission,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::test_support::{TestContext, call, multipart_body, sign_in, test_app};

    const PDF: &[u8] = b"%PDF-1.4\n%portal test\n";

    /// 教师建班、学生入班并布置一份作业
    macro_rules! classroom {
        ($app:expr, $ctx:expr) => {{
            let teacher = sign_in!($app, $ctx, "t@example.com", "Grace Hopper", "teacher");
            let student = sign_in!($app, $ctx, "s@example.com", "Sam Student", "student");
            let (_, body) = call!(
                $app,
                $ctx.post_json("/api/v1/classes", Some(&teacher), json!({"name": "Systems"}))
            );
            let class_id = body["data"]["id"].as_i64().expect("class id");
            let (status, _) = call!(
                $app,
                $ctx.post_json(&format!("/api/v1/classes/{class_id}/join"), Some(&student), json!({}))
            );
            assert_eq!(status, 201);
            let (_, body) = call!(
                $app,
                $ctx.post_json(
                    "/api/v1/assignments",
                    Some(&teacher),
                    json!({"class_id": class_id, "course": "CS", "title": "Lab 1"}),
                )
            );
            let assignment_id = body["data"]["id"].as_i64().expect("assignment id");
            (teacher, student, class_id, assignment_id)
        }};
    }

    #[actix_web::test]
    async fn test_submit_once_then_conflict() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let (_teacher, student, _class_id, assignment_id) = classroom!(app, ctx);
        let id = assignment_id.to_string();

        let body = multipart_body(
            &[("assignment_id", id.as_str()), ("note", " first try ")],
            &[("file", "lab1.pdf", "application/pdf", PDF)],
        );
        let (status, resp) = call!(app, ctx.post_multipart("/api/v1/submissions", Some(&student), body));
        assert_eq!(status, 201, "{resp}");
        assert_eq!(resp["data"]["status"], "pending");
        assert_eq!(resp["data"]["grade"], serde_json::Value::Null);
        assert_eq!(resp["data"]["feedback"], "");
        assert_eq!(resp["data"]["note"], "first try");

        let body = multipart_body(
            &[("assignment_id", id.as_str())],
            &[("file", "lab1-v2.pdf", "application/pdf", PDF)],
        );
        let (status, resp) = call!(app, ctx.post_multipart("/api/v1/submissions", Some(&student), body));
        assert_eq!(status, 409, "{resp}");

        let (status, resp) = call!(app, ctx.get("/api/v1/submissions/mine", Some(&student)));
        assert_eq!(status, 200);
        let items = resp["data"]["items"].as_array().expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["file"]["original_name"], "lab1.pdf");
        assert_eq!(items[0]["student_name"], "Sam Student");
    }

    #[actix_web::test]
    async fn test_upload_validation() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let (teacher, student, _class_id, assignment_id) = classroom!(app, ctx);
        let outsider = sign_in!(app, ctx, "x@example.com", "Xena", "student");
        let id = assignment_id.to_string();

        let cases: Vec<(Vec<u8>, u16)> = vec![
            // 未提供文件
            (multipart_body(&[("assignment_id", id.as_str())], &[]), 400),
            // 不在允许列表中的类型
            (
                multipart_body(&[("assignment_id", id.as_str())], &[("file", "a.gif", "image/gif", &b"GIF89a"[..])]),
                400,
            ),
            // 内容与声明类型不符
            (
                multipart_body(&[("assignment_id", id.as_str())], &[("file", "a.png", "image/png", &b"not a png"[..])]),
                400,
            ),
            (
                multipart_body(&[("assignment_id", id.as_str())], &[("file", "a.txt", "text/plain", &b""[..])]),
                400,
            ),
            // 多个文件
            (
                multipart_body(
                    &[("assignment_id", id.as_str())],
                    &[
                        ("file", "a.pdf", "application/pdf", PDF),
                        ("file", "b.pdf", "application/pdf", PDF),
                    ],
                ),
                400,
            ),
            (
                multipart_body(&[("assignment_id", "abc")], &[("file", "a.pdf", "application/pdf", PDF)]),
                400,
            ),
            (
                multipart_body(&[("assignment_id", "424242")], &[("file", "a.pdf", "application/pdf", PDF)]),
                404,
            ),
        ];
        for (i, (body, expected)) in cases.into_iter().enumerate() {
            let (status, resp) = call!(app, ctx.post_multipart("/api/v1/submissions", Some(&student), body));
            assert_eq!(status.as_u16(), expected, "case {i}: {resp}");
        }

        let body = multipart_body(&[("assignment_id", id.as_str())], &[("file", "a.pdf", "application/pdf", PDF)]);
        let (status, _) = call!(app, ctx.post_multipart("/api/v1/submissions", Some(&outsider), body));
        assert_eq!(status, 403);

        let body = multipart_body(&[("assignment_id", id.as_str())], &[("file", "a.pdf", "application/pdf", PDF)]);
        let (status, _) = call!(app, ctx.post_multipart("/api/v1/submissions", Some(&teacher), body));
        assert_eq!(status, 403);

        // 被拒绝的上传不留下提交
        let (_, resp) = call!(app, ctx.get("/api/v1/submissions/mine", Some(&student)));
        assert_eq!(resp["data"]["items"].as_array().map(Vec::len), Some(0));
    }

    #[actix_web::test]
    async fn test_review_and_visibility() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);
        let (teacher, student, class_id, assignment_id) = classroom!(app, ctx);
        let classmate = sign_in!(app, ctx, "c@example.com", "Cleo", "student");
        let other_teacher = sign_in!(app, ctx, "o@example.com", "Alan Turing", "teacher");
        call!(app, ctx.post_json(&format!("/api/v1/classes/{class_id}/join"), Some(&classmate), json!({})));

        let id = assignment_id.to_string();
        let mut submission_ids = Vec::new();
        for token in [&student, &classmate] {
            let body = multipart_body(&[("assignment_id", id.as_str())], &[("file", "notes.txt", "text/plain", &b"hello"[..])]);
            let (status, resp) = call!(app, ctx.post_multipart("/api/v1/submissions", Some(token), body));
            assert_eq!(status, 201, "{resp}");
            submission_ids.push(resp["data"]["id"].as_i64().expect("submission id"));
        }

        let list_uri = format!("/api/v1/classes/{class_id}/submissions");
        let (status, resp) = call!(app, ctx.get(&list_uri, Some(&teacher)));
        assert_eq!(status, 200);
        assert_eq!(resp["data"]["items"].as_array().map(Vec::len), Some(2));
        let (status, resp) = call!(app, ctx.get(&list_uri, Some(&student)));
        assert_eq!(status, 200);
        let items = resp["data"]["items"].as_array().expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["submission"]["id"].as_i64(), Some(submission_ids[0]));

        let detail_uri = format!("/api/v1/submissions/{}", submission_ids[0]);
        let (status, _) = call!(app, ctx.get(&detail_uri, Some(&student)));
        assert_eq!(status, 200);
        let (status, _) = call!(app, ctx.get(&detail_uri, Some(&teacher)));
        assert_eq!(status, 200);
        let (status, _) = call!(app, ctx.get(&detail_uri, Some(&classmate)));
        assert_eq!(status, 403);

        let review_uri = format!("/api/v1/submissions/{}/review", submission_ids[0]);
        for grade in [json!(101), json!(-1), json!(100.4), json!("-0.4"), json!("abc")] {
            let (status, resp) = call!(app, ctx.patch_json(&review_uri, Some(&teacher), json!({"grade": grade})));
            assert_eq!(status, 400, "{resp}");
        }
        let (status, _) = call!(app, ctx.patch_json(&review_uri, Some(&teacher), json!({"status": "done"})));
        assert_eq!(status, 400);
        let (status, _) = call!(app, ctx.patch_json(&review_uri, Some(&other_teacher), json!({"grade": 90})));
        assert_eq!(status, 403);
        let (status, _) = call!(app, ctx.patch_json(&review_uri, Some(&student), json!({"grade": 100})));
        assert_eq!(status, 403);

        let (status, resp) = call!(
            app,
            ctx.patch_json(&review_uri, Some(&teacher), json!({"grade": "92.6", "feedback": "  Nice work  "}))
        );
        assert_eq!(status, 200, "{resp}");
        assert_eq!(resp["data"]["grade"], 93);
        assert_eq!(resp["data"]["status"], "graded");
        assert_eq!(resp["data"]["feedback"], "Nice work");
        assert!(resp["data"]["reviewed_at"].is_string());

        // 空串清除分数，状态保持不变
        let (status, resp) = call!(app, ctx.patch_json(&review_uri, Some(&teacher), json!({"grade": ""})));
        assert_eq!(status, 200);
        assert_eq!(resp["data"]["grade"], serde_json::Value::Null);
        assert_eq!(resp["data"]["status"], "graded");
        assert_eq!(resp["data"]["feedback"], "Nice work");

        let (status, _) = call!(app, ctx.patch_json("/api/v1/submissions/999/review", Some(&teacher), json!({"grade": 1})));
        assert_eq!(status, 404);
    }
}
