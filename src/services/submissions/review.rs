use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::SubmissionService;
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    submissions::{
        entities::{Submission, SubmissionStatus},
        requests::{ReviewSubmissionRequest, SubmissionReview},
    },
};
use crate::utils::validate::MAX_FEEDBACK_LEN;

/// 根据请求与当前提交计算批改结果
///
/// 未给出的字段保持原值；未指定状态但给出分数时视为已批改。
pub(crate) fn build_review(
    current: &Submission,
    req: &ReviewSubmissionRequest,
) -> Result<SubmissionReview, (ErrorCode, String)> {
    let status = match req.status.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(
            s.parse::<SubmissionStatus>()
                .map_err(|e| (ErrorCode::InvalidSubmissionStatus, e))?,
        ),
        _ => None,
    };

    let grade = req
        .grade
        .resolve()
        .map_err(|e| (ErrorCode::GradeOutOfRange, e))?;

    let feedback = match req.feedback.as_deref() {
        Some(f) => {
            let f = f.trim();
            if f.chars().count() > MAX_FEEDBACK_LEN {
                return Err((
                    ErrorCode::BadRequest,
                    format!("Feedback must be at most {MAX_FEEDBACK_LEN} characters"),
                ));
            }
            f.to_string()
        }
        None => current.feedback.clone(),
    };

    let status = match (status, grade) {
        (Some(status), _) => status,
        (None, Some(Some(_))) => SubmissionStatus::Graded,
        (None, _) => current.status,
    };

    Ok(SubmissionReview {
        status,
        grade: grade.unwrap_or(current.grade),
        feedback,
    })
}

pub async fn review_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    review_data: ReviewSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(uid) = RequireSession::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user id",
        )));
    };

    let current = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "Submission not found",
            )));
        }
        Err(e) => {
            error!("Failed to load submission {}: {}", submission_id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to review submission",
                )),
            );
        }
    };

    if current.teacher_id != uid {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::ClassPermissionDenied,
            "Only the class teacher can review this submission",
        )));
    }

    let review = match build_review(&current, &review_data) {
        Ok(review) => review,
        Err((code, message)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message)));
        }
    };

    match storage.review_submission(submission_id, review).await {
        Ok(Some(submission)) => {
            info!(
                "Teacher {} reviewed submission {} (status {}, grade {:?})",
                uid, submission.id, submission.status, submission.grade
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                submission,
                "Submission reviewed successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        ))),
        Err(e) => {
            error!("Failed to review submission {}: {}", submission_id, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to review submission",
                )),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submissions::requests::GradeInput;

    fn submission() -> Submission {
        Submission {
            id: 1,
            class_id: 1,
            assignment_id: 1,
            teacher_id: 10,
            student_id: 20,
            file_id: "f".to_string(),
            note: None,
            submitted_at: chrono::Utc::now(),
            status: SubmissionStatus::Pending,
            grade: None,
            feedback: String::new(),
            reviewed_at: None,
        }
    }

    fn request(status: Option<&str>, grade: GradeInput, feedback: Option<&str>) -> ReviewSubmissionRequest {
        ReviewSubmissionRequest {
            status: status.map(str::to_string),
            grade,
            feedback: feedback.map(str::to_string),
        }
    }

    #[test]
    fn test_grade_implies_graded() {
        let review = build_review(&submission(), &request(None, GradeInput::Value(88.4), None))
            .expect("valid review");
        assert_eq!(review.status, SubmissionStatus::Graded);
        assert_eq!(review.grade, Some(88));
        assert_eq!(review.feedback, "");
    }

    #[test]
    fn test_omitted_fields_keep_current_values() {
        let mut current = submission();
        current.status = SubmissionStatus::Graded;
        current.grade = Some(70);
        current.feedback = "ok".to_string();

        let review = build_review(&current, &request(None, GradeInput::Unchanged, None))
            .expect("valid review");
        assert_eq!(review.status, SubmissionStatus::Graded);
        assert_eq!(review.grade, Some(70));
        assert_eq!(review.feedback, "ok");

        let cleared = build_review(&current, &request(Some("pending"), GradeInput::Clear, Some("  redo ")))
            .expect("valid review");
        assert_eq!(cleared.status, SubmissionStatus::Pending);
        assert_eq!(cleared.grade, None);
        assert_eq!(cleared.feedback, "redo");
    }

    #[test]
    fn test_rejects_invalid_input() {
        let current = submission();
        let (code, _) = build_review(&current, &request(None, GradeInput::Value(100.6), None))
            .expect_err("grade out of range");
        assert_eq!(code, ErrorCode::GradeOutOfRange);

        let (code, _) = build_review(&current, &request(Some("done"), GradeInput::Unchanged, None))
            .expect_err("unknown status");
        assert_eq!(code, ErrorCode::InvalidSubmissionStatus);

        let long = "x".repeat(MAX_FEEDBACK_LEN + 1);
        let (code, _) = build_review(&current, &request(None, GradeInput::Unchanged, Some(&long)))
            .expect_err("feedback too long");
        assert_eq!(code, ErrorCode::BadRequest);
    }
}
