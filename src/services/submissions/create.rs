//! 作业上传
//!
//! 整个 multipart 请求先读入内存（受 `upload.max_size` 限制），
//! 校验通过后再写入文件存储并创建提交记录。

use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::SubmissionService;
use crate::config::AppConfig;
use crate::file_store::FileStore;
use crate::middlewares::RequireSession;
use crate::models::{
    ApiResponse, ErrorCode,
    files::requests::NewStoredFile,
    submissions::requests::NewSubmission,
};
use crate::storage::Storage;
use crate::utils::validate::{MAX_FEEDBACK_LEN, non_empty, sanitize_filename};
use crate::utils::validate_magic_bytes;

/// 文本字段的最大字节数
const MAX_TEXT_FIELD_SIZE: usize = 16 * 1024;

struct UploadedFile {
    original_name: String,
    content_type: String,
    data: Vec<u8>,
}

#[derive(Default)]
struct SubmissionForm {
    assignment_id: Option<String>,
    note: Option<String>,
    file: Option<UploadedFile>,
}

fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

fn upload_failed() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::SubmissionFailed,
        "Submission failed",
    ))
}

/// 读取整个表单，只做结构性检查：大小上限与文件字段数量
async fn read_form(mut payload: Multipart, max_size: usize) -> Result<SubmissionForm, HttpResponse> {
    let mut form = SubmissionForm::default();

    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(bad_request(
                    ErrorCode::BadRequest,
                    format!("Malformed multipart body: {e}"),
                ));
            }
        };

        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            if form.file.is_some() {
                return Err(bad_request(
                    ErrorCode::MultifileUploadNotAllowed,
                    "Only one file can be submitted",
                ));
            }

            let original_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(sanitize_filename)
                .unwrap_or_else(|| "upload".to_string());
            let content_type = field
                .content_type()
                .map(|mime| mime.essence_str().to_ascii_lowercase())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let mut data = Vec::new();
            loop {
                match field.try_next().await {
                    Ok(Some(chunk)) => {
                        if data.len() + chunk.len() > max_size {
                            return Err(bad_request(
                                ErrorCode::FileSizeExceeded,
                                format!("File size exceeds the limit of {max_size} bytes"),
                            ));
                        }
                        data.extend_from_slice(&chunk);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        return Err(bad_request(
                            ErrorCode::BadRequest,
                            format!("Malformed multipart body: {e}"),
                        ));
                    }
                }
            }

            form.file = Some(UploadedFile {
                original_name,
                content_type,
                data,
            });
        } else {
            let mut buf = Vec::new();
            loop {
                match field.try_next().await {
                    Ok(Some(chunk)) => {
                        if buf.len() + chunk.len() > MAX_TEXT_FIELD_SIZE {
                            return Err(bad_request(
                                ErrorCode::BadRequest,
                                format!("Field '{name}' is too large"),
                            ));
                        }
                        buf.extend_from_slice(&chunk);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        return Err(bad_request(
                            ErrorCode::BadRequest,
                            format!("Malformed multipart body: {e}"),
                        ));
                    }
                }
            }
            let value = String::from_utf8_lossy(&buf).into_owned();
            match name.as_str() {
                "assignment_id" => form.assignment_id = Some(value),
                "note" => form.note = Some(value),
                // 忽略未知字段
                _ => {}
            }
        }
    }

    Ok(form)
}

pub async fn create_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let config = AppConfig::get();
    let storage = service.get_storage(request);

    let Some(uid) = RequireSession::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user id",
        )));
    };

    // 1. 读取表单
    let form = match read_form(payload, config.upload.max_size).await {
        Ok(form) => form,
        Err(response) => return Ok(response),
    };

    let assignment_id = match form
        .assignment_id
        .as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
    {
        Some(id) => id,
        None => {
            return Ok(bad_request(
                ErrorCode::BadRequest,
                "A valid assignment_id is required",
            ));
        }
    };

    let note = form.note.as_deref().and_then(non_empty);
    if note
        .as_ref()
        .is_some_and(|n| n.chars().count() > MAX_FEEDBACK_LEN)
    {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            format!("Note must be at most {MAX_FEEDBACK_LEN} characters"),
        ));
    }

    // 2. 作业存在且学生已加入班级
    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            )));
        }
        Err(e) => {
            error!("Failed to load assignment {}: {}", assignment_id, e);
            return Ok(upload_failed());
        }
    };

    match storage.get_class_member(assignment.class_id, uid).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::NotClassMember,
                "You are not a member of this class",
            )));
        }
        Err(e) => {
            error!("Failed to check membership: {}", e);
            return Ok(upload_failed());
        }
    }

    // 3. 已提交过则拒绝，避免无谓写入文件
    match storage.get_student_submission(assignment.id, uid).await {
        Ok(Some(_)) => return Ok(already_submitted()),
        Ok(None) => {}
        Err(e) => {
            error!("Failed to check existing submission: {}", e);
            return Ok(upload_failed());
        }
    }

    // 4. 文件校验
    let Some(file) = form.file else {
        return Ok(bad_request(ErrorCode::BadRequest, "A file is required"));
    };
    if file.data.is_empty() {
        return Ok(bad_request(ErrorCode::BadRequest, "Uploaded file is empty"));
    }

    if !config
        .upload
        .allowed_types
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&file.content_type))
    {
        return Ok(bad_request(
            ErrorCode::FileTypeNotAllowed,
            format!("File type '{}' is not allowed", file.content_type),
        ));
    }

    if !validate_magic_bytes(&file.data, &file.content_type) {
        return Ok(bad_request(
            ErrorCode::FileTypeNotAllowed,
            "File content does not match its declared type",
        ));
    }

    // 5. 写入文件与提交
    let file_store = service.get_file_store(request);
    let file_id = Uuid::new_v4().to_string();
    let size = file.data.len() as i64;

    if let Err(e) = file_store.put(&file_id, file.data).await {
        error!("Failed to store uploaded file: {}", e);
        return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::FileUploadFailed,
            "Failed to store file",
        )));
    }

    let record = NewStoredFile {
        id: file_id.clone(),
        original_name: file.original_name,
        content_type: file.content_type,
        size,
        backend: file_store.name().to_string(),
        uploader_id: uid,
    };
    if let Err(e) = storage.create_file_record(record).await {
        error!("Failed to create file record: {}", e);
        discard_upload(&storage, &file_store, &file_id, false).await;
        return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::FileUploadFailed,
            "Failed to store file",
        )));
    }

    let new_submission = NewSubmission {
        class_id: assignment.class_id,
        assignment_id: assignment.id,
        teacher_id: assignment.teacher_id,
        student_id: uid,
        file_id: file_id.clone(),
        note,
    };

    match storage.create_submission(new_submission).await {
        Ok(submission) => {
            info!(
                "Student {} submitted assignment {} (submission {}, {} bytes)",
                uid, assignment.id, submission.id, size
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                submission,
                "Submission created successfully",
            )))
        }
        // 并发提交：唯一索引兜底
        Err(e) if e.is_conflict() => {
            discard_upload(&storage, &file_store, &file_id, true).await;
            Ok(already_submitted())
        }
        Err(e) => {
            error!("Failed to create submission: {}", e);
            discard_upload(&storage, &file_store, &file_id, true).await;
            Ok(upload_failed())
        }
    }
}

fn already_submitted() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::SubmissionAlreadyExists,
        "You have already submitted this assignment",
    ))
}

/// 清理已写入的文件内容与记录，失败只记录日志
async fn discard_upload(
    storage: &Arc<dyn Storage>,
    file_store: &Arc<dyn FileStore>,
    file_id: &str,
    has_record: bool,
) {
    if has_record && let Err(e) = storage.delete_file_record(file_id).await {
        warn!("Failed to delete orphan file record {}: {}", file_id, e);
    }
    if let Err(e) = file_store.delete(file_id).await {
        warn!("Failed to delete orphan file content {}: {}", file_id, e);
    }
}
