use actix_web::http::header::{
    self, Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::FileService;
use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode, users::entities::UserRole};

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::InternalServerError, message))
}

/// 非 ASCII 文件名使用 RFC 5987 的 filename* 形式
pub(crate) fn attachment_disposition(file_name: &str) -> ContentDisposition {
    let param = if file_name.is_ascii() {
        DispositionParam::Filename(file_name.to_string())
    } else {
        DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: file_name.as_bytes().to_vec(),
        })
    };
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![param],
    }
}

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    file_id: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (Some(uid), Some(role)) = (
        RequireSession::extract_user_id(request),
        RequireSession::extract_active_role(request),
    ) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing session",
        )));
    };

    let record = match storage.get_file_record(&file_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File not found",
            )));
        }
        Err(e) => {
            error!("File query failed for {}: {}", file_id, e);
            return Ok(internal_error("File query failed"));
        }
    };

    // 提交的学生与班级教师可下载；未关联提交的文件只有上传者可下载
    let allowed = match storage.get_submission_by_file_id(&file_id).await {
        Ok(Some(submission)) => match role {
            UserRole::Student => submission.student_id == uid,
            UserRole::Teacher => submission.teacher_id == uid,
        },
        Ok(None) => record.uploader_id == uid,
        Err(e) => {
            error!("Submission query failed for file {}: {}", file_id, e);
            return Ok(internal_error("File query failed"));
        }
    };
    if !allowed {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "No permission to download this file",
        )));
    }

    let file_store = service.get_file_store(request);
    let data = match file_store.get(&record.id).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File content not found",
            )));
        }
        Err(e) => {
            error!("File read failed for {} ({}): {}", record.id, record.backend, e);
            return Ok(internal_error("File read failed"));
        }
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, record.content_type.clone()))
        .insert_header(attachment_disposition(&record.original_name))
        .body(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_disposition() {
        let ascii = attachment_disposition("report.pdf");
        assert!(ascii.is_attachment());
        assert_eq!(ascii.get_filename(), Some("report.pdf"));

        let unicode = attachment_disposition("作业.pdf");
        assert!(unicode.is_attachment());
        let ext = unicode.get_filename_ext().expect("extended filename");
        assert_eq!(ext.value, "作业.pdf".as_bytes());
    }
}
