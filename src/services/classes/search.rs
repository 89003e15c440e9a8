use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassService;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::{
        requests::TeacherSearchQuery,
        responses::{ClassSearchItem, ClassSearchResponse},
    },
    users::entities::UserRole,
};

/// 查询串转小写后按空白切分
fn search_tokens(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// 每个关键词都是姓名的子串才算匹配
fn name_matches(name: &str, tokens: &[String]) -> bool {
    let name = name.to_lowercase();
    tokens.iter().all(|token| name.contains(token.as_str()))
}

pub async fn search_by_teacher(
    service: &ClassService,
    request: &HttpRequest,
    query: TeacherSearchQuery,
) -> ActixResult<HttpResponse> {
    let tokens = search_tokens(query.teacher.as_deref().unwrap_or_default());
    if tokens.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Query parameter 'teacher' is required",
        )));
    }

    let storage = service.get_storage(request);

    let teachers = match storage.list_users_with_role(UserRole::Teacher).await {
        Ok(teachers) => teachers,
        Err(e) => {
            error!("Failed to list teachers: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Class search failed",
                )),
            );
        }
    };

    let names: HashMap<i64, String> = teachers
        .into_iter()
        .filter(|t| name_matches(&t.name, &tokens))
        .map(|t| (t.id, t.name))
        .collect();
    let teacher_ids: Vec<i64> = names.keys().copied().collect();

    let classes = match storage.list_classes_by_teachers(&teacher_ids).await {
        Ok(classes) => classes,
        Err(e) => {
            error!("Failed to list classes for search: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Class search failed",
                )),
            );
        }
    };

    let items = classes
        .into_iter()
        .map(|class| ClassSearchItem {
            teacher_name: names.get(&class.teacher_id).cloned().unwrap_or_default(),
            id: class.id,
            name: class.name,
            description: class.description,
            teacher_id: class.teacher_id,
            created_at: class.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ClassSearchResponse { items },
        "Search completed",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_tokens() {
        assert_eq!(search_tokens("  Ada   LOVE "), vec!["ada", "love"]);
        assert!(search_tokens("   ").is_empty());
    }

    #[test]
    fn test_name_matches() {
        let tokens = search_tokens("ada love");
        assert!(name_matches("Ada Lovelace", &tokens));
        assert!(name_matches("LOVELACE, ADA", &tokens));
        assert!(!name_matches("Ada Byron", &tokens));
        assert!(name_matches("anything", &[]));
    }
}
