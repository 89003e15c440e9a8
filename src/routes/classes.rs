use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::classes::requests::{CreateClassRequest, JoinByCodeRequest, TeacherSearchQuery};
use crate::models::users::entities::UserRole;
use crate::services::{AssignmentService, ClassService, SubmissionService};
use crate::utils::SafeClassIdI64;

// 懒加载的全局 CLASS_SERVICE 实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

// HTTP处理程序
pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn list_my_classes(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_my_classes(&req).await
}

pub async fn search_by_teacher(
    req: HttpRequest,
    query: web::Query<TeacherSearchQuery>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .search_by_teacher(&req, query.into_inner())
        .await
}

pub async fn get_class_by_code(
    req: HttpRequest,
    code: web::Path<String>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .get_class_by_code(&req, code.into_inner())
        .await
}

pub async fn join_by_code(
    req: HttpRequest,
    join_data: web::Json<JoinByCodeRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .join_by_code(&req, join_data.into_inner())
        .await
}

pub async fn join_by_id(req: HttpRequest, class_id: SafeClassIdI64) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.join_by_id(&req, class_id.0).await
}

pub async fn list_members(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_members(&req).await
}

pub async fn list_class_assignments(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_class_assignments(&req).await
}

pub async fn list_class_submissions(req: HttpRequest) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.list_class_submissions(&req).await
}

// 配置路由
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes")
            .wrap(middlewares::RequireSession)
            .service(
                // 教师创建班级
                web::resource("").route(
                    web::post()
                        .to(create_class)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .route("/mine", web::get().to(list_my_classes))
            .route("/search", web::get().to(search_by_teacher))
            .service(
                web::resource("/code/{code}")
                    .wrap(middlewares::RateLimit::class_code())
                    .route(web::get().to(get_class_by_code)),
            )
            .service(
                web::resource("/join")
                    .wrap(middlewares::RateLimit::class_code())
                    .route(
                        web::post()
                            .to(join_by_code)
                            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                    ),
            )
            .service(
                web::resource("/{class_id}/join").route(
                    web::post()
                        .to(join_by_id)
                        .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                ),
            )
            .service(
                // 仅班级教师可查看成员
                web::resource("/{class_id}/members")
                    .wrap(middlewares::RequireClassAccess::owner())
                    .route(web::get().to(list_members)),
            )
            .service(
                web::resource("/{class_id}/assignments")
                    .wrap(middlewares::RequireClassAccess::owner_or_member())
                    .route(web::get().to(list_class_assignments)),
            )
            .service(
                // 教师看到全部提交，学生只看到自己的
                web::resource("/{class_id}/submissions")
                    .wrap(middlewares::RequireClassAccess::owner_or_member())
                    .route(web::get().to(list_class_submissions)),
            ),
    );
}
