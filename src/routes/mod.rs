pub mod assignments;

pub mod auth;

pub mod classes;

pub mod files;

pub mod health;

pub mod submissions;

pub use assignments::configure_assignments_routes;
pub use auth::configure_auth_routes;
pub use classes::configure_classes_routes;
pub use files::configure_file_routes;
pub use health::configure_health_routes;
pub use submissions::configure_submissions_routes;

use actix_web::web;

/// 注册全部路由
pub fn configure_all(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_auth_routes)
        .configure(configure_classes_routes)
        .configure(configure_assignments_routes)
        .configure(configure_submissions_routes)
        .configure(configure_file_routes);
}
