pub mod assignments;
pub mod auth;
pub mod class_members;
pub mod classes;
pub mod common;
pub mod files;
pub mod submissions;
pub mod users;

pub use common::error_code::ErrorCode;
pub use common::response::ApiResponse;

/// 进程启动时间，用于健康检查与启动耗时统计
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
