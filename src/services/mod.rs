pub mod assignments;
pub mod auth;
pub mod classes;
pub mod files;
pub mod health;
pub mod submissions;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use classes::ClassService;
pub use files::FileService;
pub use health::HealthService;
pub use submissions::SubmissionService;
