use serde::Serialize;
use ts_rs::TS;

use crate::models::users::{entities::UserRole, responses::UserResponse};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub selected_role: UserRole,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct MeResponse {
    pub user: UserResponse,
    pub active_role: UserRole,
    pub session_expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct VerifyResetCodeResponse {
    pub reset_token: String,
    pub expires_in: i64,
}
