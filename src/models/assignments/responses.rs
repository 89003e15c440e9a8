use serde::Serialize;
use ts_rs::TS;

use super::entities::Assignment;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
}
