use serde::Serialize;
use ts_rs::TS;

use super::entities::ClassMember;
use crate::models::classes::entities::Class;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "class_member.ts")]
pub struct JoinClassResponse {
    pub class: Class,
    pub membership: ClassMember,
    pub already_member: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "class_member.ts")]
pub struct ClassMemberListResponse {
    pub items: Vec<ClassMember>,
}
