//! 文件元数据实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub original_name: String,
    pub content_type: String,
    pub size: i64,
    pub backend: String,
    pub uploader_id: i64,
    pub uploaded_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UploaderId",
        to = "super::users::Column::Id"
    )]
    Uploader,
    #[sea_orm(has_many = "super::file_chunks::Entity")]
    Chunks,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl Related<super::file_chunks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chunks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_stored_file(self) -> crate::models::files::entities::StoredFile {
        use crate::models::files::entities::StoredFile;
        use chrono::{DateTime, Utc};

        StoredFile {
            id: self.id,
            original_name: self.original_name,
            content_type: self.content_type,
            size: self.size,
            backend: self.backend,
            uploader_id: self.uploader_id,
            uploaded_at: DateTime::<Utc>::from_timestamp(self.uploaded_at, 0).unwrap_or_default(),
        }
    }
}
