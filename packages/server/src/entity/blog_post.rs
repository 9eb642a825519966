use common::PostStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,

    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    /// JSON array of keyword strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub keywords: Json,

    #[sea_orm(indexed)]
    pub status: PostStatus,
    pub author_id: Uuid,
    pub published_at: Option<DateTimeUtc>,

    #[sea_orm(default_value = 0)]
    pub view_count: i64,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Set when the post is soft-deleted.
    #[sea_orm(indexed)]
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn keyword_list(&self) -> Vec<String> {
        serde_json::from_value(self.keywords.clone()).unwrap_or_default()
    }
}
