use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The role assigned when a profile is created without one.
pub const DEFAULT_ROLE: &str = "user";

/// Per-user profile keyed by the identity provider's user id.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub email: String,
    pub full_name: Option<String>,
    /// One of `user`, `admin`, `super_admin`.
    pub role: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
