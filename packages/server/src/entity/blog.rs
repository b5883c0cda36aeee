use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub title: String,
    pub author: Option<String>,
    pub url: String,
    #[sea_orm(default_value = 0)]
    pub likes: i32,

    /// JSON array of comment strings.
    #[sea_orm(column_type = "Json")]
    pub comments: serde_json::Value,

    /// NULL for blogs created without an owner (e.g. imported or seeded data).
    pub user_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
