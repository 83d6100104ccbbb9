//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Contact email address
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Argon2 password hash
    pub password_hash: String,

    /// Disabled accounts cannot authenticate
    #[sea_orm(default_value = false)]
    pub is_disabled: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::device_registration::Entity")]
    DeviceRegistrations,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::device_registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeviceRegistrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
