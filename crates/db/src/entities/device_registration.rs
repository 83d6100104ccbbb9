//! Device registration entity (push reachability records).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One claim that a device can receive pushes for a user until `expires_at`.
///
/// A user may hold several concurrent registrations (one per device). A
/// record is usable only while `active` is set and `expires_at` lies in the
/// future; deregistration flips `active` off rather than deleting the row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "device_registration")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    /// Provider-issued device registration token
    #[sea_orm(column_type = "Text")]
    pub device_token: String,

    #[sea_orm(default_value = true)]
    pub active: bool,

    pub expires_at: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
