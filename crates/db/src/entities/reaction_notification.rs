//! Reaction notification entity.
//!
//! One row per reaction, addressed to the post's author. The `sent` flag
//! transitions false to true exactly once: either at creation time when a
//! reachable device was found, or later when the backlog is flushed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::reaction::Emoji;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reaction_notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The post that was reacted to
    pub post_id: String,

    /// Post title, denormalized at creation time for notification text
    pub post_title: String,

    /// The user receiving the notification (the post's author)
    #[sea_orm(indexed)]
    pub recipient_id: String,

    /// The user who reacted
    pub reactor_id: String,

    /// Reactor display name, denormalized for notification text
    pub reactor_name: String,

    pub emoji: Emoji,

    /// Whether a push dispatch has been attempted for this notification
    #[sea_orm(default_value = false)]
    pub sent: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Recipient,

    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl ActiveModelBehavior for ActiveModel {}
