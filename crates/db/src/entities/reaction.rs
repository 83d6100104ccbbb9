//! Reaction entity (emoji reactions to posts).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The closed set of reaction emoji.
///
/// Reactions are a tagged variant type, not an open string: anything outside
/// this set is rejected at the validation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum Emoji {
    #[sea_orm(string_value = "👍")]
    #[serde(rename = "👍")]
    ThumbsUp,
    #[sea_orm(string_value = "❤️")]
    #[serde(rename = "❤️")]
    Heart,
    #[sea_orm(string_value = "😀")]
    #[serde(rename = "😀")]
    Grinning,
    #[sea_orm(string_value = "😂")]
    #[serde(rename = "😂")]
    Joy,
    #[sea_orm(string_value = "😮")]
    #[serde(rename = "😮")]
    Surprised,
    #[sea_orm(string_value = "😢")]
    #[serde(rename = "😢")]
    Crying,
}

impl Emoji {
    /// Parse an emoji from its codepoint string, rejecting anything outside
    /// the closed set.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "👍" => Some(Self::ThumbsUp),
            "❤️" => Some(Self::Heart),
            "😀" => Some(Self::Grinning),
            "😂" => Some(Self::Joy),
            "😮" => Some(Self::Surprised),
            "😢" => Some(Self::Crying),
            _ => None,
        }
    }

    /// The emoji codepoint string, as stored and as rendered in push bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍",
            Self::Heart => "❤️",
            Self::Grinning => "😀",
            Self::Joy => "😂",
            Self::Surprised => "😮",
            Self::Crying => "😢",
        }
    }
}

impl std::fmt::Display for Emoji {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The post being reacted to
    #[sea_orm(indexed)]
    pub post_id: String,

    /// The user who reacted
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Reactor display name (denormalized for notification text)
    pub user_name: String,

    pub emoji: Emoji,

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

    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
