//! Create reaction notification table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReactionNotification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReactionNotification::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReactionNotification::PostId)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReactionNotification::PostTitle)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReactionNotification::RecipientId)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReactionNotification::ReactorId)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReactionNotification::ReactorName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReactionNotification::Emoji).string_len(8).not_null())
                    .col(
                        ColumnDef::new(ReactionNotification::Sent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ReactionNotification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reaction_notification_recipient")
                            .from(
                                ReactionNotification::Table,
                                ReactionNotification::RecipientId,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (recipient_id, sent) - the backlog flush query
        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_notification_recipient_sent")
                    .table(ReactionNotification::Table)
                    .col(ReactionNotification::RecipientId)
                    .col(ReactionNotification::Sent)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReactionNotification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReactionNotification {
    Table,
    Id,
    PostId,
    PostTitle,
    RecipientId,
    ReactorId,
    ReactorName,
    Emoji,
    Sent,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
