//! Create device registration table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeviceRegistration::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceRegistration::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeviceRegistration::UserId)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceRegistration::DeviceToken)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceRegistration::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DeviceRegistration::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeviceRegistration::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_registration_user")
                            .from(DeviceRegistration::Table, DeviceRegistration::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, active) - reachability lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_device_registration_user_active")
                    .table(DeviceRegistration::Table)
                    .col(DeviceRegistration::UserId)
                    .col(DeviceRegistration::Active)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeviceRegistration::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DeviceRegistration {
    Table,
    Id,
    UserId,
    DeviceToken,
    Active,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
