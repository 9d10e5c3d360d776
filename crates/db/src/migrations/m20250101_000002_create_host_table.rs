//! Create host table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Host::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Host::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Host::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Host::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Host::Description).text())
                    .col(ColumnDef::new(Host::HostType).string_len(16).not_null())
                    .col(ColumnDef::new(Host::City).string_len(128).not_null())
                    .col(ColumnDef::new(Host::Address).string_len(512))
                    .col(ColumnDef::new(Host::ContactEmail).string_len(320))
                    .col(ColumnDef::new(Host::Website).string_len(1024))
                    .col(
                        ColumnDef::new(Host::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Host::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Host::UpdatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Host::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_host_user_id")
                            .from(Host::Table, Host::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_host_user_id")
                    .table(Host::Table)
                    .col(Host::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_host_city")
                    .table(Host::Table)
                    .col(Host::City)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Host::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Host {
    Table,
    Id,
    UserId,
    Name,
    Description,
    HostType,
    City,
    Address,
    ContactEmail,
    Website,
    IsVerified,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
