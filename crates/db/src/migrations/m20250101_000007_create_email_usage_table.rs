//! Create email usage table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailUsage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailUsage::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailUsage::Provider).string_len(32).not_null())
                    .col(ColumnDef::new(EmailUsage::Day).date().not_null())
                    .col(
                        ColumnDef::new(EmailUsage::Count)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(EmailUsage::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailUsage::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailUsage {
    Table,
    Id,
    Provider,
    Day,
    Count,
    UpdatedAt,
}
