//! Create opportunity table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Opportunity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Opportunity::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Opportunity::HostId).string_len(32).not_null())
                    .col(ColumnDef::new(Opportunity::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Opportunity::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Opportunity::Description).text().not_null())
                    .col(ColumnDef::new(Opportunity::City).string_len(128).not_null())
                    .col(ColumnDef::new(Opportunity::WorkHoursPerWeek).integer())
                    .col(ColumnDef::new(Opportunity::MinStayDays).integer())
                    .col(ColumnDef::new(Opportunity::MaxStayDays).integer())
                    .col(
                        ColumnDef::new(Opportunity::Positions)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Opportunity::Benefits)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Opportunity::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Opportunity::StatusHistory)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Opportunity::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Opportunity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Opportunity::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunity_host_id")
                            .from(Opportunity::Table, Opportunity::HostId)
                            .to(Host::Table, Host::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_opportunity_host_id")
                    .table(Opportunity::Table)
                    .col(Opportunity::HostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_opportunity_user_id")
                    .table(Opportunity::Table)
                    .col(Opportunity::UserId)
                    .to_owned(),
            )
            .await?;

        // Composite index: public listing by status, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_opportunity_status_created_at")
                    .table(Opportunity::Table)
                    .col(Opportunity::Status)
                    .col(Opportunity::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Opportunity::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Opportunity {
    Table,
    Id,
    HostId,
    UserId,
    Title,
    Description,
    City,
    WorkHoursPerWeek,
    MinStayDays,
    MaxStayDays,
    Positions,
    Benefits,
    Status,
    StatusHistory,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Host {
    Table,
    Id,
}
