//! Create application table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Application::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Application::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Application::ApplicantId).string_len(32).not_null())
                    .col(ColumnDef::new(Application::OpportunityId).string_len(32).not_null())
                    .col(ColumnDef::new(Application::HostId).string_len(32).not_null())
                    .col(ColumnDef::new(Application::HostUserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Application::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Application::StartDate).date().not_null())
                    .col(ColumnDef::new(Application::EndDate).date().not_null())
                    .col(ColumnDef::new(Application::Message).text().not_null())
                    .col(ColumnDef::new(Application::Review).json_binary())
                    .col(ColumnDef::new(Application::Cancellation).json_binary())
                    .col(ColumnDef::new(Application::Completion).json_binary())
                    .col(
                        ColumnDef::new(Application::StatusHistory)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Application::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Application::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_opportunity_id")
                            .from(Application::Table, Application::OpportunityId)
                            .to(Opportunity::Table, Opportunity::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_applicant_id")
                            .from(Application::Table, Application::ApplicantId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_application_applicant_id")
                    .table(Application::Table)
                    .col(Application::ApplicantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_application_host_user_id")
                    .table(Application::Table)
                    .col(Application::HostUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_application_opportunity_id")
                    .table(Application::Table)
                    .col(Application::OpportunityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Application::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Application {
    Table,
    Id,
    ApplicantId,
    OpportunityId,
    HostId,
    HostUserId,
    Status,
    StartDate,
    EndDate,
    Message,
    Review,
    Cancellation,
    Completion,
    StatusHistory,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Opportunity {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
