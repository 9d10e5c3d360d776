//! Create image table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Image::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Image::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Image::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Image::PublicId).string_len(512).not_null())
                    .col(ColumnDef::new(Image::Url).string_len(1024).not_null())
                    .col(ColumnDef::new(Image::Width).integer().not_null())
                    .col(ColumnDef::new(Image::Height).integer().not_null())
                    .col(ColumnDef::new(Image::Format).string_len(16).not_null())
                    .col(ColumnDef::new(Image::Bytes).big_integer().not_null())
                    .col(
                        ColumnDef::new(Image::Purpose)
                            .string_len(16)
                            .not_null()
                            .default("other"),
                    )
                    .col(
                        ColumnDef::new(Image::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Image::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_image_public_id")
                    .table(Image::Table)
                    .col(Image::PublicId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_image_owner_id")
                    .table(Image::Table)
                    .col(Image::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Image::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Image {
    Table,
    Id,
    OwnerId,
    PublicId,
    Url,
    Width,
    Height,
    Format,
    Bytes,
    Purpose,
    CreatedAt,
    DeletedAt,
}
