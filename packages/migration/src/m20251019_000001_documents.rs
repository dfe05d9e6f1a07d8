use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Documents {
    Table,
    Collection,
    Id,
    ParentId,
    OrderKey,
    Body,
    Version,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // documents: one row per document, keyed by (collection, id)
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Collection).string().not_null())
                    .col(ColumnDef::new(Documents::Id).string().not_null())
                    .col(ColumnDef::new(Documents::ParentId).string().null())
                    .col(
                        ColumnDef::new(Documents::OrderKey)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Documents::Body).text().not_null())
                    .col(
                        ColumnDef::new(Documents::Version)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_documents")
                            .col(Documents::Collection)
                            .col(Documents::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Page scans: newest first within a collection, optionally per parent
        manager
            .create_index(
                Index::create()
                    .name("idx_documents_collection_order")
                    .table(Documents::Table)
                    .col(Documents::Collection)
                    .col(Documents::OrderKey)
                    .col(Documents::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_documents_parent_order")
                    .table(Documents::Table)
                    .col(Documents::Collection)
                    .col(Documents::ParentId)
                    .col(Documents::OrderKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).if_exists().to_owned())
            .await
    }
}
