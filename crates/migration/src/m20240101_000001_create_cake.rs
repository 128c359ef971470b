//! Create `cake` table.
//!
//! Single table backing the cake catalogue; ids are assigned by the database.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cake::Table)
                    .if_not_exists()
                    .col(pk_auto(Cake::Id))
                    .col(string_len(Cake::Name, 255).not_null())
                    .col(text_null(Cake::Description))
                    .col(string_len_null(Cake::ImageUrl, 1024))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Cake::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Cake { Table, Id, Name, Description, ImageUrl }
