use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Destination::Table)
                    .if_not_exists()
                    .col(uuid(Destination::Id).primary_key())
                    .col(string_len(Destination::Name, 100).not_null())
                    .col(string_len(Destination::Country, 100).not_null())
                    .col(string_len(Destination::City, 100).not_null())
                    .col(boolean(Destination::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Destination::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Destination::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Destination::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Destination {
    #[sea_orm(iden = "destinations")]
    Table,
    Id,
    Name,
    Country,
    City,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
