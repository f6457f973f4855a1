use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000002_create_users::User;
use super::m20250301_000004_create_destinations::Destination;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(pk_auto(Booking::Id))
                    .col(string_len(Booking::CustomerName, 100).not_null())
                    .col(string_len(Booking::CustomerEmail, 255).not_null())
                    .col(uuid(Booking::DestinationId).not_null())
                    .col(date(Booking::TravelDate).not_null())
                    // PENDING, CONFIRMED or CANCELLED
                    .col(string_len(Booking::Status, 20).not_null().default("PENDING"))
                    .col(uuid_null(Booking::CreatedByUserId))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Booking::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_destination")
                            .from(Booking::Table, Booking::DestinationId)
                            .to(Destination::Table, Destination::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_created_by")
                            .from(Booking::Table, Booking::CreatedByUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_destination_status")
                    .table(Booking::Table)
                    .col(Booking::DestinationId)
                    .col(Booking::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    #[sea_orm(iden = "bookings")]
    Table,
    Id,
    CustomerName,
    CustomerEmail,
    DestinationId,
    TravelDate,
    Status,
    CreatedByUserId,
    CreatedAt,
    UpdatedAt,
}
