//! Create `payment` and the `payment_store` join table used by mass payments.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payment::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(big_integer_null(Payment::TaskId))
                    .col(decimal_len(Payment::Amount, 10, 2))
                    .col(string_len(Payment::Status, 20))
                    .col(string_len_null(Payment::PaymentType, 20))
                    .col(timestamp_with_time_zone_null(Payment::PaymentDate))
                    .col(string_len_null(Payment::PaymentReference, 100))
                    .col(text_null(Payment::Notes))
                    .col(string_len_null(Payment::Region, 100))
                    .col(string_len_null(Payment::RetailNetwork, 100))
                    .col(string_len_null(Payment::LegalEntity, 100))
                    .col(string_len_null(Payment::PaymentRecipient, 100))
                    .col(string_len_null(Payment::Oktmo, 20))
                    .col(boolean(Payment::BankMarkRequired).default(false))
                    .col(timestamp_with_time_zone(Payment::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_task")
                            .from(Payment::Table, Payment::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentStore::Table)
                    .if_not_exists()
                    .col(big_integer(PaymentStore::PaymentId))
                    .col(big_integer(PaymentStore::StoreId))
                    .primary_key(Index::create().col(PaymentStore::PaymentId).col(PaymentStore::StoreId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_store_payment")
                            .from(PaymentStore::Table, PaymentStore::PaymentId)
                            .to(Payment::Table, Payment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_store_store")
                            .from(PaymentStore::Table, PaymentStore::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PaymentStore::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Payment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Payment {
    Table,
    Id,
    TaskId,
    Amount,
    Status,
    PaymentType,
    PaymentDate,
    PaymentReference,
    Notes,
    Region,
    RetailNetwork,
    LegalEntity,
    PaymentRecipient,
    Oktmo,
    BankMarkRequired,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PaymentStore { Table, PaymentId, StoreId }

#[derive(DeriveIden)]
enum Task { Table, Id }

#[derive(DeriveIden)]
enum Store { Table, Id }
