use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Dos::Table)
                    .col(pk_id_col(manager, Dos::Id))
                    .col(uuid_col(Dos::Uuid))
                    .col(ColumnDef::new(Dos::SapDoNumber).string().not_null())
                    .col(ColumnDef::new(Dos::Branch).string().not_null())
                    .col(ColumnDef::new(Dos::DeliveryDate).date().not_null())
                    .col(ColumnDef::new(Dos::SalesAdminRemarks).text())
                    .col(
                        ColumnDef::new(Dos::OverallStatus)
                            .string_len(64)
                            .not_null()
                            .default(Expr::val("รอยืนยัน DO")),
                    )
                    .col(ColumnDef::new(Dos::SalesAdminName).string().not_null())
                    .col(ColumnDef::new(Dos::SalesAdminEmail).string().not_null())
                    .col(ColumnDef::new(Dos::DispatcherName).string())
                    .col(ColumnDef::new(Dos::DispatcherEmail).string())
                    .col(ColumnDef::new(Dos::DispatcherAckTime).timestamp())
                    .col(ColumnDef::new(Dos::ShipmentQty).big_integer())
                    .col(ColumnDef::new(Dos::DispatcherNotes).text())
                    .col(ColumnDef::new(Dos::ShipmentTime).timestamp())
                    .col(ColumnDef::new(Dos::RejectionReason).text())
                    .col(timestamp_col(Dos::CreatedAt))
                    .col(ColumnDef::new(Dos::LastUpdated).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_dos_uuid")
                    .table(Dos::Table)
                    .col(Dos::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_dos_overall_status")
                    .table(Dos::Table)
                    .col(Dos::OverallStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_dos_dispatcher_email")
                    .table(Dos::Table)
                    .col(Dos::DispatcherEmail)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_dos_delivery_date")
                    .table(Dos::Table)
                    .col(Dos::DeliveryDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Dos::Table).to_owned())
            .await
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Dos {
    Table,
    Id,
    Uuid,
    SapDoNumber,
    Branch,
    DeliveryDate,
    SalesAdminRemarks,
    OverallStatus,
    SalesAdminName,
    SalesAdminEmail,
    DispatcherName,
    DispatcherEmail,
    DispatcherAckTime,
    ShipmentQty,
    DispatcherNotes,
    ShipmentTime,
    RejectionReason,
    CreatedAt,
    LastUpdated,
}
