use sea_orm::entity::prelude::*;

use crate::types::DoStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub sap_do_number: String,
    pub branch: String,
    pub delivery_date: Date,
    pub sales_admin_remarks: Option<String>,
    pub overall_status: DoStatus,
    pub sales_admin_name: String,
    pub sales_admin_email: String,
    pub dispatcher_name: Option<String>,
    pub dispatcher_email: Option<String>,
    pub dispatcher_ack_time: Option<DateTimeUtc>,
    pub shipment_qty: Option<i64>,
    pub dispatcher_notes: Option<String>,
    pub shipment_time: Option<DateTimeUtc>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTimeUtc,
    pub last_updated: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
