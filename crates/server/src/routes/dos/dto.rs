use chrono::{DateTime, NaiveDate, Utc};
use db::{models::do_task::DoTask, types::DoStatus};
use serde::Serialize;
use uuid::Uuid;

/// External shape of a delivery-order task. The field names are the frozen
/// client contract and stay independent of the storage schema.
#[derive(Debug, Clone, Serialize)]
pub struct DoTaskResponse {
    #[serde(rename = "DO_Task_ID")]
    pub id: Uuid,
    #[serde(rename = "SAP_DO_Number")]
    pub sap_do_number: String,
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "Delivery_Date")]
    pub delivery_date: NaiveDate,
    #[serde(rename = "Sales_Admin_Remarks")]
    pub sales_admin_remarks: Option<String>,
    #[serde(rename = "Overall_Status")]
    pub overall_status: DoStatus,
    #[serde(rename = "Sales_Admin_Name")]
    pub sales_admin_name: String,
    #[serde(rename = "Sales_Admin_Email")]
    pub sales_admin_email: String,
    #[serde(rename = "Sales_Admin_Timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "Dispatcher_Name_DO")]
    pub dispatcher_name: Option<String>,
    #[serde(rename = "Dispatcher_Email_DO")]
    pub dispatcher_email: Option<String>,
    #[serde(rename = "Dispatcher_DO_Confirm_Timestamp")]
    pub dispatcher_ack_time: Option<DateTime<Utc>>,
    #[serde(rename = "Dispatcher_Shipment_Qty")]
    pub shipment_qty: Option<i64>,
    #[serde(rename = "Dispatcher_Notes")]
    pub dispatcher_notes: Option<String>,
    #[serde(rename = "Dispatcher_Shipment_Confirm_Timestamp")]
    pub shipment_time: Option<DateTime<Utc>>,
    #[serde(rename = "Rejection_Reason")]
    pub rejection_reason: Option<String>,
    #[serde(rename = "Last_Updated")]
    pub last_updated: DateTime<Utc>,
}

impl From<DoTask> for DoTaskResponse {
    fn from(task: DoTask) -> Self {
        Self {
            id: task.id,
            sap_do_number: task.sap_do_number,
            branch: task.branch,
            delivery_date: task.delivery_date,
            sales_admin_remarks: task.sales_admin_remarks,
            overall_status: task.overall_status,
            sales_admin_name: task.sales_admin_name,
            sales_admin_email: task.sales_admin_email,
            created_at: task.created_at,
            dispatcher_name: task.dispatcher_name,
            dispatcher_email: task.dispatcher_email,
            dispatcher_ack_time: task.dispatcher_ack_time,
            shipment_qty: task.shipment_qty,
            dispatcher_notes: task.dispatcher_notes,
            shipment_time: task.shipment_time,
            rejection_reason: task.rejection_reason,
            // Clients always see a timestamp, even before the first mutation.
            last_updated: task.last_updated.unwrap_or(task.created_at),
        }
    }
}
