use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Workflow status of a delivery-order task.
///
/// The string tags are the untranslated business vocabulary the original
/// rollout shipped with; they are wire-stable and stored verbatim, so both
/// serde and the database mapping reject anything outside this set.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum DoStatus {
    #[default]
    #[sea_orm(string_value = "รอยืนยัน DO")]
    #[serde(rename = "รอยืนยัน DO")]
    #[strum(serialize = "รอยืนยัน DO")]
    PendingConfirmation,
    #[sea_orm(string_value = "โอนงาน")]
    #[serde(rename = "โอนงาน")]
    #[strum(serialize = "โอนงาน")]
    Transferred,
    #[sea_orm(string_value = "กำลังดำเนินการ")]
    #[serde(rename = "กำลังดำเนินการ")]
    #[strum(serialize = "กำลังดำเนินการ")]
    InProgress,
    #[sea_orm(string_value = "ดำเนินการเสร็จสิ้น")]
    #[serde(rename = "ดำเนินการเสร็จสิ้น")]
    #[strum(serialize = "ดำเนินการเสร็จสิ้น")]
    Completed,
    #[sea_orm(string_value = "รอ Sales Admin แก้ไข")]
    #[serde(rename = "รอ Sales Admin แก้ไข")]
    #[strum(serialize = "รอ Sales Admin แก้ไข")]
    PendingSalesAdminEdit,
    #[sea_orm(string_value = "แก้ไขโดย Sale Admin")]
    #[serde(rename = "แก้ไขโดย Sale Admin")]
    #[strum(serialize = "แก้ไขโดย Sale Admin")]
    EditedBySalesAdmin,
}

impl DoStatus {
    /// Statuses a dispatcher may claim from the shared pool.
    pub const POOL: &'static [DoStatus] = &[DoStatus::PendingConfirmation, DoStatus::Transferred];

    /// Statuses in which a task belongs to a dispatcher.
    pub const DISPATCHER_OWNED: &'static [DoStatus] = &[
        DoStatus::InProgress,
        DoStatus::Completed,
        DoStatus::EditedBySalesAdmin,
    ];
}
