use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Select, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{entities::do_task, types::DoStatus};

#[derive(Debug, Error)]
pub enum DoTaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("DO task not found")]
    TaskNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoTask {
    pub id: Uuid,
    pub sap_do_number: String,
    pub branch: String,
    pub delivery_date: NaiveDate,
    pub sales_admin_remarks: Option<String>,
    pub overall_status: DoStatus,
    pub sales_admin_name: String,
    pub sales_admin_email: String,
    pub dispatcher_name: Option<String>,
    pub dispatcher_email: Option<String>,
    pub dispatcher_ack_time: Option<DateTime<Utc>>,
    pub shipment_qty: Option<i64>,
    pub dispatcher_notes: Option<String>,
    pub shipment_time: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoTask {
    pub sap_do_number: String,
    pub branch: String,
    pub delivery_date: NaiveDate,
    pub sales_admin_remarks: Option<String>,
    pub sales_admin_name: String,
    pub sales_admin_email: String,
}

/// Filter set for the administrative overview; every predicate is optional
/// and they combine with AND.
#[derive(Debug, Clone, Default)]
pub struct DoTaskFilter {
    pub created_on: Option<NaiveDate>,
    pub delivery_date_start: Option<NaiveDate>,
    pub delivery_date_end: Option<NaiveDate>,
    pub status: Option<DoStatus>,
    pub branch: Option<String>,
}

/// The narrower filter set the dispatcher worklists accept.
#[derive(Debug, Clone, Default)]
pub struct WorklistFilter {
    pub created_on: Option<NaiveDate>,
    pub delivery_date_start: Option<NaiveDate>,
    pub delivery_date_end: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct DispatcherAssignment {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct ShipmentDetails {
    pub qty: i64,
    pub notes: Option<String>,
    pub time: DateTime<Utc>,
}

/// Typed partial update applied by a status transition. Each workflow action
/// constructs exactly one shape of this struct, so the set of columns a
/// transition may touch is fixed at compile time. `dispatcher: Some(None)`
/// clears the assignment; `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct DoTaskPatch {
    pub dispatcher: Option<Option<DispatcherAssignment>>,
    pub dispatcher_ack_time: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub shipment: Option<ShipmentDetails>,
}

fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(1))
}

fn apply_worklist_filter(
    mut select: Select<do_task::Entity>,
    filter: &WorklistFilter,
) -> Select<do_task::Entity> {
    if let Some(day) = filter.created_on {
        let (start, end) = day_bounds(day);
        select = select
            .filter(do_task::Column::CreatedAt.gte(start))
            .filter(do_task::Column::CreatedAt.lt(end));
    }
    if let Some(start) = filter.delivery_date_start {
        select = select.filter(do_task::Column::DeliveryDate.gte(start));
    }
    if let Some(end) = filter.delivery_date_end {
        select = select.filter(do_task::Column::DeliveryDate.lte(end));
    }
    select
}

impl DoTask {
    fn from_model(model: do_task::Model) -> Self {
        Self {
            id: model.uuid,
            sap_do_number: model.sap_do_number,
            branch: model.branch,
            delivery_date: model.delivery_date,
            sales_admin_remarks: model.sales_admin_remarks,
            overall_status: model.overall_status,
            sales_admin_name: model.sales_admin_name,
            sales_admin_email: model.sales_admin_email,
            dispatcher_name: model.dispatcher_name,
            dispatcher_email: model.dispatcher_email,
            dispatcher_ack_time: model.dispatcher_ack_time,
            shipment_qty: model.shipment_qty,
            dispatcher_notes: model.dispatcher_notes,
            shipment_time: model.shipment_time,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at,
            last_updated: model.last_updated,
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateDoTask,
        id: Uuid,
    ) -> Result<Self, DbErr> {
        let active = do_task::ActiveModel {
            uuid: Set(id),
            sap_do_number: Set(data.sap_do_number.clone()),
            branch: Set(data.branch.clone()),
            delivery_date: Set(data.delivery_date),
            sales_admin_remarks: Set(data.sales_admin_remarks.clone()),
            overall_status: Set(DoStatus::PendingConfirmation),
            sales_admin_name: Set(data.sales_admin_name.clone()),
            sales_admin_email: Set(data.sales_admin_email.clone()),
            dispatcher_name: Set(None),
            dispatcher_email: Set(None),
            dispatcher_ack_time: Set(None),
            shipment_qty: Set(None),
            dispatcher_notes: Set(None),
            shipment_time: Set(None),
            rejection_reason: Set(None),
            created_at: Set(Utc::now()),
            last_updated: Set(None),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = do_task::Entity::find()
            .filter(do_task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// Administrative overview: every task, newest first.
    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        filter: &DoTaskFilter,
    ) -> Result<Vec<Self>, DbErr> {
        let mut select = apply_worklist_filter(
            do_task::Entity::find(),
            &WorklistFilter {
                created_on: filter.created_on,
                delivery_date_start: filter.delivery_date_start,
                delivery_date_end: filter.delivery_date_end,
            },
        );
        if let Some(status) = filter.status {
            select = select.filter(do_task::Column::OverallStatus.eq(status));
        }
        if let Some(branch) = &filter.branch {
            select = select.filter(do_task::Column::Branch.eq(branch.clone()));
        }

        let models = select
            .order_by_desc(do_task::Column::Id)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    /// Unclaimed pool: tasks any dispatcher may acknowledge.
    pub async fn find_pool<C: ConnectionTrait>(
        db: &C,
        filter: &WorklistFilter,
    ) -> Result<Vec<Self>, DbErr> {
        let select = apply_worklist_filter(
            do_task::Entity::find()
                .filter(do_task::Column::OverallStatus.is_in(DoStatus::POOL.iter().copied()))
                .filter(do_task::Column::DispatcherEmail.is_null()),
            filter,
        );

        let models = select
            .order_by_desc(do_task::Column::Id)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    /// Tasks the given dispatcher owns in the current cycle.
    pub async fn find_mine<C: ConnectionTrait>(
        db: &C,
        dispatcher_email: &str,
        filter: &WorklistFilter,
    ) -> Result<Vec<Self>, DbErr> {
        let select = apply_worklist_filter(
            do_task::Entity::find()
                .filter(do_task::Column::DispatcherEmail.eq(dispatcher_email))
                .filter(
                    do_task::Column::OverallStatus
                        .is_in(DoStatus::DISPATCHER_OWNED.iter().copied()),
                ),
            filter,
        );

        let models = select
            .order_by_desc(do_task::Column::Id)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    /// Single atomic conditional write: applies `next` plus the patch only if
    /// the row's current status is within `allowed`. Returns whether the
    /// update took effect; `false` means the guard lost, because the status
    /// moved underneath the caller or the id is unknown.
    pub async fn transition<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        allowed: &[DoStatus],
        next: DoStatus,
        patch: DoTaskPatch,
    ) -> Result<bool, DbErr> {
        let now = Utc::now();
        let mut update = do_task::Entity::update_many()
            .col_expr(do_task::Column::OverallStatus, Expr::value(next))
            .col_expr(do_task::Column::LastUpdated, Expr::value(Some(now)));

        if let Some(assignment) = patch.dispatcher {
            let (name, email) = match assignment {
                Some(assignment) => (Some(assignment.name), Some(assignment.email)),
                None => (None, None),
            };
            update = update
                .col_expr(do_task::Column::DispatcherName, Expr::value(name))
                .col_expr(do_task::Column::DispatcherEmail, Expr::value(email));
        }
        if let Some(ack_time) = patch.dispatcher_ack_time {
            update = update.col_expr(
                do_task::Column::DispatcherAckTime,
                Expr::value(Some(ack_time)),
            );
        }
        if let Some(reason) = patch.rejection_reason {
            update = update.col_expr(
                do_task::Column::RejectionReason,
                Expr::value(Some(reason)),
            );
        }
        if let Some(shipment) = patch.shipment {
            update = update
                .col_expr(do_task::Column::ShipmentQty, Expr::value(Some(shipment.qty)))
                .col_expr(
                    do_task::Column::DispatcherNotes,
                    Expr::value(shipment.notes),
                )
                .col_expr(
                    do_task::Column::ShipmentTime,
                    Expr::value(Some(shipment.time)),
                );
        }

        let result = update
            .filter(do_task::Column::Uuid.eq(id))
            .filter(do_task::Column::OverallStatus.is_in(allowed.iter().copied()))
            .exec(db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Sales-admin remarks patch. A task sitting in `PendingSalesAdminEdit`
    /// is handed back to the dispatchers as `EditedBySalesAdmin` in the same
    /// write; any other status keeps its state and only the remarks change.
    pub async fn update_remarks<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        remarks: String,
    ) -> Result<Self, DoTaskError> {
        let now = Utc::now();
        let handed_back = do_task::Entity::update_many()
            .col_expr(
                do_task::Column::SalesAdminRemarks,
                Expr::value(Some(remarks.clone())),
            )
            .col_expr(
                do_task::Column::OverallStatus,
                Expr::value(DoStatus::EditedBySalesAdmin),
            )
            .col_expr(do_task::Column::LastUpdated, Expr::value(Some(now)))
            .filter(do_task::Column::Uuid.eq(id))
            .filter(do_task::Column::OverallStatus.eq(DoStatus::PendingSalesAdminEdit))
            .exec(db)
            .await?;

        if handed_back.rows_affected == 0 {
            let patched = do_task::Entity::update_many()
                .col_expr(
                    do_task::Column::SalesAdminRemarks,
                    Expr::value(Some(remarks)),
                )
                .col_expr(do_task::Column::LastUpdated, Expr::value(Some(now)))
                .filter(do_task::Column::Uuid.eq(id))
                .exec(db)
                .await?;
            if patched.rows_affected == 0 {
                return Err(DoTaskError::TaskNotFound);
            }
        }

        Self::find_by_id(db, id)
            .await?
            .ok_or(DoTaskError::TaskNotFound)
    }

    /// Administrative escape hatch; not part of the workflow.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = do_task::Entity::delete_many()
            .filter(do_task::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn create_data(sap: &str, branch: &str) -> CreateDoTask {
        CreateDoTask {
            sap_do_number: sap.to_string(),
            branch: branch.to_string(),
            delivery_date: NaiveDate::from_ymd_opt(2026, 8, 14).unwrap(),
            sales_admin_remarks: Some("urgent".to_string()),
            sales_admin_name: "Admin".to_string(),
            sales_admin_email: "admin@example.com".to_string(),
        }
    }

    fn claim(email: &str) -> DoTaskPatch {
        DoTaskPatch {
            dispatcher: Some(Some(DispatcherAssignment {
                name: "Dispatcher".to_string(),
                email: email.to_string(),
            })),
            dispatcher_ack_time: Some(Utc::now()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_sets_workflow_defaults() {
        let db = setup_db().await;
        let id = Uuid::new_v4();
        let task = DoTask::create(&db, &create_data("DO-1", "X"), id)
            .await
            .unwrap();

        assert_eq!(task.id, id);
        assert_eq!(task.overall_status, DoStatus::PendingConfirmation);
        assert!(task.dispatcher_email.is_none());
        assert!(task.dispatcher_ack_time.is_none());
        assert!(task.shipment_qty.is_none());
        assert!(task.last_updated.is_none());
    }

    #[tokio::test]
    async fn transition_applies_only_from_allowed_status() {
        let db = setup_db().await;
        let id = Uuid::new_v4();
        DoTask::create(&db, &create_data("DO-1", "X"), id)
            .await
            .unwrap();

        let applied = DoTask::transition(
            &db,
            id,
            DoStatus::POOL,
            DoStatus::InProgress,
            claim("d@x"),
        )
        .await
        .unwrap();
        assert!(applied);

        let task = DoTask::find_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(task.overall_status, DoStatus::InProgress);
        assert_eq!(task.dispatcher_email.as_deref(), Some("d@x"));
        assert!(task.dispatcher_ack_time.is_some());
        let last_updated = task.last_updated.expect("mutation stamps last_updated");
        assert!(last_updated >= task.created_at);

        // The guard has moved on; a second claim must lose.
        let applied = DoTask::transition(
            &db,
            id,
            DoStatus::POOL,
            DoStatus::InProgress,
            claim("other@x"),
        )
        .await
        .unwrap();
        assert!(!applied);

        let task = DoTask::find_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(task.dispatcher_email.as_deref(), Some("d@x"));
    }

    #[tokio::test]
    async fn failed_transition_leaves_row_untouched() {
        let db = setup_db().await;
        let id = Uuid::new_v4();
        let before = DoTask::create(&db, &create_data("DO-1", "X"), id)
            .await
            .unwrap();

        let applied = DoTask::transition(
            &db,
            id,
            &[DoStatus::InProgress],
            DoStatus::Completed,
            DoTaskPatch {
                shipment: Some(ShipmentDetails {
                    qty: 10,
                    notes: Some("ok".to_string()),
                    time: Utc::now(),
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(!applied);

        let after = DoTask::find_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(after.overall_status, before.overall_status);
        assert!(after.shipment_qty.is_none());
        assert!(after.shipment_time.is_none());
        assert_eq!(after.last_updated, before.last_updated);
    }

    #[tokio::test]
    async fn transition_is_a_noop_for_unknown_id() {
        let db = setup_db().await;
        let applied = DoTask::transition(
            &db,
            Uuid::new_v4(),
            DoStatus::POOL,
            DoStatus::InProgress,
            claim("d@x"),
        )
        .await
        .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn pool_excludes_claimed_tasks() {
        let db = setup_db().await;
        let unclaimed = Uuid::new_v4();
        let claimed = Uuid::new_v4();
        DoTask::create(&db, &create_data("DO-1", "X"), unclaimed)
            .await
            .unwrap();
        DoTask::create(&db, &create_data("DO-2", "X"), claimed)
            .await
            .unwrap();
        DoTask::transition(
            &db,
            claimed,
            DoStatus::POOL,
            DoStatus::InProgress,
            claim("d@x"),
        )
        .await
        .unwrap();

        let pool = DoTask::find_pool(&db, &WorklistFilter::default())
            .await
            .unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, unclaimed);
        assert!(pool.iter().all(|task| task.dispatcher_email.is_none()));
    }

    #[tokio::test]
    async fn mine_is_scoped_to_the_actor() {
        let db = setup_db().await;
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        DoTask::create(&db, &create_data("DO-1", "X"), first)
            .await
            .unwrap();
        DoTask::create(&db, &create_data("DO-2", "X"), second)
            .await
            .unwrap();
        DoTask::transition(&db, first, DoStatus::POOL, DoStatus::InProgress, claim("a@x"))
            .await
            .unwrap();
        DoTask::transition(
            &db,
            second,
            DoStatus::POOL,
            DoStatus::InProgress,
            claim("b@x"),
        )
        .await
        .unwrap();

        let mine = DoTask::find_mine(&db, "a@x", &WorklistFilter::default())
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, first);
    }

    #[tokio::test]
    async fn find_all_composes_optional_filters() {
        let db = setup_db().await;
        let matching = Uuid::new_v4();
        DoTask::create(&db, &create_data("DO-1", "หาดใหญ่"), matching)
            .await
            .unwrap();
        DoTask::create(&db, &create_data("DO-2", "ภูเก็ต"), Uuid::new_v4())
            .await
            .unwrap();

        let filter = DoTaskFilter {
            branch: Some("หาดใหญ่".to_string()),
            status: Some(DoStatus::PendingConfirmation),
            delivery_date_start: Some(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()),
            delivery_date_end: Some(NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()),
            created_on: Some(Utc::now().date_naive()),
        };
        let tasks = DoTask::find_all(&db, &filter).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, matching);

        let none = DoTask::find_all(
            &db,
            &DoTaskFilter {
                branch: Some("ตรัง".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn worklists_order_newest_first() {
        let db = setup_db().await;
        let older = Uuid::new_v4();
        let newer = Uuid::new_v4();
        DoTask::create(&db, &create_data("DO-1", "X"), older)
            .await
            .unwrap();
        DoTask::create(&db, &create_data("DO-2", "X"), newer)
            .await
            .unwrap();

        let all = DoTask::find_all(&db, &DoTaskFilter::default()).await.unwrap();
        assert_eq!(all[0].id, newer);
        assert_eq!(all[1].id, older);
    }

    #[tokio::test]
    async fn remarks_edit_hands_back_rejected_tasks() {
        let db = setup_db().await;
        let id = Uuid::new_v4();
        DoTask::create(&db, &create_data("DO-1", "X"), id)
            .await
            .unwrap();
        DoTask::transition(&db, id, DoStatus::POOL, DoStatus::InProgress, claim("d@x"))
            .await
            .unwrap();
        DoTask::transition(
            &db,
            id,
            &[DoStatus::InProgress],
            DoStatus::PendingSalesAdminEdit,
            DoTaskPatch {
                dispatcher: Some(None),
                rejection_reason: Some("bad qty".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let task = DoTask::update_remarks(&db, id, "qty corrected".to_string())
            .await
            .unwrap();
        assert_eq!(task.overall_status, DoStatus::EditedBySalesAdmin);
        assert_eq!(task.sales_admin_remarks.as_deref(), Some("qty corrected"));
        // A rejection reason survives the correction.
        assert_eq!(task.rejection_reason.as_deref(), Some("bad qty"));
    }

    #[tokio::test]
    async fn remarks_edit_elsewhere_keeps_status() {
        let db = setup_db().await;
        let id = Uuid::new_v4();
        DoTask::create(&db, &create_data("DO-1", "X"), id)
            .await
            .unwrap();

        let task = DoTask::update_remarks(&db, id, "note".to_string())
            .await
            .unwrap();
        assert_eq!(task.overall_status, DoStatus::PendingConfirmation);
        assert_eq!(task.sales_admin_remarks.as_deref(), Some("note"));
        assert!(task.last_updated.is_some());

        let missing = DoTask::update_remarks(&db, Uuid::new_v4(), "note".to_string()).await;
        assert!(matches!(missing, Err(DoTaskError::TaskNotFound)));
    }

    #[tokio::test]
    async fn delete_reports_affected_rows() {
        let db = setup_db().await;
        let id = Uuid::new_v4();
        DoTask::create(&db, &create_data("DO-1", "X"), id)
            .await
            .unwrap();

        assert_eq!(DoTask::delete(&db, id).await.unwrap(), 1);
        assert_eq!(DoTask::delete(&db, id).await.unwrap(), 0);
        assert!(DoTask::find_by_id(&db, id).await.unwrap().is_none());
    }
}
