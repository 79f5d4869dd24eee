use chrono::Utc;
use db::models::do_task::{DispatcherAssignment, DoTask, DoTaskPatch, ShipmentDetails};
use db::types::DoStatus;
use sea_orm::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::actions::DoAction;

/// Authenticated identity of the caller, as injected by the upstream
/// authenticator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Task not found")]
    TaskNotFound,
    #[error("Action '{action}' is not allowed while the task is '{status}'")]
    InvalidTransition {
        action: &'static str,
        status: DoStatus,
    },
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Validates and applies the delivery-order status transitions.
///
/// The guard and the write are one conditional update; concurrent actors
/// racing for the same task are decided by the affected-row count, never by a
/// read-then-write sequence.
pub struct WorkflowEngine;

impl WorkflowEngine {
    pub async fn apply<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
        actor: &Actor,
        action: DoAction,
    ) -> Result<DoTask, WorkflowError> {
        let current = DoTask::find_by_id(db, task_id)
            .await?
            .ok_or(WorkflowError::TaskNotFound)?;

        let allowed = action.allowed_from();
        // Early report with the observed status; the conditional update below
        // remains the authoritative gate.
        if !allowed.contains(&current.overall_status) {
            return Err(WorkflowError::InvalidTransition {
                action: action.name(),
                status: current.overall_status,
            });
        }

        let name = action.name();
        let next = action.target_status();
        let patch = Self::patch_for(&action, actor);

        let applied = DoTask::transition(db, task_id, allowed, next, patch).await?;
        if !applied {
            // Lost the race: another actor moved the task between the read
            // and the conditional write.
            let status = DoTask::find_by_id(db, task_id)
                .await?
                .map(|task| task.overall_status)
                .ok_or(WorkflowError::TaskNotFound)?;
            tracing::debug!(%task_id, action = name, %status, "Transition guard failed");
            return Err(WorkflowError::InvalidTransition {
                action: name,
                status,
            });
        }

        DoTask::find_by_id(db, task_id)
            .await?
            .ok_or(WorkflowError::TaskNotFound)
    }

    fn patch_for(action: &DoAction, actor: &Actor) -> DoTaskPatch {
        let assignment = || DispatcherAssignment {
            name: actor.display_name.clone(),
            email: actor.email.clone(),
        };

        match action {
            DoAction::Acknowledge => DoTaskPatch {
                dispatcher: Some(Some(assignment())),
                dispatcher_ack_time: Some(Utc::now()),
                ..Default::default()
            },
            DoAction::Reject { reason } => DoTaskPatch {
                dispatcher: Some(None),
                rejection_reason: Some(reason.clone()),
                ..Default::default()
            },
            DoAction::Transfer => DoTaskPatch {
                dispatcher: Some(None),
                ..Default::default()
            },
            DoAction::Shipment { qty, notes } => DoTaskPatch {
                shipment: Some(ShipmentDetails {
                    qty: *qty,
                    notes: notes.clone(),
                    time: Utc::now(),
                }),
                ..Default::default()
            },
            // A corrected task sits unowned until a dispatcher picks the
            // correction up; acknowledging it re-establishes ownership.
            DoAction::AcknowledgeSalesAdminEdit => DoTaskPatch {
                dispatcher: Some(Some(assignment())),
                ..Default::default()
            },
        }
    }
}
