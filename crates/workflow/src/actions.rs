use db::types::DoStatus;
use serde::Deserialize;
use thiserror::Error;

/// Shipment confirmation payload as submitted by the dispatcher client.
#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentForm {
    pub qty: i64,
    pub notes: Option<String>,
}

/// A dispatcher-side workflow action together with its required payload.
#[derive(Debug, Clone)]
pub enum DoAction {
    Acknowledge,
    Reject { reason: String },
    Transfer,
    Shipment { qty: i64, notes: Option<String> },
    AcknowledgeSalesAdminEdit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionParseError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Rejection requires a reason")]
    MissingReason,
    #[error("Shipment confirmation requires formData")]
    MissingShipmentForm,
}

impl DoAction {
    /// Builds an action from its wire name and the optional payload fields of
    /// the action request, so a payload a transition depends on can never be
    /// absent past this point.
    pub fn parse(
        action: &str,
        reason: Option<String>,
        form_data: Option<ShipmentForm>,
    ) -> Result<Self, ActionParseError> {
        match action {
            "acknowledge" => Ok(Self::Acknowledge),
            "reject" => {
                let reason = reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .ok_or(ActionParseError::MissingReason)?;
                Ok(Self::Reject { reason })
            }
            "transfer" => Ok(Self::Transfer),
            "shipment" => {
                let form = form_data.ok_or(ActionParseError::MissingShipmentForm)?;
                Ok(Self::Shipment {
                    qty: form.qty,
                    notes: form.notes,
                })
            }
            "acknowledgeSalesAdminEdit" => Ok(Self::AcknowledgeSalesAdminEdit),
            other => Err(ActionParseError::UnknownAction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Acknowledge => "acknowledge",
            Self::Reject { .. } => "reject",
            Self::Transfer => "transfer",
            Self::Shipment { .. } => "shipment",
            Self::AcknowledgeSalesAdminEdit => "acknowledgeSalesAdminEdit",
        }
    }

    /// The states this action is legal from; the conditional update gates on
    /// exactly this set.
    pub fn allowed_from(&self) -> &'static [DoStatus] {
        match self {
            Self::Acknowledge => DoStatus::POOL,
            Self::Reject { .. } | Self::Transfer | Self::Shipment { .. } => {
                &[DoStatus::InProgress]
            }
            Self::AcknowledgeSalesAdminEdit => &[DoStatus::EditedBySalesAdmin],
        }
    }

    pub fn target_status(&self) -> DoStatus {
        match self {
            Self::Acknowledge => DoStatus::InProgress,
            Self::Reject { .. } => DoStatus::PendingSalesAdminEdit,
            Self::Transfer => DoStatus::Transferred,
            Self::Shipment { .. } => DoStatus::Completed,
            Self::AcknowledgeSalesAdminEdit => DoStatus::InProgress,
        }
    }

    /// Reply message on a successful transition.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Acknowledge => "Task acknowledged",
            Self::Reject { .. } => "Task rejected",
            Self::Transfer => "Task transferred",
            Self::Shipment { .. } => "Shipment confirmed",
            Self::AcknowledgeSalesAdminEdit => "Acknowledged edit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_requires_action_payloads() {
        assert!(matches!(
            DoAction::parse("acknowledge", None, None),
            Ok(DoAction::Acknowledge)
        ));
        assert_eq!(
            DoAction::parse("reject", None, None).unwrap_err(),
            ActionParseError::MissingReason
        );
        assert_eq!(
            DoAction::parse("reject", Some("  ".to_string()), None).unwrap_err(),
            ActionParseError::MissingReason
        );
        assert_eq!(
            DoAction::parse("shipment", None, None).unwrap_err(),
            ActionParseError::MissingShipmentForm
        );
        assert_eq!(
            DoAction::parse("close", None, None).unwrap_err(),
            ActionParseError::UnknownAction("close".to_string())
        );
    }

    #[test]
    fn transition_table_matches_workflow() {
        let ack = DoAction::Acknowledge;
        assert_eq!(ack.allowed_from(), DoStatus::POOL);
        assert_eq!(ack.target_status(), DoStatus::InProgress);

        let reject = DoAction::Reject {
            reason: "bad".to_string(),
        };
        assert_eq!(reject.allowed_from(), &[DoStatus::InProgress]);
        assert_eq!(reject.target_status(), DoStatus::PendingSalesAdminEdit);

        let ship = DoAction::Shipment { qty: 1, notes: None };
        assert_eq!(ship.allowed_from(), &[DoStatus::InProgress]);
        assert_eq!(ship.target_status(), DoStatus::Completed);

        assert_eq!(
            DoAction::AcknowledgeSalesAdminEdit.allowed_from(),
            &[DoStatus::EditedBySalesAdmin]
        );
    }
}
