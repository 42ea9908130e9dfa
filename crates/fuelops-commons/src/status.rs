//! Status and classification enums shared between the API wire format and
//! the backend's domain layer.

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Where a reading sits relative to settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Unsettled,
    PendingSettlement,
    Settled,
    CarriedForward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    Manual,
    Ocr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Draft,
    Submitted,
    Settled,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Draft,
    Final,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverType {
    ShiftCollection,
    EmployeeToManager,
    ManagerToOwner,
    DepositToBank,
}

impl HandoverType {
    /// The handover type that must be confirmed before this one may be
    /// created. `ShiftCollection` seeds the chain.
    pub fn required_predecessor(&self) -> Option<HandoverType> {
        match self {
            HandoverType::ShiftCollection => None,
            HandoverType::EmployeeToManager => Some(HandoverType::ShiftCollection),
            HandoverType::ManagerToOwner => Some(HandoverType::EmployeeToManager),
            HandoverType::DepositToBank => Some(HandoverType::ManagerToOwner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverStatus {
    Pending,
    Confirmed,
    Disputed,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditTransactionType {
    Credit,
    Settlement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Active,
    Ended,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    Morning,
    Afternoon,
    Night,
    FullDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpStatus {
    Active,
    Repair,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    Strict,
    Warning,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefillEntryType {
    Refill,
    Adjustment,
    Correction,
    Initial,
}

/// Classification of a tank level against capacity and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankLevelStatus {
    Negative,
    Empty,
    Critical,
    Low,
    Overflow,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCategory {
    Auth,
    Data,
    Finance,
    System,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Processing,
    Success,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handover_chain_predecessors() {
        assert_eq!(HandoverType::ShiftCollection.required_predecessor(), None);
        assert_eq!(
            HandoverType::EmployeeToManager.required_predecessor(),
            Some(HandoverType::ShiftCollection)
        );
        assert_eq!(
            HandoverType::ManagerToOwner.required_predecessor(),
            Some(HandoverType::EmployeeToManager)
        );
        assert_eq!(
            HandoverType::DepositToBank.required_predecessor(),
            Some(HandoverType::ManagerToOwner)
        );
    }

    #[test]
    fn wire_casing_is_snake() {
        assert_eq!(
            serde_json::to_string(&HandoverType::EmployeeToManager).unwrap(),
            "\"employee_to_manager\""
        );
        assert_eq!(
            serde_json::to_string(&FlowStatus::PendingSettlement).unwrap(),
            "\"pending_settlement\""
        );
    }
}
