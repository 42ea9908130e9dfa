use crate::db::audit_logs::AuditCategory;
use crate::db::audit_logs::AuditSeverity;
use crate::db::credit_transactions::CreditEntryType;
use crate::db::daily_transactions::TransactionStatus;
use crate::db::handovers::HandoverStatus;
use crate::db::handovers::HandoverType;
use crate::db::pumps::EquipmentStatus;
use crate::db::readings::ApprovalStatus;
use crate::db::readings::FlowStatus;
use crate::db::readings::ReadingSource;
use crate::db::settlements::SettlementStatus;
use crate::db::shifts::ShiftStatus;
use crate::db::shifts::ShiftType;
use crate::db::tank_refills::RefillEntryType;
use crate::db::tanks::TrackingMode;
use crate::db::uploads::UploadStatus;
use crate::db::users::UserRole;
use crate::schema::sql_types::ApprovalStatusType;
use crate::schema::sql_types::AuditCategoryType;
use crate::schema::sql_types::AuditSeverityType;
use crate::schema::sql_types::CreditEntryTypeType;
use crate::schema::sql_types::EquipmentStatusType;
use crate::schema::sql_types::FlowStatusType;
use crate::schema::sql_types::HandoverStatusType;
use crate::schema::sql_types::HandoverTypeType;
use crate::schema::sql_types::ReadingSourceType;
use crate::schema::sql_types::RefillEntryTypeType;
use crate::schema::sql_types::SettlementStatusType;
use crate::schema::sql_types::ShiftStatusType;
use crate::schema::sql_types::ShiftTypeType;
use crate::schema::sql_types::TrackingModeType;
use crate::schema::sql_types::TransactionStatusType;
use crate::schema::sql_types::UploadStatusType;
use crate::schema::sql_types::UserRoleType;
use diesel::deserialize;
use diesel::deserialize::FromSql;
use diesel::pg::Pg;
use diesel::pg::PgValue;
use diesel::query_builder::QueryId;
use diesel::serialize;
use diesel::serialize::IsNull;
use diesel::serialize::Output;
use diesel::serialize::ToSql;
use std::any::TypeId;
use std::io::Write;

macro_rules! no_static_query_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl QueryId for $ty {
                type QueryId = $ty;
                const HAS_STATIC_QUERY_ID: bool = false;

                fn query_id() -> Option<TypeId> {
                    None
                }
            }
        )*
    };
}

no_static_query_id!(
    ApprovalStatusType,
    AuditCategoryType,
    AuditSeverityType,
    CreditEntryTypeType,
    EquipmentStatusType,
    FlowStatusType,
    HandoverStatusType,
    HandoverTypeType,
    ReadingSourceType,
    RefillEntryTypeType,
    SettlementStatusType,
    ShiftStatusType,
    ShiftTypeType,
    TrackingModeType,
    TransactionStatusType,
    UploadStatusType,
    UserRoleType,
);

impl ToSql<UserRoleType, Pg> for UserRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            UserRole::SuperAdmin => out.write_all(b"super_admin")?,
            UserRole::Owner => out.write_all(b"owner")?,
            UserRole::Manager => out.write_all(b"manager")?,
            UserRole::Employee => out.write_all(b"employee")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<UserRoleType, Pg> for UserRole {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"super_admin" => Ok(UserRole::SuperAdmin),
            b"owner" => Ok(UserRole::Owner),
            b"manager" => Ok(UserRole::Manager),
            b"employee" => Ok(UserRole::Employee),
            _ => Err("Unrecognized enum variant for UserRole".into()),
        }
    }
}

impl ToSql<EquipmentStatusType, Pg> for EquipmentStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            EquipmentStatus::Active => out.write_all(b"active")?,
            EquipmentStatus::Repair => out.write_all(b"repair")?,
            EquipmentStatus::Inactive => out.write_all(b"inactive")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<EquipmentStatusType, Pg> for EquipmentStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"active" => Ok(EquipmentStatus::Active),
            b"repair" => Ok(EquipmentStatus::Repair),
            b"inactive" => Ok(EquipmentStatus::Inactive),
            _ => Err("Unrecognized enum variant for EquipmentStatus".into()),
        }
    }
}

impl ToSql<ReadingSourceType, Pg> for ReadingSource {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            ReadingSource::Manual => out.write_all(b"manual")?,
            ReadingSource::Ocr => out.write_all(b"ocr")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<ReadingSourceType, Pg> for ReadingSource {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"manual" => Ok(ReadingSource::Manual),
            b"ocr" => Ok(ReadingSource::Ocr),
            _ => Err("Unrecognized enum variant for ReadingSource".into()),
        }
    }
}

impl ToSql<ApprovalStatusType, Pg> for ApprovalStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            ApprovalStatus::Pending => out.write_all(b"pending")?,
            ApprovalStatus::Approved => out.write_all(b"approved")?,
            ApprovalStatus::Rejected => out.write_all(b"rejected")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<ApprovalStatusType, Pg> for ApprovalStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"pending" => Ok(ApprovalStatus::Pending),
            b"approved" => Ok(ApprovalStatus::Approved),
            b"rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err("Unrecognized enum variant for ApprovalStatus".into()),
        }
    }
}

impl ToSql<FlowStatusType, Pg> for FlowStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            FlowStatus::Unsettled => out.write_all(b"unsettled")?,
            FlowStatus::PendingSettlement => out.write_all(b"pending_settlement")?,
            FlowStatus::Settled => out.write_all(b"settled")?,
            FlowStatus::CarriedForward => out.write_all(b"carried_forward")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<FlowStatusType, Pg> for FlowStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"unsettled" => Ok(FlowStatus::Unsettled),
            b"pending_settlement" => Ok(FlowStatus::PendingSettlement),
            b"settled" => Ok(FlowStatus::Settled),
            b"carried_forward" => Ok(FlowStatus::CarriedForward),
            _ => Err("Unrecognized enum variant for FlowStatus".into()),
        }
    }
}

impl ToSql<TransactionStatusType, Pg> for TransactionStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            TransactionStatus::Draft => out.write_all(b"draft")?,
            TransactionStatus::Submitted => out.write_all(b"submitted")?,
            TransactionStatus::Settled => out.write_all(b"settled")?,
            TransactionStatus::Cancelled => out.write_all(b"cancelled")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<TransactionStatusType, Pg> for TransactionStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"draft" => Ok(TransactionStatus::Draft),
            b"submitted" => Ok(TransactionStatus::Submitted),
            b"settled" => Ok(TransactionStatus::Settled),
            b"cancelled" => Ok(TransactionStatus::Cancelled),
            _ => Err("Unrecognized enum variant for TransactionStatus".into()),
        }
    }
}

impl ToSql<SettlementStatusType, Pg> for SettlementStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            SettlementStatus::Draft => out.write_all(b"draft")?,
            SettlementStatus::Final => out.write_all(b"final")?,
            SettlementStatus::Locked => out.write_all(b"locked")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<SettlementStatusType, Pg> for SettlementStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"draft" => Ok(SettlementStatus::Draft),
            b"final" => Ok(SettlementStatus::Final),
            b"locked" => Ok(SettlementStatus::Locked),
            _ => Err("Unrecognized enum variant for SettlementStatus".into()),
        }
    }
}

impl ToSql<CreditEntryTypeType, Pg> for CreditEntryType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            CreditEntryType::Credit => out.write_all(b"credit")?,
            CreditEntryType::Settlement => out.write_all(b"settlement")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<CreditEntryTypeType, Pg> for CreditEntryType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"credit" => Ok(CreditEntryType::Credit),
            b"settlement" => Ok(CreditEntryType::Settlement),
            _ => Err("Unrecognized enum variant for CreditEntryType".into()),
        }
    }
}

impl ToSql<ShiftTypeType, Pg> for ShiftType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            ShiftType::Morning => out.write_all(b"morning")?,
            ShiftType::Afternoon => out.write_all(b"afternoon")?,
            ShiftType::Night => out.write_all(b"night")?,
            ShiftType::FullDay => out.write_all(b"full_day")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<ShiftTypeType, Pg> for ShiftType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"morning" => Ok(ShiftType::Morning),
            b"afternoon" => Ok(ShiftType::Afternoon),
            b"night" => Ok(ShiftType::Night),
            b"full_day" => Ok(ShiftType::FullDay),
            _ => Err("Unrecognized enum variant for ShiftType".into()),
        }
    }
}

impl ToSql<ShiftStatusType, Pg> for ShiftStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            ShiftStatus::Active => out.write_all(b"active")?,
            ShiftStatus::Ended => out.write_all(b"ended")?,
            ShiftStatus::Cancelled => out.write_all(b"cancelled")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<ShiftStatusType, Pg> for ShiftStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"active" => Ok(ShiftStatus::Active),
            b"ended" => Ok(ShiftStatus::Ended),
            b"cancelled" => Ok(ShiftStatus::Cancelled),
            _ => Err("Unrecognized enum variant for ShiftStatus".into()),
        }
    }
}

impl ToSql<HandoverTypeType, Pg> for HandoverType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            HandoverType::ShiftCollection => out.write_all(b"shift_collection")?,
            HandoverType::EmployeeToManager => out.write_all(b"employee_to_manager")?,
            HandoverType::ManagerToOwner => out.write_all(b"manager_to_owner")?,
            HandoverType::DepositToBank => out.write_all(b"deposit_to_bank")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<HandoverTypeType, Pg> for HandoverType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"shift_collection" => Ok(HandoverType::ShiftCollection),
            b"employee_to_manager" => Ok(HandoverType::EmployeeToManager),
            b"manager_to_owner" => Ok(HandoverType::ManagerToOwner),
            b"deposit_to_bank" => Ok(HandoverType::DepositToBank),
            _ => Err("Unrecognized enum variant for HandoverType".into()),
        }
    }
}

impl ToSql<HandoverStatusType, Pg> for HandoverStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            HandoverStatus::Pending => out.write_all(b"pending")?,
            HandoverStatus::Confirmed => out.write_all(b"confirmed")?,
            HandoverStatus::Disputed => out.write_all(b"disputed")?,
            HandoverStatus::Resolved => out.write_all(b"resolved")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<HandoverStatusType, Pg> for HandoverStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"pending" => Ok(HandoverStatus::Pending),
            b"confirmed" => Ok(HandoverStatus::Confirmed),
            b"disputed" => Ok(HandoverStatus::Disputed),
            b"resolved" => Ok(HandoverStatus::Resolved),
            _ => Err("Unrecognized enum variant for HandoverStatus".into()),
        }
    }
}

impl ToSql<TrackingModeType, Pg> for TrackingMode {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            TrackingMode::Strict => out.write_all(b"strict")?,
            TrackingMode::Warning => out.write_all(b"warning")?,
            TrackingMode::Disabled => out.write_all(b"disabled")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<TrackingModeType, Pg> for TrackingMode {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"strict" => Ok(TrackingMode::Strict),
            b"warning" => Ok(TrackingMode::Warning),
            b"disabled" => Ok(TrackingMode::Disabled),
            _ => Err("Unrecognized enum variant for TrackingMode".into()),
        }
    }
}

impl ToSql<RefillEntryTypeType, Pg> for RefillEntryType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            RefillEntryType::Refill => out.write_all(b"refill")?,
            RefillEntryType::Adjustment => out.write_all(b"adjustment")?,
            RefillEntryType::Correction => out.write_all(b"correction")?,
            RefillEntryType::Initial => out.write_all(b"initial")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<RefillEntryTypeType, Pg> for RefillEntryType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"refill" => Ok(RefillEntryType::Refill),
            b"adjustment" => Ok(RefillEntryType::Adjustment),
            b"correction" => Ok(RefillEntryType::Correction),
            b"initial" => Ok(RefillEntryType::Initial),
            _ => Err("Unrecognized enum variant for RefillEntryType".into()),
        }
    }
}

impl ToSql<AuditSeverityType, Pg> for AuditSeverity {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            AuditSeverity::Info => out.write_all(b"info")?,
            AuditSeverity::Warning => out.write_all(b"warning")?,
            AuditSeverity::Critical => out.write_all(b"critical")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<AuditSeverityType, Pg> for AuditSeverity {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"info" => Ok(AuditSeverity::Info),
            b"warning" => Ok(AuditSeverity::Warning),
            b"critical" => Ok(AuditSeverity::Critical),
            _ => Err("Unrecognized enum variant for AuditSeverity".into()),
        }
    }
}

impl ToSql<AuditCategoryType, Pg> for AuditCategory {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            AuditCategory::Auth => out.write_all(b"auth")?,
            AuditCategory::Data => out.write_all(b"data")?,
            AuditCategory::Finance => out.write_all(b"finance")?,
            AuditCategory::System => out.write_all(b"system")?,
            AuditCategory::General => out.write_all(b"general")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<AuditCategoryType, Pg> for AuditCategory {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"auth" => Ok(AuditCategory::Auth),
            b"data" => Ok(AuditCategory::Data),
            b"finance" => Ok(AuditCategory::Finance),
            b"system" => Ok(AuditCategory::System),
            b"general" => Ok(AuditCategory::General),
            _ => Err("Unrecognized enum variant for AuditCategory".into()),
        }
    }
}

impl ToSql<UploadStatusType, Pg> for UploadStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            UploadStatus::Processing => out.write_all(b"processing")?,
            UploadStatus::Success => out.write_all(b"success")?,
            UploadStatus::Failed => out.write_all(b"failed")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<UploadStatusType, Pg> for UploadStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"processing" => Ok(UploadStatus::Processing),
            b"success" => Ok(UploadStatus::Success),
            b"failed" => Ok(UploadStatus::Failed),
            _ => Err("Unrecognized enum variant for UploadStatus".into()),
        }
    }
}
