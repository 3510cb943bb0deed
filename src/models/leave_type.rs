//! Leave type reference data.
//!
//! Leave types are immutable reference data maintained by administrators:
//! the statutory categories, cycle lengths, and per-cycle caps that the
//! rest of the engine computes against.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The statutory category a leave type falls under.
///
/// The category drives which eligibility rules apply: sick leave runs on a
/// 36-month cycle with the medical-certificate rule, family-responsibility
/// leave has service-length preconditions, and unpaid leave is not tracked
/// against a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveCategory {
    /// Annual leave: accrues monthly, subject to the 18-month forfeiture rule.
    Annual,
    /// Sick leave: lump-sum entitlement over a 36-month cycle.
    Sick,
    /// Family-responsibility leave: capped per year, eligibility-gated.
    FamilyResponsibility,
    /// Unpaid leave: no balance tracking.
    Unpaid,
}

/// How entitlement is added to a balance over a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualMethod {
    /// Entitlement is credited monthly, pro-rata from the employment start date.
    Monthly,
    /// The full cycle entitlement is available from the start of the cycle.
    LumpSum,
}

/// A leave type an employee can request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveType {
    /// Unique identifier for the leave type.
    pub id: Uuid,
    /// Display name (e.g., "Annual Leave").
    pub name: String,
    /// Display colour, not used by any rule.
    pub color: String,
    /// Whether this type is a statutory BCEA entitlement.
    pub statutory: bool,
    /// The statutory category the rules key off.
    pub category: LeaveCategory,
    /// Length of the entitlement cycle in months (12 for annual, 36 for sick).
    pub cycle_months: u32,
    /// How entitlement is added over the cycle.
    pub accrual_method: AccrualMethod,
    /// The maximum entitlement per cycle.
    pub max_days_per_cycle: Decimal,
}

impl LeaveType {
    /// Whether requests of this type consume a tracked balance.
    pub fn tracks_balance(&self) -> bool {
        self.category != LeaveCategory::Unpaid
    }
}
