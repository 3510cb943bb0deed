//! Leave policy configuration types.
//!
//! The policy captures the statutory BCEA parameters the engine computes
//! against, plus the leave-type definitions an installation offers. The
//! compiled-in [`Default`] matches the Act, so the engine runs without a
//! policy file.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AccrualMethod, LeaveCategory, LeaveType};

/// Definition of a leave type as it appears in the policy file.
///
/// Materialized into a [`LeaveType`] row (with a generated id) when the
/// store is seeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveTypeDefinition {
    /// Display name.
    pub name: String,
    /// Display colour.
    pub color: String,
    /// Whether the type is a statutory entitlement.
    pub statutory: bool,
    /// The statutory category.
    pub category: LeaveCategory,
    /// Cycle length in months.
    pub cycle_months: u32,
    /// How entitlement is added over the cycle.
    pub accrual_method: AccrualMethod,
    /// Maximum entitlement per cycle.
    pub max_days_per_cycle: Decimal,
}

impl LeaveTypeDefinition {
    /// Materializes this definition into a stored leave type with a fresh id.
    pub fn materialize(&self) -> LeaveType {
        LeaveType {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            color: self.color.clone(),
            statutory: self.statutory,
            category: self.category,
            cycle_months: self.cycle_months,
            accrual_method: self.accrual_method,
            max_days_per_cycle: self.max_days_per_cycle,
        }
    }
}

/// The statutory parameters and leave-type catalogue the engine runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// Annual-leave entitlement per 12-month cycle.
    pub annual_leave_days_per_year: Decimal,
    /// Monthly annual-leave accrual rate.
    pub annual_accrual_per_month: Decimal,
    /// Sick-leave entitlement per 36-month cycle.
    pub sick_leave_days_per_cycle: Decimal,
    /// Length of the sick-leave cycle in months.
    pub sick_leave_cycle_months: u32,
    /// Family-responsibility entitlement per year.
    pub family_responsibility_days_per_year: Decimal,
    /// Minimum months of continuous service for family-responsibility leave.
    pub frl_min_service_months: u32,
    /// Minimum working days per week for family-responsibility leave.
    pub frl_min_work_days_per_week: u8,
    /// Consecutive working days of sick leave from which a medical
    /// certificate is advised.
    pub medical_certificate_threshold_days: Decimal,
    /// Months of carry-over grace after a cycle ends before unused annual
    /// leave is forfeited (12-month cycle + 6 = the 18-month rule).
    pub carry_over_grace_months: u32,
    /// The leave types this installation offers.
    pub leave_types: Vec<LeaveTypeDefinition>,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            annual_leave_days_per_year: Decimal::from(21),
            annual_accrual_per_month: Decimal::new(175, 2),
            sick_leave_days_per_cycle: Decimal::from(30),
            sick_leave_cycle_months: 36,
            family_responsibility_days_per_year: Decimal::from(3),
            frl_min_service_months: 4,
            frl_min_work_days_per_week: 4,
            medical_certificate_threshold_days: Decimal::from(2),
            carry_over_grace_months: 6,
            leave_types: vec![
                LeaveTypeDefinition {
                    name: "Annual Leave".to_string(),
                    color: "#2563eb".to_string(),
                    statutory: true,
                    category: LeaveCategory::Annual,
                    cycle_months: 12,
                    accrual_method: AccrualMethod::Monthly,
                    max_days_per_cycle: Decimal::from(21),
                },
                LeaveTypeDefinition {
                    name: "Sick Leave".to_string(),
                    color: "#dc2626".to_string(),
                    statutory: true,
                    category: LeaveCategory::Sick,
                    cycle_months: 36,
                    accrual_method: AccrualMethod::LumpSum,
                    max_days_per_cycle: Decimal::from(30),
                },
                LeaveTypeDefinition {
                    name: "Family Responsibility Leave".to_string(),
                    color: "#d97706".to_string(),
                    statutory: true,
                    category: LeaveCategory::FamilyResponsibility,
                    cycle_months: 12,
                    accrual_method: AccrualMethod::LumpSum,
                    max_days_per_cycle: Decimal::from(3),
                },
                LeaveTypeDefinition {
                    name: "Unpaid Leave".to_string(),
                    color: "#6b7280".to_string(),
                    statutory: false,
                    category: LeaveCategory::Unpaid,
                    cycle_months: 12,
                    accrual_method: AccrualMethod::LumpSum,
                    max_days_per_cycle: Decimal::ZERO,
                },
            ],
        }
    }
}
