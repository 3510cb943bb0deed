//! Leave balance rows: the authoritative per-employee, per-type, per-cycle
//! record of entitlement, usage, and remainder.
//!
//! Balance rows are mutated only through the invariant-preserving methods
//! here, driven by the ledger; `remaining_days == total_days - used_days`
//! holds at all times.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// One cycle's balance for one employee and one leave type.
///
/// The `version` field is the optimistic-concurrency token: every stored
/// mutation bumps it, and writers supply the version they read so racing
/// updates are detected instead of silently lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Unique identifier for the balance row.
    pub id: Uuid,
    /// The employee this balance belongs to.
    pub employee_id: Uuid,
    /// The leave type this balance tracks.
    pub leave_type_id: Uuid,
    /// The cycle key: the calendar year the cycle starts in.
    pub year: i32,
    /// First day of the cycle.
    pub cycle_start: NaiveDate,
    /// Last day of the cycle.
    pub cycle_end: NaiveDate,
    /// Total entitled days for the cycle.
    pub total_days: Decimal,
    /// Days already taken.
    pub used_days: Decimal,
    /// Days still available. Always `total_days - used_days`.
    pub remaining_days: Decimal,
    /// Days credited by monthly accrual so far: the idempotence watermark
    /// for the accrual batch.
    pub accrued_days: Decimal,
    /// Days carried over from the previous cycle.
    pub carried_over_days: Decimal,
    /// Optimistic-concurrency version token.
    pub version: u64,
    /// When the row was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl LeaveBalance {
    /// Creates a fresh balance row for a cycle with the given opening
    /// entitlement and nothing used.
    pub fn open_cycle(
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
        cycle_start: NaiveDate,
        cycle_end: NaiveDate,
        opening_days: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            leave_type_id,
            year,
            cycle_start,
            cycle_end,
            total_days: opening_days,
            used_days: Decimal::ZERO,
            remaining_days: opening_days,
            accrued_days: Decimal::ZERO,
            carried_over_days: Decimal::ZERO,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// Whether the row satisfies the ledger invariant.
    pub fn is_consistent(&self) -> bool {
        self.remaining_days == self.total_days - self.used_days
            && self.total_days >= Decimal::ZERO
            && self.used_days >= Decimal::ZERO
    }

    /// Records usage of `days`: increments `used_days`, decrements
    /// `remaining_days`. Fails if the remainder would go negative.
    pub fn record_usage(&mut self, days: Decimal) -> EngineResult<()> {
        if days <= Decimal::ZERO {
            return Err(EngineError::validation("usage must be a positive number of days"));
        }
        if days > self.remaining_days {
            return Err(EngineError::eligibility(format!(
                "insufficient balance: requested {days}, remaining {}",
                self.remaining_days
            )));
        }
        self.used_days += days;
        self.remaining_days -= days;
        Ok(())
    }

    /// Reverses previously recorded usage of `days`. Fails if it would
    /// drive `used_days` below zero.
    pub fn reverse_usage(&mut self, days: Decimal) -> EngineResult<()> {
        if days <= Decimal::ZERO {
            return Err(EngineError::validation("reversal must be a positive number of days"));
        }
        if days > self.used_days {
            return Err(EngineError::validation(format!(
                "cannot reverse {days} days: only {} days used",
                self.used_days
            )));
        }
        self.used_days -= days;
        self.remaining_days += days;
        Ok(())
    }

    /// Removes `days` of unused entitlement: decrements `total_days` and
    /// `remaining_days`, leaving `used_days` untouched. Fails if `days`
    /// exceeds the current remainder.
    pub fn forfeit(&mut self, days: Decimal) -> EngineResult<()> {
        if days <= Decimal::ZERO {
            return Err(EngineError::validation("forfeiture must be a positive number of days"));
        }
        if days > self.remaining_days {
            return Err(EngineError::eligibility(format!(
                "cannot forfeit {days} days: only {} remaining",
                self.remaining_days
            )));
        }
        self.total_days -= days;
        self.remaining_days -= days;
        Ok(())
    }

    /// Credits `days` of accrued entitlement: increments `accrued_days`,
    /// `total_days`, and `remaining_days`.
    pub fn credit_accrual(&mut self, days: Decimal) -> EngineResult<()> {
        if days <= Decimal::ZERO {
            return Err(EngineError::validation("accrual credit must be a positive number of days"));
        }
        self.accrued_days += days;
        self.total_days += days;
        self.remaining_days += days;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_balance(total: &str, used: &str) -> LeaveBalance {
        let total = dec(total);
        let used = dec(used);
        LeaveBalance {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            leave_type_id: Uuid::new_v4(),
            year: 2025,
            cycle_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            cycle_end: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            total_days: total,
            used_days: used,
            remaining_days: total - used,
            accrued_days: total,
            carried_over_days: Decimal::ZERO,
            version: 0,
            updated_at: Utc::now(),
        }
    }

    // =========================================================================
    // BL-001: usage moves days from remaining to used
    // =========================================================================
    #[test]
    fn test_bl_001_record_usage() {
        let mut balance = create_balance("21", "0");
        balance.record_usage(dec("5")).unwrap();

        assert_eq!(balance.used_days, dec("5"));
        assert_eq!(balance.remaining_days, dec("16"));
        assert_eq!(balance.total_days, dec("21"));
        assert!(balance.is_consistent());
    }

    // =========================================================================
    // BL-002: usage beyond the remainder is rejected untouched
    // =========================================================================
    #[test]
    fn test_bl_002_usage_cannot_exceed_remaining() {
        let mut balance = create_balance("21", "20");
        let err = balance.record_usage(dec("2")).unwrap_err();

        assert!(matches!(err, EngineError::Eligibility { .. }));
        assert_eq!(balance.used_days, dec("20"));
        assert_eq!(balance.remaining_days, dec("1"));
    }

    // =========================================================================
    // BL-003: usage then reversal restores the row exactly
    // =========================================================================
    #[test]
    fn test_bl_003_usage_reversal_round_trip() {
        let mut balance = create_balance("21", "3");
        let before = balance.clone();

        balance.record_usage(dec("5")).unwrap();
        balance.reverse_usage(dec("5")).unwrap();

        assert_eq!(balance.total_days, before.total_days);
        assert_eq!(balance.used_days, before.used_days);
        assert_eq!(balance.remaining_days, before.remaining_days);
    }

    // =========================================================================
    // BL-004: reversal cannot drive used below zero
    // =========================================================================
    #[test]
    fn test_bl_004_reversal_cannot_exceed_used() {
        let mut balance = create_balance("21", "2");
        let err = balance.reverse_usage(dec("3")).unwrap_err();

        assert!(matches!(err, EngineError::Validation { .. }));
        assert_eq!(balance.used_days, dec("2"));
    }

    // =========================================================================
    // BL-005: forfeiture reduces total and remaining, never used
    // =========================================================================
    #[test]
    fn test_bl_005_forfeit_leaves_used_untouched() {
        let mut balance = create_balance("21", "6");
        balance.forfeit(dec("10")).unwrap();

        assert_eq!(balance.total_days, dec("11"));
        assert_eq!(balance.remaining_days, dec("5"));
        assert_eq!(balance.used_days, dec("6"));
        assert!(balance.is_consistent());
    }

    // =========================================================================
    // BL-006: forfeiture capped at the remainder
    // =========================================================================
    #[test]
    fn test_bl_006_forfeit_cannot_exceed_remaining() {
        let mut balance = create_balance("21", "15");
        let err = balance.forfeit(dec("7")).unwrap_err();

        assert!(matches!(err, EngineError::Eligibility { .. }));
        assert_eq!(balance.total_days, dec("21"));
    }

    #[test]
    fn test_accrual_credit_updates_watermark() {
        let mut balance = create_balance("0", "0");
        balance.accrued_days = Decimal::ZERO;

        balance.credit_accrual(dec("1.75")).unwrap();
        balance.credit_accrual(dec("1.75")).unwrap();

        assert_eq!(balance.accrued_days, dec("3.50"));
        assert_eq!(balance.total_days, dec("3.50"));
        assert_eq!(balance.remaining_days, dec("3.50"));
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_half_day_usage() {
        let mut balance = create_balance("21", "0");
        balance.record_usage(dec("0.5")).unwrap();

        assert_eq!(balance.used_days, dec("0.5"));
        assert_eq!(balance.remaining_days, dec("20.5"));
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        let mut balance = create_balance("21", "5");
        assert!(balance.record_usage(Decimal::ZERO).is_err());
        assert!(balance.reverse_usage(dec("-1")).is_err());
        assert!(balance.forfeit(Decimal::ZERO).is_err());
        assert!(balance.credit_accrual(dec("-0.5")).is_err());
    }

    #[test]
    fn test_open_cycle_starts_consistent() {
        let balance = LeaveBalance::open_cycle(
            Uuid::new_v4(),
            Uuid::new_v4(),
            2025,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            dec("30"),
        );

        assert!(balance.is_consistent());
        assert_eq!(balance.remaining_days, dec("30"));
        assert_eq!(balance.used_days, Decimal::ZERO);
        assert_eq!(balance.version, 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // The invariant survives any sequence of mutations, whether each
            // one is accepted or refused.
            #[test]
            fn prop_invariant_holds_after_mutations(ops in prop::collection::vec(0u8..4, 0..32)) {
                let mut balance = create_balance("21", "0");
                for op in ops {
                    let _ = match op {
                        0 => balance.record_usage(dec("1")),
                        1 => balance.reverse_usage(dec("1")),
                        2 => balance.forfeit(dec("2")),
                        _ => balance.credit_accrual(dec("1.75")),
                    };
                    prop_assert!(balance.is_consistent());
                }
            }
        }
    }
}
