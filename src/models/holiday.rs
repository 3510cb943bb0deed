//! Public holiday reference data.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A public holiday consumed by the working-day calculator.
///
/// When a holiday falls on a Sunday it is observed on the following Monday;
/// such entries carry the shifted date in `date` and the Sunday in
/// `original_date`. Only observed holidays are excluded from working-day
/// counts, and only on their observed date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicHoliday {
    /// Unique identifier for the holiday entry.
    pub id: Uuid,
    /// The date the holiday is observed on.
    pub date: NaiveDate,
    /// The name of the holiday (e.g., "Heritage Day").
    pub name: String,
    /// Whether the holiday is observed as a non-working day.
    pub observed: bool,
    /// The original date, when the holiday was shifted off a Sunday.
    pub original_date: Option<NaiveDate>,
}

impl PublicHoliday {
    /// The calendar year this holiday entry belongs to.
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}
