use chrono::Duration;
use rust_decimal::Decimal;
use serde_aux::field_attributes::deserialize_number_from_string;

/// The knobs of the lending rules. Defaults match the library's published terms.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LendingPolicy {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub loan_period_days: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_active_borrowings: usize,
    pub fine_per_overdue_day: Decimal,
    /// Days past due after which every further day is charged twice.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub extra_fine_after_days: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub due_soon_window_hours: i64,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: 30,
            max_active_borrowings: 3,
            fine_per_overdue_day: Decimal::new(50, 2),
            extra_fine_after_days: 30,
            due_soon_window_hours: 24,
        }
    }
}

impl LendingPolicy {
    pub fn loan_period(&self) -> Duration {
        Duration::days(self.loan_period_days)
    }

    pub fn due_soon_window(&self) -> Duration {
        Duration::hours(self.due_soon_window_hours)
    }
}
