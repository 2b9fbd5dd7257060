use crate::domain::Borrowing;
use crate::lending::LendingPolicy;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days in `span`, rounding any started day up. Zero for empty or negative spans.
pub fn started_days(span: Duration) -> i64 {
    let millis = span.num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

impl LendingPolicy {
    /// The fine owed for a book due at `due_at` and still out (or handed back) at `now`.
    ///
    /// Every started day past due costs the daily rate; days beyond
    /// `extra_fine_after_days` are charged a second time on top of that.
    pub fn compute_fine(&self, due_at: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
        if now <= due_at {
            return Decimal::ZERO;
        }
        let overdue_days = started_days(now - due_at);
        if overdue_days <= 0 {
            return Decimal::ZERO;
        }

        let mut fine = Decimal::from(overdue_days) * self.fine_per_overdue_day;
        if overdue_days > self.extra_fine_after_days {
            let surcharged_days = overdue_days - self.extra_fine_after_days;
            fine += Decimal::from(surcharged_days) * self.fine_per_overdue_day;
        }
        fine.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Brings the fine of an unreturned, overdue borrowing up to date.
    ///
    /// Returns `true` when the record changed and has to be written back.
    pub fn accrue_fine(&self, borrowing: &mut Borrowing, now: DateTime<Utc>) -> bool {
        if !borrowing.is_overdue_at(now) {
            return false;
        }
        let fine = self.compute_fine(borrowing.due_at, now);
        let grew = fine > borrowing.fine_amount;
        let reopened = fine > Decimal::ZERO && borrowing.fine_paid;
        if !(grew || reopened) {
            return false;
        }
        borrowing.fine_amount = fine;
        borrowing.fine_paid = fine.is_zero();
        true
    }
}
