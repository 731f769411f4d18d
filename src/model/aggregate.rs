use rust_decimal::Decimal;

use super::period::Period;

/// Mean daily difference over every record of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyAggregate {
    pub period: Period,
    pub mean_diff: Decimal,
    /// Number of contributing records, never zero.
    pub count: usize,
}
