use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::period::Period;

/// One price row as read from the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the source file.
    pub line: u64,
    pub date: NaiveDate,
    pub open: Decimal,
    pub close: Decimal,
}

/// A raw row plus its daily close-minus-open difference and month key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedRecord {
    pub line: u64,
    pub date: NaiveDate,
    pub open: Decimal,
    pub close: Decimal,
    pub diff: Decimal,
    pub period: Period,
}
