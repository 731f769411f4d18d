use crate::model::period::Period;
use crate::model::record::{DerivedRecord, RawRecord};

pub fn derive_record(raw: &RawRecord) -> DerivedRecord {
    DerivedRecord {
        line: raw.line,
        date: raw.date,
        open: raw.open,
        close: raw.close,
        diff: raw.close - raw.open,
        period: Period::from_date(raw.date),
    }
}

/// One derived record per input, same order.
pub fn derive_records(records: &[RawRecord]) -> Vec<DerivedRecord> {
    records.iter().map(derive_record).collect()
}
