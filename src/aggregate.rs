use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::model::aggregate::MonthlyAggregate;
use crate::model::period::Period;
use crate::model::record::DerivedRecord;

/// Mean of `diff` per calendar month, ascending by period.
///
/// Input order does not matter. Months without records are not emitted.
pub fn monthly_mean_diff(records: &[DerivedRecord]) -> Vec<MonthlyAggregate> {
    let mut buckets: BTreeMap<Period, (Decimal, usize)> = BTreeMap::new();
    for record in records {
        let (sum, count) = buckets.entry(record.period).or_insert((Decimal::ZERO, 0));
        *sum += record.diff;
        *count += 1;
    }

    let series: Vec<MonthlyAggregate> = buckets
        .into_iter()
        .map(|(period, (sum, count))| MonthlyAggregate {
            period,
            mean_diff: sum / Decimal::from(count),
            count,
        })
        .collect();

    tracing::info!(
        records = records.len(),
        months = series.len(),
        "Aggregated monthly mean difference"
    );
    series
}
