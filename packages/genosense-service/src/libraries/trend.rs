use std::collections::BTreeMap;

use crate::models::{InfectionRecord, TrendBucket};

/// Group records by calendar day of record and average their levels.
///
/// Buckets come back sorted ascending by `YYYY-MM-DD`.
pub fn aggregate_by_date(records: &[InfectionRecord]) -> Vec<TrendBucket> {
    let mut days: BTreeMap<String, (u32, f64)> = BTreeMap::new();

    for record in records {
        let entry = days.entry(record.day()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.level;
    }

    days.into_iter()
        .map(|(date, (count, total_level))| TrendBucket {
            date,
            count,
            avg_level: if count > 0 {
                total_level / f64::from(count)
            } else {
                0.0
            },
        })
        .collect()
}
