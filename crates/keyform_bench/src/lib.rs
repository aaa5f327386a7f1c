//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use keyform_attr::AttributeMap;
use keyform_testkit::order_record;
use rand::Rng;
use time::OffsetDateTime;

/// Generate order records; roughly one in four has no status.
pub fn generate_records(count: usize) -> Vec<AttributeMap> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let status = rng.gen_ratio(3, 4).then_some("OPEN");
            let tenant = format!("tenant-{}", rng.gen_range(0..16));
            order_record(&tenant, &format!("o{i}"), status)
        })
        .collect()
}

/// Generate random timestamps between 1970 and 2100 in UTC.
pub fn generate_timestamps(count: usize) -> Vec<OffsetDateTime> {
    let mut rng = rand::thread_rng();
    (0..count)
        .filter_map(|_| OffsetDateTime::from_unix_timestamp(rng.gen_range(0..4_102_444_800)).ok())
        .collect()
}
