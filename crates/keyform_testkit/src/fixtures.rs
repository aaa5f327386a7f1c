//! Sample entities, schemas and records.
//!
//! The order entity exercises every encoding family: text partitions,
//! a UTC epoch sort key, a padded integer sort key and a nested path.

use keyform_attr::{AttributeMap, AttributeValue};
use keyform_core::{
    CompiledEntity, EntityDefinition, FieldTypeTable, IndexCompiler, IndexDefinition,
    KeyDefinition,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Schema of the sample order entity.
pub fn order_schema() -> FieldTypeTable {
    [
        ("tenant", "string"),
        ("id", "string"),
        ("status", "string"),
        ("customer.id", "string"),
        ("total", "u64"),
        ("createdAt", "timestamp"),
    ]
    .into_iter()
    .collect()
}

/// Key layout of the sample order entity.
///
/// - `primary`: `TENANT#{tenant}` / `ORDER#{id}`
/// - `byStatus`: `STATUS#{status}` / `{createdAt:utc:unixnano:%020d}`
/// - `byCustomer`: `CUSTOMER#{customer.id}` / `{total:%020d}`
pub fn order_definition() -> EntityDefinition {
    EntityDefinition::new(
        "Order",
        IndexDefinition::new("primary", KeyDefinition::new("pk", "TENANT#{tenant}"))
            .with_sort(KeyDefinition::new("sk", "ORDER#{id}")),
    )
    .with_secondary(
        IndexDefinition::new("byStatus", KeyDefinition::new("gsi1pk", "STATUS#{status}"))
            .with_sort(KeyDefinition::new("gsi1sk", "{createdAt:utc:unixnano:%020d}")),
    )
    .with_secondary(
        IndexDefinition::new(
            "byCustomer",
            KeyDefinition::new("gsi2pk", "CUSTOMER#{customer.id}"),
        )
        .with_sort(KeyDefinition::new("gsi2sk", "{total:%020d}")),
    )
}

/// Compiles the sample order entity with the default compiler.
pub fn compiled_order() -> CompiledEntity {
    IndexCompiler::default()
        .compile(&order_definition(), &order_schema())
        .expect("sample order entity compiles")
}

/// A stored order record.
///
/// Sort-key fields hold their encoded text, as a storage client would
/// write them.
pub fn order_record(tenant: &str, id: &str, status: Option<&str>) -> AttributeMap {
    let mut record = AttributeMap::from([
        ("tenant".to_string(), AttributeValue::from(tenant)),
        ("id".to_string(), AttributeValue::from(id)),
        (
            "customer".to_string(),
            AttributeValue::map([("id", AttributeValue::from("c-1"))]),
        ),
        (
            "total".to_string(),
            AttributeValue::from("00000000000000001250"),
        ),
        (
            "createdAt".to_string(),
            AttributeValue::from("01704067200000000000"),
        ),
    ]);
    if let Some(status) = status {
        record.insert("status".to_string(), AttributeValue::from(status));
    }
    record
}

/// A record serialized as attribute-value JSON in a temporary directory.
pub struct TempRecordFile {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TempRecordFile {
    /// Writes `record` to `record.json` in a fresh temporary directory.
    pub fn new(record: &AttributeMap) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("record.json");
        let json = serde_json::to_string_pretty(record).expect("Failed to serialize record");
        std::fs::write(&path, json).expect("Failed to write record file");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
