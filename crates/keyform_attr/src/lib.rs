//! # Keyform Attr
//!
//! Self-describing attribute values for Keyform.
//!
//! Stored items are maps from attribute name to a typed value, in the shape
//! used by DynamoDB-style stores:
//!
//! - Scalars: `S` (string), `N` (number as decimal string), `B` (bytes)
//! - `BOOL` and `NULL` markers
//! - Nested documents: `M` (map) and `L` (list)
//! - Sets: `SS`, `NS`, `BS`
//!
//! Key attributes are always one of the scalar kinds, see [`AttributeKind`].
//!
//! ## Usage
//!
//! ```
//! use keyform_attr::{AttributeMap, AttributeValue};
//!
//! let mut item = AttributeMap::new();
//! item.insert("id".to_string(), AttributeValue::from("u-1"));
//! item.insert("age".to_string(), AttributeValue::from(30i64));
//!
//! assert_eq!(item["age"].as_n(), Some("30"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod binary;
mod error;
mod kind;
mod number;
mod value;

pub use error::{AttrError, AttrResult};
pub use kind::AttributeKind;
pub use number::is_number_string;
pub use value::{AttributeMap, AttributeValue};
