//! Base64 serde adapters for binary attributes.
//!
//! DynamoDB JSON carries `B` and `BS` members as standard base64 strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub(crate) fn serialize<S: Serializer>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(value))
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
    let text = String::deserialize(deserializer)?;
    decode(&text).map_err(D::Error::custom)
}

fn decode(text: &str) -> Result<Bytes, String> {
    STANDARD
        .decode(text)
        .map(Bytes::from)
        .map_err(|e| format!("invalid base64 in binary attribute: {e}"))
}

/// `BS` members: a list of base64 strings.
pub(crate) mod set {
    use super::{decode, Bytes, Deserialize, Deserializer, Engine, Serializer, STANDARD};
    use serde::de::Error as _;

    pub(crate) fn serialize<S: Serializer>(
        values: &[Bytes],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| STANDARD.encode(v)))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Bytes>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|text| decode(text).map_err(D::Error::custom))
            .collect()
    }
}
