//! Wire types of the DA JSON-RPC protocol.
//!
//! Byte strings travel as standard base64. A nil list is sent as `null`.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

/// Bytes encoded as a base64 string.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Base64Bytes(pub(crate) Vec<u8>);

impl Serialize for Base64Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Base64Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map(Self).map_err(D::Error::custom)
    }
}

impl From<Vec<u8>> for Base64Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Base64Bytes {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

/// Response of `da.GetIDs`.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct GetIdsResponse {
    #[serde(rename = "IDs", default)]
    pub(crate) ids: Option<Vec<Base64Bytes>>,

    #[serde(rename = "Timestamp", default)]
    pub(crate) timestamp: DateTime<Utc>,
}
