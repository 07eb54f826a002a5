//! Opaque document identifier.
//!
//! # Responsibility
//! - Generate stable, roughly time-ordered identifiers for stored documents.
//! - Provide the canonical 24-char lowercase hex form used on the wire.
//!
//! # Invariants
//! - An `ObjectId` is exactly 12 bytes.
//! - `Display` and `Serialize` always emit the canonical hex form.

use once_cell::sync::Lazy;
use rand::RngCore;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const OBJECT_ID_LEN: usize = 12;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| {
    let mut bytes = [0_u8; 5];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
});
static COUNTER: Lazy<AtomicU32> =
    Lazy::new(|| AtomicU32::new(rand::thread_rng().next_u32() & COUNTER_MASK));

/// 12-byte identifier: 4-byte unix seconds, 5 process-unique bytes and a
/// 3-byte rolling counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

/// Returned when text is not a 24-char hex identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidObjectId(pub String);

impl Display for InvalidObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid object id `{}`: expected 24 hex chars", self.0)
    }
}

impl Error for InvalidObjectId {}

impl ObjectId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or_default();
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0_u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(PROCESS_UNIQUE.as_slice());
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Creation time embedded in the identifier, in unix seconds.
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Parses the 24-char hex form. Upper-case hex is accepted.
    pub fn parse_str(value: &str) -> Result<Self, InvalidObjectId> {
        if value.len() != OBJECT_ID_LEN * 2 {
            return Err(InvalidObjectId(value.to_string()));
        }
        let mut bytes = [0_u8; OBJECT_ID_LEN];
        hex::decode_to_slice(value, &mut bytes)
            .map_err(|_| InvalidObjectId(value.to_string()))?;
        Ok(Self(bytes))
    }

    /// Canonical lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_str(value)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_str(&text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectId;

    #[test]
    fn parse_and_display_use_lowercase_hex() {
        let id = ObjectId::parse_str("507F191E810C19729DE860EA").unwrap();
        assert_eq!(id.to_string(), "507f191e810c19729de860ea");
    }

    #[test]
    fn parse_rejects_wrong_length_and_non_hex() {
        assert!(ObjectId::parse_str("507f191e").is_err());
        assert!(ObjectId::parse_str("zz7f191e810c19729de860ea").is_err());
    }

    #[test]
    fn generated_ids_are_unique_and_carry_timestamp() {
        let first = ObjectId::new();
        let second = ObjectId::new();
        assert_ne!(first, second);
        assert!(first.timestamp_secs() > 1_500_000_000);
    }

    #[test]
    fn serde_uses_hex_string() {
        let id = ObjectId::parse_str("507f191e810c19729de860ea").unwrap();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, "507f191e810c19729de860ea");
        let decoded: ObjectId = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, id);
    }
}
