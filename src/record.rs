//! User record - the structured mapping describing the authenticated user.
//!
//! The persistence layer treats the record as opaque beyond one requirement:
//! it must serialize deterministically, so the verification digest computed
//! at login time matches the one recomputed at read time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrary field-name → value mapping for the authenticated user.
///
/// Backed by `serde_json`'s object map, which keeps keys sorted (the
/// `preserve_order` feature must stay disabled), so serialization is
/// canonical: the same record always produces the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the field existed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Canonical deterministic byte form: JSON with sorted keys.
    ///
    /// This is the exact payload the verification digest is computed over.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for UserRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for UserRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_bytes_sorts_keys() {
        // Insert in reverse order; canonical form is still key-sorted
        let mut record = UserRecord::new();
        record.insert("name", "alice");
        record.insert("id", 42);

        let bytes = record.canonical_bytes().unwrap();
        assert_eq!(bytes, br#"{"id":42,"name":"alice"}"#);
    }

    #[test]
    fn test_canonical_bytes_deterministic() {
        let a: UserRecord = [
            ("id".to_string(), json!(42)),
            ("name".to_string(), json!("alice")),
        ]
        .into_iter()
        .collect();
        let b: UserRecord = [
            ("name".to_string(), json!("alice")),
            ("id".to_string(), json!(42)),
        ]
        .into_iter()
        .collect();

        assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    }

    #[test]
    fn test_nested_objects_are_canonical_too() {
        let mut record = UserRecord::new();
        record.insert("roles", json!({"b": 1, "a": 2}));

        let bytes = record.canonical_bytes().unwrap();
        assert_eq!(bytes, br#"{"roles":{"a":2,"b":1}}"#);
    }

    #[test]
    fn test_roundtrip_through_value() {
        let mut record = UserRecord::new();
        record.insert("id", 42);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"id": 42}));

        let back: UserRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_empty_record() {
        let record = UserRecord::new();
        assert!(record.is_empty());
        assert_eq!(record.len(), 0);
        assert_eq!(record.canonical_bytes().unwrap(), b"{}");
    }
}
