//! # Versioned Documents
//!
//! A document is a JSON value plus a monotonically increasing version.
//! Versions start at 1 on create and bump by 1 on every committed write;
//! they are what commit-time conflict checks compare.

use serde::de::DeserializeOwned;

use crate::error::StoreResult;
use crate::path::DocumentPath;

/// Document version. `1` is the first committed state.
pub type Version = u64;

/// A document as read from the store: address, version, payload.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDocument {
    pub path: DocumentPath,
    pub version: Version,
    pub value: serde_json::Value,
}

impl VersionedDocument {
    /// Decodes the payload into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::CollectionPath;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pet {
        name: String,
        legs: u32,
    }

    #[test]
    fn test_decode_typed() {
        let doc = VersionedDocument {
            path: CollectionPath::new("pets").doc("p1"),
            version: 3,
            value: serde_json::json!({ "name": "Crab", "legs": 8 }),
        };
        let pet: Pet = doc.decode().unwrap();
        assert_eq!(
            pet,
            Pet {
                name: "Crab".to_string(),
                legs: 8
            }
        );
    }

    #[test]
    fn test_decode_wrong_shape_errors() {
        let doc = VersionedDocument {
            path: CollectionPath::new("pets").doc("p1"),
            version: 1,
            value: serde_json::json!({ "name": "Crab" }),
        };
        assert!(doc.decode::<Pet>().is_err());
    }
}
