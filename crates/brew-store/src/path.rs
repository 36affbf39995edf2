//! # Document Paths
//!
//! Typed collection and document paths, so `shops/s1/ingredients` and a
//! bare ingredient id can't be mixed up in a call signature.
//!
//! A document path is always `collection + "/" + id`. Collections may be
//! nested (`shops/s1/ingredients`); the store does not interpret segments,
//! it only groups documents by their collection for listing.

use std::fmt;

/// A collection of documents, e.g. `shops/s1/ingredients`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Creates a collection path, trimming stray slashes.
    pub fn new(path: impl Into<String>) -> CollectionPath {
        CollectionPath(path.into().trim_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the document `id` within this collection.
    pub fn doc(&self, id: impl Into<String>) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single document's address: its collection plus an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    pub fn new(collection: &CollectionPath, id: impl Into<String>) -> DocumentPath {
        collection.doc(id)
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
