//! Addressing and write primitives for the document store

use std::fmt;

/// Address of a single document: the collection it lives in and its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Value written by a [`FieldUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    /// Resolved by the store at write time, in milliseconds since the Unix epoch.
    ServerTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub field: String,
    pub value: FieldValue,
}

impl FieldUpdate {
    pub fn set(field: impl Into<String>, value: FieldValue) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_ref_displays_as_path() {
        let target = DocumentRef::new("reports", "rep123");
        assert_eq!(target.to_string(), "reports/rep123");
    }
}
