//! Records and pagination metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

/// An item of a collection.
///
/// `fields` holds the user-defined schema fields keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Record identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    /// Display title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Creation time (Unix seconds).
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: i64,
    /// Last update time (Unix seconds).
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: i64,
    /// Identifier of the creating user.
    #[serde(deserialize_with = "null_as_default")]
    pub creator: u64,
    /// Schema-defined field values.
    #[serde(deserialize_with = "null_as_default")]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Returns a field value by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Pagination record found under `meta.pagination`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    /// Current page.
    #[serde(deserialize_with = "null_as_default")]
    pub page: u64,
    /// Items per page.
    #[serde(deserialize_with = "null_as_default")]
    pub page_size: u64,
    /// Total number of items.
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
    /// Total number of pages.
    #[serde(deserialize_with = "null_as_default")]
    pub total_pages: u64,
}

impl Pagination {
    /// Returns true if a page follows the current one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Image URLs in three sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlSet {
    /// Original size.
    pub full_size_url: String,
    /// 128x128 thumbnail.
    pub thumb_url: String,
    /// 26x26 icon.
    pub icon_url: String,
}

/// Uploaded image as stored in an image field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageResult {
    /// Image URLs.
    pub url: Option<UrlSet>,
    /// Free-form metadata.
    pub meta: Value,
    /// Expiry of the signed URLs.
    pub expired: i64,
    /// Size in bytes.
    pub file_size: i64,
    /// Creation time.
    pub created: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_missing_fields_default() {
        let record: Record = serde_json::from_value(json!({"id": 5})).unwrap();
        assert_eq!(record.id, 5);
        assert!(record.title.is_empty());
        assert!(record.field("anything").is_none());
    }

    #[test]
    fn test_record_null_members_default() {
        let record: Record = serde_json::from_value(json!({
            "id": 1,
            "title": null,
            "created_at": null,
            "updated_at": 0,
            "creator": null,
            "fields": null
        }))
        .unwrap();
        assert_eq!(record.id, 1);
        assert!(record.title.is_empty());
        assert_eq!(record.created_at, 0);
        assert_eq!(record.creator, 0);
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_pagination_wire_names() {
        let p = Pagination {
            page: 1,
            page_size: 10,
            total: 25,
            total_pages: 3,
        };
        assert_eq!(
            serde_json::to_value(p).unwrap(),
            json!({"page": 1, "pageSize": 10, "total": 25, "totalPages": 3})
        );
        assert!(p.has_next());
    }
}
