use serde::{Serialize, Serializer};

use crate::model::Bookmark;
use crate::sanitize::sanitize;

/// A bookmark as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerializedBookmark {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub rating: WireRating,
    pub description: String,
}

/// Numeric rating on the wire. Whole numbers serialize as JSON integers,
/// anything that is not a finite number as `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireRating(pub f64);

impl Serialize for WireRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let n = self.0;
        if !n.is_finite() {
            serializer.serialize_none()
        } else if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
            serializer.serialize_i64(n as i64)
        } else {
            serializer.serialize_f64(n)
        }
    }
}

pub fn serialize_bookmark(bookmark: &Bookmark) -> SerializedBookmark {
    SerializedBookmark {
        id: bookmark.id,
        title: sanitize(&bookmark.title),
        url: bookmark.url.clone(),
        rating: WireRating(bookmark.rating.as_number()),
        description: sanitize(&bookmark.description),
    }
}
