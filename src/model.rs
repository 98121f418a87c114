/// Rating as it sits in the store. The column has integer affinity, but
/// SQLite keeps text that does not look like a number as text.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRating {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl StoredRating {
    /// Numeric value of the rating, `NaN` when the stored text is not a number.
    ///
    /// Text follows the lenient string-to-number rules clients expect:
    /// surrounding whitespace is ignored and blank text is zero.
    pub fn as_number(&self) -> f64 {
        match self {
            StoredRating::Integer(n) => *n as f64,
            StoredRating::Real(n) => *n,
            StoredRating::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return 0.0;
                }
                // Rust accepts "inf"/"nan" spellings that are not numbers here.
                if trimmed.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
                    return f64::NAN;
                }
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
    }
}

impl From<StoredRating> for libsql::Value {
    fn from(rating: StoredRating) -> Self {
        match rating {
            StoredRating::Integer(n) => libsql::Value::Integer(n),
            StoredRating::Real(n) => libsql::Value::Real(n),
            StoredRating::Text(s) => libsql::Value::Text(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub rating: StoredRating,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub rating: StoredRating,
    pub description: String,
}

/// Sparse update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub rating: Option<StoredRating>,
    pub description: Option<String>,
}

impl BookmarkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none() && self.rating.is_none() && self.description.is_none()
    }
}
