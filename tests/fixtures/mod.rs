use serde_json::{Value, json};

use bookmarks::model::{NewBookmark, StoredRating};

fn bookmark(title: &str, url: &str, description: &str, rating: i64) -> NewBookmark {
    NewBookmark {
        title: title.to_string(),
        url: url.to_string(),
        rating: StoredRating::Integer(rating),
        description: description.to_string(),
    }
}

/// Fixture rows paired with how they come back from a fresh table, where
/// ids start at 1 in insertion order.
pub fn make_bookmarks_array() -> Vec<(NewBookmark, Value)> {
    let rows = [
        ("Book One", "www.goodbook.com", "This book is really good", 5),
        ("Book two", "www.badbook.com", "This book is really bad", 1),
        ("Book three", "www.bookthree.com", "This book is bad", 2),
        ("Book four", "www.bookfour.com", "This book is good", 4),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (title, url, description, rating))| {
            (
                bookmark(title, url, description, *rating),
                json!({
                    "id": i + 1,
                    "title": title,
                    "url": url,
                    "rating": rating,
                    "description": description,
                }),
            )
        })
        .collect()
}

/// A bookmark carrying XSS payloads in every text column, including a rating
/// stored as text, and the sanitized form clients should receive.
pub fn make_malicious_bookmark() -> (NewBookmark, Value) {
    let naughty = r#"Naughty naughty very naughty <script>alert("xss");</script>"#;
    let malicious = NewBookmark {
        title: naughty.to_string(),
        url: naughty.to_string(),
        rating: StoredRating::Text(naughty.to_string()),
        description: r#"Bad image <img src="https://url.to.file.which/does-not.exist" onerror="alert(document.cookie);">. But not <strong>all</strong> bad."#.to_string(),
    };

    let expected = json!({
        "id": 1,
        "title": r#"Naughty naughty very naughty &lt;script&gt;alert("xss");&lt;/script&gt;"#,
        "url": naughty,
        "rating": null,
        "description": r#"Bad image <img src="https://url.to.file.which/does-not.exist">. But not <strong>all</strong> bad."#,
    });

    (malicious, expected)
}
