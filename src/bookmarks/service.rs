use anyhow::Result;
use libsql::Connection;

use crate::model::{Bookmark, BookmarkPatch, NewBookmark, StoredRating};

/// CRUD over the `bookmarks` table. Borrows the shared connection for the
/// duration of one request; every call is a round trip to the store.
pub struct BookmarksService<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarksService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<Bookmark>> {
        let query = r#"
            SELECT id, title, url, rating, description
            FROM bookmarks
            ORDER BY id
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut bookmarks = Vec::new();

        while let Some(row) = rows.next().await? {
            bookmarks.push(row_to_bookmark(&row)?);
        }

        Ok(bookmarks)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Bookmark>> {
        let query = r#"
            SELECT id, title, url, rating, description
            FROM bookmarks WHERE id = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Persists `input` as given. Callers validate before getting here.
    pub async fn insert(&self, input: NewBookmark) -> Result<Bookmark> {
        let query = r#"
            INSERT INTO bookmarks (title, url, rating, description)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, url, rating, description
        "#;

        let rating: libsql::Value = input.rating.into();
        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![input.title, input.url, rating, input.description],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(row_to_bookmark(&row)?)
        } else {
            anyhow::bail!("Failed to create bookmark")
        }
    }

    /// Writes the attributes present in `patch`. Returns the number of rows
    /// touched, so 0 means no bookmark has that id.
    pub async fn update(&self, id: i64, patch: BookmarkPatch) -> Result<u64> {
        let mut updates = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(title) = patch.title {
            updates.push("title = ?");
            params.push(title.into());
        }
        if let Some(url) = patch.url {
            updates.push("url = ?");
            params.push(url.into());
        }
        if let Some(rating) = patch.rating {
            updates.push("rating = ?");
            params.push(rating.into());
        }
        if let Some(description) = patch.description {
            updates.push("description = ?");
            params.push(description.into());
        }

        if updates.is_empty() {
            return Ok(0);
        }

        params.push(id.into());
        let query = format!("UPDATE bookmarks SET {} WHERE id = ?", updates.join(", "));

        Ok(self.conn.execute(&query, params).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<u64> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?", libsql::params![id])
            .await?;
        Ok(affected)
    }
}

fn row_to_bookmark(row: &libsql::Row) -> Result<Bookmark> {
    let rating = match row.get_value(3)? {
        libsql::Value::Integer(n) => StoredRating::Integer(n),
        libsql::Value::Real(n) => StoredRating::Real(n),
        libsql::Value::Text(s) => StoredRating::Text(s),
        other => anyhow::bail!("unexpected rating value: {:?}", other),
    };

    Ok(Bookmark {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        rating,
        description: row.get(4)?,
    })
}
