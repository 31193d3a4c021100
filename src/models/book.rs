//! Book model and related types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::author::Author;
use super::genre::Genre;

/// Full book model. Relations are loaded separately by the repository
/// ("populate"); a dangling reference stays `None`/empty.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    // Relations (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub author: Option<Author>,
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Short book representation for form select lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookRef {
    pub id: i32,
    pub title: String,
}

/// Create/update request, built from a sanitized form submission
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

impl Book {
    /// Canonical URL for the book with the given id
    pub fn url_for(id: i32) -> String {
        format!("/catalog/book/{}", id)
    }

    /// Canonical URL for this book
    pub fn url(&self) -> String {
        Self::url_for(self.id)
    }

    /// Data bag for the view renderer, expanded relations included
    pub fn view(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "url": self.url(),
            "summary": self.summary,
            "isbn": self.isbn,
            "author": self.author.as_ref().map(Author::view),
            "genre": self.genres.iter().map(Genre::view).collect::<Vec<_>>(),
        })
    }
}

impl BookRef {
    pub fn view(&self) -> Value {
        json!({ "id": self.id, "title": self.title })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_derives_from_identity() {
        let book = Book {
            id: 42,
            title: "T".to_string(),
            author_id: 1,
            summary: "S".to_string(),
            isbn: "123".to_string(),
            author: None,
            genres: vec![],
        };
        assert_eq!(book.url(), "/catalog/book/42");
    }

    #[test]
    fn view_leaves_missing_author_null() {
        let book = Book {
            id: 1,
            title: "T".to_string(),
            author_id: 9,
            summary: "S".to_string(),
            isbn: "123".to_string(),
            author: None,
            genres: vec![],
        };
        let bag = book.view();
        assert!(bag["author"].is_null());
        assert_eq!(bag["genre"].as_array().map(Vec::len), Some(0));
    }
}
