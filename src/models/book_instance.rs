//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::author::format_date;
use super::book::Book;

/// Loan status values used by convention. Stored as free text; the form
/// pipeline does not validate against this list.
pub const STATUS_AVAILABLE: &str = "Available";
pub const STATUS_MAINTENANCE: &str = "Maintenance";

/// Physical copy of a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: i32,
    pub book_id: i32,
    pub imprint: String,
    pub status: String,
    pub due_back: Option<NaiveDate>,
    // Relation (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub book: Option<Book>,
}

/// Create request, built from a sanitized form submission
#[derive(Debug, Clone)]
pub struct NewBookInstance {
    pub book_id: i32,
    pub imprint: String,
    pub status: String,
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    /// Canonical URL for the copy with the given id
    pub fn url_for(id: i32) -> String {
        format!("/catalog/bookinstance/{}", id)
    }

    /// Canonical URL for this copy
    pub fn url(&self) -> String {
        Self::url_for(self.id)
    }

    /// Data bag for the view renderer
    pub fn view(&self) -> Value {
        json!({
            "id": self.id,
            "url": self.url(),
            "imprint": self.imprint,
            "status": self.status,
            "due_back": self.due_back,
            "due_back_formatted": format_date(self.due_back),
            "book": self.book.as_ref().map(Book::view),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_derives_from_identity() {
        let copy = BookInstance {
            id: 11,
            book_id: 1,
            imprint: "London, 1958".to_string(),
            status: STATUS_AVAILABLE.to_string(),
            due_back: None,
            book: None,
        };
        assert_eq!(copy.url(), "/catalog/bookinstance/11");
        assert_eq!(copy.view()["due_back_formatted"], "");
    }
}
