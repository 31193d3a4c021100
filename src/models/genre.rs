//! Genre model

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Genre record. `name` is unique at the storage layer; the create
/// handler additionally dedups by name before inserting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl Genre {
    /// Canonical URL for the genre with the given id
    pub fn url_for(id: i32) -> String {
        format!("/catalog/genre/{}", id)
    }

    /// Canonical URL for this genre
    pub fn url(&self) -> String {
        Self::url_for(self.id)
    }

    /// Data bag for the view renderer
    pub fn view(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "url": self.url() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_derives_from_identity() {
        let genre = Genre { id: 3, name: "Fantasy".to_string() };
        assert_eq!(genre.url(), "/catalog/genre/3");
    }
}
