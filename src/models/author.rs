//! Author model and derived display attributes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Author record from the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Create author request, built from a sanitized form submission
#[derive(Debug, Clone)]
pub struct NewAuthor {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Display name in catalog order: "family_name, first_name"
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// Canonical URL for the author with the given id
    pub fn url_for(id: i32) -> String {
        format!("/catalog/author/{}", id)
    }

    /// Canonical URL for this author
    pub fn url(&self) -> String {
        Self::url_for(self.id)
    }

    /// Lifespan string for list pages, e.g. "1926 - 2001"
    pub fn lifespan(&self) -> String {
        let year = |d: &Option<NaiveDate>| {
            d.map(|d| d.format("%Y").to_string()).unwrap_or_default()
        };
        format!("{} - {}", year(&self.date_of_birth), year(&self.date_of_death))
    }

    /// Data bag for the view renderer, derived attributes included
    pub fn view(&self) -> Value {
        json!({
            "id": self.id,
            "first_name": self.first_name,
            "family_name": self.family_name,
            "name": self.display_name(),
            "url": self.url(),
            "date_of_birth": self.date_of_birth,
            "date_of_death": self.date_of_death,
            "date_of_birth_formatted": format_date(self.date_of_birth),
            "date_of_death_formatted": format_date(self.date_of_death),
            "lifespan": self.lifespan(),
        })
    }
}

/// Human-readable date, e.g. "June 3, 1926"; empty when absent
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_default()
}
