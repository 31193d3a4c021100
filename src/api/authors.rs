//! Author page handlers: list, detail, create form.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    forms::{sanitize, validate, Check, FormData, Rule, Sanitizer, Target, Transform},
    models::{
        author::{Author, NewAuthor},
        book::Book,
    },
    view::{self, Page},
    AppState,
};

const RULES: &[Rule] = &[
    Rule { field: "first_name", check: Check::Required, message: "First name must be specified." },
    Rule { field: "first_name", check: Check::MaxLength(100), message: "First name too long." },
    Rule { field: "family_name", check: Check::Required, message: "Family name must be specified." },
    Rule { field: "family_name", check: Check::MaxLength(100), message: "Family name too long." },
    Rule { field: "date_of_birth", check: Check::OptionalDate, message: "Invalid date of birth" },
    Rule { field: "date_of_death", check: Check::OptionalDate, message: "Invalid date of death" },
];

const SANITIZERS: &[Sanitizer] = &[
    Sanitizer { target: Target::All, transform: Transform::Trim },
    Sanitizer { target: Target::Field("first_name"), transform: Transform::Escape },
    Sanitizer { target: Target::Field("family_name"), transform: Transform::Escape },
    Sanitizer { target: Target::Field("date_of_birth"), transform: Transform::ToDate },
    Sanitizer { target: Target::Field("date_of_death"), transform: Transform::ToDate },
];

/// Candidate author rebuilt from a submitted form
#[derive(Debug, Clone)]
struct AuthorSubmission {
    first_name: String,
    family_name: String,
    date_of_birth: String,
    date_of_death: String,
}

impl AuthorSubmission {
    fn from_form(form: &FormData) -> Self {
        Self {
            first_name: form.first("first_name").to_string(),
            family_name: form.first("family_name").to_string(),
            date_of_birth: form.first("date_of_birth").to_string(),
            date_of_death: form.first("date_of_death").to_string(),
        }
    }

    fn view(&self) -> Value {
        json!({
            "first_name": self.first_name,
            "family_name": self.family_name,
            "date_of_birth": self.date_of_birth,
            "date_of_death": self.date_of_death,
        })
    }

    fn to_record(&self) -> AppResult<NewAuthor> {
        let parse = |value: &str, what: &str| {
            if value.is_empty() {
                Ok(None)
            } else {
                chrono::NaiveDate::parse_from_str(value, crate::forms::DATE_FORMAT)
                    .map(Some)
                    .map_err(|_| AppError::BadRequest(format!("Malformed {}", what)))
            }
        };

        Ok(NewAuthor {
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth: parse(&self.date_of_birth, "date of birth")?,
            date_of_death: parse(&self.date_of_death, "date of death")?,
        })
    }
}

/// Author list page, catalog order
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "authors",
    responses(
        (status = 200, description = "All authors")
    )
)]
pub async fn author_list(State(state): State<AppState>) -> AppResult<Page> {
    let authors = state.repository.authors.list().await?;

    Ok(Page::new(
        "author_list",
        json!({
            "title": "Author List",
            "author_list": authors.iter().map(Author::view).collect::<Vec<_>>(),
        }),
    ))
}

/// Author detail page
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author with their books"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Page> {
    let repo = &state.repository;

    let (author, author_books) = tokio::try_join!(
        repo.authors.get(id),
        repo.books.list_by_author(id),
    )?;

    let Some(author) = author else {
        return Err(AppError::NotFound(format!("Author {} not found", id)));
    };

    Ok(Page::new(
        "author_detail",
        json!({
            "title": "Author Detail",
            "author": author.view(),
            "author_books": author_books.iter().map(Book::view).collect::<Vec<_>>(),
        }),
    ))
}

/// Author create form
#[utoipa::path(
    get,
    path = "/catalog/author/create",
    tag = "authors",
    responses((status = 200, description = "Empty author form"))
)]
pub async fn author_create_get() -> Page {
    Page::new("author_form", json!({ "title": "Create Author" }))
}

/// Author create submission
#[utoipa::path(
    post,
    path = "/catalog/author/create",
    tag = "authors",
    responses(
        (status = 303, description = "Created; redirect to the new author"),
        (status = 422, description = "Validation failed; form re-rendered with errors")
    )
)]
pub async fn author_create_post(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let mut form = FormData::from_pairs(fields);

    let errors = validate(&form, RULES);
    sanitize(&mut form, SANITIZERS);
    let author = AuthorSubmission::from_form(&form);

    if !errors.is_empty() {
        let page = Page::new(
            "author_form",
            json!({
                "title": "Create Author",
                "author": author.view(),
                "errors": errors,
            }),
        )
        .with_status(StatusCode::UNPROCESSABLE_ENTITY);
        return Ok(page.into_response());
    }

    let id = state.repository.authors.create(&author.to_record()?).await?;
    tracing::info!("Created author id={}", id);

    Ok(Redirect::to(&Author::url_for(id)).into_response())
}

/// Author delete form (not implemented)
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn author_delete_get() -> Response {
    view::not_implemented("Author delete GET")
}

/// Author delete submission (not implemented)
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn author_delete_post() -> Response {
    view::not_implemented("Author delete POST")
}

/// Author update form (not implemented)
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn author_update_get() -> Response {
    view::not_implemented("Author update GET")
}

/// Author update submission (not implemented)
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn author_update_post() -> Response {
    view::not_implemented("Author update POST")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn both_names_are_required_and_bounded() {
        let long_name = "x".repeat(101);
        let data = form(&[("first_name", ""), ("family_name", long_name.as_str())]);
        let errors = validate(&data, RULES);

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["first_name", "family_name"]);
        assert_eq!(errors[1].message, "Family name too long.");
    }

    #[test]
    fn valid_submission_builds_a_record_with_parsed_dates() {
        let mut data = form(&[
            ("first_name", " Ursula "),
            ("family_name", "Le Guin"),
            ("date_of_birth", "1929-10-21"),
            ("date_of_death", ""),
        ]);

        assert!(validate(&data, RULES).is_empty());
        sanitize(&mut data, SANITIZERS);

        let record = AuthorSubmission::from_form(&data).to_record().unwrap();
        assert_eq!(record.first_name, "Ursula");
        assert_eq!(
            record.date_of_birth,
            chrono::NaiveDate::from_ymd_opt(1929, 10, 21)
        );
        assert_eq!(record.date_of_death, None);
    }
}
