//! Genre page handlers: list, detail, create form.
//!
//! Genre creation dedups by name: an existing genre wins over a new
//! insert and the client is redirected to it. The unique index on
//! `genres.name` backs the check, so two concurrent submissions of the
//! same new name cannot both insert; the loser re-fetches the winner.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    forms::{sanitize, validate, Check, FormData, Rule, Sanitizer, Target, Transform},
    models::{book::Book, genre::Genre},
    view::{self, Page},
    AppState,
};

const RULES: &[Rule] = &[
    Rule { field: "name", check: Check::Required, message: "Genre name required" },
];

const SANITIZERS: &[Sanitizer] = &[
    Sanitizer { target: Target::Field("name"), transform: Transform::Trim },
    Sanitizer { target: Target::Field("name"), transform: Transform::Escape },
];

/// Genre list page, name ascending
#[utoipa::path(
    get,
    path = "/catalog/genres",
    tag = "genres",
    responses(
        (status = 200, description = "All genres sorted by name")
    )
)]
pub async fn genre_list(State(state): State<AppState>) -> AppResult<Page> {
    let genres = state.repository.genres.list().await?;

    Ok(Page::new(
        "genre_list",
        json!({
            "title": "Genre List",
            "genre_list": genres.iter().map(Genre::view).collect::<Vec<_>>(),
        }),
    ))
}

/// Genre detail page
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre with the books carrying it"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn genre_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Page> {
    let repo = &state.repository;

    let (genre, genre_books) = tokio::try_join!(
        repo.genres.get(id),
        repo.books.list_by_genre(id),
    )?;

    let Some(genre) = genre else {
        return Err(AppError::NotFound(format!("Genre {} not found", id)));
    };

    Ok(Page::new(
        "genre_detail",
        json!({
            "title": "Genre Detail",
            "genre": genre.view(),
            "genre_books": genre_books.iter().map(Book::view).collect::<Vec<_>>(),
        }),
    ))
}

/// Genre create form
#[utoipa::path(
    get,
    path = "/catalog/genre/create",
    tag = "genres",
    responses((status = 200, description = "Empty genre form"))
)]
pub async fn genre_create_get() -> Page {
    Page::new("genre_form", json!({ "title": "Create Genre" }))
}

/// Genre create submission
#[utoipa::path(
    post,
    path = "/catalog/genre/create",
    tag = "genres",
    responses(
        (status = 303, description = "Redirect to the new or already existing genre"),
        (status = 422, description = "Validation failed; form re-rendered with errors")
    )
)]
pub async fn genre_create_post(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let mut form = FormData::from_pairs(fields);

    let errors = validate(&form, RULES);
    sanitize(&mut form, SANITIZERS);
    let name = form.first("name").to_string();

    if !errors.is_empty() {
        let page = Page::new(
            "genre_form",
            json!({
                "title": "Create Genre",
                "genre": { "name": name },
                "errors": errors,
            }),
        )
        .with_status(StatusCode::UNPROCESSABLE_ENTITY);
        return Ok(page.into_response());
    }

    // A genre with this name already exists: redirect instead of inserting
    if let Some(existing) = state.repository.genres.find_by_name(&name).await? {
        return Ok(Redirect::to(&existing.url()).into_response());
    }

    match state.repository.genres.create(&name).await? {
        Some(id) => {
            tracing::info!("Created genre id={}", id);
            Ok(Redirect::to(&Genre::url_for(id)).into_response())
        }
        // Lost the race against a concurrent identical submission;
        // the unique index kept a single row, redirect to it.
        None => {
            let existing = state
                .repository
                .genres
                .find_by_name(&name)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!("Genre '{}' vanished after insert conflict", name))
                })?;
            Ok(Redirect::to(&existing.url()).into_response())
        }
    }
}

/// Genre delete form (not implemented)
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn genre_delete_get() -> Response {
    view::not_implemented("Genre delete GET")
}

/// Genre delete submission (not implemented)
#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn genre_delete_post() -> Response {
    view::not_implemented("Genre delete POST")
}

/// Genre update form (not implemented)
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn genre_update_get() -> Response {
    view::not_implemented("Genre update GET")
}

/// Genre update submission (not implemented)
#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn genre_update_post() -> Response {
    view::not_implemented("Genre update POST")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_and_escaped_before_lookup() {
        let pairs = vec![("name".to_string(), "  Sword & Sorcery  ".to_string())];
        let mut form = FormData::from_pairs(pairs);

        let errors = validate(&form, RULES);
        sanitize(&mut form, SANITIZERS);

        assert!(errors.is_empty());
        assert_eq!(form.first("name"), "Sword &amp; Sorcery");
    }

    #[test]
    fn empty_name_fails_validation_even_after_sanitizing() {
        let pairs = vec![("name".to_string(), "   ".to_string())];
        let mut form = FormData::from_pairs(pairs);

        let errors = validate(&form, RULES);
        sanitize(&mut form, SANITIZERS);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].message, "Genre name required");
    }
}
