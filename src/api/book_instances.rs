//! Book instance (physical copy) page handlers.
//!
//! The reference implementation's detail page tested the wrong variable
//! in its missing-copy check and could never 404; here the fetched copy
//! itself is checked.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    forms::{
        sanitize, validate, Check, FieldError, FormData, Rule, Sanitizer, Target, Transform,
    },
    models::{
        book::BookRef,
        book_instance::{BookInstance, NewBookInstance},
    },
    view::{self, Page},
    AppState,
};

const RULES: &[Rule] = &[
    Rule { field: "book", check: Check::Required, message: "Book must be specified" },
    Rule { field: "imprint", check: Check::Required, message: "Imprint must be specified" },
    Rule { field: "due_back", check: Check::OptionalDate, message: "Invalid date" },
];

const SANITIZERS: &[Sanitizer] = &[
    Sanitizer { target: Target::Field("book"), transform: Transform::Trim },
    Sanitizer { target: Target::Field("book"), transform: Transform::Escape },
    Sanitizer { target: Target::Field("imprint"), transform: Transform::Trim },
    Sanitizer { target: Target::Field("imprint"), transform: Transform::Escape },
    Sanitizer { target: Target::Field("status"), transform: Transform::Trim },
    Sanitizer { target: Target::Field("status"), transform: Transform::Escape },
    Sanitizer { target: Target::Field("due_back"), transform: Transform::Trim },
    Sanitizer { target: Target::Field("due_back"), transform: Transform::ToDate },
];

/// Candidate copy rebuilt from a submitted form
#[derive(Debug, Clone)]
struct InstanceSubmission {
    book: String,
    imprint: String,
    status: String,
    due_back: String,
}

impl InstanceSubmission {
    fn from_form(form: &FormData) -> Self {
        Self {
            book: form.first("book").to_string(),
            imprint: form.first("imprint").to_string(),
            status: form.first("status").to_string(),
            due_back: form.first("due_back").to_string(),
        }
    }

    fn view(&self) -> Value {
        json!({
            "book": self.book,
            "imprint": self.imprint,
            "status": self.status,
            "due_back": self.due_back,
        })
    }

    fn to_record(&self) -> AppResult<NewBookInstance> {
        let book_id = self
            .book
            .parse()
            .map_err(|_| AppError::BadRequest("Malformed book reference".to_string()))?;
        let due_back = if self.due_back.is_empty() {
            None
        } else {
            Some(
                chrono::NaiveDate::parse_from_str(&self.due_back, crate::forms::DATE_FORMAT)
                    .map_err(|_| AppError::BadRequest("Malformed due date".to_string()))?,
            )
        };

        Ok(NewBookInstance {
            book_id,
            imprint: self.imprint.clone(),
            status: self.status.clone(),
            due_back,
        })
    }
}

/// Copy list page
#[utoipa::path(
    get,
    path = "/catalog/bookinstances",
    tag = "bookinstances",
    responses(
        (status = 200, description = "All copies with their books")
    )
)]
pub async fn bookinstance_list(State(state): State<AppState>) -> AppResult<Page> {
    let instances = state.repository.book_instances.list().await?;

    Ok(Page::new(
        "bookinstance_list",
        json!({
            "title": "Book Instance List",
            "bookinstance_list": instances.iter().map(BookInstance::view).collect::<Vec<_>>(),
        }),
    ))
}

/// Copy detail page
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}",
    tag = "bookinstances",
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy with its book"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn bookinstance_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Page> {
    let instance = state.repository.book_instances.get(id).await?;

    let Some(instance) = instance else {
        return Err(AppError::NotFound(format!("Book copy {} not found", id)));
    };

    Ok(Page::new(
        "bookinstance_detail",
        json!({
            "title": "Book:",
            "bookinstance": instance.view(),
        }),
    ))
}

/// Copy create form
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Empty copy form with the book list")
    )
)]
pub async fn bookinstance_create_get(State(state): State<AppState>) -> AppResult<Page> {
    let books = state.repository.books.list_refs().await?;

    Ok(Page::new(
        "bookinstance_form",
        json!({
            "title": "Create BookInstance",
            "book_list": books.iter().map(BookRef::view).collect::<Vec<_>>(),
        }),
    ))
}

/// Copy create submission
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    responses(
        (status = 303, description = "Created; redirect to the new copy"),
        (status = 422, description = "Validation failed; form re-rendered with errors")
    )
)]
pub async fn bookinstance_create_post(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let mut form = FormData::from_pairs(fields);

    let errors = validate(&form, RULES);
    sanitize(&mut form, SANITIZERS);
    let instance = InstanceSubmission::from_form(&form);

    if !errors.is_empty() {
        let page = render_form_with_errors(&state, instance, errors).await?;
        return Ok(page.into_response());
    }

    let id = state
        .repository
        .book_instances
        .create(&instance.to_record()?)
        .await?;
    tracing::info!("Created book instance id={}", id);

    Ok(Redirect::to(&BookInstance::url_for(id)).into_response())
}

/// Re-render the copy form with the candidate, a fresh book list and
/// the accumulated field errors.
async fn render_form_with_errors(
    state: &AppState,
    instance: InstanceSubmission,
    errors: Vec<FieldError>,
) -> AppResult<Page> {
    let books = state.repository.books.list_refs().await?;

    Ok(Page::new(
        "bookinstance_form",
        json!({
            "title": "Create BookInstance",
            "book_list": books.iter().map(BookRef::view).collect::<Vec<_>>(),
            "selected_book": instance.book,
            "bookinstance": instance.view(),
            "errors": errors,
        }),
    )
    .with_status(StatusCode::UNPROCESSABLE_ENTITY))
}

/// Copy delete form (not implemented)
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "bookinstances",
    params(("id" = i32, Path, description = "Copy ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn bookinstance_delete_get() -> Response {
    view::not_implemented("BookInstance delete GET")
}

/// Copy delete submission (not implemented)
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "bookinstances",
    params(("id" = i32, Path, description = "Copy ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn bookinstance_delete_post() -> Response {
    view::not_implemented("BookInstance delete POST")
}

/// Copy update form (not implemented)
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(("id" = i32, Path, description = "Copy ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn bookinstance_update_get() -> Response {
    view::not_implemented("BookInstance update GET")
}

/// Copy update submission (not implemented)
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(("id" = i32, Path, description = "Copy ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn bookinstance_update_post() -> Response {
    view::not_implemented("BookInstance update POST")
}
