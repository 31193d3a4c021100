//! Book page handlers: list, detail, create and update forms.
//!
//! Detail and form pages fetch their independent queries concurrently
//! and join before rendering. Form submissions run the fixed pipeline:
//! normalize multi-valued fields, validate, sanitize, rebuild a
//! candidate, then either re-render the form with errors or persist
//! and redirect to the canonical URL.

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
        author::Author,
        book::{Book, NewBook},
        genre::Genre,
    },
    view::{self, Page},
    AppState,
};

const RULES: &[Rule] = &[
    Rule { field: "title", check: Check::Required, message: "Title must not be empty." },
    Rule { field: "author", check: Check::Required, message: "Author must not be empty." },
    Rule { field: "summary", check: Check::Required, message: "Summary must not be empty." },
    Rule { field: "isbn", check: Check::Required, message: "ISBN must not be empty." },
];

const SANITIZERS: &[Sanitizer] = &[
    Sanitizer { target: Target::All, transform: Transform::Trim },
    Sanitizer { target: Target::All, transform: Transform::Escape },
];

/// Candidate book rebuilt from a submitted form. Reference ids stay as
/// raw strings for re-display; parsing happens at persist time.
#[derive(Debug, Clone)]
struct BookSubmission {
    id: Option<i32>,
    title: String,
    author: String,
    summary: String,
    isbn: String,
    genre: Vec<String>,
}

impl BookSubmission {
    fn from_form(form: &FormData) -> Self {
        Self {
            id: None,
            title: form.first("title").to_string(),
            author: form.first("author").to_string(),
            summary: form.first("summary").to_string(),
            isbn: form.first("isbn").to_string(),
            genre: form.values("genre").to_vec(),
        }
    }

    fn view(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "author": self.author,
            "summary": self.summary,
            "isbn": self.isbn,
            "genre": self.genre,
        })
    }

    fn to_record(&self) -> AppResult<NewBook> {
        let author_id = self
            .author
            .parse()
            .map_err(|_| AppError::BadRequest("Malformed author reference".to_string()))?;
        let genre_ids = self
            .genre
            .iter()
            .map(|id| {
                id.parse::<i32>()
                    .map_err(|_| AppError::BadRequest("Malformed genre reference".to_string()))
            })
            .collect::<AppResult<Vec<i32>>>()?;

        Ok(NewBook {
            title: self.title.clone(),
            author_id,
            summary: self.summary.clone(),
            isbn: self.isbn.clone(),
            genre_ids,
        })
    }
}

/// Mark every genre whose id appears in `selected` for form re-display
fn mark_selected(genres: &[Genre], selected: &[String]) -> Vec<Value> {
    genres
        .iter()
        .map(|genre| {
            let mut bag = genre.view();
            if selected.iter().any(|id| id == &genre.id.to_string()) {
                bag["checked"] = json!(true);
            }
            bag
        })
        .collect()
}

/// Re-render the book form with the candidate, freshly fetched
/// reference data and the accumulated field errors.
async fn render_form_with_errors(
    state: &AppState,
    title: &'static str,
    book: BookSubmission,
    errors: Vec<FieldError>,
) -> AppResult<Page> {
    let repo = &state.repository;
    let (authors, genres) = tokio::try_join!(repo.authors.list(), repo.genres.list())?;

    let genres = mark_selected(&genres, &book.genre);

    Ok(Page::new(
        "book_form",
        json!({
            "title": title,
            "authors": authors.iter().map(Author::view).collect::<Vec<_>>(),
            "genres": genres,
            "book": book.view(),
            "errors": errors,
        }),
    )
    .with_status(StatusCode::UNPROCESSABLE_ENTITY))
}

/// Book list page
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "books",
    responses(
        (status = 200, description = "All books with their authors")
    )
)]
pub async fn book_list(State(state): State<AppState>) -> AppResult<Page> {
    let books = state.repository.books.list().await?;

    Ok(Page::new(
        "book_list",
        json!({
            "title": "Book List",
            "book_list": books.iter().map(Book::view).collect::<Vec<_>>(),
        }),
    ))
}

/// Book detail page
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book with author, genres and copies"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Page> {
    let repo = &state.repository;

    let (book, book_instances) = tokio::try_join!(
        repo.books.get(id),
        repo.book_instances.list_for_book(id),
    )?;

    let Some(book) = book else {
        return Err(AppError::NotFound(format!("Book {} not found", id)));
    };

    Ok(Page::new(
        "book_detail",
        json!({
            "title": book.title,
            "book": book.view(),
            "book_instances": book_instances.iter().map(|i| i.view()).collect::<Vec<_>>(),
        }),
    ))
}

/// Book create form
#[utoipa::path(
    get,
    path = "/catalog/book/create",
    tag = "books",
    responses(
        (status = 200, description = "Empty book form with authors and genres")
    )
)]
pub async fn book_create_get(State(state): State<AppState>) -> AppResult<Page> {
    let repo = &state.repository;
    let (authors, genres) = tokio::try_join!(repo.authors.list(), repo.genres.list())?;

    Ok(Page::new(
        "book_form",
        json!({
            "title": "Create Book",
            "authors": authors.iter().map(Author::view).collect::<Vec<_>>(),
            "genres": genres.iter().map(Genre::view).collect::<Vec<_>>(),
        }),
    ))
}

/// Book create submission
#[utoipa::path(
    post,
    path = "/catalog/book/create",
    tag = "books",
    responses(
        (status = 303, description = "Created; redirect to the new book"),
        (status = 422, description = "Validation failed; form re-rendered with errors")
    )
)]
pub async fn book_create_post(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let mut form = FormData::from_pairs(fields);
    // A genre selection may arrive absent, as one value or repeated
    form.normalize_list("genre");

    let errors = validate(&form, RULES);
    sanitize(&mut form, SANITIZERS);
    let book = BookSubmission::from_form(&form);

    if !errors.is_empty() {
        let page = render_form_with_errors(&state, "Create Book", book, errors).await?;
        return Ok(page.into_response());
    }

    let id = state.repository.books.create(&book.to_record()?).await?;
    tracing::info!("Created book id={}", id);

    Ok(Redirect::to(&Book::url_for(id)).into_response())
}

/// Book update form
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book form pre-filled with the target book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_update_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Page> {
    let repo = &state.repository;

    let (book, authors, genres) = tokio::try_join!(
        repo.books.get(id),
        repo.authors.list(),
        repo.genres.list(),
    )?;

    let Some(book) = book else {
        return Err(AppError::NotFound(format!("Book {} not found", id)));
    };

    // Cross-check the full catalog against the book's own genres
    let selected: Vec<String> = book.genres.iter().map(|g| g.id.to_string()).collect();
    let genres = mark_selected(&genres, &selected);

    Ok(Page::new(
        "book_form",
        json!({
            "title": "Update Book",
            "authors": authors.iter().map(Author::view).collect::<Vec<_>>(),
            "genres": genres,
            "book": book.view(),
        }),
    ))
}

/// Book update submission
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 303, description = "Updated; redirect to the book"),
        (status = 422, description = "Validation failed; form re-rendered with errors")
    )
)]
pub async fn book_update_post(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(fields): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let mut form = FormData::from_pairs(fields);
    form.normalize_list("genre");

    let errors = validate(&form, RULES);
    sanitize(&mut form, SANITIZERS);
    // The candidate carries the original identifier
    let mut book = BookSubmission::from_form(&form);
    book.id = Some(id);

    if !errors.is_empty() {
        let page = render_form_with_errors(&state, "Update Book", book, errors).await?;
        return Ok(page.into_response());
    }

    state.repository.books.update(id, &book.to_record()?).await?;
    tracing::info!("Updated book id={}", id);

    Ok(Redirect::to(&Book::url_for(id)).into_response())
}

/// Book delete form (not implemented)
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn book_delete_get() -> Response {
    view::not_implemented("Book delete GET")
}

/// Book delete submission (not implemented)
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses((status = 501, description = "Not implemented"))
)]
pub async fn book_delete_post() -> Response {
    view::not_implemented("Book delete POST")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: i32, name: &str) -> Genre {
        Genre { id, name: name.to_string() }
    }

    #[test]
    fn marks_exactly_the_selected_genres() {
        let catalog = vec![genre(1, "Fantasy"), genre(2, "Poetry"), genre(3, "History")];
        let selected = vec!["1".to_string(), "2".to_string()];

        let marked = mark_selected(&catalog, &selected);

        assert_eq!(marked[0]["checked"], json!(true));
        assert_eq!(marked[1]["checked"], json!(true));
        assert!(marked[2].get("checked").is_none());
    }

    #[test]
    fn marks_nothing_when_nothing_is_selected() {
        let catalog = vec![genre(1, "Fantasy")];
        let marked = mark_selected(&catalog, &[]);
        assert!(marked[0].get("checked").is_none());
    }

    #[test]
    fn submission_pipeline_attributes_errors_to_fields() {
        let pairs = vec![
            ("title".to_string(), "".to_string()),
            ("author".to_string(), "1".to_string()),
            ("summary".to_string(), "  A summary  ".to_string()),
            ("isbn".to_string(), "123".to_string()),
        ];
        let mut form = FormData::from_pairs(pairs);
        form.normalize_list("genre");

        let errors = validate(&form, RULES);
        sanitize(&mut form, SANITIZERS);
        let book = BookSubmission::from_form(&form);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
        assert_eq!(errors[0].message, "Title must not be empty.");
        // Sanitized values flow into the candidate regardless
        assert_eq!(book.summary, "A summary");
        assert!(book.genre.is_empty());
    }

    #[test]
    fn scalar_genre_submission_becomes_a_singleton_sequence() {
        let pairs = vec![("genre".to_string(), "5".to_string())];
        let mut form = FormData::from_pairs(pairs);
        form.normalize_list("genre");

        let book = BookSubmission::from_form(&form);
        assert_eq!(book.genre, vec!["5".to_string()]);
    }

    #[test]
    fn record_parses_reference_ids() {
        let book = BookSubmission {
            id: None,
            title: "T".to_string(),
            author: "4".to_string(),
            summary: "S".to_string(),
            isbn: "123".to_string(),
            genre: vec!["1".to_string(), "2".to_string()],
        };
        let record = book.to_record().unwrap();
        assert_eq!(record.author_id, 4);
        assert_eq!(record.genre_ids, vec![1, 2]);
    }

    #[test]
    fn record_rejects_malformed_reference_ids() {
        let book = BookSubmission {
            id: None,
            title: "T".to_string(),
            author: "not-a-number".to_string(),
            summary: "S".to_string(),
            isbn: "123".to_string(),
            genre: vec![],
        };
        assert!(matches!(book.to_record(), Err(AppError::BadRequest(_))));
    }
}
