//! Home page handler

use axum::extract::State;
use serde_json::json;

use crate::{error::AppResult, models::book_instance, view::Page, AppState};

/// Home page with aggregate catalog counts.
///
/// The five counts are independent queries run concurrently and joined;
/// an empty collection contributes zero, not an error.
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Home page with collection counts")
    )
)]
pub async fn index(State(state): State<AppState>) -> AppResult<Page> {
    let repo = &state.repository;

    let (
        book_count,
        book_instance_count,
        book_instance_available_count,
        author_count,
        genre_count,
    ) = tokio::try_join!(
        repo.books.count(),
        repo.book_instances.count(),
        repo.book_instances.count_by_status(book_instance::STATUS_AVAILABLE),
        repo.authors.count(),
        repo.genres.count(),
    )?;

    Ok(Page::new(
        "index",
        json!({
            "title": "Local Library Home",
            "data": {
                "book_count": book_count,
                "book_instance_count": book_instance_count,
                "book_instance_available_count": book_instance_available_count,
                "author_count": author_count,
                "genre_count": genre_count,
            },
        }),
    ))
}
