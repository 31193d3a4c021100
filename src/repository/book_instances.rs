//! Book instances repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::{
        book::Book,
        book_instance::{BookInstance, NewBookInstance},
    },
};

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Total number of copies
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Number of copies with the given status
    pub async fn count_by_status(&self, status: &str) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// List all copies with the book expanded
    pub async fn list(&self) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.book_id, i.imprint, i.status, i.due_back,
                   b.id AS b_id, b.title AS b_title, b.author_id AS b_author_id,
                   b.summary AS b_summary, b.isbn AS b_isbn
            FROM book_instances i
            LEFT JOIN books b ON b.id = i.book_id
            ORDER BY i.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(instance_with_book).collect())
    }

    /// Get one copy with the book expanded
    pub async fn get(&self, id: i32) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query(
            r#"
            SELECT i.id, i.book_id, i.imprint, i.status, i.due_back,
                   b.id AS b_id, b.title AS b_title, b.author_id AS b_author_id,
                   b.summary AS b_summary, b.isbn AS b_isbn
            FROM book_instances i
            LEFT JOIN books b ON b.id = i.book_id
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(instance_with_book))
    }

    /// All copies of one book, reference unexpanded
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        sqlx::query_as::<_, BookInstance>(
            "SELECT id, book_id, imprint, status, due_back FROM book_instances \
             WHERE book_id = $1 ORDER BY id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a new copy, returning the new id
    pub async fn create(&self, instance: &NewBookInstance) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO book_instances (book_id, imprint, status, due_back) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(&instance.status)
        .bind(instance.due_back)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }
}

fn instance_with_book(row: &PgRow) -> BookInstance {
    let book = row.get::<Option<i32>, _>("b_id").map(|id| Book {
        id,
        title: row.get("b_title"),
        author_id: row.get("b_author_id"),
        summary: row.get("b_summary"),
        isbn: row.get("b_isbn"),
        author: None,
        genres: Vec::new(),
    });

    BookInstance {
        id: row.get("id"),
        book_id: row.get("book_id"),
        imprint: row.get("imprint"),
        status: row.get("status"),
        due_back: row.get("due_back"),
        book,
    }
}
