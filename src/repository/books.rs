//! Books repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::{
        author::Author,
        book::{Book, BookRef, NewBook},
        genre::Genre,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Total number of books
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// List all books ordered by title, with the author expanded
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, b.author_id, b.summary, b.isbn,
                   a.id AS a_id, a.first_name AS a_first_name,
                   a.family_name AS a_family_name,
                   a.date_of_birth AS a_date_of_birth,
                   a.date_of_death AS a_date_of_death
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(book_with_author).collect())
    }

    /// Get one book with its author and genres expanded.
    /// A dangling author reference leaves `author` as None.
    pub async fn get(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, summary, isbn FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut book) = book else {
            return Ok(None);
        };

        book.author = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, family_name, date_of_birth, date_of_death \
             FROM authors WHERE id = $1",
        )
        .bind(book.author_id)
        .fetch_optional(&self.pool)
        .await?;

        book.genres = self.get_book_genres(book.id).await?;

        Ok(Some(book))
    }

    /// Load all genres for a book via the book_genres junction table
    async fn get_book_genres(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Id/title pairs for form select lists
    pub async fn list_refs(&self) -> AppResult<Vec<BookRef>> {
        sqlx::query_as::<_, BookRef>("SELECT id, title FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Books carrying a given genre
    pub async fn list_by_genre(&self, genre_id: i32) -> AppResult<Vec<Book>> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.title, b.author_id, b.summary, b.isbn
            FROM books b
            JOIN book_genres bg ON bg.book_id = b.id
            WHERE bg.genre_id = $1
            ORDER BY b.title
            "#,
        )
        .bind(genre_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Books written by a given author
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, summary, isbn FROM books \
             WHERE author_id = $1 ORDER BY title",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a new book and its genre links, returning the new id
    pub async fn create(&self, book: &NewBook) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO books (title, author_id, summary, isbn) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await?;

        self.sync_book_genres(id, &book.genre_ids).await?;

        Ok(id)
    }

    /// Replace-by-identifier update of a book and its genre links
    pub async fn update(&self, id: i32, book: &NewBook) -> AppResult<()> {
        sqlx::query(
            "UPDATE books SET title = $1, author_id = $2, summary = $3, isbn = $4 \
             WHERE id = $5",
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.sync_book_genres(id, &book.genre_ids).await?;

        Ok(())
    }

    /// Replace all genre links for a book: delete existing rows then
    /// insert the new set.
    async fn sync_book_genres(&self, book_id: i32, genre_ids: &[i32]) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        for genre_id in genre_ids {
            sqlx::query(
                "INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

fn book_with_author(row: &PgRow) -> Book {
    let author = row.get::<Option<i32>, _>("a_id").map(|id| Author {
        id,
        first_name: row.get("a_first_name"),
        family_name: row.get("a_family_name"),
        date_of_birth: row.get("a_date_of_birth"),
        date_of_death: row.get("a_date_of_death"),
    });

    Book {
        id: row.get("id"),
        title: row.get("title"),
        author_id: row.get("author_id"),
        summary: row.get("summary"),
        isbn: row.get("isbn"),
        author,
        genres: Vec::new(),
    }
}
