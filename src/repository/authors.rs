//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::author::{Author, NewAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Total number of authors
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// List all authors in catalog order
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        sqlx::query_as::<_, Author>(
            "SELECT id, first_name, family_name, date_of_birth, date_of_death \
             FROM authors ORDER BY family_name, first_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Get one author by id
    pub async fn get(&self, id: i32) -> AppResult<Option<Author>> {
        sqlx::query_as::<_, Author>(
            "SELECT id, first_name, family_name, date_of_birth, date_of_death \
             FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a new author, returning the new id
    pub async fn create(&self, author: &NewAuthor) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO authors (first_name, family_name, date_of_birth, date_of_death) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&author.first_name)
        .bind(&author.family_name)
        .bind(author.date_of_birth)
        .bind(author.date_of_death)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }
}
