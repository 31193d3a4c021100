//! Genres repository for database operations

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::genre::Genre};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Total number of genres
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// List all genres, name ascending
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Get one genre by id
    pub async fn get(&self, id: i32) -> AppResult<Option<Genre>> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Find a genre by its exact name
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a genre. Returns None when another insert with the same
    /// name won the race against the unique index; the caller then
    /// re-fetches the winner.
    pub async fn create(&self, name: &str) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO genres (name) VALUES ($1) \
             ON CONFLICT (name) DO NOTHING RETURNING id",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }
}
