//! Repository layer for database operations

pub mod books;
pub mod loans;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

pub use books::BookStore;
pub use loans::LoanStore;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: Arc<dyn BookStore>,
    pub loans: Arc<dyn LoanStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            loans: Arc::new(loans::LoansRepository::new(pool.clone())),
            pool,
        }
    }

    /// Build a repository around arbitrary stores (mocks in tests)
    pub fn with_stores(
        pool: Pool<Postgres>,
        books: Arc<dyn BookStore>,
        loans: Arc<dyn LoanStore>,
    ) -> Self {
        Self { pool, books, loans }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
