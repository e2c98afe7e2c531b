//! Loans repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanDetails, LoanDetailsRow, LoanQuery, NewLoan},
        page::PageRequest,
    },
};

use super::books::like_pattern;

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.customer, l.customer_email, l.loan_date, l.returned,
           b.id AS book_id, b.title, b.author, b.isbn
    FROM loans l
    JOIN books b ON b.id = l.book_id
"#;

/// Persistence operations on loans
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn create(&self, loan: &NewLoan) -> AppResult<Loan>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Loan>>;
    async fn update(&self, loan: &Loan) -> AppResult<Loan>;
    /// True when the book has a loan that is not returned yet
    async fn exists_outstanding_for_book(&self, book_id: i64) -> AppResult<bool>;
    async fn find(&self, filter: &LoanQuery, page: PageRequest) -> AppResult<(Vec<LoanDetails>, i64)>;
    async fn find_by_book(&self, book_id: i64, page: PageRequest) -> AppResult<(Vec<LoanDetails>, i64)>;
    /// Unreturned loans made on or before `cutoff`
    async fn find_late(&self, cutoff: NaiveDate) -> AppResult<Vec<LoanDetails>>;
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &LoanQuery) {
        builder.push(" WHERE 1=1");
        if let Some(isbn) = filter.isbn() {
            builder.push(" AND b.isbn = ").push_bind(isbn.to_string());
        }
        if let Some(customer) = filter.customer() {
            builder
                .push(" AND l.customer ILIKE ")
                .push_bind(like_pattern(customer));
        }
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    async fn create(&self, loan: &NewLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (customer, customer_email, book_id, loan_date, returned)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING id, customer, customer_email, book_id, loan_date, returned
            "#,
        )
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.book_id)
        .bind(loan.loan_date)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from_db)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT id, customer, customer_email, book_id, loan_date, returned FROM loans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn update(&self, loan: &Loan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET customer = $1, customer_email = $2, returned = $3
            WHERE id = $4
            RETURNING id, customer, customer_email, book_id, loan_date, returned
            "#,
        )
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.returned)
        .bind(loan.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan.id)))
    }

    async fn exists_outstanding_for_book(&self, book_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND NOT returned)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find(&self, filter: &LoanQuery, page: PageRequest) -> AppResult<(Vec<LoanDetails>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM loans l JOIN books b ON b.id = l.book_id",
        );
        Self::push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(DETAILS_SELECT);
        Self::push_filters(&mut select, filter);
        select
            .push(" ORDER BY l.id LIMIT ")
            .push_bind(page.size())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build_query_as::<LoanDetailsRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(LoanDetails::from).collect(), total))
    }

    async fn find_by_book(&self, book_id: i64, page: PageRequest) -> AppResult<(Vec<LoanDetails>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, LoanDetailsRow>(&format!(
            "{} WHERE l.book_id = $1 ORDER BY l.loan_date DESC, l.id DESC LIMIT $2 OFFSET $3",
            DETAILS_SELECT
        ))
        .bind(book_id)
        .bind(page.size())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(LoanDetails::from).collect(), total))
    }

    async fn find_late(&self, cutoff: NaiveDate) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&format!(
            "{} WHERE NOT l.returned AND l.loan_date <= $1 ORDER BY l.loan_date",
            DETAILS_SELECT
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LoanDetails::from).collect())
    }
}
