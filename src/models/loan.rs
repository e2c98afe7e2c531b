//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::{non_blank, Book};

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i64,
    pub customer: String,
    pub customer_email: Option<String>,
    pub book_id: i64,
    pub loan_date: NaiveDate,
    pub returned: bool,
}

/// Values for a loan about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub customer: String,
    pub customer_email: Option<String>,
    pub book_id: i64,
    pub loan_date: NaiveDate,
}

/// Loan joined with its book, as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub isbn: String,
    pub customer: String,
    pub email: Option<String>,
    pub loan_date: NaiveDate,
    pub returned: bool,
    pub book: Book,
}

/// Flat row produced by the `loans JOIN books` queries
#[derive(Debug, FromRow)]
pub struct LoanDetailsRow {
    pub id: i64,
    pub customer: String,
    pub customer_email: Option<String>,
    pub loan_date: NaiveDate,
    pub returned: bool,
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl From<LoanDetailsRow> for LoanDetails {
    fn from(row: LoanDetailsRow) -> Self {
        Self {
            id: row.id,
            isbn: row.isbn.clone(),
            customer: row.customer,
            email: row.customer_email,
            loan_date: row.loan_date,
            returned: row.returned,
            book: Book {
                id: row.book_id,
                title: row.title,
                author: row.author,
                isbn: row.isbn,
            },
        }
    }
}

/// Create loan request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateLoan {
    /// ISBN of the book to borrow
    #[validate(length(min = 1, message = "Isbn is required"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Customer is required"))]
    pub customer: String,
    /// Address that receives late-loan notifications
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Return (or reopen) a loan
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReturnLoan {
    pub returned: bool,
}

/// Loan filter query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    /// Exact ISBN of the loaned book
    pub isbn: Option<String>,
    /// Case-insensitive substring of the customer name
    pub customer: Option<String>,
}

impl LoanQuery {
    pub fn isbn(&self) -> Option<&str> {
        non_blank(&self.isbn)
    }

    pub fn customer(&self) -> Option<&str> {
        non_blank(&self.customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_from_row() {
        let row = LoanDetailsRow {
            id: 7,
            customer: "Junior".to_string(),
            customer_email: Some("junior@example.com".to_string()),
            loan_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            returned: false,
            book_id: 1,
            title: "Futere".to_string(),
            author: "Junior".to_string(),
            isbn: "001".to_string(),
        };
        let details = LoanDetails::from(row);
        assert_eq!(details.isbn, "001");
        assert_eq!(details.book.id, 1);
        assert_eq!(details.email.as_deref(), Some("junior@example.com"));
    }

    #[test]
    fn test_create_loan_rejects_bad_email() {
        let loan = CreateLoan {
            isbn: "123".to_string(),
            customer: "Junior".to_string(),
            email: Some("not-an-email".to_string()),
        };
        assert!(loan.validate().is_err());
    }
}
