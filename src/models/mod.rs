//! Data models for the library API

pub mod book;
pub mod loan;
pub mod page;

// Re-export commonly used types
pub use book::{Book, BookQuery, CreateBook, UpdateBook};
pub use loan::{CreateLoan, Loan, LoanDetails, LoanQuery, ReturnLoan};
pub use page::{Page, PageRequest};
