//! Loan management service

use chrono::{Duration, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult, BOOK_ALREADY_LOANED},
    models::{
        book::Book,
        loan::{Loan, LoanDetails, LoanQuery, NewLoan},
        page::{Page, PageRequest},
    },
    repository::Repository,
};

use super::books::book_not_found;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    late_after_days: i64,
}

impl LoansService {
    pub fn new(repository: Repository, late_after_days: i64) -> Self {
        Self {
            repository,
            late_after_days,
        }
    }

    /// Lend a book. A book with an unreturned loan cannot be lent again.
    pub async fn save(
        &self,
        book: &Book,
        customer: String,
        customer_email: Option<String>,
    ) -> AppResult<Loan> {
        if self.repository.loans.exists_outstanding_for_book(book.id).await? {
            return Err(AppError::Business(BOOK_ALREADY_LOANED.to_string()));
        }

        let loan = NewLoan {
            customer,
            customer_email,
            book_id: book.id,
            loan_date: today(),
        };
        let created = self.repository.loans.create(&loan).await?;
        tracing::info!(loan_id = created.id, book_id = book.id, "Book loaned");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Loan>> {
        self.repository.loans.find_by_id(id).await
    }

    /// Mark a loan returned, or reopen it
    pub async fn set_returned(&self, id: i64, returned: bool) -> AppResult<Loan> {
        let mut loan = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.returned && !returned
            && self.repository.loans.exists_outstanding_for_book(loan.book_id).await?
        {
            return Err(AppError::Business(BOOK_ALREADY_LOANED.to_string()));
        }

        loan.returned = returned;
        self.update(&loan).await
    }

    pub async fn update(&self, loan: &Loan) -> AppResult<Loan> {
        self.repository.loans.update(loan).await
    }

    /// Filter loans with pagination
    pub async fn find(&self, filter: &LoanQuery, page: PageRequest) -> AppResult<Page<LoanDetails>> {
        let (loans, total) = self.repository.loans.find(filter, page).await?;
        Ok(Page::new(loans, page, total))
    }

    /// Loan history of one book
    pub async fn get_loans_by_book(&self, book_id: i64, page: PageRequest) -> AppResult<Page<LoanDetails>> {
        if self.repository.books.find_by_id(book_id).await?.is_none() {
            return Err(book_not_found(book_id));
        }
        let (loans, total) = self.repository.loans.find_by_book(book_id, page).await?;
        Ok(Page::new(loans, page, total))
    }

    /// Unreturned loans older than the configured grace period
    pub async fn get_all_late_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository
            .loans
            .find_late(late_cutoff(today(), self.late_after_days))
            .await
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Last loan date that counts as late on `today`
pub fn late_cutoff(today: NaiveDate, late_after_days: i64) -> NaiveDate {
    Duration::try_days(late_after_days)
        .and_then(|grace| today.checked_sub_signed(grace))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{books::MockBookStore, loans::MockLoanStore};
    use crate::services::test_support::repository_with;
    use mockall::predicate::eq;

    fn book() -> Book {
        Book {
            id: 1,
            title: "Futere".to_string(),
            author: "Junior".to_string(),
            isbn: "123".to_string(),
        }
    }

    fn loan(returned: bool) -> Loan {
        Loan {
            id: 1,
            customer: "Junior".to_string(),
            customer_email: None,
            book_id: 1,
            loan_date: today(),
            returned,
        }
    }

    fn service(books: MockBookStore, loans: MockLoanStore) -> LoansService {
        LoansService::new(repository_with(books, loans), 4)
    }

    #[tokio::test]
    async fn test_save_loan() {
        let mut loans = MockLoanStore::new();
        loans
            .expect_exists_outstanding_for_book()
            .with(eq(1))
            .returning(|_| Ok(false));
        loans
            .expect_create()
            .withf(|l| l.book_id == 1 && l.customer == "Junior" && l.loan_date == today())
            .times(1)
            .returning(|_| Ok(loan(false)));

        let saved = service(MockBookStore::new(), loans)
            .save(&book(), "Junior".to_string(), None)
            .await
            .unwrap();

        assert_eq!(saved.id, 1);
        assert!(!saved.returned);
    }

    #[tokio::test]
    async fn test_save_loan_with_book_already_loaned() {
        let mut loans = MockLoanStore::new();
        loans
            .expect_exists_outstanding_for_book()
            .returning(|_| Ok(true));
        loans.expect_create().never();

        let err = service(MockBookStore::new(), loans)
            .save(&book(), "Junior".to_string(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Business(ref msg) if msg == BOOK_ALREADY_LOANED));
    }

    #[tokio::test]
    async fn test_get_loan_by_id() {
        let mut loans = MockLoanStore::new();
        loans
            .expect_find_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(loan(false))));

        let found = service(MockBookStore::new(), loans)
            .get_by_id(1)
            .await
            .unwrap();

        assert_eq!(found, Some(loan(false)));
    }

    #[tokio::test]
    async fn test_return_loan() {
        let mut loans = MockLoanStore::new();
        loans
            .expect_find_by_id()
            .returning(|_| Ok(Some(loan(false))));
        loans.expect_exists_outstanding_for_book().never();
        loans
            .expect_update()
            .withf(|l| l.returned)
            .times(1)
            .returning(|l| Ok(l.clone()));

        let updated = service(MockBookStore::new(), loans)
            .set_returned(1, true)
            .await
            .unwrap();

        assert!(updated.returned);
    }

    #[tokio::test]
    async fn test_reopen_loan_when_book_is_out_again() {
        let mut loans = MockLoanStore::new();
        loans.expect_find_by_id().returning(|_| Ok(Some(loan(true))));
        loans
            .expect_exists_outstanding_for_book()
            .returning(|_| Ok(true));
        loans.expect_update().never();

        let err = service(MockBookStore::new(), loans)
            .set_returned(1, false)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Business(_)));
    }

    #[tokio::test]
    async fn test_reopen_loan() {
        let mut loans = MockLoanStore::new();
        loans.expect_find_by_id().returning(|_| Ok(Some(loan(true))));
        loans
            .expect_exists_outstanding_for_book()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(false));
        loans
            .expect_update()
            .withf(|l| l.id == 1 && !l.returned)
            .times(1)
            .returning(|l| Ok(l.clone()));

        let reopened = service(MockBookStore::new(), loans)
            .set_returned(1, false)
            .await
            .unwrap();

        assert!(!reopened.returned);
    }

    #[tokio::test]
    async fn test_return_missing_loan() {
        let mut loans = MockLoanStore::new();
        loans.expect_find_by_id().returning(|_| Ok(None));

        let err = service(MockBookStore::new(), loans)
            .set_returned(5, true)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_loans_by_missing_book() {
        let mut books = MockBookStore::new();
        books.expect_find_by_id().returning(|_| Ok(None));
        let mut loans = MockLoanStore::new();
        loans.expect_find_by_book().never();

        let err = service(books, loans)
            .get_loans_by_book(1, PageRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_late_loans_use_cutoff() {
        let mut loans = MockLoanStore::new();
        let expected = late_cutoff(today(), 4);
        loans
            .expect_find_late()
            .with(eq(expected))
            .times(1)
            .returning(|_| Ok(vec![]));

        let late = service(MockBookStore::new(), loans)
            .get_all_late_loans()
            .await
            .unwrap();

        assert!(late.is_empty());
    }

    #[test]
    fn test_late_cutoff() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            late_cutoff(today, 4),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(late_cutoff(today, i64::MAX), NaiveDate::MIN);
    }
}
