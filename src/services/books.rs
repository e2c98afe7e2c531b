//! Book catalog service

use crate::{
    error::{AppError, AppResult, ISBN_ALREADY_REGISTERED},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        page::{Page, PageRequest},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new book. ISBNs are unique.
    pub async fn save(&self, book: CreateBook) -> AppResult<Book> {
        if self.repository.books.exists_by_isbn(&book.isbn).await? {
            return Err(AppError::Business(ISBN_ALREADY_REGISTERED.to_string()));
        }
        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = created.id, isbn = %created.isbn, "Book registered");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        self.repository.books.find_by_id(id).await
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        self.repository.books.find_by_isbn(isbn).await
    }

    /// Update title and author of an existing book
    pub async fn update(&self, id: i64, data: UpdateBook) -> AppResult<Book> {
        let mut book = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| book_not_found(id))?;

        book.title = data.title;
        book.author = data.author;

        self.repository.books.update(&book).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let book = self.get_by_id(id).await?.ok_or_else(|| book_not_found(id))?;
        self.repository.books.delete(book.id).await?;
        tracing::info!(book_id = book.id, "Book deleted");
        Ok(())
    }

    /// Filter books with pagination
    pub async fn find(&self, filter: &BookQuery, page: PageRequest) -> AppResult<Page<Book>> {
        let (books, total) = self.repository.books.find(filter, page).await?;
        Ok(Page::new(books, page, total))
    }
}

pub(crate) fn book_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", id))
}
