//! Book endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{ApiErrors, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        loan::LoanDetails,
        page::{BookPage, LoanPage, Page, PageRequest},
    },
    services::books::book_not_found,
    AppState,
};

use super::{Path, Query, ValidatedJson};

/// Register a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or ISBN already registered", body = ApiErrors)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ValidatedJson(book): ValidatedJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.save(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = ApiErrors)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .get_by_id(id)
        .await?
        .ok_or_else(|| book_not_found(id))?;
    Ok(Json(book))
}

/// Update title and author of a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = ApiErrors),
        (status = 404, description = "Book not found", body = ApiErrors)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(data): ValidatedJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = ApiErrors)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Filter books with pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery, PageRequest),
    responses(
        (status = 200, description = "Page of books", body = BookPage)
    )
)]
pub async fn find_books(
    State(state): State<AppState>,
    Query(filter): Query<BookQuery>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<Page<Book>>> {
    let books = state.services.books.find(&filter, page).await?;
    Ok(Json(books))
}

/// Loan history of a book
#[utoipa::path(
    get,
    path = "/books/{id}/loans",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID"),
        PageRequest
    ),
    responses(
        (status = 200, description = "Page of loans", body = LoanPage),
        (status = 404, description = "Book not found", body = ApiErrors)
    )
)]
pub async fn loans_by_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<Page<LoanDetails>>> {
    let loans = state.services.loans.get_loans_by_book(id, page).await?;
    Ok(Json(loans))
}
