//! Loan management endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::{ApiErrors, AppError, AppResult, BOOK_NOT_FOUND_FOR_ISBN},
    models::{
        loan::{CreateLoan, LoanDetails, LoanQuery, ReturnLoan},
        page::{LoanPage, Page, PageRequest},
    },
    AppState,
};

use super::{Path, Query, ValidatedJson};

/// Lend a book, identified by ISBN. Responds with the new loan id.
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = i64),
        (status = 400, description = "Unknown ISBN or book already loaned", body = ApiErrors)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateLoan>,
) -> AppResult<(StatusCode, Json<i64>)> {
    let book = state
        .services
        .books
        .get_by_isbn(&request.isbn)
        .await?
        .ok_or_else(|| AppError::BadRequest(BOOK_NOT_FOUND_FOR_ISBN.to_string()))?;

    let loan = state
        .services
        .loans
        .save(&book, request.customer, request.email)
        .await?;

    Ok((StatusCode::CREATED, Json(loan.id)))
}

/// Mark a loan as returned
#[utoipa::path(
    patch,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Loan updated"),
        (status = 400, description = "Book already loaned again", body = ApiErrors),
        (status = 404, description = "Loan not found", body = ApiErrors)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<ReturnLoan>,
) -> AppResult<StatusCode> {
    state.services.loans.set_returned(id, request.returned).await?;
    Ok(StatusCode::OK)
}

/// Filter loans with pagination
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanQuery, PageRequest),
    responses(
        (status = 200, description = "Page of loans", body = LoanPage)
    )
)]
pub async fn find_loans(
    State(state): State<AppState>,
    Query(filter): Query<LoanQuery>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<Page<LoanDetails>>> {
    let loans = state.services.loans.find(&filter, page).await?;
    Ok(Json(loans))
}
