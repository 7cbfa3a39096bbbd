//! Persistence seam. The PostgreSQL store backs production; the in-memory
//! store backs tests and local demos.

use crate::models::{
    Account, AccountCashLine, CreateAccount, CreateProduct, DayBook, DayBookWithLines, Document,
    DocumentKind, DocumentWithLines, ListDocumentsFilter, ListProductsFilter, NewDayBook,
    NewDocument, Product, UpdateProduct,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::AppError;
use uuid::Uuid;

#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    // Accounts

    async fn create_account(&self, input: &CreateAccount) -> Result<Account, AppError>;

    async fn get_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError>;

    /// Case-insensitive lookup by name.
    async fn find_account_by_name(&self, name: &str) -> Result<Option<Account>, AppError>;

    /// All accounts ordered by name.
    async fn list_accounts(&self) -> Result<Vec<Account>, AppError>;

    // Products

    async fn create_product(&self, input: &CreateProduct) -> Result<Product, AppError>;

    async fn get_product(&self, product_id: Uuid) -> Result<Option<Product>, AppError>;

    /// Products ordered by name.
    async fn list_products(&self, filter: &ListProductsFilter) -> Result<Vec<Product>, AppError>;

    async fn update_product(
        &self,
        product_id: Uuid,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, AppError>;

    // Estimates, sales, purchases

    /// Insert a document, assigning the next number for its kind.
    async fn create_document(&self, input: &NewDocument) -> Result<DocumentWithLines, AppError>;

    async fn get_document(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Option<DocumentWithLines>, AppError>;

    /// Headers matching the filter, newest date first.
    async fn list_documents(
        &self,
        kind: DocumentKind,
        filter: &ListDocumentsFilter,
    ) -> Result<Vec<Document>, AppError>;

    /// Replace header and lines, keeping id and number.
    async fn update_document(
        &self,
        document_id: Uuid,
        input: &NewDocument,
    ) -> Result<Option<DocumentWithLines>, AppError>;

    /// Sales and purchases for a party dated on or before `until`.
    async fn party_documents(
        &self,
        party_name: &str,
        until: NaiveDate,
    ) -> Result<Vec<Document>, AppError>;

    // Day book

    /// Insert a day book. Fails with `Conflict` if the date already has one.
    async fn create_day_book(&self, input: &NewDayBook) -> Result<DayBookWithLines, AppError>;

    async fn get_day_book(&self, day_book_id: Uuid)
        -> Result<Option<DayBookWithLines>, AppError>;

    /// Headers dated within `[from, to]`, oldest first.
    async fn list_day_books(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DayBook>, AppError>;

    async fn update_day_book(
        &self,
        day_book_id: Uuid,
        input: &NewDayBook,
    ) -> Result<Option<DayBookWithLines>, AppError>;

    /// Day-book lines naming an account, dated on or before `until`.
    async fn account_cash_lines(
        &self,
        account_name: &str,
        until: NaiveDate,
    ) -> Result<Vec<AccountCashLine>, AppError>;
}
