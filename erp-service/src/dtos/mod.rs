pub mod accounts;
pub mod day_books;
pub mod documents;
pub mod numeric;
pub mod products;
pub mod reports;

pub use accounts::{AccountListResponse, AccountResponse, CreateAccountRequest};
pub use day_books::{
    CalendarParams, CalendarResponse, CashBookPreviewResponse, DayBookListParams,
    DayBookListResponse, DayBookPreviewRequest, DayBookRequest, DayBookResponse,
    DayBookSummaryResponse,
};
pub use documents::{
    DocumentListParams, DocumentListResponse, DocumentRequest, DocumentResponse,
    DocumentSummaryResponse, TotalsPreviewRequest, TotalsPreviewResponse,
};
pub use products::{
    CreateProductRequest, ProductListParams, ProductListResponse, ProductResponse,
    UpdateProductRequest,
};
pub use reports::{FiscalYearResponse, LedgerReportParams};
