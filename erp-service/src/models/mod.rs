//! Domain models for erp-service.

mod account;
mod day_book;
mod document;
pub mod fiscal_year;
pub mod ledger_report;
mod product;
pub mod totals;

pub use account::{name_key, Account, CreateAccount};
pub use day_book::{
    AccountCashLine, CalendarDay, DayBook, DayBookLine, DayBookWithLines, NewDayBook,
    NewDayBookLine,
};
pub use document::{
    Document, DocumentHeader, DocumentKind, DocumentLine, DocumentWithLines, ListDocumentsFilter,
    NewDocument, NewDocumentLine,
};
pub use fiscal_year::FiscalYear;
pub use ledger_report::LedgerReport;
pub use product::{
    CreateProduct, ListProductsFilter, Product, ProductCategory, ProductUnit, UpdateProduct,
};
