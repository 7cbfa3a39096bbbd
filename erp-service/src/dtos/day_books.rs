use crate::dtos::numeric;
use crate::models::totals::{CashBook, CashEntry, CashField, CashSide, TotalsError};
use crate::models::{CalendarDay, DayBook, DayBookLine, DayBookWithLines};
use crate::utils::not_blank;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CashEntryRequest {
    #[validate(
        length(max = 200, message = "Account name must be at most 200 characters"),
        custom(function = "not_blank")
    )]
    pub account_name: String,

    #[serde(default, deserialize_with = "numeric::lenient")]
    pub amount: String,

    pub particulars: Option<String>,
}

impl CashEntryRequest {
    pub fn to_entry(&self) -> CashEntry {
        CashEntry::new(
            self.account_name.clone(),
            self.amount.clone(),
            self.particulars.clone().filter(|p| !p.trim().is_empty()),
        )
    }
}

/// Create or replace the day book for a date.
#[derive(Debug, Deserialize, Validate)]
pub struct DayBookRequest {
    #[validate(required(message = "Date is required"))]
    pub date: Option<NaiveDate>,

    pub narration: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub received: Vec<CashEntryRequest>,

    #[serde(default)]
    #[validate(nested)]
    pub payments: Vec<CashEntryRequest>,
}

impl DayBookRequest {
    pub fn cash_book(&self) -> Result<CashBook, TotalsError> {
        CashBook::new(
            self.received.iter().map(CashEntryRequest::to_entry).collect(),
            self.payments.iter().map(CashEntryRequest::to_entry).collect(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CashOperation {
    Edit {
        side: CashSide,
        index: usize,
        field: CashField,
        #[serde(default, deserialize_with = "numeric::lenient")]
        value: String,
    },
    Add {
        side: CashSide,
        #[serde(default)]
        account_name: String,
        #[serde(default, deserialize_with = "numeric::lenient")]
        amount: String,
        particulars: Option<String>,
    },
    Remove {
        side: CashSide,
        index: usize,
    },
}

impl CashOperation {
    pub fn apply(&self, book: &mut CashBook) -> Result<(), TotalsError> {
        match self {
            CashOperation::Edit {
                side,
                index,
                field,
                value,
            } => book.edit(*side, *index, *field, value.clone()).map(|_| ()),
            CashOperation::Add {
                side,
                account_name,
                amount,
                particulars,
            } => {
                book.push(
                    *side,
                    CashEntry::new(account_name.clone(), amount.clone(), particulars.clone()),
                );
                Ok(())
            }
            CashOperation::Remove { side, index } => book.remove(*side, *index).map(|_| ()),
        }
    }
}

/// Draft sent to `/day-books/preview`. Entries may still be blank.
#[derive(Debug, Deserialize, Validate)]
pub struct DayBookPreviewRequest {
    #[serde(default)]
    pub received: Vec<PreviewCashEntry>,
    #[serde(default)]
    pub payments: Vec<PreviewCashEntry>,
    #[serde(default)]
    pub operations: Vec<CashOperation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewCashEntry {
    #[serde(default)]
    pub account_name: String,
    #[serde(default, deserialize_with = "numeric::lenient")]
    pub amount: String,
    pub particulars: Option<String>,
}

impl DayBookPreviewRequest {
    pub fn run(&self) -> Result<CashBook, TotalsError> {
        let entries = |side: &[PreviewCashEntry]| -> Vec<CashEntry> {
            side.iter()
                .map(|e| {
                    CashEntry::new(e.account_name.clone(), e.amount.clone(), e.particulars.clone())
                })
                .collect()
        };
        let mut book = CashBook::new(entries(&self.received), entries(&self.payments))?;
        for operation in &self.operations {
            operation.apply(&mut book)?;
        }
        Ok(book)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CashLineResponse {
    pub account_name: String,
    pub amount: Decimal,
    pub particulars: Option<String>,
}

impl From<&CashEntry> for CashLineResponse {
    fn from(entry: &CashEntry) -> Self {
        Self {
            account_name: entry.account_name().to_string(),
            amount: entry.amount(),
            particulars: entry.particulars().map(str::to_string),
        }
    }
}

impl From<&DayBookLine> for CashLineResponse {
    fn from(line: &DayBookLine) -> Self {
        Self {
            account_name: line.account_name.clone(),
            amount: line.amount,
            particulars: line.particulars.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CashBookPreviewResponse {
    pub received: Vec<CashLineResponse>,
    pub payments: Vec<CashLineResponse>,
    pub received_total: Decimal,
    pub payment_total: Decimal,
    pub balance: Decimal,
}

impl From<&CashBook> for CashBookPreviewResponse {
    fn from(book: &CashBook) -> Self {
        let side = |side: CashSide| -> Vec<CashLineResponse> {
            book.entries(side).iter().map(CashLineResponse::from).collect()
        };
        Self {
            received: side(CashSide::Received),
            payments: side(CashSide::Payment),
            received_total: book.received_total(),
            payment_total: book.payment_total(),
            balance: book.balance(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayBookSummaryResponse {
    pub day_book_id: String,
    pub date: NaiveDate,
    pub year: String,
    pub narration: Option<String>,
    pub received_total: Decimal,
    pub payment_total: Decimal,
    pub balance: Decimal,
    pub created_utc: String,
    pub updated_utc: String,
}

impl From<DayBook> for DayBookSummaryResponse {
    fn from(book: DayBook) -> Self {
        Self {
            day_book_id: book.day_book_id.to_string(),
            date: book.date,
            year: book.year,
            narration: book.narration,
            received_total: book.received_total,
            payment_total: book.payment_total,
            balance: book.balance,
            created_utc: book.created_utc.to_rfc3339(),
            updated_utc: book.updated_utc.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayBookResponse {
    #[serde(flatten)]
    pub header: DayBookSummaryResponse,
    pub received: Vec<CashLineResponse>,
    pub payments: Vec<CashLineResponse>,
}

impl From<DayBookWithLines> for DayBookResponse {
    fn from(stored: DayBookWithLines) -> Self {
        let received = stored.side(CashSide::Received).map(CashLineResponse::from).collect();
        let payments = stored.side(CashSide::Payment).map(CashLineResponse::from).collect();
        Self {
            header: stored.day_book.into(),
            received,
            payments,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DayBookListParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayBookListResponse {
    pub day_books: Vec<DayBookSummaryResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarParams {
    /// `YYYY-MM`
    pub month: String,
}

impl CalendarParams {
    /// First and last day of the requested month.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (year, month) = self.month.trim().split_once('-')?;
        let first = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?;
        let next = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
        };
        Some((first, next.pred_opt()?))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub month: String,
    pub days: Vec<CalendarDay>,
}
