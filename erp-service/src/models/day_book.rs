//! Day book (daily cash ledger) model.

use crate::models::fiscal_year::FiscalYear;
use crate::models::totals::{CashBook, CashSide};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Day-book header for one date.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DayBook {
    pub day_book_id: Uuid,
    pub date: NaiveDate,
    pub year: String,
    pub narration: Option<String>,
    pub received_total: Decimal,
    pub payment_total: Decimal,
    pub balance: Decimal,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// One received or paid line.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DayBookLine {
    pub line_id: Uuid,
    pub day_book_id: Uuid,
    pub side: String,
    pub position: i32,
    pub account_name: String,
    pub amount: Decimal,
    pub particulars: Option<String>,
}

impl DayBookLine {
    pub fn parsed_side(&self) -> Option<CashSide> {
        CashSide::from_string(&self.side)
    }
}

/// Header plus lines, received first then payments, each in entry order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBookWithLines {
    pub day_book: DayBook,
    pub lines: Vec<DayBookLine>,
}

impl DayBookWithLines {
    pub fn side(&self, side: CashSide) -> impl Iterator<Item = &DayBookLine> {
        self.lines
            .iter()
            .filter(move |line| line.parsed_side() == Some(side))
    }
}

/// Line ready to persist.
#[derive(Debug, Clone)]
pub struct NewDayBookLine {
    pub side: CashSide,
    pub account_name: String,
    pub amount: Decimal,
    pub particulars: Option<String>,
}

/// Day book ready to persist (create or full replace).
#[derive(Debug, Clone)]
pub struct NewDayBook {
    pub date: NaiveDate,
    pub year: String,
    pub narration: Option<String>,
    pub received_total: Decimal,
    pub payment_total: Decimal,
    pub balance: Decimal,
    pub lines: Vec<NewDayBookLine>,
}

impl NewDayBook {
    pub fn from_cash_book(date: NaiveDate, narration: Option<String>, book: &CashBook) -> Self {
        let lines = [CashSide::Received, CashSide::Payment]
            .into_iter()
            .flat_map(|side| {
                book.entries(side).iter().map(move |entry| NewDayBookLine {
                    side,
                    account_name: entry.account_name().trim().to_string(),
                    amount: entry.amount(),
                    particulars: entry.particulars().map(str::to_string),
                })
            })
            .collect();

        Self {
            date,
            year: FiscalYear::containing(date).label(),
            narration,
            received_total: book.received_total(),
            payment_total: book.payment_total(),
            balance: book.balance(),
            lines,
        }
    }
}

/// A day-book line touching one account, with the date it was booked on.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccountCashLine {
    pub day_book_id: Uuid,
    pub date: NaiveDate,
    pub created_utc: DateTime<Utc>,
    pub side: String,
    pub amount: Decimal,
    pub particulars: Option<String>,
}

/// Per-date totals shown on the month calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_book_id: Uuid,
    pub received_total: Decimal,
    pub payment_total: Decimal,
    pub balance: Decimal,
}

impl From<&DayBook> for CalendarDay {
    fn from(book: &DayBook) -> Self {
        Self {
            date: book.date,
            day_book_id: book.day_book_id,
            received_total: book.received_total,
            payment_total: book.payment_total,
            balance: book.balance,
        }
    }
}
