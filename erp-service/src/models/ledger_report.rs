//! Account statement (ledger report) built from documents and the day book.
//!
//! Debits increase what the party owes the business, credits reduce it:
//!
//! | source                  | debit          | credit         |
//! |-------------------------|----------------|----------------|
//! | sale                    | gross total    |                |
//! | advance on a sale       |                | advance        |
//! | purchase                |                | gross total    |
//! | advance on a purchase   | advance        |                |
//! | day book, received      |                | amount         |
//! | day book, payment       | amount         |                |
//!
//! Estimates are quotations and never post.

use crate::models::account::Account;
use crate::models::day_book::AccountCashLine;
use crate::models::document::{Document, DocumentKind};
use crate::models::totals::{round_money, CashSide};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a movement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementSource {
    Sale,
    SaleAdvance,
    Purchase,
    PurchaseAdvance,
    CashReceived,
    CashPaid,
}

/// One debit or credit against an account.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub date: NaiveDate,
    pub posted_utc: DateTime<Utc>,
    pub source: MovementSource,
    pub reference_id: Uuid,
    pub document_number: Option<i64>,
    pub narration: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl Movement {
    fn net(&self) -> Decimal {
        self.debit.saturating_sub(self.credit)
    }
}

/// Movements a document posts to its party.
pub fn document_movements(document: &Document) -> Vec<Movement> {
    let (main_source, advance_source) = match document.parsed_kind() {
        Some(DocumentKind::Sale) => (MovementSource::Sale, MovementSource::SaleAdvance),
        Some(DocumentKind::Purchase) => (MovementSource::Purchase, MovementSource::PurchaseAdvance),
        Some(DocumentKind::Estimate) | None => return Vec::new(),
    };

    let movement = |source: MovementSource, amount: Decimal| {
        let (debit, credit) = match source {
            MovementSource::Sale | MovementSource::PurchaseAdvance => (amount, Decimal::ZERO),
            _ => (Decimal::ZERO, amount),
        };
        Movement {
            date: document.date,
            posted_utc: document.created_utc,
            source,
            reference_id: document.document_id,
            document_number: Some(document.document_number),
            narration: document.notes.clone(),
            debit: round_money(debit),
            credit: round_money(credit),
        }
    };

    let mut movements = vec![movement(main_source, document.gross_total)];
    if !document.advance.is_zero() {
        movements.push(movement(advance_source, document.advance));
    }
    movements
}

/// Movement a day-book line posts to its account.
pub fn cash_movement(line: &AccountCashLine) -> Option<Movement> {
    let side = CashSide::from_string(&line.side)?;
    let (source, debit, credit) = match side {
        CashSide::Received => (MovementSource::CashReceived, Decimal::ZERO, line.amount),
        CashSide::Payment => (MovementSource::CashPaid, line.amount, Decimal::ZERO),
    };
    Some(Movement {
        date: line.date,
        posted_utc: line.created_utc,
        source,
        reference_id: line.day_book_id,
        document_number: None,
        narration: line.particulars.clone(),
        debit: round_money(debit),
        credit: round_money(credit),
    })
}

/// Statement line with running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    pub date: NaiveDate,
    pub source: MovementSource,
    pub reference_id: Uuid,
    pub document_number: Option<i64>,
    pub narration: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
    pub running_balance: Decimal,
}

/// Account statement for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerReport {
    pub account_id: Uuid,
    pub account_name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub opening_balance: Decimal,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub closing_balance: Decimal,
    pub lines: Vec<ReportLine>,
}

/// Build the statement for `[from, to]`. Movements dated before `from` roll
/// into the opening balance; movements after `to` are ignored.
pub fn build_report(
    account: &Account,
    from: NaiveDate,
    to: NaiveDate,
    mut movements: Vec<Movement>,
) -> LedgerReport {
    movements.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.posted_utc.cmp(&b.posted_utc))
            .then(a.reference_id.cmp(&b.reference_id))
    });

    let mut opening_balance = account.opening_balance;
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    let mut lines = Vec::new();

    for movement in movements.into_iter().filter(|m| m.date <= to) {
        if movement.date < from {
            opening_balance = opening_balance.saturating_add(movement.net());
            continue;
        }

        total_debit = total_debit.saturating_add(movement.debit);
        total_credit = total_credit.saturating_add(movement.credit);
        lines.push(ReportLine {
            date: movement.date,
            source: movement.source,
            reference_id: movement.reference_id,
            document_number: movement.document_number,
            narration: movement.narration,
            debit: movement.debit,
            credit: movement.credit,
            running_balance: Decimal::ZERO,
        });
    }

    let opening_balance = round_money(opening_balance);
    let mut running = opening_balance;
    for line in &mut lines {
        running = running.saturating_add(line.debit.saturating_sub(line.credit));
        line.running_balance = round_money(running);
    }

    LedgerReport {
        account_id: account.account_id,
        account_name: account.name.clone(),
        from,
        to,
        opening_balance,
        total_debit: round_money(total_debit),
        total_credit: round_money(total_credit),
        closing_balance: round_money(
            opening_balance
                .saturating_add(total_debit)
                .saturating_sub(total_credit),
        ),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(opening: Decimal) -> Account {
        Account {
            account_id: Uuid::new_v4(),
            name: "Ravi Traders".into(),
            phone: None,
            address: None,
            opening_balance: opening,
            created_utc: Utc::now(),
        }
    }

    fn document(kind: DocumentKind, on: NaiveDate, gross: Decimal, advance: Decimal) -> Document {
        Document {
            document_id: Uuid::new_v4(),
            kind: kind.as_str().into(),
            document_number: 1,
            date: on,
            year: "2024-25".into(),
            party_name: "Ravi Traders".into(),
            vehicle_number: None,
            notes: None,
            tax: Decimal::ZERO,
            tempo: Decimal::ZERO,
            loading: Decimal::ZERO,
            unloading: Decimal::ZERO,
            other_charges: Decimal::ZERO,
            line_total: gross,
            charges_total: Decimal::ZERO,
            gross_total: gross,
            advance,
            balance: gross - advance,
            created_utc: Utc::now(),
            updated_utc: Utc::now(),
        }
    }

    fn cash(side: CashSide, on: NaiveDate, amount: Decimal) -> AccountCashLine {
        AccountCashLine {
            day_book_id: Uuid::new_v4(),
            date: on,
            created_utc: Utc::now(),
            side: side.as_str().into(),
            amount,
            particulars: None,
        }
    }

    #[test]
    fn estimates_do_not_post() {
        let estimate = document(DocumentKind::Estimate, date(2024, 5, 1), dec!(100), dec!(10));
        assert!(document_movements(&estimate).is_empty());
    }

    #[test]
    fn sale_posts_debit_and_advance_credit() {
        let sale = document(DocumentKind::Sale, date(2024, 5, 1), dec!(615), dec!(200));
        let movements = document_movements(&sale);
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].debit, dec!(615));
        assert_eq!(movements[1].source, MovementSource::SaleAdvance);
        assert_eq!(movements[1].credit, dec!(200));
    }

    #[test]
    fn purchase_posts_credit_and_advance_debit() {
        let purchase = document(DocumentKind::Purchase, date(2024, 5, 1), dec!(1000), dec!(0));
        let movements = document_movements(&purchase);
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].credit, dec!(1000));
        assert_eq!(movements[0].debit, dec!(0));
    }

    #[test]
    fn report_rolls_prior_movements_into_opening_balance() {
        let acct = account(dec!(50));
        let mut movements = document_movements(&document(
            DocumentKind::Sale,
            date(2024, 4, 20),
            dec!(500),
            dec!(0),
        ));
        movements.extend(document_movements(&document(
            DocumentKind::Sale,
            date(2024, 5, 3),
            dec!(300),
            dec!(100),
        )));
        movements.extend(cash_movement(&cash(CashSide::Received, date(2024, 5, 10), dec!(400))));
        movements.extend(cash_movement(&cash(CashSide::Payment, date(2024, 6, 2), dec!(999))));

        let report = build_report(&acct, date(2024, 5, 1), date(2024, 5, 31), movements);

        assert_eq!(report.opening_balance, dec!(550));
        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.total_debit, dec!(300));
        assert_eq!(report.total_credit, dec!(500));
        assert_eq!(report.closing_balance, dec!(350));

        let running: Vec<Decimal> = report.lines.iter().map(|l| l.running_balance).collect();
        assert_eq!(running, vec![dec!(850), dec!(750), dec!(350)]);
    }

    #[test]
    fn empty_range_reports_opening_only() {
        let report = build_report(&account(dec!(-25)), date(2024, 1, 1), date(2024, 1, 31), Vec::new());
        assert!(report.lines.is_empty());
        assert_eq!(report.opening_balance, dec!(-25));
        assert_eq!(report.closing_balance, dec!(-25));
    }
}
