//! Trade documents: estimates, sales and purchases.

use crate::models::fiscal_year::FiscalYear;
use crate::models::totals::{ChargeKind, DocumentTotals};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Estimate,
    Sale,
    Purchase,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Estimate => "estimate",
            DocumentKind::Sale => "sale",
            DocumentKind::Purchase => "purchase",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "estimate" => Some(DocumentKind::Estimate),
            "sale" => Some(DocumentKind::Sale),
            "purchase" => Some(DocumentKind::Purchase),
            _ => None,
        }
    }

    /// Human label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Estimate => "Estimate",
            DocumentKind::Sale => "Sale",
            DocumentKind::Purchase => "Purchase",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Document header with its derived totals.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Document {
    pub document_id: Uuid,
    pub kind: String,
    pub document_number: i64,
    pub date: NaiveDate,
    pub year: String,
    pub party_name: String,
    pub vehicle_number: Option<String>,
    pub notes: Option<String>,
    pub tax: Decimal,
    pub tempo: Decimal,
    pub loading: Decimal,
    pub unloading: Decimal,
    pub other_charges: Decimal,
    pub line_total: Decimal,
    pub charges_total: Decimal,
    pub gross_total: Decimal,
    pub advance: Decimal,
    pub balance: Decimal,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Document {
    pub fn parsed_kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_string(&self.kind)
    }
}

/// One stored line of a document.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DocumentLine {
    pub line_id: Uuid,
    pub document_id: Uuid,
    pub position: i32,
    pub descriptor: String,
    pub quantity: Decimal,
    pub quantity_area: Option<Decimal>,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Header plus ordered lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentWithLines {
    pub document: Document,
    pub lines: Vec<DocumentLine>,
}

/// Line ready to persist; every figure already recomputed.
#[derive(Debug, Clone)]
pub struct NewDocumentLine {
    pub descriptor: String,
    pub quantity: Decimal,
    pub quantity_area: Option<Decimal>,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Header fields entered by the user.
#[derive(Debug, Clone)]
pub struct DocumentHeader {
    pub date: NaiveDate,
    pub party_name: String,
    pub vehicle_number: Option<String>,
    pub notes: Option<String>,
}

/// Document ready to persist (create or full replace).
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub date: NaiveDate,
    pub year: String,
    pub party_name: String,
    pub vehicle_number: Option<String>,
    pub notes: Option<String>,
    pub tax: Decimal,
    pub tempo: Decimal,
    pub loading: Decimal,
    pub unloading: Decimal,
    pub other_charges: Decimal,
    pub line_total: Decimal,
    pub charges_total: Decimal,
    pub gross_total: Decimal,
    pub advance: Decimal,
    pub balance: Decimal,
    pub lines: Vec<NewDocumentLine>,
}

impl NewDocument {
    /// Snapshot the reducer's figures into a persistable document. The fiscal
    /// year is derived from the document date.
    pub fn from_totals(kind: DocumentKind, header: DocumentHeader, totals: &DocumentTotals) -> Self {
        let charges = totals.charges();
        let lines = totals
            .lines()
            .iter()
            .map(|line| NewDocumentLine {
                descriptor: line.descriptor().trim().to_string(),
                quantity: line.quantity(),
                quantity_area: line.quantity_area(),
                rate: line.rate(),
                amount: line.amount(),
            })
            .collect();

        Self {
            kind,
            date: header.date,
            year: FiscalYear::containing(header.date).label(),
            party_name: header.party_name.trim().to_string(),
            vehicle_number: header.vehicle_number,
            notes: header.notes,
            tax: charges.get(ChargeKind::Tax),
            tempo: charges.get(ChargeKind::Tempo),
            loading: charges.get(ChargeKind::Loading),
            unloading: charges.get(ChargeKind::Unloading),
            other_charges: charges.get(ChargeKind::Other),
            line_total: totals.line_total(),
            charges_total: totals.charges_total(),
            gross_total: totals.gross_total(),
            advance: totals.advance(),
            balance: totals.balance(),
            lines,
        }
    }
}

/// Filter parameters for listing documents.
#[derive(Debug, Clone, Default)]
pub struct ListDocumentsFilter {
    pub party: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub year: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl ListDocumentsFilter {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.clamp(1, 100))
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::totals::{Charges, LineItem};
    use rust_decimal_macros::dec;

    #[test]
    fn from_totals_snapshots_figures_and_year() {
        let totals = DocumentTotals::new(
            vec![LineItem::new(" Black Galaxy ", "2", Some("10".into()), "50")],
            Charges::new().with(ChargeKind::Tax, "10"),
            "100",
        )
        .unwrap();

        let doc = NewDocument::from_totals(
            DocumentKind::Sale,
            DocumentHeader {
                date: NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
                party_name: " Ravi Traders ".into(),
                vehicle_number: None,
                notes: None,
            },
            &totals,
        );

        assert_eq!(doc.year, "2024-25");
        assert_eq!(doc.party_name, "Ravi Traders");
        assert_eq!(doc.lines[0].descriptor, "Black Galaxy");
        assert_eq!(doc.lines[0].quantity_area, Some(dec!(10)));
        assert_eq!(doc.lines[0].amount, dec!(500));
        assert_eq!(doc.tax, dec!(10));
        assert_eq!(doc.tempo, dec!(0));
        assert_eq!(doc.gross_total, dec!(510));
        assert_eq!(doc.balance, dec!(410));
    }

    #[test]
    fn list_filter_pages() {
        let filter = ListDocumentsFilter {
            page: 3,
            page_size: 500,
            ..Default::default()
        };
        assert_eq!(filter.limit(), 100);
        assert_eq!(filter.offset(), 200);

        let first = ListDocumentsFilter::default();
        assert_eq!(first.limit(), 1);
        assert_eq!(first.offset(), 0);
    }
}
