use crate::dtos::numeric;
use crate::models::totals::{
    ChargeKind, Charges, DocumentTotals, LineField, LineItem, TotalsError,
};
use crate::models::{
    Document, DocumentHeader, DocumentKind, DocumentLine, DocumentWithLines, ListDocumentsFilter,
};
use crate::utils::not_blank;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One line as typed. A client-sent `amount` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItemRequest {
    #[validate(
        length(max = 200, message = "Descriptor must be at most 200 characters"),
        custom(function = "not_blank")
    )]
    pub descriptor: String,

    #[serde(default, deserialize_with = "numeric::lenient")]
    pub quantity: String,

    #[serde(default, deserialize_with = "numeric::lenient_opt")]
    pub quantity_area: Option<String>,

    #[serde(default, deserialize_with = "numeric::lenient")]
    pub rate: String,
}

impl LineItemRequest {
    pub fn to_line_item(&self) -> LineItem {
        LineItem::new(
            self.descriptor.clone(),
            self.quantity.clone(),
            self.quantity_area.clone(),
            self.rate.clone(),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargesRequest {
    #[serde(default, deserialize_with = "numeric::lenient")]
    pub tax: String,
    #[serde(default, deserialize_with = "numeric::lenient")]
    pub tempo: String,
    #[serde(default, deserialize_with = "numeric::lenient")]
    pub loading: String,
    #[serde(default, deserialize_with = "numeric::lenient")]
    pub unloading: String,
    #[serde(default, deserialize_with = "numeric::lenient")]
    pub other: String,
}

impl ChargesRequest {
    pub fn to_charges(&self) -> Charges {
        Charges::new()
            .with(ChargeKind::Tax, self.tax.clone())
            .with(ChargeKind::Tempo, self.tempo.clone())
            .with(ChargeKind::Loading, self.loading.clone())
            .with(ChargeKind::Unloading, self.unloading.clone())
            .with(ChargeKind::Other, self.other.clone())
    }
}

/// Create or replace an estimate, sale or purchase.
#[derive(Debug, Deserialize, Validate)]
pub struct DocumentRequest {
    #[validate(required(message = "Date is required"))]
    pub date: Option<NaiveDate>,

    #[validate(
        length(max = 200, message = "Party name must be at most 200 characters"),
        custom(function = "not_blank")
    )]
    pub party_name: String,

    #[validate(length(max = 32, message = "Vehicle number must be at most 32 characters"))]
    pub vehicle_number: Option<String>,

    pub notes: Option<String>,

    #[validate(
        length(min = 1, message = "At least one line item is required"),
        nested
    )]
    pub lines: Vec<LineItemRequest>,

    #[serde(default)]
    pub charges: ChargesRequest,

    #[serde(default, deserialize_with = "numeric::lenient")]
    pub advance: String,
}

impl DocumentRequest {
    /// Run the reducer over the submitted draft.
    pub fn totals(&self) -> Result<DocumentTotals, TotalsError> {
        DocumentTotals::new(
            self.lines.iter().map(LineItemRequest::to_line_item).collect(),
            self.charges.to_charges(),
            self.advance.clone(),
        )
    }

    /// Header fields, or `None` when the date is missing (caught by validation).
    pub fn header(&self) -> Option<DocumentHeader> {
        Some(DocumentHeader {
            date: self.date?,
            party_name: self.party_name.clone(),
            vehicle_number: self
                .vehicle_number
                .clone()
                .filter(|v| !v.trim().is_empty()),
            notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
        })
    }
}

/// One interactive edit applied to a draft, in request order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DocumentOperation {
    EditLine {
        index: usize,
        field: LineField,
        #[serde(default, deserialize_with = "numeric::lenient")]
        value: String,
    },
    AddLine(LineItemRequest),
    RemoveLine {
        index: usize,
    },
    SetCharge {
        kind: ChargeKind,
        #[serde(default, deserialize_with = "numeric::lenient")]
        value: String,
    },
    SetAdvance {
        #[serde(default, deserialize_with = "numeric::lenient")]
        value: String,
    },
}

impl DocumentOperation {
    pub fn apply(&self, totals: &mut DocumentTotals) -> Result<(), TotalsError> {
        match self {
            DocumentOperation::EditLine {
                index,
                field,
                value,
            } => totals.edit_line(*index, *field, value.clone()).map(|_| ()),
            DocumentOperation::AddLine(line) => {
                totals.push_line(line.to_line_item());
                Ok(())
            }
            DocumentOperation::RemoveLine { index } => totals.remove_line(*index).map(|_| ()),
            DocumentOperation::SetCharge { kind, value } => {
                totals.set_charge(*kind, value.clone());
                Ok(())
            }
            DocumentOperation::SetAdvance { value } => {
                totals.set_advance(value.clone());
                Ok(())
            }
        }
    }
}

/// Draft sent to `/totals/preview`. Lines may still have blank descriptors.
#[derive(Debug, Deserialize, Validate)]
pub struct TotalsPreviewRequest {
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub lines: Vec<PreviewLine>,

    #[serde(default)]
    pub charges: ChargesRequest,

    #[serde(default, deserialize_with = "numeric::lenient")]
    pub advance: String,

    #[serde(default)]
    pub operations: Vec<DocumentOperation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewLine {
    #[serde(default)]
    pub descriptor: String,
    #[serde(default, deserialize_with = "numeric::lenient")]
    pub quantity: String,
    #[serde(default, deserialize_with = "numeric::lenient_opt")]
    pub quantity_area: Option<String>,
    #[serde(default, deserialize_with = "numeric::lenient")]
    pub rate: String,
}

impl TotalsPreviewRequest {
    pub fn run(&self) -> Result<DocumentTotals, TotalsError> {
        let lines = self
            .lines
            .iter()
            .map(|l| {
                LineItem::new(
                    l.descriptor.clone(),
                    l.quantity.clone(),
                    l.quantity_area.clone(),
                    l.rate.clone(),
                )
            })
            .collect();
        let mut totals =
            DocumentTotals::new(lines, self.charges.to_charges(), self.advance.clone())?;
        for operation in &self.operations {
            operation.apply(&mut totals)?;
        }
        Ok(totals)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LineResponse {
    pub position: usize,
    pub descriptor: String,
    pub quantity: Decimal,
    pub quantity_area: Option<Decimal>,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl From<DocumentLine> for LineResponse {
    fn from(line: DocumentLine) -> Self {
        Self {
            position: usize::try_from(line.position).unwrap_or_default(),
            descriptor: line.descriptor,
            quantity: line.quantity,
            quantity_area: line.quantity_area,
            rate: line.rate,
            amount: line.amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChargesResponse {
    pub tax: Decimal,
    pub tempo: Decimal,
    pub loading: Decimal,
    pub unloading: Decimal,
    pub other: Decimal,
}

impl From<&Charges> for ChargesResponse {
    fn from(charges: &Charges) -> Self {
        Self {
            tax: charges.get(ChargeKind::Tax),
            tempo: charges.get(ChargeKind::Tempo),
            loading: charges.get(ChargeKind::Loading),
            unloading: charges.get(ChargeKind::Unloading),
            other: charges.get(ChargeKind::Other),
        }
    }
}

/// Figures computed for a draft without saving it.
#[derive(Debug, Serialize, Deserialize)]
pub struct TotalsPreviewResponse {
    pub lines: Vec<LineResponse>,
    pub charges: ChargesResponse,
    pub line_total: Decimal,
    pub charges_total: Decimal,
    pub gross_total: Decimal,
    pub advance: Decimal,
    pub balance: Decimal,
}

impl From<&DocumentTotals> for TotalsPreviewResponse {
    fn from(totals: &DocumentTotals) -> Self {
        Self {
            lines: totals
                .lines()
                .iter()
                .enumerate()
                .map(|(position, line)| LineResponse {
                    position,
                    descriptor: line.descriptor().to_string(),
                    quantity: line.quantity(),
                    quantity_area: line.quantity_area(),
                    rate: line.rate(),
                    amount: line.amount(),
                })
                .collect(),
            charges: totals.charges().into(),
            line_total: totals.line_total(),
            charges_total: totals.charges_total(),
            gross_total: totals.gross_total(),
            advance: totals.advance(),
            balance: totals.balance(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentSummaryResponse {
    pub document_id: String,
    pub kind: String,
    pub document_number: i64,
    pub date: NaiveDate,
    pub year: String,
    pub party_name: String,
    pub vehicle_number: Option<String>,
    pub notes: Option<String>,
    pub charges: ChargesResponse,
    pub line_total: Decimal,
    pub charges_total: Decimal,
    pub gross_total: Decimal,
    pub advance: Decimal,
    pub balance: Decimal,
    pub created_utc: String,
    pub updated_utc: String,
}

impl From<Document> for DocumentSummaryResponse {
    fn from(doc: Document) -> Self {
        Self {
            document_id: doc.document_id.to_string(),
            kind: doc.kind,
            document_number: doc.document_number,
            date: doc.date,
            year: doc.year,
            party_name: doc.party_name,
            vehicle_number: doc.vehicle_number,
            notes: doc.notes,
            charges: ChargesResponse {
                tax: doc.tax,
                tempo: doc.tempo,
                loading: doc.loading,
                unloading: doc.unloading,
                other: doc.other_charges,
            },
            line_total: doc.line_total,
            charges_total: doc.charges_total,
            gross_total: doc.gross_total,
            advance: doc.advance,
            balance: doc.balance,
            created_utc: doc.created_utc.to_rfc3339(),
            updated_utc: doc.updated_utc.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    #[serde(flatten)]
    pub header: DocumentSummaryResponse,
    pub lines: Vec<LineResponse>,
}

impl From<DocumentWithLines> for DocumentResponse {
    fn from(stored: DocumentWithLines) -> Self {
        Self {
            header: stored.document.into(),
            lines: stored.lines.into_iter().map(LineResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentListParams {
    pub party: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub year: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<DocumentListParams> for ListDocumentsFilter {
    fn from(params: DocumentListParams) -> Self {
        Self {
            party: params.party.filter(|p| !p.trim().is_empty()),
            from: params.from,
            to: params.to,
            year: params.year.filter(|y| !y.trim().is_empty()),
            page: params.page.unwrap_or(1).max(1),
            page_size: params.page_size.unwrap_or(20).clamp(1, 100),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub kind: DocumentKind,
    pub documents: Vec<DocumentSummaryResponse>,
    pub page: u32,
    pub page_size: u32,
}
