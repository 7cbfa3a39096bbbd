//! Line-item arithmetic shared by estimates, sales, purchases and the day book.
//!
//! Every document in the system is an ordered list of line items plus a few
//! header figures. Quantities and rates arrive as free text exactly as typed;
//! they are parsed permissively (anything unparseable counts as zero) and all
//! derived figures are recomputed eagerly on every mutation, so a value read
//! back from any accessor is never stale.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places kept on every monetary figure.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude accepted from a single typed field (twelve integer
/// digits). Anything beyond it is treated like unparseable text.
pub const MAX_ENTRY: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 3);

/// Errors raised by line-list mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TotalsError {
    #[error("a document must contain at least one line item")]
    EmptyDocument,

    #[error("cannot remove the only remaining line item")]
    LastLine,

    #[error("line item {index} does not exist ({len} lines)")]
    LineOutOfRange { index: usize, len: usize },
}

/// Parse a user-entered number.
///
/// Surrounding whitespace and `,` grouping separators are ignored. The longest
/// numeric prefix is used (`"12.5 sqft"` is 12.5); text with no leading number
/// at all, including the empty string, is zero. So is any figure larger in
/// magnitude than [`MAX_ENTRY`].
pub fn parse_amount(raw: &str) -> Decimal {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_point = false;
    for (i, c) in cleaned.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return Decimal::ZERO;
    }

    let prefix = cleaned[..end].trim_end_matches('.');
    match Decimal::from_str(prefix) {
        Ok(value) if value.abs() <= MAX_ENTRY => value,
        _ => Decimal::ZERO,
    }
}

/// Saturating sum, so aggregates never overflow.
pub fn sum_money(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, value| acc.saturating_add(value))
}

/// Round to [`MONEY_SCALE`] places, half away from zero, and pad the scale so
/// figures always render with two decimals.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Editable fields of a [`LineItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineField {
    Descriptor,
    Quantity,
    QuantityArea,
    Rate,
}

/// One row of a document: `amount = multiplicand * rate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    descriptor: String,
    quantity: String,
    quantity_area: Option<String>,
    rate: String,
    amount: Decimal,
}

impl LineItem {
    pub fn new(
        descriptor: impl Into<String>,
        quantity: impl Into<String>,
        quantity_area: Option<String>,
        rate: impl Into<String>,
    ) -> Self {
        let mut item = Self {
            descriptor: descriptor.into(),
            quantity: quantity.into(),
            quantity_area,
            rate: rate.into(),
            amount: Decimal::ZERO,
        };
        item.recompute();
        item
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn quantity(&self) -> Decimal {
        parse_amount(&self.quantity)
    }

    /// Area quantity, if the line is area-priced.
    pub fn quantity_area(&self) -> Option<Decimal> {
        self.area_text().map(parse_amount)
    }

    pub fn rate(&self) -> Decimal {
        parse_amount(&self.rate)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The figure multiplied by the rate: area quantity when present, else
    /// the plain quantity.
    pub fn multiplicand(&self) -> Decimal {
        self.quantity_area().unwrap_or_else(|| self.quantity())
    }

    pub fn set(&mut self, field: LineField, raw: impl Into<String>) {
        let raw = raw.into();
        match field {
            LineField::Descriptor => self.descriptor = raw,
            LineField::Quantity => self.quantity = raw,
            LineField::QuantityArea => self.quantity_area = Some(raw),
            LineField::Rate => self.rate = raw,
        }
        self.recompute();
    }

    pub fn set_quantity(&mut self, raw: impl Into<String>) {
        self.set(LineField::Quantity, raw);
    }

    pub fn set_quantity_area(&mut self, raw: impl Into<String>) {
        self.set(LineField::QuantityArea, raw);
    }

    pub fn set_rate(&mut self, raw: impl Into<String>) {
        self.set(LineField::Rate, raw);
    }

    fn area_text(&self) -> Option<&str> {
        self.quantity_area
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
    }

    fn recompute(&mut self) {
        self.amount = round_money(self.multiplicand().saturating_mul(self.rate()));
    }
}

/// Named surcharges added on top of the line total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeKind {
    Tax,
    Tempo,
    Loading,
    Unloading,
    Other,
}

impl ChargeKind {
    pub const ALL: [ChargeKind; 5] = [
        ChargeKind::Tax,
        ChargeKind::Tempo,
        ChargeKind::Loading,
        ChargeKind::Unloading,
        ChargeKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeKind::Tax => "tax",
            ChargeKind::Tempo => "tempo",
            ChargeKind::Loading => "loading",
            ChargeKind::Unloading => "unloading",
            ChargeKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fixed charge set of a document. Unset charges are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Charges {
    raw: BTreeMap<ChargeKind, String>,
}

impl Charges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ChargeKind, raw: impl Into<String>) -> Self {
        self.set(kind, raw);
        self
    }

    pub fn set(&mut self, kind: ChargeKind, raw: impl Into<String>) {
        self.raw.insert(kind, raw.into());
    }

    pub fn get(&self, kind: ChargeKind) -> Decimal {
        self.raw
            .get(&kind)
            .map(|raw| round_money(parse_amount(raw)))
            .unwrap_or_else(|| round_money(Decimal::ZERO))
    }

    pub fn total(&self) -> Decimal {
        round_money(sum_money(ChargeKind::ALL.iter().map(|kind| self.get(*kind))))
    }
}

/// Running totals of an estimate, sale or purchase.
///
/// `gross_total = sum(line amounts) + sum(charges)` and
/// `balance = gross_total - advance`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTotals {
    lines: Vec<LineItem>,
    charges: Charges,
    advance: String,
    line_total: Decimal,
    charges_total: Decimal,
    gross_total: Decimal,
    balance: Decimal,
}

impl DocumentTotals {
    pub fn new(
        lines: Vec<LineItem>,
        charges: Charges,
        advance: impl Into<String>,
    ) -> Result<Self, TotalsError> {
        if lines.is_empty() {
            return Err(TotalsError::EmptyDocument);
        }

        let mut totals = Self {
            lines,
            charges,
            advance: advance.into(),
            line_total: Decimal::ZERO,
            charges_total: Decimal::ZERO,
            gross_total: Decimal::ZERO,
            balance: Decimal::ZERO,
        };
        totals.recompute();
        Ok(totals)
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn charges(&self) -> &Charges {
        &self.charges
    }

    pub fn advance(&self) -> Decimal {
        round_money(parse_amount(&self.advance))
    }

    pub fn line_total(&self) -> Decimal {
        self.line_total
    }

    pub fn charges_total(&self) -> Decimal {
        self.charges_total
    }

    pub fn gross_total(&self) -> Decimal {
        self.gross_total
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn edit_line(
        &mut self,
        index: usize,
        field: LineField,
        raw: impl Into<String>,
    ) -> Result<&LineItem, TotalsError> {
        let len = self.lines.len();
        self.lines
            .get_mut(index)
            .ok_or(TotalsError::LineOutOfRange { index, len })?
            .set(field, raw);
        self.recompute();
        Ok(&self.lines[index])
    }

    pub fn push_line(&mut self, item: LineItem) {
        self.lines.push(item);
        self.recompute();
    }

    pub fn remove_line(&mut self, index: usize) -> Result<LineItem, TotalsError> {
        let len = self.lines.len();
        if index >= len {
            return Err(TotalsError::LineOutOfRange { index, len });
        }
        if len == 1 {
            return Err(TotalsError::LastLine);
        }
        let removed = self.lines.remove(index);
        self.recompute();
        Ok(removed)
    }

    pub fn set_charge(&mut self, kind: ChargeKind, raw: impl Into<String>) {
        self.charges.set(kind, raw);
        self.recompute();
    }

    pub fn set_advance(&mut self, raw: impl Into<String>) {
        self.advance = raw.into();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.line_total = round_money(sum_money(self.lines.iter().map(LineItem::amount)));
        self.charges_total = self.charges.total();
        self.gross_total = round_money(self.line_total.saturating_add(self.charges_total));
        self.balance = round_money(self.gross_total.saturating_sub(self.advance()));
    }
}

/// Which half of the day book an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashSide {
    /// Money in (credit to the paying account).
    Received,
    /// Money out (debit to the receiving account).
    Payment,
}

impl CashSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashSide::Received => "received",
            CashSide::Payment => "payment",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "received" => Some(CashSide::Received),
            "payment" => Some(CashSide::Payment),
            _ => None,
        }
    }
}

impl std::fmt::Display for CashSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Editable fields of a [`CashEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashField {
    AccountName,
    Amount,
    Particulars,
}

/// One received or paid line of the day book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashEntry {
    account_name: String,
    amount: String,
    particulars: Option<String>,
}

impl CashEntry {
    pub fn new(
        account_name: impl Into<String>,
        amount: impl Into<String>,
        particulars: Option<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            amount: amount.into(),
            particulars,
        }
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn amount(&self) -> Decimal {
        round_money(parse_amount(&self.amount))
    }

    pub fn particulars(&self) -> Option<&str> {
        self.particulars.as_deref()
    }

    fn set(&mut self, field: CashField, raw: String) {
        match field {
            CashField::AccountName => self.account_name = raw,
            CashField::Amount => self.amount = raw,
            CashField::Particulars => self.particulars = Some(raw),
        }
    }
}

/// Day-book totals: `balance = received_total - payment_total`.
///
/// A book needs at least one entry, and a side holding a single entry cannot
/// have it removed.
#[derive(Debug, Clone, PartialEq)]
pub struct CashBook {
    received: Vec<CashEntry>,
    payments: Vec<CashEntry>,
    received_total: Decimal,
    payment_total: Decimal,
    balance: Decimal,
}

impl CashBook {
    pub fn new(received: Vec<CashEntry>, payments: Vec<CashEntry>) -> Result<Self, TotalsError> {
        if received.is_empty() && payments.is_empty() {
            return Err(TotalsError::EmptyDocument);
        }

        let mut book = Self {
            received,
            payments,
            received_total: Decimal::ZERO,
            payment_total: Decimal::ZERO,
            balance: Decimal::ZERO,
        };
        book.recompute_side(CashSide::Received);
        book.recompute_side(CashSide::Payment);
        Ok(book)
    }

    pub fn entries(&self, side: CashSide) -> &[CashEntry] {
        match side {
            CashSide::Received => &self.received,
            CashSide::Payment => &self.payments,
        }
    }

    pub fn received_total(&self) -> Decimal {
        self.received_total
    }

    pub fn payment_total(&self) -> Decimal {
        self.payment_total
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn push(&mut self, side: CashSide, entry: CashEntry) {
        self.side_mut(side).push(entry);
        self.recompute_side(side);
    }

    pub fn edit(
        &mut self,
        side: CashSide,
        index: usize,
        field: CashField,
        raw: impl Into<String>,
    ) -> Result<&CashEntry, TotalsError> {
        let entries = self.side_mut(side);
        let len = entries.len();
        entries
            .get_mut(index)
            .ok_or(TotalsError::LineOutOfRange { index, len })?
            .set(field, raw.into());
        self.recompute_side(side);
        Ok(&self.entries(side)[index])
    }

    pub fn remove(&mut self, side: CashSide, index: usize) -> Result<CashEntry, TotalsError> {
        let entries = self.side_mut(side);
        let len = entries.len();
        if index >= len {
            return Err(TotalsError::LineOutOfRange { index, len });
        }
        if len == 1 {
            return Err(TotalsError::LastLine);
        }
        let removed = entries.remove(index);
        self.recompute_side(side);
        Ok(removed)
    }

    fn side_mut(&mut self, side: CashSide) -> &mut Vec<CashEntry> {
        match side {
            CashSide::Received => &mut self.received,
            CashSide::Payment => &mut self.payments,
        }
    }

    fn recompute_side(&mut self, side: CashSide) {
        let total = round_money(sum_money(self.entries(side).iter().map(CashEntry::amount)));
        match side {
            CashSide::Received => self.received_total = total,
            CashSide::Payment => self.payment_total = total,
        }
        self.balance = round_money(self.received_total.saturating_sub(self.payment_total));
    }
}
