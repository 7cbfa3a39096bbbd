//! In-memory store used by tests and `STORE_BACKEND=memory` demo runs.

use crate::models::{
    name_key, Account, AccountCashLine, CreateAccount, CreateProduct, DayBook, DayBookLine,
    DayBookWithLines, Document, DocumentKind, DocumentLine, DocumentWithLines,
    ListDocumentsFilter, ListProductsFilter, NewDayBook, NewDocument, Product, UpdateProduct,
};
use crate::services::store::Store;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use service_core::error::AppError;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<Uuid, Account>,
    account_names: DashMap<String, Uuid>,
    products: DashMap<Uuid, Product>,
    product_names: DashMap<String, Uuid>,
    documents: DashMap<Uuid, DocumentWithLines>,
    sequences: DashMap<DocumentKind, i64>,
    day_books: DashMap<Uuid, DayBookWithLines>,
    day_book_dates: DashMap<NaiveDate, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_number(&self, kind: DocumentKind) -> i64 {
        let mut last = self.sequences.entry(kind).or_insert(0);
        *last += 1;
        *last
    }

    /// Move a unique key from `old` to `new`, failing if `new` is taken by
    /// another row.
    fn rekey<K>(index: &DashMap<K, Uuid>, old: &K, new: K, id: Uuid) -> bool
    where
        K: std::hash::Hash + Eq + Clone,
    {
        if *old == new {
            return true;
        }
        match index.entry(new) {
            Entry::Occupied(e) => *e.get() == id,
            Entry::Vacant(e) => {
                e.insert(id);
                index.remove(old);
                true
            }
        }
    }
}

fn document_lines(document_id: Uuid, input: &NewDocument) -> Vec<DocumentLine> {
    input
        .lines
        .iter()
        .enumerate()
        .map(|(position, line)| DocumentLine {
            line_id: Uuid::new_v4(),
            document_id,
            position: position as i32,
            descriptor: line.descriptor.clone(),
            quantity: line.quantity,
            quantity_area: line.quantity_area,
            rate: line.rate,
            amount: line.amount,
        })
        .collect()
}

fn day_book_lines(day_book_id: Uuid, input: &NewDayBook) -> Vec<DayBookLine> {
    let mut positions = HashMap::new();
    input
        .lines
        .iter()
        .map(|line| {
            let position = positions.entry(line.side).or_insert(0i32);
            let row = DayBookLine {
                line_id: Uuid::new_v4(),
                day_book_id,
                side: line.side.as_str().to_string(),
                position: *position,
                account_name: line.account_name.clone(),
                amount: line.amount,
                particulars: line.particulars.clone(),
            };
            *position += 1;
            row
        })
        .collect()
}

fn conflict_for_date(date: NaiveDate) -> AppError {
    AppError::Conflict(anyhow::anyhow!("A day book already exists for {}", date))
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_account(&self, input: &CreateAccount) -> Result<Account, AppError> {
        let account_id = Uuid::new_v4();
        match self.account_names.entry(name_key(&input.name)) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Account '{}' already exists",
                    input.name
                )));
            }
            Entry::Vacant(e) => {
                e.insert(account_id);
            }
        }

        let account = Account {
            account_id,
            name: input.name.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            opening_balance: input.opening_balance,
            created_utc: Utc::now(),
        };
        self.accounts.insert(account_id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.get(&account_id).map(|a| a.clone()))
    }

    async fn find_account_by_name(&self, name: &str) -> Result<Option<Account>, AppError> {
        let Some(account_id) = self.account_names.get(&name_key(name)).map(|id| *id) else {
            return Ok(None);
        };
        self.get_account(account_id).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|a| a.clone()).collect();
        accounts.sort_by_key(|a| name_key(&a.name));
        Ok(accounts)
    }

    async fn create_product(&self, input: &CreateProduct) -> Result<Product, AppError> {
        let product_id = Uuid::new_v4();
        match self.product_names.entry(name_key(&input.name)) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Product '{}' already exists",
                    input.name
                )));
            }
            Entry::Vacant(e) => {
                e.insert(product_id);
            }
        }

        let now = Utc::now();
        let product = Product {
            product_id,
            name: input.name.clone(),
            category: input.category.as_str().to_string(),
            unit: input.unit.as_str().to_string(),
            default_rate: input.default_rate,
            active: true,
            created_utc: now,
            updated_utc: now,
        };
        self.products.insert(product_id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.products.get(&product_id).map(|p| p.clone()))
    }

    async fn list_products(&self, filter: &ListProductsFilter) -> Result<Vec<Product>, AppError> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| {
                filter
                    .category
                    .map_or(true, |c| p.category == c.as_str())
                    && (!filter.active_only || p.active)
            })
            .map(|p| p.clone())
            .collect();
        products.sort_by_key(|p| name_key(&p.name));
        Ok(products)
    }

    async fn update_product(
        &self,
        product_id: Uuid,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, AppError> {
        let Some(mut product) = self.products.get_mut(&product_id) else {
            return Ok(None);
        };

        if let Some(name) = &input.name {
            let renamed = Self::rekey(
                &self.product_names,
                &name_key(&product.name),
                name_key(name),
                product_id,
            );
            if !renamed {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Product '{}' already exists",
                    name
                )));
            }
            product.name = name.clone();
        }
        if let Some(category) = input.category {
            product.category = category.as_str().to_string();
        }
        if let Some(unit) = input.unit {
            product.unit = unit.as_str().to_string();
        }
        if let Some(rate) = input.default_rate {
            product.default_rate = rate;
        }
        if let Some(active) = input.active {
            product.active = active;
        }
        product.updated_utc = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn create_document(&self, input: &NewDocument) -> Result<DocumentWithLines, AppError> {
        let document_id = Uuid::new_v4();
        let now = Utc::now();
        let document = Document {
            document_id,
            kind: input.kind.as_str().to_string(),
            document_number: self.next_number(input.kind),
            date: input.date,
            year: input.year.clone(),
            party_name: input.party_name.clone(),
            vehicle_number: input.vehicle_number.clone(),
            notes: input.notes.clone(),
            tax: input.tax,
            tempo: input.tempo,
            loading: input.loading,
            unloading: input.unloading,
            other_charges: input.other_charges,
            line_total: input.line_total,
            charges_total: input.charges_total,
            gross_total: input.gross_total,
            advance: input.advance,
            balance: input.balance,
            created_utc: now,
            updated_utc: now,
        };
        let stored = DocumentWithLines {
            lines: document_lines(document_id, input),
            document,
        };
        self.documents.insert(document_id, stored.clone());
        Ok(stored)
    }

    async fn get_document(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Option<DocumentWithLines>, AppError> {
        Ok(self
            .documents
            .get(&document_id)
            .filter(|d| d.document.kind == kind.as_str())
            .map(|d| d.clone()))
    }

    async fn list_documents(
        &self,
        kind: DocumentKind,
        filter: &ListDocumentsFilter,
    ) -> Result<Vec<Document>, AppError> {
        let party = filter.party.as_deref().map(name_key);
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .map(|d| d.document.clone())
            .filter(|d| d.kind == kind.as_str())
            .filter(|d| party.as_ref().map_or(true, |p| name_key(&d.party_name) == *p))
            .filter(|d| filter.from.map_or(true, |from| d.date >= from))
            .filter(|d| filter.to.map_or(true, |to| d.date <= to))
            .filter(|d| filter.year.as_ref().map_or(true, |y| d.year == *y))
            .collect();
        documents.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.document_number.cmp(&a.document_number))
        });

        Ok(documents
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect())
    }

    async fn update_document(
        &self,
        document_id: Uuid,
        input: &NewDocument,
    ) -> Result<Option<DocumentWithLines>, AppError> {
        let Some(mut stored) = self.documents.get_mut(&document_id) else {
            return Ok(None);
        };
        if stored.document.kind != input.kind.as_str() {
            return Ok(None);
        }

        let document = &mut stored.document;
        document.date = input.date;
        document.year = input.year.clone();
        document.party_name = input.party_name.clone();
        document.vehicle_number = input.vehicle_number.clone();
        document.notes = input.notes.clone();
        document.tax = input.tax;
        document.tempo = input.tempo;
        document.loading = input.loading;
        document.unloading = input.unloading;
        document.other_charges = input.other_charges;
        document.line_total = input.line_total;
        document.charges_total = input.charges_total;
        document.gross_total = input.gross_total;
        document.advance = input.advance;
        document.balance = input.balance;
        document.updated_utc = Utc::now();
        stored.lines = document_lines(document_id, input);

        Ok(Some(stored.clone()))
    }

    async fn party_documents(
        &self,
        party_name: &str,
        until: NaiveDate,
    ) -> Result<Vec<Document>, AppError> {
        let party = name_key(party_name);
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .map(|d| d.document.clone())
            .filter(|d| {
                matches!(
                    d.parsed_kind(),
                    Some(DocumentKind::Sale | DocumentKind::Purchase)
                ) && name_key(&d.party_name) == party
                    && d.date <= until
            })
            .collect();
        documents.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_utc.cmp(&b.created_utc)));
        Ok(documents)
    }

    async fn create_day_book(&self, input: &NewDayBook) -> Result<DayBookWithLines, AppError> {
        let day_book_id = Uuid::new_v4();
        match self.day_book_dates.entry(input.date) {
            Entry::Occupied(_) => return Err(conflict_for_date(input.date)),
            Entry::Vacant(e) => {
                e.insert(day_book_id);
            }
        }

        let now = Utc::now();
        let stored = DayBookWithLines {
            day_book: DayBook {
                day_book_id,
                date: input.date,
                year: input.year.clone(),
                narration: input.narration.clone(),
                received_total: input.received_total,
                payment_total: input.payment_total,
                balance: input.balance,
                created_utc: now,
                updated_utc: now,
            },
            lines: day_book_lines(day_book_id, input),
        };
        self.day_books.insert(day_book_id, stored.clone());
        Ok(stored)
    }

    async fn get_day_book(
        &self,
        day_book_id: Uuid,
    ) -> Result<Option<DayBookWithLines>, AppError> {
        Ok(self.day_books.get(&day_book_id).map(|b| b.clone()))
    }

    async fn list_day_books(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DayBook>, AppError> {
        let mut books: Vec<DayBook> = self
            .day_books
            .iter()
            .map(|b| b.day_book.clone())
            .filter(|b| from.map_or(true, |from| b.date >= from))
            .filter(|b| to.map_or(true, |to| b.date <= to))
            .collect();
        books.sort_by_key(|b| b.date);
        Ok(books)
    }

    async fn update_day_book(
        &self,
        day_book_id: Uuid,
        input: &NewDayBook,
    ) -> Result<Option<DayBookWithLines>, AppError> {
        let Some(mut stored) = self.day_books.get_mut(&day_book_id) else {
            return Ok(None);
        };

        if !Self::rekey(
            &self.day_book_dates,
            &stored.day_book.date,
            input.date,
            day_book_id,
        ) {
            return Err(conflict_for_date(input.date));
        }

        let book = &mut stored.day_book;
        book.date = input.date;
        book.year = input.year.clone();
        book.narration = input.narration.clone();
        book.received_total = input.received_total;
        book.payment_total = input.payment_total;
        book.balance = input.balance;
        book.updated_utc = Utc::now();
        stored.lines = day_book_lines(day_book_id, input);

        Ok(Some(stored.clone()))
    }

    async fn account_cash_lines(
        &self,
        account_name: &str,
        until: NaiveDate,
    ) -> Result<Vec<AccountCashLine>, AppError> {
        let account = name_key(account_name);
        let mut lines: Vec<AccountCashLine> = self
            .day_books
            .iter()
            .filter(|b| b.day_book.date <= until)
            .flat_map(|b| {
                b.lines
                    .iter()
                    .filter(|l| name_key(&l.account_name) == account)
                    .map(|l| AccountCashLine {
                        day_book_id: b.day_book.day_book_id,
                        date: b.day_book.date,
                        created_utc: b.day_book.created_utc,
                        side: l.side.clone(),
                        amount: l.amount,
                        particulars: l.particulars.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        lines.sort_by_key(|l| l.date);
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewDayBookLine, ProductCategory, ProductUnit};
    use crate::models::totals::CashSide;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day_book(date: NaiveDate) -> NewDayBook {
        NewDayBook {
            date,
            year: "2024-25".into(),
            narration: None,
            received_total: dec!(100),
            payment_total: Decimal::ZERO,
            balance: dec!(100),
            lines: vec![NewDayBookLine {
                side: CashSide::Received,
                account_name: "Ravi Traders".into(),
                amount: dec!(100),
                particulars: None,
            }],
        }
    }

    #[tokio::test]
    async fn account_names_are_unique_case_insensitively() {
        let store = MemoryStore::new();
        let input = CreateAccount {
            name: "Ravi Traders".into(),
            phone: None,
            address: None,
            opening_balance: Decimal::ZERO,
        };
        store.create_account(&input).await.unwrap();

        let dup = CreateAccount {
            name: " ravi traders".into(),
            ..input
        };
        let err = store.create_account(&dup).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let found = store.find_account_by_name("RAVI TRADERS").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn renaming_product_onto_existing_name_conflicts() {
        let store = MemoryStore::new();
        let create = |name: &str| CreateProduct {
            name: name.into(),
            category: ProductCategory::Granite,
            unit: ProductUnit::Sqft,
            default_rate: dec!(80),
        };
        store.create_product(&create("Black Galaxy")).await.unwrap();
        let tan = store.create_product(&create("Tan Brown")).await.unwrap();

        let update = UpdateProduct {
            name: Some("black galaxy".into()),
            ..Default::default()
        };
        let err = store.update_product(tan.product_id, &update).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn day_book_dates_are_unique() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        store.create_day_book(&day_book(date)).await.unwrap();

        let err = store.create_day_book(&day_book(date)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn moving_day_book_to_free_date_releases_old_date() {
        let store = MemoryStore::new();
        let june_1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let june_2 = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let created = store.create_day_book(&day_book(june_1)).await.unwrap();

        store
            .update_day_book(created.day_book.day_book_id, &day_book(june_2))
            .await
            .unwrap()
            .unwrap();

        assert!(store.create_day_book(&day_book(june_1)).await.is_ok());
    }
}
