//! PostgreSQL store for erp-service.

use crate::models::{
    Account, AccountCashLine, CreateAccount, CreateProduct, DayBook, DayBookLine,
    DayBookWithLines, Document, DocumentKind, DocumentLine, DocumentWithLines,
    ListDocumentsFilter, ListProductsFilter, NewDayBook, NewDayBookLine, NewDocument,
    NewDocumentLine, Product, UpdateProduct,
};
use crate::services::metrics::QueryTimer;
use crate::services::store::Store;
use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if is_data_exception(&e) {
            AppError::BadRequest(anyhow::anyhow!("{}: {}", context, e))
        } else {
            AppError::DatabaseError(anyhow::anyhow!("{}: {}", context, e))
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// SQLSTATE class 22: the value does not fit its column (numeric overflow,
/// over-long text).
fn is_data_exception(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db_err) if db_err.code().is_some_and(|code| code.starts_with("22"))
    )
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "erp-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn document_lines(&self, document_id: Uuid) -> Result<Vec<DocumentLine>, AppError> {
        sqlx::query_as::<_, DocumentLine>(
            r#"
            SELECT line_id, document_id, position, descriptor, quantity, quantity_area, rate, amount
            FROM document_lines
            WHERE document_id = $1
            ORDER BY position
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to get document lines"))
    }

    async fn day_book_lines(&self, day_book_id: Uuid) -> Result<Vec<DayBookLine>, AppError> {
        sqlx::query_as::<_, DayBookLine>(
            r#"
            SELECT line_id, day_book_id, side, position, account_name, amount, particulars
            FROM day_book_lines
            WHERE day_book_id = $1
            ORDER BY CASE side WHEN 'received' THEN 0 ELSE 1 END, position
            "#,
        )
        .bind(day_book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to get day book lines"))
    }
}

async fn insert_document_lines(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    lines: &[NewDocumentLine],
) -> Result<Vec<DocumentLine>, AppError> {
    let mut inserted = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let row = sqlx::query_as::<_, DocumentLine>(
            r#"
            INSERT INTO document_lines (line_id, document_id, position, descriptor, quantity, quantity_area, rate, amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING line_id, document_id, position, descriptor, quantity, quantity_area, rate, amount
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(document_id)
        .bind(position as i32)
        .bind(&line.descriptor)
        .bind(line.quantity)
        .bind(line.quantity_area)
        .bind(line.rate)
        .bind(line.amount)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error("Failed to insert document line"))?;
        inserted.push(row);
    }
    Ok(inserted)
}

async fn insert_day_book_lines(
    tx: &mut Transaction<'_, Postgres>,
    day_book_id: Uuid,
    lines: &[NewDayBookLine],
) -> Result<Vec<DayBookLine>, AppError> {
    let mut inserted = Vec::with_capacity(lines.len());
    let mut positions = std::collections::HashMap::new();
    for line in lines {
        let position = positions.entry(line.side).or_insert(0i32);
        let row = sqlx::query_as::<_, DayBookLine>(
            r#"
            INSERT INTO day_book_lines (line_id, day_book_id, side, position, account_name, amount, particulars)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING line_id, day_book_id, side, position, account_name, amount, particulars
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(day_book_id)
        .bind(line.side.as_str())
        .bind(*position)
        .bind(&line.account_name)
        .bind(line.amount)
        .bind(&line.particulars)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_error("Failed to insert day book line"))?;
        *position += 1;
        inserted.push(row);
    }
    Ok(inserted)
}

#[async_trait]
impl Store for Database {
    /// Check database health.
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Account Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_account(&self, input: &CreateAccount) -> Result<Account, AppError> {
        let _timer = QueryTimer::start("create_account");

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (account_id, name, phone, address, opening_balance)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING account_id, name, phone, address, opening_balance, created_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.opening_balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(anyhow::anyhow!(
                    "Account '{}' already exists",
                    input.name
                ))
            } else {
                db_error("Failed to create account")(e)
            }
        })?;

        info!(account_id = %account.account_id, "Account created");

        Ok(account)
    }

    #[instrument(skip(self))]
    async fn get_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError> {
        let _timer = QueryTimer::start("get_account");

        sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, name, phone, address, opening_balance, created_utc
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get account"))
    }

    #[instrument(skip(self))]
    async fn find_account_by_name(&self, name: &str) -> Result<Option<Account>, AppError> {
        let _timer = QueryTimer::start("find_account_by_name");

        sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, name, phone, address, opening_balance, created_utc
            FROM accounts
            WHERE LOWER(name) = LOWER($1)
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find account"))
    }

    #[instrument(skip(self))]
    async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        let _timer = QueryTimer::start("list_accounts");

        sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, name, phone, address, opening_balance, created_utc
            FROM accounts
            ORDER BY LOWER(name)
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list accounts"))
    }

    // -------------------------------------------------------------------------
    // Product Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_product(&self, input: &CreateProduct) -> Result<Product, AppError> {
        let _timer = QueryTimer::start("create_product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (product_id, name, category, unit, default_rate, active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING product_id, name, category, unit, default_rate, active, created_utc, updated_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.category.as_str())
        .bind(input.unit.as_str())
        .bind(input.default_rate)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(anyhow::anyhow!("Product '{}' already exists", input.name))
            } else {
                db_error("Failed to create product")(e)
            }
        })?;

        info!(product_id = %product.product_id, "Product created");

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: Uuid) -> Result<Option<Product>, AppError> {
        let _timer = QueryTimer::start("get_product");

        sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, name, category, unit, default_rate, active, created_utc, updated_utc
            FROM products
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get product"))
    }

    #[instrument(skip(self))]
    async fn list_products(&self, filter: &ListProductsFilter) -> Result<Vec<Product>, AppError> {
        let _timer = QueryTimer::start("list_products");

        sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, name, category, unit, default_rate, active, created_utc, updated_utc
            FROM products
            WHERE ($1::varchar IS NULL OR category = $1)
              AND (NOT $2 OR active)
            ORDER BY LOWER(name)
            "#,
        )
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list products"))
    }

    #[instrument(skip(self, input))]
    async fn update_product(
        &self,
        product_id: Uuid,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, AppError> {
        let _timer = QueryTimer::start("update_product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                unit = COALESCE($4, unit),
                default_rate = COALESCE($5, default_rate),
                active = COALESCE($6, active),
                updated_utc = NOW()
            WHERE product_id = $1
            RETURNING product_id, name, category, unit, default_rate, active, created_utc, updated_utc
            "#,
        )
        .bind(product_id)
        .bind(&input.name)
        .bind(input.category.map(|c| c.as_str()))
        .bind(input.unit.map(|u| u.as_str()))
        .bind(input.default_rate)
        .bind(input.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(anyhow::anyhow!("Product name already exists"))
            } else {
                db_error("Failed to update product")(e)
            }
        })?;

        if let Some(ref p) = product {
            info!(product_id = %p.product_id, "Product updated");
        }

        Ok(product)
    }

    // -------------------------------------------------------------------------
    // Document Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(kind = %input.kind, line_count = input.lines.len()))]
    async fn create_document(&self, input: &NewDocument) -> Result<DocumentWithLines, AppError> {
        let _timer = QueryTimer::start("create_document");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let document_number: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO document_sequences (kind, last_number)
            VALUES ($1, 1)
            ON CONFLICT (kind) DO UPDATE SET last_number = document_sequences.last_number + 1
            RETURNING last_number
            "#,
        )
        .bind(input.kind.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to allocate document number"))?;

        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (
                document_id, kind, document_number, date, year, party_name, vehicle_number, notes,
                tax, tempo, loading, unloading, other_charges,
                line_total, charges_total, gross_total, advance, balance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING document_id, kind, document_number, date, year, party_name, vehicle_number, notes,
                tax, tempo, loading, unloading, other_charges,
                line_total, charges_total, gross_total, advance, balance, created_utc, updated_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.kind.as_str())
        .bind(document_number)
        .bind(input.date)
        .bind(&input.year)
        .bind(&input.party_name)
        .bind(&input.vehicle_number)
        .bind(&input.notes)
        .bind(input.tax)
        .bind(input.tempo)
        .bind(input.loading)
        .bind(input.unloading)
        .bind(input.other_charges)
        .bind(input.line_total)
        .bind(input.charges_total)
        .bind(input.gross_total)
        .bind(input.advance)
        .bind(input.balance)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to insert document"))?;

        let lines = insert_document_lines(&mut tx, document.document_id, &input.lines).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!(
            document_id = %document.document_id,
            document_number = document.document_number,
            gross_total = %document.gross_total,
            "Document created"
        );

        Ok(DocumentWithLines { document, lines })
    }

    #[instrument(skip(self))]
    async fn get_document(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Option<DocumentWithLines>, AppError> {
        let _timer = QueryTimer::start("get_document");

        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT document_id, kind, document_number, date, year, party_name, vehicle_number, notes,
                tax, tempo, loading, unloading, other_charges,
                line_total, charges_total, gross_total, advance, balance, created_utc, updated_utc
            FROM documents
            WHERE document_id = $1 AND kind = $2
            "#,
        )
        .bind(document_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get document"))?;

        match document {
            Some(document) => {
                let lines = self.document_lines(document.document_id).await?;
                Ok(Some(DocumentWithLines { document, lines }))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter))]
    async fn list_documents(
        &self,
        kind: DocumentKind,
        filter: &ListDocumentsFilter,
    ) -> Result<Vec<Document>, AppError> {
        let _timer = QueryTimer::start("list_documents");

        sqlx::query_as::<_, Document>(
            r#"
            SELECT document_id, kind, document_number, date, year, party_name, vehicle_number, notes,
                tax, tempo, loading, unloading, other_charges,
                line_total, charges_total, gross_total, advance, balance, created_utc, updated_utc
            FROM documents
            WHERE kind = $1
              AND ($2::varchar IS NULL OR LOWER(party_name) = LOWER($2))
              AND ($3::date IS NULL OR date >= $3)
              AND ($4::date IS NULL OR date <= $4)
              AND ($5::varchar IS NULL OR year = $5)
            ORDER BY date DESC, document_number DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(kind.as_str())
        .bind(filter.party.as_deref().map(str::trim))
        .bind(filter.from)
        .bind(filter.to)
        .bind(&filter.year)
        .bind(filter.limit())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list documents"))
    }

    #[instrument(skip(self, input), fields(kind = %input.kind, line_count = input.lines.len()))]
    async fn update_document(
        &self,
        document_id: Uuid,
        input: &NewDocument,
    ) -> Result<Option<DocumentWithLines>, AppError> {
        let _timer = QueryTimer::start("update_document");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents SET
                date = $3, year = $4, party_name = $5, vehicle_number = $6, notes = $7,
                tax = $8, tempo = $9, loading = $10, unloading = $11, other_charges = $12,
                line_total = $13, charges_total = $14, gross_total = $15, advance = $16, balance = $17,
                updated_utc = NOW()
            WHERE document_id = $1 AND kind = $2
            RETURNING document_id, kind, document_number, date, year, party_name, vehicle_number, notes,
                tax, tempo, loading, unloading, other_charges,
                line_total, charges_total, gross_total, advance, balance, created_utc, updated_utc
            "#,
        )
        .bind(document_id)
        .bind(input.kind.as_str())
        .bind(input.date)
        .bind(&input.year)
        .bind(&input.party_name)
        .bind(&input.vehicle_number)
        .bind(&input.notes)
        .bind(input.tax)
        .bind(input.tempo)
        .bind(input.loading)
        .bind(input.unloading)
        .bind(input.other_charges)
        .bind(input.line_total)
        .bind(input.charges_total)
        .bind(input.gross_total)
        .bind(input.advance)
        .bind(input.balance)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to update document"))?;

        let Some(document) = document else {
            tx.rollback().await.ok();
            return Ok(None);
        };

        sqlx::query("DELETE FROM document_lines WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear document lines"))?;

        let lines = insert_document_lines(&mut tx, document_id, &input.lines).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!(
            document_id = %document.document_id,
            gross_total = %document.gross_total,
            "Document updated"
        );

        Ok(Some(DocumentWithLines { document, lines }))
    }

    #[instrument(skip(self))]
    async fn party_documents(
        &self,
        party_name: &str,
        until: NaiveDate,
    ) -> Result<Vec<Document>, AppError> {
        let _timer = QueryTimer::start("party_documents");

        sqlx::query_as::<_, Document>(
            r#"
            SELECT document_id, kind, document_number, date, year, party_name, vehicle_number, notes,
                tax, tempo, loading, unloading, other_charges,
                line_total, charges_total, gross_total, advance, balance, created_utc, updated_utc
            FROM documents
            WHERE LOWER(party_name) = LOWER($1)
              AND kind IN ('sale', 'purchase')
              AND date <= $2
            ORDER BY date, created_utc
            "#,
        )
        .bind(party_name.trim())
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to get party documents"))
    }

    // -------------------------------------------------------------------------
    // Day Book Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(date = %input.date, line_count = input.lines.len()))]
    async fn create_day_book(&self, input: &NewDayBook) -> Result<DayBookWithLines, AppError> {
        let _timer = QueryTimer::start("create_day_book");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let day_book = sqlx::query_as::<_, DayBook>(
            r#"
            INSERT INTO day_books (day_book_id, date, year, narration, received_total, payment_total, balance)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING day_book_id, date, year, narration, received_total, payment_total, balance, created_utc, updated_utc
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.date)
        .bind(&input.year)
        .bind(&input.narration)
        .bind(input.received_total)
        .bind(input.payment_total)
        .bind(input.balance)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(anyhow::anyhow!(
                    "A day book already exists for {}",
                    input.date
                ))
            } else {
                db_error("Failed to insert day book")(e)
            }
        })?;

        let lines = insert_day_book_lines(&mut tx, day_book.day_book_id, &input.lines).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!(
            day_book_id = %day_book.day_book_id,
            balance = %day_book.balance,
            "Day book created"
        );

        Ok(DayBookWithLines { day_book, lines })
    }

    #[instrument(skip(self))]
    async fn get_day_book(
        &self,
        day_book_id: Uuid,
    ) -> Result<Option<DayBookWithLines>, AppError> {
        let _timer = QueryTimer::start("get_day_book");

        let day_book = sqlx::query_as::<_, DayBook>(
            r#"
            SELECT day_book_id, date, year, narration, received_total, payment_total, balance, created_utc, updated_utc
            FROM day_books
            WHERE day_book_id = $1
            "#,
        )
        .bind(day_book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get day book"))?;

        match day_book {
            Some(day_book) => {
                let lines = self.day_book_lines(day_book.day_book_id).await?;
                Ok(Some(DayBookWithLines { day_book, lines }))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn list_day_books(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DayBook>, AppError> {
        let _timer = QueryTimer::start("list_day_books");

        sqlx::query_as::<_, DayBook>(
            r#"
            SELECT day_book_id, date, year, narration, received_total, payment_total, balance, created_utc, updated_utc
            FROM day_books
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
            ORDER BY date
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list day books"))
    }

    #[instrument(skip(self, input), fields(date = %input.date, line_count = input.lines.len()))]
    async fn update_day_book(
        &self,
        day_book_id: Uuid,
        input: &NewDayBook,
    ) -> Result<Option<DayBookWithLines>, AppError> {
        let _timer = QueryTimer::start("update_day_book");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let day_book = sqlx::query_as::<_, DayBook>(
            r#"
            UPDATE day_books SET
                date = $2, year = $3, narration = $4,
                received_total = $5, payment_total = $6, balance = $7,
                updated_utc = NOW()
            WHERE day_book_id = $1
            RETURNING day_book_id, date, year, narration, received_total, payment_total, balance, created_utc, updated_utc
            "#,
        )
        .bind(day_book_id)
        .bind(input.date)
        .bind(&input.year)
        .bind(&input.narration)
        .bind(input.received_total)
        .bind(input.payment_total)
        .bind(input.balance)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(anyhow::anyhow!(
                    "A day book already exists for {}",
                    input.date
                ))
            } else {
                db_error("Failed to update day book")(e)
            }
        })?;

        let Some(day_book) = day_book else {
            tx.rollback().await.ok();
            return Ok(None);
        };

        sqlx::query("DELETE FROM day_book_lines WHERE day_book_id = $1")
            .bind(day_book_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear day book lines"))?;

        let lines = insert_day_book_lines(&mut tx, day_book_id, &input.lines).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!(
            day_book_id = %day_book.day_book_id,
            balance = %day_book.balance,
            "Day book updated"
        );

        Ok(Some(DayBookWithLines { day_book, lines }))
    }

    #[instrument(skip(self))]
    async fn account_cash_lines(
        &self,
        account_name: &str,
        until: NaiveDate,
    ) -> Result<Vec<AccountCashLine>, AppError> {
        let _timer = QueryTimer::start("account_cash_lines");

        sqlx::query_as::<_, AccountCashLine>(
            r#"
            SELECT b.day_book_id, b.date, b.created_utc, l.side, l.amount, l.particulars
            FROM day_book_lines l
            JOIN day_books b ON b.day_book_id = l.day_book_id
            WHERE LOWER(l.account_name) = LOWER($1)
              AND b.date <= $2
            ORDER BY b.date, l.side, l.position
            "#,
        )
        .bind(account_name.trim())
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to get account cash lines"))
    }
}
