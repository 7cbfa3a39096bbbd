//! Ledger account (party) model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A party the business trades or settles cash with. Its name is the key
/// that day-book lines and document parties refer to.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub account_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Positive when the party owed the business at the start of the books.
    pub opening_balance: Decimal,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a new account.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Decimal,
}

/// Case-insensitive key used for account-name matching.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
