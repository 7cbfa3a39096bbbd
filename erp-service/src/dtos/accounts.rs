use crate::dtos::numeric;
use crate::models::totals::{parse_amount, round_money};
use crate::models::{Account, CreateAccount};
use crate::utils::not_blank;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,

    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,

    pub address: Option<String>,

    #[serde(default, deserialize_with = "numeric::lenient")]
    pub opening_balance: String,
}

impl CreateAccountRequest {
    pub fn into_input(self) -> CreateAccount {
        CreateAccount {
            name: self.name.trim().to_string(),
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            address: self.address.filter(|a| !a.trim().is_empty()),
            opening_balance: round_money(parse_amount(&self.opening_balance)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Decimal,
    pub created_utc: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id.to_string(),
            name: account.name,
            phone: account.phone,
            address: account.address,
            opening_balance: account.opening_balance,
            created_utc: account.created_utc.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountResponse>,
}
