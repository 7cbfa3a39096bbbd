//! erp-service: estimates, sales, purchases, day book and ledger reports for
//! a flooring and tiles trading business.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
