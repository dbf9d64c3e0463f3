//! EcoGest back-office client
//!
//! Typed access to the EcoGest REST backend: customers, suppliers,
//! products, purchases, sales, employees, ledger entries, expenses and
//! accounts payable/receivable. Reads go through a coalescing query cache
//! that mutations invalidate; tables are driven by filter-bar and
//! pagination state.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod filters;
pub mod http;
pub mod kpi;
pub mod models;
pub mod notify;
pub mod reports;
pub mod resources;
pub mod search;
pub mod views;

pub use client::EcoGest;
pub use errors::{ClientError, Result};
