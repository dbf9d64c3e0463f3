//! Backend records and the payloads used to create or change them.
//!
//! Every record is a cache of what the backend last returned: identities
//! are assigned server-side and status transitions are validated there, so
//! nothing here enforces relational integrity.

pub mod bill;
pub mod customer;
pub mod employee;
pub mod entry;
pub mod page;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod status;
pub mod supplier;
pub mod validation;

pub use bill::{BillPayment, NewPayable, NewReceivable, PartialPayment, Payable, Receivable};
pub use customer::{Customer, NewCustomer};
pub use employee::{Employee, NewEmployee};
pub use entry::{Entry, EntryKind, Expense, NewEntry, NewExpense};
pub use page::{ListParams, Page, PageMeta, Period};
pub use product::{NewProduct, Product};
pub use purchase::{NewPurchase, Purchase, PurchaseUpdate};
pub use sale::{NewSale, Sale, SaleUpdate};
pub use status::{BillStatus, OrderStatus};
pub use supplier::{NewSupplier, Supplier};

/// Backend-assigned numeric identity.
pub type EntityId = i64;
