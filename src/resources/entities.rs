use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::filters::EntityType;
use crate::models::{
    Customer, EntityId, Employee, Entry, Expense, NewCustomer, NewEmployee, NewEntry, NewExpense,
    NewPayable, NewProduct, NewPurchase, NewReceivable, NewSale, NewSupplier, Payable, Product,
    Purchase, PurchaseUpdate, Receivable, Sale, SaleUpdate, Supplier,
};

/// A backend-managed entity.
pub trait Resource: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Root segment of the entity's cache keys.
    const NAME: &'static str;
    /// Endpoint path.
    const PATH: &'static str;

    /// Filter table of the entity's listing, if it has one.
    const FILTERS: Option<EntityType>;

    type Create: Serialize + Validate + Send + Sync;
    type Update: Serialize + Validate + Send + Sync;

    fn id(&self) -> EntityId;

    /// Short human-readable description for listings.
    fn label(&self) -> String;
}

macro_rules! resource {
    ($ty:ty, $name:literal, $path:literal, $filters:expr, $create:ty, $update:ty, |$this:ident| $label:expr) => {
        impl Resource for $ty {
            const NAME: &'static str = $name;
            const PATH: &'static str = $path;
            const FILTERS: Option<EntityType> = $filters;

            type Create = $create;
            type Update = $update;

            fn id(&self) -> EntityId {
                self.id
            }

            fn label(&self) -> String {
                let $this = self;
                $label
            }
        }
    };
}

fn code_or_id(code: Option<&str>, id: EntityId) -> String {
    match code {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => format!("#{}", id),
    }
}

resource!(Customer, "customers", "/customers", None, NewCustomer, NewCustomer, |c| {
    c.name.clone()
});
resource!(Supplier, "suppliers", "/suppliers", None, NewSupplier, NewSupplier, |s| {
    s.name.clone()
});
resource!(Product, "products", "/products", None, NewProduct, NewProduct, |p| {
    p.name.clone()
});
resource!(Employee, "employees", "/employees", None, NewEmployee, NewEmployee, |e| {
    e.name.clone()
});
resource!(
    Purchase,
    "purchases",
    "/purchases",
    Some(EntityType::Purchase),
    NewPurchase,
    PurchaseUpdate,
    |p| format!("{} {}", code_or_id(p.code.as_deref(), p.id), p.supplier.name)
);
resource!(
    Sale,
    "sales",
    "/sales",
    Some(EntityType::Sale),
    NewSale,
    SaleUpdate,
    |s| format!("{} {}", code_or_id(s.code.as_deref(), s.id), s.customer.name)
);
resource!(Entry, "entries", "/entry", Some(EntityType::Entry), NewEntry, NewEntry, |e| {
    e.description.clone()
});
resource!(
    Expense,
    "expenses",
    "/expenses",
    Some(EntityType::Expense),
    NewExpense,
    NewExpense,
    |e| e.description.clone()
);
resource!(
    Payable,
    "payables",
    "/payables",
    Some(EntityType::Payable),
    NewPayable,
    NewPayable,
    |p| p.description.clone()
);
resource!(
    Receivable,
    "receivables",
    "/receivables",
    Some(EntityType::Receivable),
    NewReceivable,
    NewReceivable,
    |r| r.description.clone()
);
