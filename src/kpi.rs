//! Dashboard figures aggregated across every page of a listing.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::Result;
use crate::models::{
    BillPayment, Entry, EntryKind, Expense, ListParams, Page, Payable, Purchase, Receivable, Sale,
};
use crate::resources::{Resource, ResourceApi};

/// Page size used when walking a listing to the end.
pub const KPI_PAGE_SIZE: u64 = 100;

/// Anything that serves a listing one page at a time.
#[async_trait]
pub trait PageSource<R>: Send + Sync {
    async fn fetch_page(&self, params: &ListParams) -> Result<Page<R>>;
}

#[async_trait]
impl<R: Resource> PageSource<R> for ResourceApi<R> {
    async fn fetch_page(&self, params: &ListParams) -> Result<Page<R>> {
        self.list(params).await
    }
}

/// Every record matching `template`'s filters, starting at its `skip` and
/// advancing by `take` until `totalItems` is reached or a page is empty.
pub async fn collect_all<R, S>(source: &S, template: &ListParams) -> Result<Vec<R>>
where
    R: Send,
    S: PageSource<R> + ?Sized,
{
    let mut params = template.clone();
    params.take = params.take.max(1);
    let mut records = Vec::new();
    loop {
        let page = source.fetch_page(&params).await?;
        let total = page.total_items();
        if page.data.is_empty() {
            break;
        }
        records.extend(page.data);
        if params.skip.saturating_add(params.take) >= total {
            break;
        }
        params = params.next();
    }
    debug!(count = records.len(), "collected");
    Ok(records)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub sales_total: Decimal,
    pub purchases_total: Decimal,
    pub payables_open: Decimal,
    pub receivables_open: Decimal,
    pub overdue_payables: usize,
    pub overdue_receivables: usize,
    pub income: Decimal,
    pub entry_expenses: Decimal,
    pub expenses_total: Decimal,
    /// Income minus expense entries.
    pub balance: Decimal,
}

/// Raw records a summary is computed from.
#[derive(Debug, Clone, Default)]
pub struct KpiInputs {
    pub sales: Vec<Sale>,
    pub purchases: Vec<Purchase>,
    pub payables: Vec<Payable>,
    pub receivables: Vec<Receivable>,
    pub entries: Vec<Entry>,
    pub expenses: Vec<Expense>,
}

impl KpiSummary {
    pub fn compute(inputs: &KpiInputs, today: NaiveDate) -> Self {
        let open = |bills: &[&dyn BillPayment]| -> Decimal {
            bills
                .iter()
                .filter(|b| b.bill_status().is_outstanding())
                .map(|b| b.remaining())
                .sum()
        };
        let payables: Vec<&dyn BillPayment> =
            inputs.payables.iter().map(|b| b as &dyn BillPayment).collect();
        let receivables: Vec<&dyn BillPayment> =
            inputs.receivables.iter().map(|b| b as &dyn BillPayment).collect();

        let sum_kind = |kind: EntryKind| -> Decimal {
            inputs
                .entries
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| e.value)
                .sum()
        };
        let income = sum_kind(EntryKind::Income);
        let entry_expenses = sum_kind(EntryKind::Expense);

        Self {
            sales_total: inputs.sales.iter().map(Sale::effective_total).sum(),
            purchases_total: inputs.purchases.iter().map(Purchase::effective_total).sum(),
            payables_open: open(&payables),
            receivables_open: open(&receivables),
            overdue_payables: payables.iter().filter(|b| b.is_overdue_on(today)).count(),
            overdue_receivables: receivables.iter().filter(|b| b.is_overdue_on(today)).count(),
            income,
            entry_expenses,
            expenses_total: inputs.expenses.iter().map(|e| e.value).sum(),
            balance: income - entry_expenses,
        }
    }
}

/// Loads every listing the dashboard needs.
#[derive(Clone)]
pub struct Dashboard {
    pub sales: ResourceApi<Sale>,
    pub purchases: ResourceApi<Purchase>,
    pub payables: ResourceApi<Payable>,
    pub receivables: ResourceApi<Receivable>,
    pub entries: ResourceApi<Entry>,
    pub expenses: ResourceApi<Expense>,
    pub filters: ListParams,
}

impl Dashboard {
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<KpiSummary> {
        let inputs = self.load_inputs().await?;
        Ok(KpiSummary::compute(&inputs, Local::now().date_naive()))
    }

    pub async fn load_inputs(&self) -> Result<KpiInputs> {
        let filters = &self.filters;
        let (sales, purchases, payables, receivables, entries, expenses) = tokio::try_join!(
            collect_all(&self.sales, filters),
            collect_all(&self.purchases, filters),
            collect_all(&self.payables, filters),
            collect_all(&self.receivables, filters),
            collect_all(&self.entries, filters),
            collect_all(&self.expenses, filters),
        )?;
        Ok(KpiInputs {
            sales,
            purchases,
            payables,
            receivables,
            entries,
            expenses,
        })
    }
}
