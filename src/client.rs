use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::auth::{AuthApi, FileTokenStore, MemoryTokenStore, TokenStore};
use crate::cache::QueryCache;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::http::HttpClient;
use crate::kpi::{Dashboard, KPI_PAGE_SIZE};
use crate::models::{
    Customer, Employee, Entry, Expense, ListParams, Payable, Product, Purchase, Receivable, Sale,
    Supplier,
};
use crate::notify::{Notifications, Notifier};
use crate::resources::{Resource, ResourceApi};
use crate::search::DebouncedSearch;
use crate::views::ListView;

/// Entry point: one backend connection, one cache, one notification
/// channel shared by every resource API handed out.
#[derive(Clone)]
pub struct EcoGest {
    config: Arc<AppConfig>,
    http: Arc<HttpClient>,
    cache: QueryCache,
    notifier: Notifier,
}

impl EcoGest {
    pub fn new(config: AppConfig, tokens: Arc<dyn TokenStore>) -> Result<(Self, Notifications)> {
        let http = HttpClient::new(&config, tokens)?;
        Ok(Self::with_http(config, http))
    }

    /// Token kept in the configured session file, or in memory when no
    /// home directory is known.
    pub fn from_config(config: AppConfig) -> Result<(Self, Notifications)> {
        let tokens: Arc<dyn TokenStore> = match config.token_path() {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::default()),
        };
        Self::new(config, tokens)
    }

    pub fn with_http(config: AppConfig, http: HttpClient) -> (Self, Notifications) {
        let (notifier, notifications) = Notifier::channel();
        let cache = QueryCache::new(&config.cache);
        info!(base_url = %http.base_url(), "client ready");
        (
            Self {
                config: Arc::new(config),
                http: Arc::new(http),
                cache,
                notifier,
            },
            notifications,
        )
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(Arc::clone(&self.http))
    }

    pub fn resource<R: Resource>(&self) -> ResourceApi<R> {
        ResourceApi::new(
            Arc::clone(&self.http),
            self.cache.clone(),
            self.config.search_min_chars,
        )
    }

    pub fn customers(&self) -> ResourceApi<Customer> {
        self.resource()
    }

    pub fn suppliers(&self) -> ResourceApi<Supplier> {
        self.resource()
    }

    pub fn products(&self) -> ResourceApi<Product> {
        self.resource()
    }

    pub fn purchases(&self) -> ResourceApi<Purchase> {
        self.resource()
    }

    pub fn sales(&self) -> ResourceApi<Sale> {
        self.resource()
    }

    pub fn employees(&self) -> ResourceApi<Employee> {
        self.resource()
    }

    pub fn entries(&self) -> ResourceApi<Entry> {
        self.resource()
    }

    pub fn expenses(&self) -> ResourceApi<Expense> {
        self.resource()
    }

    pub fn payables(&self) -> ResourceApi<Payable> {
        self.resource()
    }

    pub fn receivables(&self) -> ResourceApi<Receivable> {
        self.resource()
    }

    /// Table state for a resource, paged by the configured row count.
    pub fn list_view<R: Resource>(&self) -> ListView<R> {
        ListView::new(
            self.resource(),
            u64::from(self.config.rows_per_page),
            self.notifier.clone(),
        )
    }

    /// Debounced name search delivering results to `results`.
    pub fn name_search<R: Resource>(
        &self,
        results: mpsc::UnboundedSender<Result<Vec<R>>>,
    ) -> DebouncedSearch {
        DebouncedSearch::for_resource(self.resource(), self.config.search_debounce(), results)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            sales: self.sales(),
            purchases: self.purchases(),
            payables: self.payables(),
            receivables: self.receivables(),
            entries: self.entries(),
            expenses: self.expenses(),
            filters: ListParams::new(0, KPI_PAGE_SIZE),
        }
    }
}
