//! Per-entity query and mutation API.
//!
//! Every read goes through the [`QueryCache`]; every successful mutation
//! invalidates the slots it can have changed.

mod bills;
mod entities;
mod entries;
mod orders;

pub use entities::Resource;
pub use orders::Attachment;

use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::cache::{QueryCache, QueryKey};
use crate::errors::{ClientError, Result};
use crate::http::{HttpClient, QueryPairs};
use crate::models::{EntityId, ListParams, Page, Period};

pub(crate) fn id_query(id: EntityId) -> QueryPairs {
    vec![("id".to_string(), id.to_string())]
}

/// Records echoed back by mutations are optional: some endpoints answer
/// with the record, some with a plain-text message, some with nothing.
fn echoed<R: DeserializeOwned>(body: &[u8]) -> Option<R> {
    match serde_json::from_slice(body) {
        Ok(record) => Some(record),
        Err(_) => {
            if !body.is_empty() {
                debug!(body = %String::from_utf8_lossy(body), "acknowledged without a record");
            }
            None
        }
    }
}

/// Outcome of deleting several records one by one.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteReport {
    pub deleted: Vec<EntityId>,
    pub failed: Vec<(EntityId, ClientError)>,
}

impl BatchDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }
}

/// Typed API for one entity.
pub struct ResourceApi<R> {
    http: Arc<HttpClient>,
    cache: QueryCache,
    search_min_chars: usize,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            cache: self.cache.clone(),
            search_min_chars: self.search_min_chars,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceApi<R> {
    pub fn new(http: Arc<HttpClient>, cache: QueryCache, search_min_chars: usize) -> Self {
        Self {
            http,
            cache,
            search_min_chars,
            _resource: PhantomData,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn search_min_chars(&self) -> usize {
        self.search_min_chars
    }

    /// One page of records: `GET {PATH}?skip&take&<filters>`.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn list(&self, params: &ListParams) -> Result<Page<R>> {
        let key = QueryKey::list(R::NAME, params);
        let http = Arc::clone(&self.http);
        let query = params.to_query();
        self.cache
            .fetch(&key, move || async move { http.get(R::PATH, &query).await })
            .await
    }

    /// A single record, `None` when the backend does not know the id.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn get_by_id(&self, id: EntityId) -> Result<Option<R>> {
        let key = QueryKey::detail(R::NAME, id);
        let http = Arc::clone(&self.http);
        let path = format!("{}/search/by-id", R::PATH);
        self.cache
            .fetch(&key, move || async move {
                match http.get::<Option<R>>(&path, &id_query(id)).await {
                    Err(err) if err.is_not_found() => Ok(None),
                    other => other,
                }
            })
            .await
    }

    #[instrument(skip(self, payload), fields(resource = R::NAME))]
    pub async fn create(&self, payload: &R::Create) -> Result<Option<R>> {
        payload.validate()?;
        let body = self.http.post_ack(R::PATH, payload).await?;
        self.invalidate_collections();
        info!("created");
        Ok(echoed(&body))
    }

    #[instrument(skip(self, payload), fields(resource = R::NAME))]
    pub async fn update(&self, id: EntityId, payload: &R::Update) -> Result<Option<R>> {
        payload.validate()?;
        let body = self.http.put_ack(R::PATH, &id_query(id), payload).await?;
        self.invalidate_record(id);
        info!("updated");
        Ok(echoed(&body))
    }

    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.http.delete(R::PATH, &id_query(id)).await?;
        self.cache.remove(&QueryKey::detail(R::NAME, id));
        self.invalidate_collections();
        info!("deleted");
        Ok(())
    }

    /// Deletes each id independently. Failures are collected per id and
    /// records already deleted stay deleted.
    #[instrument(skip(self, ids), fields(resource = R::NAME, count = ids.len()))]
    pub async fn delete_many(&self, ids: &[EntityId]) -> BatchDeleteReport {
        let results = join_all(ids.iter().map(|&id| async move {
            (id, self.http.delete(R::PATH, &id_query(id)).await)
        }))
        .await;

        let mut report = BatchDeleteReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => {
                    self.cache.remove(&QueryKey::detail(R::NAME, id));
                    report.deleted.push(id);
                }
                Err(err) => {
                    warn!(id, error = %err, "delete failed");
                    report.failed.push((id, err));
                }
            }
        }
        if !report.deleted.is_empty() {
            self.invalidate_collections();
        }
        report
    }

    /// Name search. Terms shorter than the configured minimum return
    /// `None` without touching the network.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn search_by_name(&self, name: &str) -> Result<Option<Vec<R>>> {
        let term = name.trim();
        if term.chars().count() < self.search_min_chars {
            debug!("search term below minimum length");
            return Ok(None);
        }
        let query = vec![("name".to_string(), term.to_string())];
        let key = QueryKey::search(R::NAME, "by-name", &query);
        let http = Arc::clone(&self.http);
        let path = format!("{}/search/by-name", R::PATH);
        self.cache
            .fetch(&key, move || async move { http.get(&path, &query).await })
            .await
            .map(Some)
    }

    /// Period search, only when both dates are present.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn search_by_period(
        &self,
        period: &Period,
        params: &ListParams,
    ) -> Result<Option<Page<R>>> {
        let Some(mut query) = period.to_query() else {
            debug!("incomplete period");
            return Ok(None);
        };
        query.push(("skip".to_string(), params.skip.to_string()));
        query.push(("take".to_string(), params.take.to_string()));

        let key = QueryKey::search(R::NAME, "by-period", &query);
        let http = Arc::clone(&self.http);
        let path = format!("{}/search/by-period", R::PATH);
        self.cache
            .fetch(&key, move || async move { http.get(&path, &query).await })
            .await
            .map(Some)
    }

    /// Lists and searches of this entity.
    pub(crate) fn invalidate_collections(&self) {
        self.cache.invalidate(&QueryKey::lists(R::NAME));
        self.cache.invalidate(&QueryKey::searches(R::NAME));
    }

    /// One record plus every collection that may contain it.
    pub(crate) fn invalidate_record(&self, id: EntityId) {
        self.cache.invalidate(&QueryKey::detail(R::NAME, id));
        self.invalidate_collections();
    }
}
