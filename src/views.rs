//! State behind one paginated table: filters, page, loaded rows and the
//! row selection.

use std::collections::BTreeSet;

use tracing::debug;

use crate::errors::{ClientError, Result};
use crate::filters::{FilterBar, FilterError, FilterOption, PageState};
use crate::models::{EntityId, ListParams, Page};
use crate::notify::Notifier;
use crate::resources::{BatchDeleteReport, Resource, ResourceApi};

pub struct ListView<R: Resource> {
    api: ResourceApi<R>,
    /// `None` for listings without a filter table.
    filters: Option<FilterBar>,
    page: PageState,
    rows: Option<Page<R>>,
    selection: BTreeSet<EntityId>,
    notifier: Notifier,
}

impl<R: Resource> ListView<R> {
    pub fn new(api: ResourceApi<R>, rows_per_page: u64, notifier: Notifier) -> Self {
        Self {
            api,
            filters: R::FILTERS.map(FilterBar::new),
            page: PageState::new(rows_per_page),
            rows: None,
            selection: BTreeSet::new(),
            notifier,
        }
    }

    pub fn filters(&self) -> Option<&FilterBar> {
        self.filters.as_ref()
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn params(&self) -> ListParams {
        match &self.filters {
            Some(bar) => bar.query(&self.page),
            None => ListParams::new(self.page.skip(), self.page.take()),
        }
    }

    /// Rows of the last successful load.
    pub fn rows(&self) -> &[R] {
        self.rows.as_ref().map(|p| p.data.as_slice()).unwrap_or(&[])
    }

    pub fn total_items(&self) -> u64 {
        self.rows.as_ref().map(Page::total_items).unwrap_or(0)
    }

    pub fn total_pages(&self) -> u64 {
        self.page.total_pages(self.total_items())
    }

    /// Fetch the current page. On failure the previous rows stay and a
    /// single error notification is sent. A page left past the end (after
    /// deletions) is pulled back onto the last page.
    pub async fn load(&mut self) -> Result<&[R]> {
        loop {
            let params = self.params();
            let page = self.api.list(&params).await.map_err(|err| self.report(err))?;
            if page.data.is_empty() && self.page.clamp(page.total_items()) {
                continue;
            }
            debug!(rows = page.data.len(), total = page.total_items(), "page loaded");
            self.rows = Some(page);
            return Ok(self.rows());
        }
    }

    pub fn toggle_filter(&mut self, option: FilterOption) -> std::result::Result<bool, FilterError> {
        let active = self.filter_bar()?.toggle(option)?;
        self.page.reset();
        Ok(active)
    }

    pub fn set_filter_value(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> std::result::Result<(), FilterError> {
        self.filter_bar()?.set_value(field, value)?;
        self.page.reset();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        if let Some(bar) = self.filters.as_mut() {
            bar.clear();
        }
        self.page.reset();
    }

    pub fn next_page(&mut self) -> bool {
        self.page.next(self.total_items())
    }

    pub fn prev_page(&mut self) -> bool {
        self.page.prev()
    }

    pub fn go_to(&mut self, page: u64) {
        self.page.go_to(page);
    }

    pub fn select(&mut self, id: EntityId) {
        self.selection.insert(id);
    }

    pub fn deselect(&mut self, id: EntityId) {
        self.selection.remove(&id);
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.contains(&id)
    }

    /// Select every row on the current page.
    pub fn select_all(&mut self) {
        let ids: Vec<EntityId> = self.rows().iter().map(Resource::id).collect();
        self.selection.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.selection.iter().copied()
    }

    /// Delete every selected row independently. The selection is cleared
    /// whatever the outcome; each failed id gets its own notification.
    pub async fn delete_selected(&mut self) -> BatchDeleteReport {
        let ids: Vec<EntityId> = std::mem::take(&mut self.selection).into_iter().collect();
        if ids.is_empty() {
            return BatchDeleteReport::default();
        }

        let report = self.api.delete_many(&ids).await;
        for (_, err) in &report.failed {
            self.notifier.notify_error(err);
        }
        if report.is_complete() {
            self.notifier.success(match report.deleted.len() {
                1 => "Record deleted".to_string(),
                n => format!("{} records deleted", n),
            });
        }
        report
    }

    fn filter_bar(&mut self) -> std::result::Result<&mut FilterBar, FilterError> {
        self.filters.as_mut().ok_or(FilterError::NoFilters(R::NAME))
    }

    fn report(&self, err: ClientError) -> ClientError {
        self.notifier.notify_error(&err);
        err
    }
}
