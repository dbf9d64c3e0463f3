//! Debounced name search.
//!
//! Keystrokes are fed to a background task. Each one restarts the quiet
//! period; when it elapses the last term is searched, provided it is long
//! enough after trimming.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::errors::Result;
use crate::resources::{Resource, ResourceApi};

pub struct DebouncedSearch {
    tx: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl DebouncedSearch {
    /// Start the debounce task. `on_search` receives the trimmed term.
    pub fn spawn<F, Fut>(delay: Duration, min_chars: usize, mut on_search: F) -> Self
    where
        F: FnMut(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let task = tokio::spawn(async move {
            let mut pending: Option<String> = None;
            loop {
                let Some(term) = pending.take() else {
                    match rx.recv().await {
                        Some(term) => pending = Some(term),
                        None => break,
                    }
                    continue;
                };

                tokio::select! {
                    next = rx.recv() => match next {
                        Some(next) => {
                            trace!(term = %next, "debounce restarted");
                            pending = Some(next);
                        }
                        None => break,
                    },
                    _ = tokio::time::sleep(delay) => {
                        let term = term.trim();
                        if term.chars().count() >= min_chars {
                            debug!(%term, "search fired");
                            on_search(term.to_string()).await;
                        } else {
                            trace!(%term, "search term too short");
                        }
                    }
                }
            }
        });

        Self { tx, task }
    }

    /// Name search against a resource, delivering results to `results`.
    pub fn for_resource<R: Resource>(
        api: ResourceApi<R>,
        delay: Duration,
        results: mpsc::UnboundedSender<Result<Vec<R>>>,
    ) -> Self {
        let min_chars = api.search_min_chars();
        Self::spawn(delay, min_chars, move |term| {
            let api = api.clone();
            let results = results.clone();
            async move {
                if let Some(found) = api.search_by_name(&term).await.transpose() {
                    let _ = results.send(found);
                }
            }
        })
    }

    /// Feed a keystroke. Returns false once the task has stopped.
    pub fn input(&self, term: impl Into<String>) -> bool {
        self.tx.send(term.into()).is_ok()
    }

    /// Stop the task. A term still waiting for its quiet period is dropped.
    pub async fn close(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}
