//! Bounded-concurrency scan scheduler.
//!
//! Fans each catalog item out to an independent resolve -> fetch -> match
//! task, gated by a semaphore so no more than the configured number of item
//! pipelines (and therefore upstream calls) are in flight at once. Results
//! are reassembled into the input order regardless of completion order, and
//! one item's failure never affects another's task.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::matching;
use crate::metadata::{IdentifierResolver, KeywordFetcher};
use crate::model::{MatchReason, MatchResult, MediaItem};

/// Runs the per-item pipeline across a bounded set of concurrent tasks.
pub struct Scheduler {
    resolver: Arc<IdentifierResolver>,
    fetcher: Arc<KeywordFetcher>,
    concurrency: usize,
}

impl Scheduler {
    /// Create a scheduler that keeps at most `concurrency` item pipelines in
    /// flight. A limit of zero is clamped to one.
    pub fn new(
        resolver: Arc<IdentifierResolver>,
        fetcher: Arc<KeywordFetcher>,
        concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Scan `items` for `term`, returning one [`MatchResult`] per input item
    /// in the input order.
    ///
    /// The batch always runs to completion: per-item panics are caught at
    /// the task boundary and recorded as non-matches, and upstream failures
    /// have already been degraded to unresolved/empty outcomes further down
    /// the stack.
    pub async fn run(&self, items: Vec<MediaItem>, term: &str) -> Vec<MatchResult> {
        info!(
            count = items.len(),
            concurrency = self.concurrency,
            term,
            "Starting keyword scan"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<(usize, MatchResult)> = JoinSet::new();

        for (index, item) in items.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let resolver = self.resolver.clone();
            let fetcher = self.fetcher.clone();
            let term = term.to_string();

            tasks.spawn(async move {
                // The permit is taken inside the task so the whole pipeline,
                // including both network boundaries, counts against the limit.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("scan semaphore is never closed");

                let id = resolver.resolve(&item).await;
                let keywords = fetcher.fetch(&id).await;
                let result = matching::evaluate(&item, &keywords, &term);
                (index, result)
            });
        }

        // Reassemble by input position; tasks finish in arbitrary order.
        let mut slots: Vec<Option<MatchResult>> = vec![None; items.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(error = %e, "Item task failed"),
            }
        }

        // A slot left empty means its task panicked; record the item as a
        // non-match rather than dropping it from the output.
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    let item = items[index].clone();
                    warn!(
                        rating_key = %item.rating_key,
                        title = %item.title,
                        "Recording failed item as non-match"
                    );
                    MatchResult {
                        item,
                        matched: false,
                        reason: MatchReason::None,
                    }
                })
            })
            .collect()
    }
}
