//! Request pipeline: identifier lookup, full-text retrieval, passage filtering.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bioc::{FullTextSource, parse_passages};
use crate::keywords::filter_medicinal;
use crate::pubmed::{DEFAULT_RETMAX, LiteratureIndex};

pub const DEFAULT_MAX_PASSAGES: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct HarvestOptions {
    /// Identifiers requested from the search endpoint.
    pub max_articles: u32,
    /// Passages kept per article, first ones first.
    pub max_passages: usize,
    /// Articles examined at once. 1 processes them strictly one after another.
    pub concurrency: usize,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            max_articles: DEFAULT_RETMAX,
            max_passages: DEFAULT_MAX_PASSAGES,
            concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub article_title: String,
    pub passages: Vec<String>,
    pub pubmed_id: String,
}

#[derive(Debug, Serialize)]
pub struct MedicinalReport {
    pub plant: String,
    pub results: Vec<ArticleRecord>,
}

/// What happened to one identifier. Only `Matched` reaches the report.
#[derive(Debug)]
enum ArticleOutcome {
    Matched(ArticleRecord),
    NoDocument,
    NoMatches,
    Failed,
}

pub struct Harvester<I, F> {
    index: I,
    full_text: F,
    options: HarvestOptions,
}

impl<I, F> Harvester<I, F>
where
    I: LiteratureIndex + Sync,
    F: FullTextSource + Sync,
{
    pub fn new(index: I, full_text: F, options: HarvestOptions) -> Self {
        Self {
            index,
            full_text,
            options,
        }
    }

    /// Collect medicinal passages for `plant`.
    ///
    /// Upstream failures never surface here: a failed lookup gives an empty
    /// report, and an article whose document is missing, unreadable, or has no
    /// matching passage is left out.
    pub async fn harvest(&self, plant: &str) -> MedicinalReport {
        let ids = match self.index.search_ids(plant, self.options.max_articles).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(plant, error = %e, "identifier lookup failed");
                Vec::new()
            }
        };

        // `buffered` yields in input order regardless of completion order.
        let outcomes: Vec<ArticleOutcome> = stream::iter(ids)
            .map(|id| self.examine(id))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let examined = outcomes.len();
        let results: Vec<ArticleRecord> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                ArticleOutcome::Matched(record) => Some(record),
                _ => None,
            })
            .collect();

        info!(plant, examined, matched = results.len(), "harvest complete");
        MedicinalReport {
            plant: plant.to_string(),
            results,
        }
    }

    async fn examine(&self, id: String) -> ArticleOutcome {
        let title = match self.index.fetch_title(&id).await {
            Ok(title) => title,
            Err(e) => {
                warn!(%id, error = %e, "title lookup failed");
                String::new()
            }
        };

        let document = match self.full_text.fetch_document(&id).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!(%id, "no full text available");
                return ArticleOutcome::NoDocument;
            }
            Err(e) => {
                warn!(%id, error = %e, "full text fetch failed");
                return ArticleOutcome::Failed;
            }
        };

        let mut passages = filter_medicinal(parse_passages(&document));
        passages.truncate(self.options.max_passages);
        if passages.is_empty() {
            debug!(%id, "no medicinal passages");
            return ArticleOutcome::NoMatches;
        }

        debug!(%id, passages = passages.len(), "article matched");
        ArticleOutcome::Matched(ArticleRecord {
            article_title: title,
            passages,
            pubmed_id: id,
        })
    }
}
