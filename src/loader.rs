//! Assembles the complete trip dataset from the paginated listing.

use crate::error::Result;
use crate::fetch::PageSource;
use crate::model::{DateRange, Dataset, PageRequest};
use tracing::{debug, info, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 10_000;
pub const DEFAULT_MAX_PAGES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    pub page_size: u32,
    /// Hard ceiling on the number of pages requested per load.
    pub max_pages: u32,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Drives a [`PageSource`] page by page, strictly in order, until the server
/// reports no further pages or the page ceiling is hit.
pub struct DatasetLoader<S> {
    source: S,
    options: LoaderOptions,
}

impl<S: PageSource> DatasetLoader<S> {
    /// A zero `max_pages` or `page_size` is raised to 1.
    pub fn new(source: S, options: LoaderOptions) -> Self {
        let options = LoaderOptions {
            page_size: options.page_size.max(1),
            max_pages: options.max_pages.max(1),
        };
        Self { source, options }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    /// Fetches pages `1..=k` with the same date range on every request.
    ///
    /// Any page failure aborts the whole load; no partial dataset is
    /// returned. Stopping at the ceiling is not a failure: the dataset is
    /// returned with `truncated` set.
    #[tracing::instrument(skip(self), fields(max_pages = self.options.max_pages))]
    pub async fn load(&self, range: Option<DateRange>) -> Result<Dataset> {
        let mut records = Vec::new();
        let mut pages_fetched = 0;
        let mut has_next = true;

        while has_next && pages_fetched < self.options.max_pages {
            let page = pages_fetched + 1;
            let request = PageRequest {
                page,
                page_size: self.options.page_size,
                range,
            };

            let fetched = self.source.fetch_page(&request).await?;
            let page_records = fetched.records.len();
            records.extend(fetched.records);
            has_next = fetched.has_next;
            pages_fetched = page;

            debug!(page, page_records, total = records.len(), has_next, "Loaded page");
        }

        let truncated = has_next;
        if truncated {
            warn!(
                max_pages = self.options.max_pages,
                records = records.len(),
                "Reached maximum page limit, stopping pagination; data may be truncated"
            );
        }

        info!(pages = pages_fetched, records = records.len(), "Finished loading trips");

        Ok(Dataset {
            records,
            range,
            pages_fetched,
            truncated,
        })
    }
}
