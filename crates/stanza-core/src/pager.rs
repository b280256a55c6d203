//! Three-page sliding window over an ordered revision list
//!
//! The pager keeps a `previous`, `current` and `next` page. Sequential access
//! through [`RevisionPager::get_commit`] shifts the window one page at a time
//! and starts fetching the neighbouring page once the position comes within
//! `prefetch_bound` revisions of an edge. Arbitrary jumps go through
//! [`RevisionPager::ensure_index`], which rebuilds the window around the target.

use crate::page::{Page, PageLoad, PageStatus};
use crate::source::{sort_revisions, FetchError, Revision, RevisionSource};
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PagerError {
    #[error("Failed to fetch revisions: {0}")]
    Fetch(#[from] Arc<FetchError>),
    #[error("Revision index {index} is out of range (history has {len} revisions)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Revision {index} is not covered by a loaded page")]
    StaleWindowAccess { index: usize },
}

impl From<FetchError> for PagerError {
    fn from(err: FetchError) -> Self {
        PagerError::Fetch(Arc::new(err))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerConfig {
    pub page_size: usize,
    pub prefetch_bound: usize,
    pub fetch_timeout: Option<Duration>,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            prefetch_bound: 25,
            fetch_timeout: None,
        }
    }
}

#[derive(Debug)]
struct Window {
    previous: Page,
    current: Page,
    next: Page,
}

impl Window {
    fn pages(&self) -> [&Page; 3] {
        [&self.previous, &self.current, &self.next]
    }

    fn page_for(&self, index: usize) -> Option<&Page> {
        self.pages().into_iter().find(|p| p.contains(index))
    }
}

/// Completion signals for the three pages of a freshly built window
#[derive(Debug)]
pub struct WindowLoad {
    previous: PageLoad,
    current: PageLoad,
    next: PageLoad,
}

impl WindowLoad {
    /// Resolves once `current` is ready. The neighbours keep loading in the
    /// background; a failure there stays on that page as `Failed`.
    pub async fn wait(self) -> Result<(), PagerError> {
        self.current.wait().await?;
        Ok(())
    }

    /// Resolves once all three pages are ready, or with the first failure
    pub async fn wait_all(self) -> Result<(), PagerError> {
        try_join_all([self.previous, self.current, self.next].map(PageLoad::wait)).await?;
        Ok(())
    }
}

/// Lazily loaded revision history with a three-page cache
#[derive(Debug)]
pub struct RevisionPager<S> {
    source: Arc<S>,
    revisions: Arc<[Revision]>,
    config: PagerConfig,
    window: Option<Window>,
}

impl<S: RevisionSource> RevisionPager<S> {
    /// Pager over an already known revision list
    pub fn new(source: Arc<S>, mut revisions: Vec<Revision>, config: PagerConfig) -> Self {
        sort_revisions(&mut revisions);
        let config = PagerConfig {
            page_size: config.page_size.max(1),
            ..config
        };
        Self {
            source,
            revisions: revisions.into(),
            config,
            window: None,
        }
    }

    /// Fetch the revision list from `source` and build a pager over it
    pub async fn open(source: Arc<S>, config: PagerConfig) -> Result<Self, PagerError> {
        let revisions = source.fetch_revision_list().await?;
        tracing::info!(count = revisions.len(), "revision list loaded");
        Ok(Self::new(source, revisions, config))
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn revision(&self, index: usize) -> Option<&Revision> {
        self.revisions.get(index)
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn previous(&self) -> Option<&Page> {
        self.window.as_ref().map(|w| &w.previous)
    }

    pub fn current(&self) -> Option<&Page> {
        self.window.as_ref().map(|w| &w.current)
    }

    pub fn next(&self) -> Option<&Page> {
        self.window.as_ref().map(|w| &w.next)
    }

    fn check_range(&self, index: usize) -> Result<(), PagerError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(PagerError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    fn page_start(&self, index: usize) -> usize {
        (index / self.config.page_size) * self.config.page_size
    }

    fn page_at(&self, start: usize) -> Page {
        Page::new(&self.revisions, start, self.config.page_size)
    }

    /// The page that precedes a page starting at `start`
    fn page_before(&self, start: usize) -> Page {
        match start.checked_sub(self.config.page_size) {
            Some(prev) => self.page_at(prev),
            None => Page::empty(self.config.page_size),
        }
    }

    /// Reuse a page of the current window if it covers the same range
    fn reuse_or_build(&self, fresh: Page) -> Page {
        self.window
            .as_ref()
            .and_then(|w| {
                w.pages()
                    .into_iter()
                    .find(|p| p.range() == fresh.range())
                    .cloned()
            })
            .unwrap_or(fresh)
    }

    fn load(&self, page: &Page) -> PageLoad {
        page.load(&self.source, self.config.fetch_timeout)
    }

    /// Rebuild the window so that `current` covers `index`, and start loading all
    /// three pages. Pages of the old window that cover the same range are kept.
    /// [`WindowLoad::wait`] only waits for the page holding `index`.
    pub fn ensure_index(&mut self, index: usize) -> Result<WindowLoad, PagerError> {
        self.check_range(index)?;
        let start = self.page_start(index);
        let window = Window {
            previous: self.reuse_or_build(self.page_before(start)),
            current: self.reuse_or_build(self.page_at(start)),
            next: self.reuse_or_build(self.page_at(start.saturating_add(self.config.page_size))),
        };
        tracing::debug!(index, start, "window rebuilt");

        let load = WindowLoad {
            previous: self.load(&window.previous),
            current: self.load(&window.current),
            next: self.load(&window.next),
        };
        self.window = Some(window);
        Ok(load)
    }

    /// Move the window so that `current` covers `index` (at most one page) and
    /// start prefetching a neighbour when `index` is near an edge.
    fn position(&mut self, index: usize) -> Result<&Page, PagerError> {
        self.check_range(index)?;
        let page_size = self.config.page_size;
        let window = self
            .window
            .as_ref()
            .ok_or(PagerError::StaleWindowAccess { index })?;

        if window.current.contains(index) {
            // no shift
        } else if window.next.contains(index) {
            let fresh = self.page_at(window.next.start().saturating_add(page_size));
            if let Some(w) = self.window.as_mut() {
                let current = std::mem::replace(&mut w.next, fresh);
                w.previous = std::mem::replace(&mut w.current, current);
                tracing::debug!(start = w.current.start(), "window shifted forward");
            }
        } else if window.previous.contains(index) {
            let fresh = self.page_before(window.previous.start());
            if let Some(w) = self.window.as_mut() {
                let current = std::mem::replace(&mut w.previous, fresh);
                w.next = std::mem::replace(&mut w.current, current);
                tracing::debug!(start = w.current.start(), "window shifted backward");
            }
        } else {
            return Err(PagerError::StaleWindowAccess { index });
        }

        let bound = self.config.prefetch_bound;
        let window = self
            .window
            .as_ref()
            .ok_or(PagerError::StaleWindowAccess { index })?;
        let current = &window.current;
        if index < current.start().saturating_add(bound) && needs_load(&window.previous) {
            tracing::debug!(index, start = window.previous.start(), "prefetching previous page");
            drop(self.load(&window.previous));
        }
        if index.saturating_add(bound) >= current.end() && needs_load(&window.next) {
            tracing::debug!(index, start = window.next.start(), "prefetching next page");
            drop(self.load(&window.next));
        }
        Ok(current)
    }

    /// Cached content of revision `index` for sequential navigation.
    ///
    /// Shifts the window by one page if `index` has left `current`. The page
    /// holding `index` must already be ready, either through a completed
    /// [`ensure_index`](Self::ensure_index) or by awaiting its load.
    pub fn get_commit(&mut self, index: usize) -> Result<Arc<str>, PagerError> {
        let page = self.position(index)?;
        if let Some(text) = page.content(index) {
            return Ok(text);
        }
        match page.error() {
            Some(err) => Err(PagerError::Fetch(err)),
            None => Err(PagerError::StaleWindowAccess { index }),
        }
    }

    /// True if `index` lies in any page of the window
    pub fn has_index(&self, index: usize) -> bool {
        self.window
            .as_ref()
            .is_some_and(|w| w.page_for(index).is_some())
    }

    /// Cached content of `index` from whichever window page holds it, without
    /// moving the window or starting any fetch
    pub fn peek(&self, index: usize) -> Option<Arc<str>> {
        self.window.as_ref()?.page_for(index)?.content(index)
    }

    /// Content of `index`, loading whatever is needed.
    ///
    /// Shifts the window when `index` is adjacent to `current`, rebuilds it
    /// otherwise, then waits for the page holding `index` only. A failed page
    /// is fetched again.
    pub async fn resolve(&mut self, index: usize) -> Result<Arc<str>, PagerError> {
        self.check_range(index)?;
        if !self.has_index(index) {
            self.ensure_index(index)?.wait().await?;
            return self.get_commit(index);
        }

        let page = self.position(index)?.clone();
        self.load(&page).wait().await?;
        self.get_commit(index)
    }

    /// Content of `index` from the window page that holds it, waiting for that
    /// page without moving the window
    pub async fn resolve_neighbor(&self, index: usize) -> Result<Arc<str>, PagerError> {
        self.check_range(index)?;
        let page = self
            .window
            .as_ref()
            .and_then(|w| w.page_for(index))
            .ok_or(PagerError::StaleWindowAccess { index })?;
        self.load(page).wait().await?;
        page.content(index)
            .ok_or(PagerError::StaleWindowAccess { index })
    }
}

fn needs_load(page: &Page) -> bool {
    matches!(page.status(), PageStatus::Unloaded | PageStatus::Failed)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::source::{FetchError, Revision, RevisionId, RevisionSource};
    use rustc_hash::{FxHashMap, FxHashSet};
    use std::sync::Mutex;
    use std::time::Duration;
    use time::OffsetDateTime;

    pub(crate) fn revision(i: usize) -> Revision {
        let date = OffsetDateTime::UNIX_EPOCH + time::Duration::minutes(i as i64);
        Revision::new(format!("rev-{i}"), date)
    }

    pub(crate) fn revisions(n: usize) -> Vec<Revision> {
        (0..n).map(revision).collect()
    }

    /// In-memory source that counts fetches per revision
    #[derive(Debug, Default)]
    pub(crate) struct CountingSource {
        list: Vec<Revision>,
        texts: FxHashMap<RevisionId, String>,
        counts: Mutex<FxHashMap<RevisionId, usize>>,
        failing: Mutex<FxHashSet<RevisionId>>,
        delay: Option<Duration>,
    }

    impl CountingSource {
        /// Each revision's text is `text of <id>`
        pub(crate) fn new(list: &[Revision]) -> Self {
            let texts = list
                .iter()
                .map(|r| (r.id.clone(), format!("text of {}", r.id)))
                .collect();
            Self {
                list: list.to_vec(),
                texts,
                ..Self::default()
            }
        }

        /// Revisions `rev-0..` with the given texts, oldest first
        pub(crate) fn with_texts(texts: &[&str]) -> Self {
            let list = revisions(texts.len());
            let texts = list
                .iter()
                .zip(texts)
                .map(|(r, t)| (r.id.clone(), t.to_string()))
                .collect();
            Self {
                list,
                texts,
                ..Self::default()
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn list(&self) -> Vec<Revision> {
            self.list.clone()
        }

        pub(crate) fn fail(&self, id: &RevisionId) {
            self.failing.lock().unwrap().insert(id.clone());
        }

        pub(crate) fn heal(&self, id: &RevisionId) {
            self.failing.lock().unwrap().remove(id);
        }

        pub(crate) fn fetches(&self, id: &RevisionId) -> usize {
            self.counts.lock().unwrap().get(id).copied().unwrap_or(0)
        }

        pub(crate) fn total_fetches(&self) -> usize {
            self.counts.lock().unwrap().values().sum()
        }
    }

    impl RevisionSource for CountingSource {
        async fn fetch_revision_list(&self) -> Result<Vec<Revision>, FetchError> {
            Ok(self.list.clone())
        }

        async fn fetch_revision_content(&self, id: &RevisionId) -> Result<String, FetchError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            *self.counts.lock().unwrap().entry(id.clone()).or_default() += 1;
            if self.failing.lock().unwrap().contains(id) {
                return Err(FetchError::NotFound(id.to_string()));
            }
            self.texts
                .get(id)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(id.to_string()))
        }
    }
}
