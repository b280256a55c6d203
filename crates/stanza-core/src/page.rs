//! A block of consecutive revisions fetched and cached together

use crate::source::{FetchError, Revision, RevisionId, RevisionSource};
use futures::future::try_join_all;
use rustc_hash::FxHashMap;
use std::ops::Range;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::watch;

/// Public view of a page's load progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone)]
enum LoadState {
    Unloaded,
    Loading,
    Ready,
    Failed(Arc<FetchError>),
}

impl LoadState {
    fn status(&self) -> PageStatus {
        match self {
            LoadState::Unloaded => PageStatus::Unloaded,
            LoadState::Loading => PageStatus::Loading,
            LoadState::Ready => PageStatus::Ready,
            LoadState::Failed(_) => PageStatus::Failed,
        }
    }

    fn is_settled(&self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Failed(_))
    }
}

#[derive(Debug)]
struct PageInner {
    start: usize,
    page_size: usize,
    revisions: Vec<Revision>,
    content: OnceLock<FxHashMap<RevisionId, Arc<str>>>,
    state: watch::Sender<LoadState>,
}

/// A window of `page_size` revisions starting at `start`.
///
/// Cloning a page is cheap and shares its cache. A page that reaches past the
/// end of the revision list simply holds fewer revisions.
#[derive(Debug, Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

impl Page {
    /// Page covering `start..start + page_size`, clipped to the revision list
    pub fn new(revisions: &[Revision], start: usize, page_size: usize) -> Self {
        let end = start.saturating_add(page_size).min(revisions.len());
        let covered = if start < end {
            revisions[start..end].to_vec()
        } else {
            Vec::new()
        };
        Self::from_parts(start, page_size, covered)
    }

    /// A page that covers nothing, used before the first revision
    pub fn empty(page_size: usize) -> Self {
        Self::from_parts(0, page_size, Vec::new())
    }

    fn from_parts(start: usize, page_size: usize, revisions: Vec<Revision>) -> Self {
        let (state, _) = watch::channel(LoadState::Unloaded);
        Self {
            inner: Arc::new(PageInner {
                start,
                page_size,
                revisions,
                content: OnceLock::new(),
                state,
            }),
        }
    }

    pub fn start(&self) -> usize {
        self.inner.start
    }

    /// Nominal end, `start + page_size`, whether or not the list reaches it
    pub fn end(&self) -> usize {
        self.inner.start.saturating_add(self.inner.page_size)
    }

    /// Number of revisions actually covered
    pub fn len(&self) -> usize {
        self.inner.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.revisions.is_empty()
    }

    /// Indices actually covered
    pub fn range(&self) -> Range<usize> {
        self.inner.start..self.inner.start + self.len()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }

    pub fn status(&self) -> PageStatus {
        self.inner.state.borrow().status()
    }

    /// Number of revisions whose content is cached
    pub fn cached(&self) -> usize {
        self.inner.content.get().map_or(0, |c| c.len())
    }

    /// Cached content for the revision at `index`, if the page is ready
    pub fn content(&self, index: usize) -> Option<Arc<str>> {
        let revision = self.inner.revisions.get(index.checked_sub(self.inner.start)?)?;
        self.inner.content.get()?.get(&revision.id).cloned()
    }

    /// The error that failed the last load, if the page is in `Failed`
    pub fn error(&self) -> Option<Arc<FetchError>> {
        match &*self.inner.state.borrow() {
            LoadState::Failed(err) => Some(Arc::clone(err)),
            _ => None,
        }
    }

    /// True if both handles refer to the same page instance
    pub fn same_as(&self, other: &Page) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Start fetching every revision of the page.
    ///
    /// A page that is already loading or ready is left alone. A failed page is
    /// fetched again. The returned handle resolves when the page settles.
    pub fn load<S: RevisionSource>(&self, source: &Arc<S>, timeout: Option<Duration>) -> PageLoad {
        let rx = self.inner.state.subscribe();

        if self.inner.revisions.is_empty() {
            self.inner.content.get_or_init(FxHashMap::default);
            self.inner.state.send_if_modified(|state| {
                if matches!(state, LoadState::Ready) {
                    false
                } else {
                    *state = LoadState::Ready;
                    true
                }
            });
            return PageLoad { rx };
        }

        let claimed = self.inner.state.send_if_modified(|state| match state {
            LoadState::Unloaded | LoadState::Failed(_) => {
                *state = LoadState::Loading;
                true
            }
            LoadState::Loading | LoadState::Ready => false,
        });
        if !claimed {
            return PageLoad { rx };
        }

        tracing::debug!(start = self.start(), len = self.len(), "loading page");
        let inner = Arc::clone(&self.inner);
        let source = Arc::clone(source);
        tokio::spawn(async move {
            let ids: Vec<RevisionId> = inner.revisions.iter().map(|r| r.id.clone()).collect();
            let fetches = ids.into_iter().map(|id| {
                let source = Arc::clone(&source);
                async move {
                    let text = fetch_one(source.as_ref(), &id, timeout).await?;
                    Ok::<_, FetchError>((id, Arc::<str>::from(text)))
                }
            });

            match try_join_all(fetches).await {
                Ok(pairs) => {
                    let _ = inner.content.set(pairs.into_iter().collect());
                    inner.state.send_replace(LoadState::Ready);
                    tracing::debug!(start = inner.start, "page ready");
                }
                Err(err) => {
                    tracing::warn!(start = inner.start, error = %err, "page load failed");
                    inner.state.send_replace(LoadState::Failed(Arc::new(err)));
                }
            }
        });

        PageLoad { rx }
    }
}

async fn fetch_one<S: RevisionSource>(
    source: &S,
    id: &RevisionId,
    timeout: Option<Duration>,
) -> Result<String, FetchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch_revision_content(id))
            .await
            .map_err(|_| FetchError::Timeout(limit))?,
        None => source.fetch_revision_content(id).await,
    }
}

/// Completion signal for a page load
#[derive(Debug)]
pub struct PageLoad {
    rx: watch::Receiver<LoadState>,
}

impl PageLoad {
    /// Wait until the page is ready, or return the error that failed it
    pub async fn wait(mut self) -> Result<(), Arc<FetchError>> {
        let settled = match self.rx.wait_for(LoadState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => return Err(Arc::new(FetchError::Abandoned)),
        };
        match settled {
            LoadState::Failed(err) => Err(err),
            _ => Ok(()),
        }
    }
}
