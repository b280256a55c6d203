//! Revision lists and revision content

use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Revision not found: {0}")]
    NotFound(String),
    #[error("Malformed payload: {0}")]
    Malformed(String),
    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("Fetch abandoned before completion")]
    Abandoned,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Opaque revision identifier (a commit hash in the stock layout)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for headers
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(7) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One historical snapshot of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub id: RevisionId,
    pub date: OffsetDateTime,
}

impl Revision {
    pub fn new(id: impl Into<String>, date: OffsetDateTime) -> Self {
        Self {
            id: RevisionId::new(id),
            date,
        }
    }
}

/// Sort revisions oldest first, keeping the listed order for equal timestamps
pub fn sort_revisions(revisions: &mut [Revision]) {
    revisions.sort_by_key(|r| r.date);
}

/// Where revision lists and contents come from
pub trait RevisionSource: Send + Sync + 'static {
    /// All revisions of the document, in any order
    fn fetch_revision_list(&self) -> impl Future<Output = Result<Vec<Revision>, FetchError>> + Send;

    /// Full text of one revision
    fn fetch_revision_content(
        &self,
        id: &RevisionId,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct HistoryFile {
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    hex: String,
    created: String,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    content: String,
}

/// Static JSON layout on disk:
///
/// - `<root>/<document>.json` with `{"history": [{"hex": .., "created": ..}]}`
/// - `<root>/<document>/<hex>.json` with `{"content": ..}`
#[derive(Debug, Clone)]
pub struct FsRevisionSource {
    root: PathBuf,
    document: String,
}

impl FsRevisionSource {
    pub fn new(root: impl Into<PathBuf>, document: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            document: document.into(),
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn list_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.document))
    }

    pub fn content_path(&self, id: &RevisionId) -> PathBuf {
        self.root
            .join(&self.document)
            .join(format!("{}.json", id.as_str()))
    }

    /// Document names available under `root` (every `<name>.json` with a `<name>/` directory)
    pub fn discover(root: &Path) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if root.join(stem).is_dir() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

async fn read_file(path: &Path, what: &str) -> Result<String, FetchError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FetchError::NotFound(format!("{what} ({})", path.display())))
        }
        Err(e) => Err(FetchError::Io(e)),
    }
}

impl RevisionSource for FsRevisionSource {
    async fn fetch_revision_list(&self) -> Result<Vec<Revision>, FetchError> {
        let path = self.list_path();
        let raw = read_file(&path, &self.document).await?;
        let file: HistoryFile = serde_json::from_str(&raw)?;

        let mut revisions = file
            .history
            .into_iter()
            .map(|entry| {
                let date = OffsetDateTime::parse(&entry.created, &Rfc3339).map_err(|e| {
                    FetchError::Malformed(format!("bad timestamp {:?}: {e}", entry.created))
                })?;
                Ok(Revision::new(entry.hex, date))
            })
            .collect::<Result<Vec<_>, FetchError>>()?;
        sort_revisions(&mut revisions);

        tracing::debug!(document = %self.document, count = revisions.len(), "loaded revision list");
        Ok(revisions)
    }

    async fn fetch_revision_content(&self, id: &RevisionId) -> Result<String, FetchError> {
        let path = self.content_path(id);
        let raw = read_file(&path, id.as_str()).await?;
        let file: ContentFile = serde_json::from_str(&raw)?;
        Ok(file.content)
    }
}
